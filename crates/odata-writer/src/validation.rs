// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Payload rules checked against settings and the entity model.

use odata_edm::{EdmModel, EntityTypeRef, NavigationProperty};
use odata_payload::{ODataEntityReferenceLink, ODataEntry, ODataFeed, ODataNavigationLink, ODataVersion};

use crate::duplicate::DuplicatePropertyNamesChecker;
use crate::error::WriterError;
use crate::settings::WriterBehavior;
use crate::state::ContentKind;

const RESERVED_NAME_CHARS: [char; 3] = [':', '.', '@'];

/// Navigation property a link resolved to, with its target entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationTarget {
    /// The navigation property.
    pub property: NavigationProperty,
    /// Entity type of the property's target (the item type for collections).
    pub entity_type: EntityTypeRef,
}

const fn multiplicity(is_collection: bool) -> &'static str {
    if is_collection {
        "collection-valued"
    } else {
        "single-valued"
    }
}

/// Resolve an entry's entity type. Without a model nothing resolves.
pub(crate) fn resolve_entity_type(
    model: Option<&dyn EdmModel>,
    type_name: Option<&str>,
    fallback: Option<&EntityTypeRef>,
) -> Result<Option<EntityTypeRef>, WriterError> {
    let Some(model) = model else {
        return Ok(None);
    };
    match type_name {
        Some(name) => model
            .find_entity_type(name)
            .map(Some)
            .ok_or_else(|| WriterError::UnrecognizedTypeName {
                type_name: name.to_owned(),
            }),
        None => fallback
            .cloned()
            .map(Some)
            .ok_or(WriterError::MissingTypeName),
    }
}

/// The entry's resolved type must be assignable to the writer's expected type.
pub(crate) fn validate_expected_type(
    model: &dyn EdmModel,
    entity_type: &EntityTypeRef,
    expected: &EntityTypeRef,
) -> Result<(), WriterError> {
    if model.is_assignable_from(expected, entity_type) {
        Ok(())
    } else {
        Err(WriterError::IncompatibleType {
            type_name: entity_type.name.clone(),
            expected: expected.name.clone(),
        })
    }
}

/// Media link entry types need a media resource; other types must not have one.
pub(crate) fn validate_entry_media_resource(
    entry: &ODataEntry,
    entity_type: Option<&EntityTypeRef>,
    enabled: bool,
) -> Result<(), WriterError> {
    let Some(entity_type) = entity_type else {
        return Ok(());
    };
    if !enabled {
        return Ok(());
    }
    match (entity_type.has_stream, entry.media_resource.is_some()) {
        (true, false) => Err(WriterError::EntryWithoutMediaResource {
            type_name: entity_type.name.clone(),
        }),
        (false, true) => Err(WriterError::EntryWithMediaResourceAndNonMleType {
            type_name: entity_type.name.clone(),
        }),
        _ => Ok(()),
    }
}

/// An expanded entry must be assignable to its navigation link's target type.
pub(crate) fn validate_entry_in_expanded_link(
    model: Option<&dyn EdmModel>,
    entity_type: Option<&EntityTypeRef>,
    target: Option<&NavigationTarget>,
) -> Result<(), WriterError> {
    let (Some(model), Some(entity_type), Some(target)) = (model, entity_type, target) else {
        return Ok(());
    };
    if model.is_assignable_from(&target.entity_type, entity_type) {
        Ok(())
    } else {
        Err(WriterError::EntryTypeNotCompatibleWithNavigationProperty {
            type_name: entity_type.name.clone(),
            expected: target.entity_type.name.clone(),
        })
    }
}

/// Check a navigation link against its content and, when known, its declaring type.
///
/// `content` is `None` for a deferred link. Returns the resolved target when a
/// model and a declaring type are available.
pub(crate) fn validate_navigation_link(
    model: Option<&dyn EdmModel>,
    link: &ODataNavigationLink,
    declaring_type: Option<&EntityTypeRef>,
    content: Option<ContentKind>,
) -> Result<Option<NavigationTarget>, WriterError> {
    if link.name.is_empty() {
        return Err(WriterError::NavigationLinkWithoutName);
    }
    let is_reference = content == Some(ContentKind::EntityReferenceLink);
    let is_feed = content == Some(ContentKind::Feed);

    if let (Some(is_collection), Some(kind)) = (link.is_collection, content) {
        if !is_reference && is_collection != is_feed {
            return Err(WriterError::LinkContentMismatch {
                link: link.name.clone(),
                is_collection,
                content: kind,
            });
        }
    }

    let (Some(model), Some(declaring_type)) = (model, declaring_type) else {
        return Ok(None);
    };
    let property = model
        .find_navigation_property(declaring_type, &link.name)
        .ok_or_else(|| WriterError::NavigationPropertyNotDefined {
            property: link.name.clone(),
            type_name: declaring_type.name.clone(),
        })?;
    let mismatch = || WriterError::LinkMetadataMismatch {
        link: link.name.clone(),
        metadata: multiplicity(property.is_collection),
    };
    if let Some(is_collection) = link.is_collection {
        // A single reference may be bound into a collection-valued link.
        if is_collection != property.is_collection && (is_collection || !is_reference) {
            return Err(mismatch());
        }
    }
    if content.is_some() && !is_reference && property.is_collection != is_feed {
        return Err(mismatch());
    }
    let entity_type = model.find_entity_type(&property.target_type).ok_or_else(|| {
        WriterError::UnrecognizedTypeName {
            type_name: property.target_type.clone(),
        }
    })?;
    Ok(Some(NavigationTarget {
        property,
        entity_type,
    }))
}

/// Rules for a feed as it starts.
pub(crate) fn validate_feed_start(
    feed: &ODataFeed,
    is_top_level: bool,
    writing_response: bool,
    version: ODataVersion,
) -> Result<(), WriterError> {
    if feed.count.is_none() {
        return Ok(());
    }
    if !is_top_level {
        return Err(WriterError::InlineCountOnNonTopLevelFeed);
    }
    if !writing_response {
        return Err(WriterError::InlineCountInRequest);
    }
    require_version("inline count", ODataVersion::V2, version)
}

/// Rules for a feed as it ends. The next-page link may be set while entries are written.
pub(crate) fn validate_feed_end(
    feed: &ODataFeed,
    writing_response: bool,
    version: ODataVersion,
) -> Result<(), WriterError> {
    if feed.next_page_link.is_none() {
        return Ok(());
    }
    if !writing_response {
        return Err(WriterError::NextPageLinkInRequest);
    }
    require_version("next-page link", ODataVersion::V2, version)
}

fn require_version(
    feature: &'static str,
    required: ODataVersion,
    actual: ODataVersion,
) -> Result<(), WriterError> {
    if actual < required {
        return Err(WriterError::VersionTooLow {
            feature,
            required,
            actual,
        });
    }
    Ok(())
}

pub(crate) fn validate_entity_reference_link(
    link: &ODataEntityReferenceLink,
) -> Result<(), WriterError> {
    if link.url.is_empty() {
        return Err(WriterError::EntityReferenceLinkWithoutUrl);
    }
    Ok(())
}

pub(crate) fn validate_property_name(name: &str) -> Result<(), WriterError> {
    if name.is_empty() || name.contains(RESERVED_NAME_CHARS) {
        return Err(WriterError::InvalidPropertyName {
            name: name.to_owned(),
        });
    }
    Ok(())
}

/// Property rules for an entry as it ends.
pub(crate) fn validate_entry_end(
    entry: &ODataEntry,
    entity_type: Option<&EntityTypeRef>,
    checker: &mut DuplicatePropertyNamesChecker,
    model: Option<&dyn EdmModel>,
    behavior: WriterBehavior,
) -> Result<(), WriterError> {
    for property in &entry.properties {
        validate_property_name(&property.name)?;
        if let (Some(model), Some(ty)) = (model, entity_type) {
            if !behavior.allow_undeclared_properties
                && !ty.is_open
                && !model.has_declared_property(ty, &property.name)
            {
                return Err(WriterError::UndeclaredProperty {
                    name: property.name.clone(),
                    type_name: ty.name.clone(),
                });
            }
        }
        checker.check_property(&property.name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use odata_edm::{EntityType, SchemaModel};
    use odata_payload::{MediaResource, ODataProperty};

    fn model() -> SchemaModel {
        SchemaModel::builder()
            .entity_type(
                EntityType::new("NS.Person")
                    .with_property("Name")
                    .with_navigation("Friends", "NS.Person", true)
                    .with_navigation("BestFriend", "NS.Person", false),
            )
            .entity_type(EntityType::new("NS.Photo").with_stream())
            .build()
            .unwrap()
    }

    #[test]
    fn no_model_resolves_nothing() {
        assert_eq!(resolve_entity_type(None, Some("NS.Ghost"), None), Ok(None));
    }

    #[test]
    fn type_names_resolve_or_fail() {
        let model = model();
        let person = resolve_entity_type(Some(&model), Some("NS.Person"), None)
            .unwrap()
            .unwrap();
        assert_eq!(person.name, "NS.Person");
        assert!(matches!(
            resolve_entity_type(Some(&model), Some("NS.Ghost"), None),
            Err(WriterError::UnrecognizedTypeName { .. })
        ));
        assert_eq!(
            resolve_entity_type(Some(&model), None, None),
            Err(WriterError::MissingTypeName)
        );
        let fallback = resolve_entity_type(Some(&model), None, Some(&person))
            .unwrap()
            .unwrap();
        assert_eq!(fallback.name, "NS.Person");
    }

    #[test]
    fn media_resources_follow_has_stream() {
        let model = model();
        let photo = model.find_entity_type("NS.Photo").unwrap();
        let person = model.find_entity_type("NS.Person").unwrap();
        let bare = ODataEntry::new();
        let media = ODataEntry::new().with_media_resource(MediaResource::default());

        assert!(matches!(
            validate_entry_media_resource(&bare, Some(&photo), true),
            Err(WriterError::EntryWithoutMediaResource { .. })
        ));
        assert!(matches!(
            validate_entry_media_resource(&media, Some(&person), true),
            Err(WriterError::EntryWithMediaResourceAndNonMleType { .. })
        ));
        validate_entry_media_resource(&bare, Some(&photo), false).unwrap();
        validate_entry_media_resource(&media, Some(&photo), true).unwrap();
    }

    #[test]
    fn link_content_must_match_link_multiplicity() {
        let link = ODataNavigationLink::single("BestFriend");
        assert!(matches!(
            validate_navigation_link(None, &link, None, Some(ContentKind::Feed)),
            Err(WriterError::LinkContentMismatch { .. })
        ));
        validate_navigation_link(None, &link, None, Some(ContentKind::EntityReferenceLink))
            .unwrap();
        assert_eq!(
            validate_navigation_link(None, &ODataNavigationLink::new(""), None, None),
            Err(WriterError::NavigationLinkWithoutName)
        );
    }

    #[test]
    fn link_resolves_against_declaring_type() {
        let model = model();
        let person = model.find_entity_type("NS.Person").unwrap();

        let target = validate_navigation_link(
            Some(&model),
            &ODataNavigationLink::new("Friends"),
            Some(&person),
            Some(ContentKind::Feed),
        )
        .unwrap()
        .unwrap();
        assert!(target.property.is_collection);
        assert_eq!(target.entity_type.name, "NS.Person");

        assert!(matches!(
            validate_navigation_link(
                Some(&model),
                &ODataNavigationLink::new("Enemies"),
                Some(&person),
                None
            ),
            Err(WriterError::NavigationPropertyNotDefined { .. })
        ));
        assert!(matches!(
            validate_navigation_link(
                Some(&model),
                &ODataNavigationLink::new("Friends"),
                Some(&person),
                Some(ContentKind::Entry)
            ),
            Err(WriterError::LinkMetadataMismatch { .. })
        ));
        assert!(matches!(
            validate_navigation_link(
                Some(&model),
                &ODataNavigationLink::collection("BestFriend"),
                Some(&person),
                None
            ),
            Err(WriterError::LinkMetadataMismatch { .. })
        ));
        validate_navigation_link(
            Some(&model),
            &ODataNavigationLink::single("Friends"),
            Some(&person),
            Some(ContentKind::EntityReferenceLink),
        )
        .unwrap();
    }

    #[test]
    fn feed_counts_and_next_links_are_gated() {
        let counted = ODataFeed::new().with_count(3);
        validate_feed_start(&counted, true, true, ODataVersion::V2).unwrap();
        assert_eq!(
            validate_feed_start(&counted, false, true, ODataVersion::V3),
            Err(WriterError::InlineCountOnNonTopLevelFeed)
        );
        assert_eq!(
            validate_feed_start(&counted, true, false, ODataVersion::V3),
            Err(WriterError::InlineCountInRequest)
        );
        assert!(matches!(
            validate_feed_start(&counted, true, true, ODataVersion::V1),
            Err(WriterError::VersionTooLow { .. })
        ));

        let paged = ODataFeed::new().with_next_page_link("http://host/People?$skip=10");
        validate_feed_end(&paged, true, ODataVersion::V3).unwrap();
        assert_eq!(
            validate_feed_end(&paged, false, ODataVersion::V3),
            Err(WriterError::NextPageLinkInRequest)
        );
        assert!(matches!(
            validate_feed_end(&paged, true, ODataVersion::V1),
            Err(WriterError::VersionTooLow { .. })
        ));
    }

    #[test]
    fn property_names_reject_reserved_characters() {
        for bad in ["", "odata.type", "ns:Name", "@annotation"] {
            assert!(validate_property_name(bad).is_err(), "{bad:?}");
        }
        validate_property_name("Name").unwrap();
    }

    #[test]
    fn closed_types_reject_undeclared_properties() {
        let model = model();
        let person = model.find_entity_type("NS.Person").unwrap();
        let entry = ODataEntry::new().with_property(ODataProperty::new("Age", 42_i64));
        let mut checker = DuplicatePropertyNamesChecker::new(false, true);
        assert!(matches!(
            validate_entry_end(
                &entry,
                Some(&person),
                &mut checker,
                Some(&model),
                WriterBehavior::default()
            ),
            Err(WriterError::UndeclaredProperty { .. })
        ));

        let lenient = WriterBehavior {
            allow_undeclared_properties: true,
            ..WriterBehavior::default()
        };
        let mut checker = DuplicatePropertyNamesChecker::new(false, true);
        validate_entry_end(&entry, Some(&person), &mut checker, Some(&model), lenient).unwrap();
    }
}
