// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Writer checks that need an entity model, plus the feed-level count and
//! next-page rules.
#![allow(missing_docs)]

use odata_dry_tests::{
    best_friend_link, customer, employee, friends_link, people_model, person, person_feed, photo,
    product, RecordingHooks,
};
use odata_payload::{
    MediaResource, ODataEntry, ODataFeed, ODataNavigationLink, ODataProperty, ODataVersion,
};
use odata_writer::{
    ErrorCategory, ODataWriter, WriterBehavior, WriterError, WriterSettings, WriterState,
};

fn response() -> WriterSettings {
    WriterSettings::response().with_model(people_model())
}

fn request() -> WriterSettings {
    WriterSettings::request().with_model(people_model())
}

fn feed_writer(settings: WriterSettings) -> (RecordingHooks, ODataWriter<RecordingHooks>) {
    let hooks = RecordingHooks::new();
    let writer = ODataWriter::feed_writer(hooks.clone(), settings);
    (hooks, writer)
}

fn entry_writer(settings: WriterSettings) -> (RecordingHooks, ODataWriter<RecordingHooks>) {
    let hooks = RecordingHooks::new();
    let writer = ODataWriter::entry_writer(hooks.clone(), settings);
    (hooks, writer)
}

/// Write one entry into a fresh feed and return the first error, if any.
fn write_in_feed(settings: WriterSettings, entry: ODataEntry) -> Result<(), WriterError> {
    let (_hooks, mut writer) = feed_writer(settings);
    writer.write_start_feed(person_feed())?;
    writer.write_start_entry(entry)?;
    writer.write_end()?;
    writer.write_end()
}

#[test]
fn unknown_type_name_is_rejected() {
    let entry = ODataEntry::new().with_type_name("NS.Ghost");

    let err = write_in_feed(response(), entry).unwrap_err();

    assert_eq!(
        err,
        WriterError::UnrecognizedTypeName {
            type_name: "NS.Ghost".into()
        }
    );
    assert_eq!(err.category(), ErrorCategory::Validation);
}

#[test]
fn entry_without_type_name_needs_an_expected_type() {
    let untyped = || ODataEntry::new().with_property(ODataProperty::new("Name", "Ada"));

    assert_eq!(
        write_in_feed(response(), untyped()),
        Err(WriterError::MissingTypeName)
    );

    let hooks = RecordingHooks::new();
    let mut writer = ODataWriter::feed_writer(hooks.clone(), response())
        .with_expected_type("NS.Person")
        .unwrap();
    writer.write_start_feed(person_feed()).unwrap();
    writer.write_start_entry(untyped()).unwrap();
    writer.write_end().unwrap();
    writer.write_end().unwrap();
    assert_eq!(writer.state(), WriterState::Completed);
}

#[test]
fn expected_type_accepts_derived_entries_only() {
    let (_hooks, writer) = entry_writer(response());
    let mut writer = writer.with_expected_type("NS.Person").unwrap();
    writer.write_start_entry(employee("1")).unwrap();
    writer.write_end().unwrap();

    let (_hooks, writer) = entry_writer(response());
    let mut writer = writer.with_expected_type("NS.Person").unwrap();
    let err = writer.write_start_entry(product("1")).unwrap_err();
    assert_eq!(
        err,
        WriterError::IncompatibleType {
            type_name: "NS.Product".into(),
            expected: "NS.Person".into(),
        }
    );
}

#[test]
fn expected_type_must_exist_in_the_model() {
    let (_hooks, writer) = entry_writer(response());

    assert!(matches!(
        writer.with_expected_type("NS.Ghost"),
        Err(WriterError::UnrecognizedTypeName { .. })
    ));
}

#[test]
fn expected_type_is_ignored_without_a_model() {
    let (_hooks, writer) = entry_writer(WriterSettings::response());
    let mut writer = writer.with_expected_type("NS.Ghost").unwrap();

    writer.write_start_entry(product("1")).unwrap();
    writer.write_end().unwrap();
}

#[test]
fn feed_entries_must_share_a_base_type() {
    let (hooks, mut writer) = feed_writer(response());

    writer.write_start_feed(person_feed()).unwrap();
    for entry in [employee("1"), customer("2")] {
        writer.write_start_entry(entry).unwrap();
        writer.write_end().unwrap();
    }
    let err = writer.write_start_entry(product("3")).unwrap_err();

    assert_eq!(
        err,
        WriterError::IncompatibleFeedEntryTypes {
            first: "NS.Person".into(),
            second: "NS.Product".into(),
        }
    );
    assert_eq!(hooks.count("StartEntry"), 2);
}

#[test]
fn media_link_entries_need_their_media_resource() {
    write_in_feed(response(), photo("1")).unwrap();

    let bare = ODataEntry::new().with_type_name("NS.Photo");
    assert_eq!(
        write_in_feed(response(), bare.clone()),
        Err(WriterError::EntryWithoutMediaResource {
            type_name: "NS.Photo".into()
        })
    );

    let lenient = response().with_behavior(WriterBehavior {
        validate_media_resource: false,
        ..WriterBehavior::default()
    });
    write_in_feed(lenient, bare).unwrap();
}

#[test]
fn plain_entries_must_not_carry_a_media_resource() {
    let entry = person("1", "Ada").with_media_resource(MediaResource::default());

    assert_eq!(
        write_in_feed(response(), entry),
        Err(WriterError::EntryWithMediaResourceAndNonMleType {
            type_name: "NS.Person".into()
        })
    );
}

#[test]
fn expanded_entry_must_fit_the_link_target() {
    let (_hooks, mut writer) = entry_writer(response());

    writer.write_start_entry(person("1", "Ada")).unwrap();
    writer
        .write_start_navigation_link(ODataNavigationLink::collection("Photos"))
        .unwrap();
    writer.write_start_feed(ODataFeed::new()).unwrap();
    let err = writer.write_start_entry(person("2", "Grace")).unwrap_err();

    assert_eq!(
        err,
        WriterError::EntryTypeNotCompatibleWithNavigationProperty {
            type_name: "NS.Person".into(),
            expected: "NS.Photo".into(),
        }
    );
}

#[test]
fn expanded_entry_without_type_name_takes_the_link_target() {
    let (hooks, mut writer) = entry_writer(response());
    let untyped = ODataEntry::new()
        .with_id("2")
        .with_property(ODataProperty::new("Name", "Grace"));

    writer.write_start_entry(person("1", "Ada")).unwrap();
    writer.write_start_navigation_link(best_friend_link()).unwrap();
    writer.write_start_entry(untyped).unwrap();
    writer.write_end().unwrap();
    writer.write_end().unwrap();
    writer.write_end().unwrap();

    assert_eq!(hooks.count("EndEntry"), 2);
    assert_eq!(writer.state(), WriterState::Completed);
}

#[test]
fn navigation_link_must_be_declared() {
    let (_hooks, mut writer) = entry_writer(request());

    writer.write_start_entry(person("1", "Ada")).unwrap();
    writer
        .write_start_navigation_link(ODataNavigationLink::new("Enemies"))
        .unwrap();
    let err = writer.write_end().unwrap_err();

    assert_eq!(
        err,
        WriterError::NavigationPropertyNotDefined {
            property: "Enemies".into(),
            type_name: "NS.Person".into(),
        }
    );
}

#[test]
fn link_content_must_match_the_declared_multiplicity() {
    let (_hooks, mut writer) = entry_writer(response());

    writer.write_start_entry(person("1", "Ada")).unwrap();
    writer
        .write_start_navigation_link(ODataNavigationLink::new("BestFriend"))
        .unwrap();
    let err = writer.write_start_feed(ODataFeed::new()).unwrap_err();

    assert!(matches!(err, WriterError::LinkMetadataMismatch { ref link, .. } if link == "BestFriend"));
}

#[test]
fn deferred_link_multiplicity_comes_from_metadata() {
    let (_hooks, mut writer) = entry_writer(request());

    writer.write_start_entry(person("1", "Ada")).unwrap();
    for _ in 0..2 {
        writer
            .write_start_navigation_link(ODataNavigationLink::new("Friends"))
            .unwrap();
        writer.write_end().unwrap();
    }
    writer.write_end().unwrap();

    assert_eq!(writer.state(), WriterState::Completed);
}

#[test]
fn undeclared_property_needs_an_open_type() {
    let nickname = || person("1", "Ada").with_property(ODataProperty::new("Nickname", "A"));

    assert_eq!(
        write_in_feed(response(), nickname()),
        Err(WriterError::UndeclaredProperty {
            name: "Nickname".into(),
            type_name: "NS.Person".into(),
        })
    );

    let open = product("2").with_property(ODataProperty::new("Color", "red"));
    write_in_feed(response(), open).unwrap();

    let lenient = response().with_behavior(WriterBehavior {
        allow_undeclared_properties: true,
        ..WriterBehavior::default()
    });
    write_in_feed(lenient, nickname()).unwrap();
}

#[test]
fn derived_entries_see_inherited_properties() {
    let entry = employee("1").with_property(ODataProperty::new("Name", "Ada"));

    write_in_feed(response(), entry).unwrap();
}

#[test]
fn inline_count_is_for_top_level_response_feeds() {
    let (_hooks, mut writer) = feed_writer(WriterSettings::response());
    writer
        .write_start_feed(ODataFeed::new().with_count(2))
        .unwrap();
    writer.write_end().unwrap();

    let (_hooks, mut writer) = feed_writer(WriterSettings::request());
    assert_eq!(
        writer.write_start_feed(ODataFeed::new().with_count(2)),
        Err(WriterError::InlineCountInRequest)
    );

    let (_hooks, mut writer) =
        feed_writer(WriterSettings::response().with_version(ODataVersion::V1));
    assert!(matches!(
        writer.write_start_feed(ODataFeed::new().with_count(2)),
        Err(WriterError::VersionTooLow {
            required: ODataVersion::V2,
            actual: ODataVersion::V1,
            ..
        })
    ));
}

#[test]
fn inline_count_on_expanded_feed_fails_in_every_version() {
    for version in [ODataVersion::V1, ODataVersion::V2, ODataVersion::V3] {
        let (_hooks, mut writer) =
            entry_writer(WriterSettings::response().with_version(version));
        writer.write_start_entry(person("1", "Ada")).unwrap();
        writer.write_start_navigation_link(friends_link()).unwrap();

        assert_eq!(
            writer.write_start_feed(ODataFeed::new().with_count(5)),
            Err(WriterError::InlineCountOnNonTopLevelFeed)
        );
    }
}

#[test]
fn next_page_link_is_checked_when_the_feed_ends() {
    let (hooks, mut writer) = feed_writer(WriterSettings::request());
    let feed = ODataFeed::new()
        .with_id("People")
        .with_next_page_link("http://host/People?$skiptoken=2");

    writer.write_start_feed(feed).unwrap();
    assert_eq!(writer.write_end(), Err(WriterError::NextPageLinkInRequest));
    assert_eq!(hooks.names(), ["StartPayload", "StartFeed"]);
}
