// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory [`EdmModel`] implementation.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{EdmModel, EntityType, EntityTypeRef, ModelError};

/// Entity types keyed by qualified name.
///
/// Built through [`SchemaModel::builder`] or deserialized from
/// `{"entity_types": [...]}`; both paths reject dangling base types,
/// dangling navigation targets and base type cycles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "SchemaDocument", into = "SchemaDocument")]
pub struct SchemaModel {
    types: BTreeMap<String, EntityTypeRef>,
}

#[derive(Serialize, Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    entity_types: Vec<EntityType>,
}

impl TryFrom<SchemaDocument> for SchemaModel {
    type Error = ModelError;

    fn try_from(doc: SchemaDocument) -> Result<Self, Self::Error> {
        doc.entity_types
            .into_iter()
            .fold(SchemaModel::builder(), SchemaModelBuilder::entity_type)
            .build()
    }
}

impl From<SchemaModel> for SchemaDocument {
    fn from(model: SchemaModel) -> Self {
        Self {
            entity_types: model.types.values().map(|t| (**t).clone()).collect(),
        }
    }
}

impl SchemaModel {
    /// Start an empty builder.
    pub fn builder() -> SchemaModelBuilder {
        SchemaModelBuilder::default()
    }

    /// Number of entity types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the model declares no types.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Qualified names in ascending order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

impl EdmModel for SchemaModel {
    fn find_entity_type(&self, qualified_name: &str) -> Option<EntityTypeRef> {
        self.types.get(qualified_name).cloned()
    }
}

/// Accumulates entity types and validates them as a whole.
#[derive(Debug, Default)]
pub struct SchemaModelBuilder {
    types: Vec<EntityType>,
}

impl SchemaModelBuilder {
    /// Add an entity type.
    pub fn entity_type(mut self, ty: EntityType) -> Self {
        self.types.push(ty);
        self
    }

    /// Validate references and freeze the model.
    pub fn build(self) -> Result<SchemaModel, ModelError> {
        let mut types = BTreeMap::new();
        for ty in self.types {
            if types.contains_key(&ty.name) {
                return Err(ModelError::DuplicateType(ty.name));
            }
            types.insert(ty.name.clone(), Arc::new(ty));
        }

        for ty in types.values() {
            if let Some(base) = &ty.base_type {
                if !types.contains_key(base) {
                    return Err(ModelError::UnknownBaseType {
                        ty: ty.name.clone(),
                        base: base.clone(),
                    });
                }
            }
            for nav in &ty.navigation_properties {
                if !types.contains_key(&nav.target_type) {
                    return Err(ModelError::UnknownNavigationTarget {
                        ty: ty.name.clone(),
                        property: nav.name.clone(),
                        target: nav.target_type.clone(),
                    });
                }
            }
        }

        for ty in types.values() {
            let mut seen = BTreeSet::new();
            let mut current = Some(ty.name.as_str());
            while let Some(name) = current {
                if !seen.insert(name) {
                    return Err(ModelError::BaseTypeCycle(ty.name.clone()));
                }
                current = types.get(name).and_then(|t| t.base_type.as_deref());
            }
        }

        Ok(SchemaModel { types })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn people() -> SchemaModel {
        SchemaModel::builder()
            .entity_type(
                EntityType::new("Ns.Person")
                    .with_property("Name")
                    .with_navigation("Friends", "Ns.Person", true)
                    .with_navigation("BestFriend", "Ns.Person", false),
            )
            .entity_type(EntityType::new("Ns.Employee").derived_from("Ns.Person"))
            .entity_type(EntityType::new("Ns.Manager").derived_from("Ns.Employee"))
            .entity_type(EntityType::new("Ns.Photo").with_stream())
            .build()
            .unwrap()
    }

    #[test]
    fn derived_types_are_assignable_to_their_bases() {
        let model = people();
        let person = model.find_entity_type("Ns.Person").unwrap();
        let manager = model.find_entity_type("Ns.Manager").unwrap();
        assert!(model.is_assignable_from(&person, &manager));
        assert!(!model.is_assignable_from(&manager, &person));
    }

    #[test]
    fn common_base_of_siblings_is_their_shared_ancestor() {
        let model = people();
        let employee = model.find_entity_type("Ns.Employee").unwrap();
        let manager = model.find_entity_type("Ns.Manager").unwrap();
        let person = model.find_entity_type("Ns.Person").unwrap();
        let photo = model.find_entity_type("Ns.Photo").unwrap();

        assert_eq!(
            model.common_base_type(&manager, &employee).unwrap().name,
            "Ns.Employee"
        );
        assert_eq!(
            model.common_base_type(&person, &manager).unwrap().name,
            "Ns.Person"
        );
        assert!(model.common_base_type(&person, &photo).is_none());
    }

    #[test]
    fn inherited_navigation_properties_resolve() {
        let model = people();
        let manager = model.find_entity_type("Ns.Manager").unwrap();
        let friends = model.find_navigation_property(&manager, "Friends").unwrap();
        assert!(friends.is_collection);
        assert!(model.has_declared_property(&manager, "Name"));
        assert!(!model.has_declared_property(&manager, "Salary"));
    }

    #[test]
    fn dangling_base_type_is_rejected() {
        let err = SchemaModel::builder()
            .entity_type(EntityType::new("Ns.A").derived_from("Ns.Missing"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::UnknownBaseType { .. }));
    }

    #[test]
    fn base_type_cycle_is_rejected() {
        let err = SchemaModel::builder()
            .entity_type(EntityType::new("Ns.A").derived_from("Ns.B"))
            .entity_type(EntityType::new("Ns.B").derived_from("Ns.A"))
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::BaseTypeCycle(_)));
    }

    #[test]
    fn duplicate_type_is_rejected() {
        let err = SchemaModel::builder()
            .entity_type(EntityType::new("Ns.A"))
            .entity_type(EntityType::new("Ns.A"))
            .build()
            .unwrap_err();
        assert_eq!(err, ModelError::DuplicateType("Ns.A".into()));
    }

    #[test]
    fn json_document_loads_and_validates() {
        let json = r#"{
            "entity_types": [
                { "name": "Ns.Person", "navigation_properties": [
                    { "name": "Friends", "target_type": "Ns.Person", "is_collection": true }
                ] },
                { "name": "Ns.Employee", "base_type": "Ns.Person" }
            ]
        }"#;
        let model: SchemaModel = serde_json::from_str(json).unwrap();
        assert_eq!(model.len(), 2);
        assert_eq!(
            model.type_names().collect::<Vec<_>>(),
            vec!["Ns.Employee", "Ns.Person"]
        );

        let bad = r#"{ "entity_types": [ { "name": "Ns.A", "base_type": "Ns.Nope" } ] }"#;
        assert!(serde_json::from_str::<SchemaModel>(bad).is_err());
    }
}
