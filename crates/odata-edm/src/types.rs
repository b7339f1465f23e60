// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Entity type descriptors.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Shared handle to an entity type owned by a model.
pub type EntityTypeRef = Arc<EntityType>;

/// An entity type as far as the writer needs to know it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityType {
    /// Namespace-qualified name, e.g. `Ns.Person`.
    pub name: String,
    /// Qualified name of the base type, if any.
    #[serde(default)]
    pub base_type: Option<String>,
    /// Open types accept properties that are not declared.
    #[serde(default)]
    pub is_open: bool,
    /// Media link entry: instances are backed by a media resource.
    #[serde(default)]
    pub has_stream: bool,
    /// Declared structural property names.
    #[serde(default)]
    pub properties: Vec<String>,
    /// Declared navigation properties.
    #[serde(default)]
    pub navigation_properties: Vec<NavigationProperty>,
}

impl EntityType {
    /// A closed, non-media entity type with no members.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_type: None,
            is_open: false,
            has_stream: false,
            properties: Vec::new(),
            navigation_properties: Vec::new(),
        }
    }

    /// Set the base type.
    pub fn derived_from(mut self, base: impl Into<String>) -> Self {
        self.base_type = Some(base.into());
        self
    }

    /// Mark the type as open.
    pub fn open(mut self) -> Self {
        self.is_open = true;
        self
    }

    /// Mark the type as a media link entry.
    pub fn with_stream(mut self) -> Self {
        self.has_stream = true;
        self
    }

    /// Declare a structural property.
    pub fn with_property(mut self, name: impl Into<String>) -> Self {
        self.properties.push(name.into());
        self
    }

    /// Declare a navigation property.
    pub fn with_navigation(
        mut self,
        name: impl Into<String>,
        target_type: impl Into<String>,
        is_collection: bool,
    ) -> Self {
        self.navigation_properties.push(NavigationProperty {
            name: name.into(),
            target_type: target_type.into(),
            is_collection,
        });
        self
    }

    /// Navigation property declared directly on this type.
    pub fn navigation_property(&self, name: &str) -> Option<&NavigationProperty> {
        self.navigation_properties.iter().find(|p| p.name == name)
    }

    /// Whether `name` is declared directly on this type.
    pub fn declares_property(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p == name) || self.navigation_property(name).is_some()
    }
}

/// A navigation property: a named relationship to another entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationProperty {
    /// Property name, unique within the declaring type hierarchy.
    pub name: String,
    /// Qualified name of the target entity type.
    pub target_type: String,
    /// Collection-valued (`true`) or single-valued (`false`).
    #[serde(default)]
    pub is_collection: bool,
}
