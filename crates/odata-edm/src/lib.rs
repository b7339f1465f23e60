// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Entity model capability for the OData payload writer.
//!
//! The writer never builds or validates models. It only asks a handful of
//! questions while it sequences a payload: does this type name resolve, is one
//! entity type assignable to another, which navigation property does a link
//! name refer to. Those questions form the [`EdmModel`] port.
//!
//! [`SchemaModel`] is a small in-memory implementation, loadable from JSON,
//! used by the replay tool and the test suites.

mod schema;
mod types;

pub use schema::{SchemaModel, SchemaModelBuilder};
pub use types::{EntityType, EntityTypeRef, NavigationProperty};

use thiserror::Error;

/// Upper bound on base-type hops followed when walking a hierarchy.
///
/// [`SchemaModel`] rejects cycles at build time; the bound keeps foreign
/// [`EdmModel`] implementations from looping forever.
pub const MAX_BASE_TYPE_CHAIN: usize = 64;

/// Errors raised while assembling a [`SchemaModel`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Two entity types share the same qualified name.
    #[error("[MODEL_DUPLICATE_TYPE] entity type '{0}' is declared twice")]
    DuplicateType(String),
    /// An entity type names a base type that is not in the model.
    #[error("[MODEL_UNKNOWN_BASE_TYPE] entity type '{ty}' derives from unknown type '{base}'")]
    UnknownBaseType {
        /// The derived type.
        ty: String,
        /// The missing base type.
        base: String,
    },
    /// Following base types from an entity type leads back to itself.
    #[error("[MODEL_BASE_TYPE_CYCLE] base type chain of '{0}' is cyclic")]
    BaseTypeCycle(String),
    /// A navigation property targets an entity type that is not in the model.
    #[error("[MODEL_UNKNOWN_NAVIGATION_TARGET] navigation property '{ty}.{property}' targets unknown type '{target}'")]
    UnknownNavigationTarget {
        /// Declaring type.
        ty: String,
        /// Navigation property name.
        property: String,
        /// The missing target type.
        target: String,
    },
}

/// Read-only view of an entity model.
///
/// Implementors only need [`find_entity_type`](EdmModel::find_entity_type);
/// every hierarchy question is answered by walking `base_type` links through it.
pub trait EdmModel: Send + Sync {
    /// Look up an entity type by its namespace-qualified name.
    fn find_entity_type(&self, qualified_name: &str) -> Option<EntityTypeRef>;

    /// The type itself followed by its base types, most derived first.
    fn ancestors(&self, ty: &EntityTypeRef) -> Vec<EntityTypeRef> {
        let mut chain = vec![ty.clone()];
        let mut next = ty.base_type.clone();
        while let Some(name) = next {
            if chain.len() > MAX_BASE_TYPE_CHAIN {
                break;
            }
            match self.find_entity_type(&name) {
                Some(base) => {
                    next = base.base_type.clone();
                    chain.push(base);
                }
                None => break,
            }
        }
        chain
    }

    /// Whether a value of type `derived` may appear where `base` is expected.
    fn is_assignable_from(&self, base: &EntityTypeRef, derived: &EntityTypeRef) -> bool {
        self.ancestors(derived)
            .iter()
            .any(|ancestor| ancestor.name == base.name)
    }

    /// Most derived type that both `a` and `b` are assignable to, if any.
    fn common_base_type(&self, a: &EntityTypeRef, b: &EntityTypeRef) -> Option<EntityTypeRef> {
        self.ancestors(a)
            .into_iter()
            .find(|candidate| self.is_assignable_from(candidate, b))
    }

    /// Navigation property `name` declared on `ty` or one of its base types.
    fn find_navigation_property(
        &self,
        ty: &EntityTypeRef,
        name: &str,
    ) -> Option<NavigationProperty> {
        self.ancestors(ty)
            .iter()
            .find_map(|t| t.navigation_property(name).cloned())
    }

    /// Whether `name` is a structural or navigation property of `ty` (including inherited ones).
    fn has_declared_property(&self, ty: &EntityTypeRef, name: &str) -> bool {
        self.ancestors(ty)
            .iter()
            .any(|t| t.declares_property(name))
    }
}
