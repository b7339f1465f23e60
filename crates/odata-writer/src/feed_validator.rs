// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Type consistency across the entries of a top-level feed.

use std::sync::Arc;

use odata_edm::{EdmModel, EntityTypeRef};

use crate::error::WriterError;

/// Narrows the feed's item type to the common base of every entry seen.
pub struct FeedTypeValidator {
    model: Arc<dyn EdmModel>,
    item_type: Option<EntityTypeRef>,
}

impl std::fmt::Debug for FeedTypeValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedTypeValidator")
            .field("item_type", &self.item_type.as_ref().map(|t| &t.name))
            .finish_non_exhaustive()
    }
}

impl FeedTypeValidator {
    /// Validator for one feed, with no item type established yet.
    pub fn new(model: Arc<dyn EdmModel>) -> Self {
        Self {
            model,
            item_type: None,
        }
    }

    /// Common base type of the entries validated so far.
    pub fn item_type(&self) -> Option<&EntityTypeRef> {
        self.item_type.as_ref()
    }

    /// Fold one entry's type into the feed's item type.
    ///
    /// Entries without a resolved type are ignored.
    pub fn validate_entry(&mut self, entity_type: Option<&EntityTypeRef>) -> Result<(), WriterError> {
        let Some(entity_type) = entity_type else {
            return Ok(());
        };
        let narrowed = match &self.item_type {
            None => entity_type.clone(),
            Some(current) => self
                .model
                .common_base_type(current, entity_type)
                .ok_or_else(|| WriterError::IncompatibleFeedEntryTypes {
                    first: current.name.clone(),
                    second: entity_type.name.clone(),
                })?,
        };
        self.item_type = Some(narrowed);
        Ok(())
    }
}
