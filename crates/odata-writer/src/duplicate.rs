// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-entry duplicate property and navigation link detection.

use std::collections::HashMap;

use odata_payload::ODataNavigationLink;

use crate::error::WriterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sighting {
    Property,
    NavigationLink { is_collection: Option<bool> },
}

/// Tracks the names already written in one entry.
///
/// Structural properties never repeat. Navigation links may repeat in
/// requests to bind several resources to one collection-valued property,
/// but never when the property is known to be single-valued.
#[derive(Debug, Clone)]
pub struct DuplicatePropertyNamesChecker {
    allow_duplicates: bool,
    writing_response: bool,
    seen: HashMap<String, Sighting>,
}

impl DuplicatePropertyNamesChecker {
    /// New checker for one entry.
    pub fn new(allow_duplicates: bool, writing_response: bool) -> Self {
        Self {
            allow_duplicates,
            writing_response,
            seen: HashMap::new(),
        }
    }

    /// Record a structural property.
    pub fn check_property(&mut self, name: &str) -> Result<(), WriterError> {
        if self.seen.insert(name.to_owned(), Sighting::Property).is_some()
            && !self.allow_duplicates
        {
            return Err(WriterError::DuplicatePropertyName {
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    /// Record a navigation link.
    ///
    /// `is_expanded` is true when the link carries an expanded feed or entry;
    /// `is_collection` is the multiplicity known at this point.
    pub fn check_navigation_link(
        &mut self,
        link: &ODataNavigationLink,
        is_expanded: bool,
        is_collection: Option<bool>,
    ) -> Result<(), WriterError> {
        let multiplicity = if is_expanded {
            is_collection
        } else if is_collection == Some(true) {
            Some(true)
        } else {
            None
        };
        let Some(previous) = self.seen.get_mut(&link.name) else {
            self.seen.insert(
                link.name.clone(),
                Sighting::NavigationLink {
                    is_collection: multiplicity,
                },
            );
            return Ok(());
        };
        if self.allow_duplicates {
            return Ok(());
        }
        match *previous {
            Sighting::Property => Err(WriterError::DuplicatePropertyName {
                name: link.name.clone(),
            }),
            Sighting::NavigationLink { .. } if self.writing_response => {
                Err(WriterError::DuplicatePropertyName {
                    name: link.name.clone(),
                })
            }
            Sighting::NavigationLink { is_collection }
                if is_collection == Some(false) || multiplicity == Some(false) =>
            {
                Err(WriterError::MultipleLinksForSingleton {
                    name: link.name.clone(),
                })
            }
            Sighting::NavigationLink { is_collection } => {
                *previous = Sighting::NavigationLink {
                    is_collection: is_collection.or(multiplicity),
                };
                Ok(())
            }
        }
    }
}
