// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Feed, entry and link items.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ODataProperty;

/// A collection of entries, e.g. a query result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ODataFeed {
    /// Feed identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Inline count. Top-level response feeds only, version 2.0 and later.
    #[serde(default)]
    pub count: Option<u64>,
    /// Server-driven paging link. Responses only, version 2.0 and later.
    #[serde(default)]
    pub next_page_link: Option<String>,
}

impl ODataFeed {
    /// An empty feed with no id, count or next-page link.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the feed id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the inline count.
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// Set the next-page link.
    pub fn with_next_page_link(mut self, link: impl Into<String>) -> Self {
        self.next_page_link = Some(link.into());
        self
    }
}

/// Media resource backing a media link entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaResource {
    /// Link to read the stream.
    #[serde(default)]
    pub read_link: Option<String>,
    /// Link to edit the stream.
    #[serde(default)]
    pub edit_link: Option<String>,
    /// Stream content type.
    #[serde(default)]
    pub content_type: Option<String>,
    /// Stream entity tag.
    #[serde(default)]
    pub etag: Option<String>,
}

/// Names selected by a projection (`$select`) for one entry.
///
/// Navigation links whose names are not selected are still sequenced and
/// validated but their output is skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectedProperties {
    names: BTreeSet<String>,
}

impl ProjectedProperties {
    /// Projection over the given names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `name` is selected. Comparison is ordinal.
    pub fn includes(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Whether `name` should be skipped.
    pub fn skips(&self, name: &str) -> bool {
        !self.includes(name)
    }
}

/// A single resource instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ODataEntry {
    /// Entry identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Namespace-qualified entity type name.
    #[serde(default)]
    pub type_name: Option<String>,
    /// Edit link.
    #[serde(default)]
    pub edit_link: Option<String>,
    /// Read link.
    #[serde(default)]
    pub read_link: Option<String>,
    /// Entity tag.
    #[serde(default)]
    pub etag: Option<String>,
    /// Media resource, present for media link entries.
    #[serde(default)]
    pub media_resource: Option<MediaResource>,
    /// Structural properties, in output order.
    #[serde(default)]
    pub properties: Vec<ODataProperty>,
    /// Projection applied to this entry's navigation links, if any.
    #[serde(default)]
    pub projection: Option<ProjectedProperties>,
}

impl ODataEntry {
    /// An entry with no type name and no properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the entity type name.
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Set the entry id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Append a property.
    pub fn with_property(mut self, property: ODataProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Attach a media resource.
    pub fn with_media_resource(mut self, media: MediaResource) -> Self {
        self.media_resource = Some(media);
        self
    }

    /// Restrict the entry's navigation links to a projection.
    pub fn with_projection(mut self, projection: ProjectedProperties) -> Self {
        self.projection = Some(projection);
        self
    }

    /// Whether the navigation link `name` falls outside this entry's projection.
    pub fn skips_navigation_link(&self, name: &str) -> bool {
        self.projection.as_ref().is_some_and(|p| p.skips(name))
    }
}

/// A named relationship from an entry to an entry or a feed.
///
/// Written either deferred (URL only) or expanded (with inline content).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ODataNavigationLink {
    /// Navigation property name.
    pub name: String,
    /// Link URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Collection-valued link, when known.
    #[serde(default)]
    pub is_collection: Option<bool>,
}

impl ODataNavigationLink {
    /// A link with unknown multiplicity.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
            is_collection: None,
        }
    }

    /// A link known to be collection-valued.
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            is_collection: Some(true),
            ..Self::new(name)
        }
    }

    /// A link known to be single-valued.
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            is_collection: Some(false),
            ..Self::new(name)
        }
    }

    /// Set the link URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Binds an existing resource, by URL, into a navigation link (requests only).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ODataEntityReferenceLink {
    /// URL of the referenced resource.
    pub url: String,
}

impl ODataEntityReferenceLink {
    /// Reference the resource at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}
