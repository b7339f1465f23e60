// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Payload items handed to the OData payload writer.
//!
//! These are plain values with no serialization rules of their own: the
//! writer sequences and validates them, format hooks turn them into bytes.
//! `serde` derives exist so that replay scripts can describe payloads.

mod items;
mod value;
mod version;

pub use items::{
    MediaResource, ODataEntityReferenceLink, ODataEntry, ODataFeed, ODataNavigationLink,
    ProjectedProperties,
};
pub use value::{ODataProperty, ODataValue};
pub use version::ODataVersion;
