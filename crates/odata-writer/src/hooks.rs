// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Format port: the points where a concrete wire format emits output.
//!
//! The writer decides *when* each hook runs and guarantees that hooks see a
//! well-formed, validated sequence. Hooks decide *what* bytes that produces.
//! Any hook error moves the writer to the error state.

use async_trait::async_trait;
use odata_payload::{ODataEntityReferenceLink, ODataEntry, ODataFeed, ODataNavigationLink};

use crate::error::WriterError;

/// Callbacks implemented by a concrete payload format (Atom, JSON, ...).
///
/// Hooks are never invoked for items whose output is skipped by a projection.
#[async_trait]
pub trait FormatHooks: Send {
    /// Per-feed state the format keeps between `start_feed` and `end_feed`.
    type FeedState: Default + Send;
    /// Per-entry state the format keeps between `start_entry` and `end_entry`.
    type EntryState: Default + Send;

    /// Create the format state for a feed scope about to be entered.
    fn create_feed_scope(&mut self, _feed: &ODataFeed, _skip_writing: bool) -> Self::FeedState {
        Self::FeedState::default()
    }

    /// Create the format state for an entry scope about to be entered.
    fn create_entry_scope(
        &mut self,
        _entry: Option<&ODataEntry>,
        _skip_writing: bool,
    ) -> Self::EntryState {
        Self::EntryState::default()
    }

    /// Before the first item of the payload.
    fn start_payload(&mut self) -> Result<(), WriterError>;

    /// After the top-level item ended.
    fn end_payload(&mut self) -> Result<(), WriterError>;

    /// A feed begins.
    fn start_feed(
        &mut self,
        feed: &ODataFeed,
        state: &mut Self::FeedState,
    ) -> Result<(), WriterError>;

    /// A feed ends.
    fn end_feed(&mut self, feed: &ODataFeed, state: &mut Self::FeedState)
        -> Result<(), WriterError>;

    /// An entry begins. `None` is a null entry inside a navigation link.
    fn start_entry(
        &mut self,
        entry: Option<&ODataEntry>,
        state: &mut Self::EntryState,
    ) -> Result<(), WriterError>;

    /// An entry ends.
    fn end_entry(
        &mut self,
        entry: Option<&ODataEntry>,
        state: &mut Self::EntryState,
    ) -> Result<(), WriterError>;

    /// A navigation link ended without content.
    fn write_deferred_navigation_link(
        &mut self,
        link: &ODataNavigationLink,
    ) -> Result<(), WriterError>;

    /// The first content item of a navigation link is about to be written.
    fn start_navigation_link_with_content(
        &mut self,
        link: &ODataNavigationLink,
    ) -> Result<(), WriterError>;

    /// A navigation link with content ends.
    fn end_navigation_link_with_content(
        &mut self,
        link: &ODataNavigationLink,
    ) -> Result<(), WriterError>;

    /// An entity reference link inside the content of `parent`.
    fn write_entity_reference_in_navigation_link_content(
        &mut self,
        parent: &ODataNavigationLink,
        reference: &ODataEntityReferenceLink,
    ) -> Result<(), WriterError>;

    /// Push buffered output to the destination.
    fn flush_synchronously(&mut self) -> Result<(), WriterError>;

    /// Push buffered output to the destination without blocking.
    async fn flush_asynchronously(&mut self) -> Result<(), WriterError>;
}
