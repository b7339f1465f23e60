// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Recording format hooks for writer tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use odata_payload::{ODataEntityReferenceLink, ODataEntry, ODataFeed, ODataNavigationLink};
use odata_writer::{FormatHooks, WriterError};

/// One hook invocation, with the identifying bits of its item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    /// `start_payload`.
    StartPayload,
    /// `end_payload`.
    EndPayload,
    /// `start_feed`, with the feed id.
    StartFeed(Option<String>),
    /// `end_feed`, with the feed id.
    EndFeed(Option<String>),
    /// `start_entry`, with the entry id (`None` for null entries).
    StartEntry(Option<String>),
    /// `end_entry`, with the entry id (`None` for null entries).
    EndEntry(Option<String>),
    /// `write_deferred_navigation_link`, with the link name.
    DeferredLink(String),
    /// `start_navigation_link_with_content`, with the link name.
    StartLinkContent(String),
    /// `end_navigation_link_with_content`, with the link name.
    EndLinkContent(String),
    /// `write_entity_reference_in_navigation_link_content`, with link name and URL.
    EntityReference(String, String),
    /// `flush_synchronously`.
    Flush,
    /// `flush_asynchronously`.
    FlushAsync,
}

impl HookEvent {
    /// Hook name without its payload, e.g. `"StartEntry"`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartPayload => "StartPayload",
            Self::EndPayload => "EndPayload",
            Self::StartFeed(_) => "StartFeed",
            Self::EndFeed(_) => "EndFeed",
            Self::StartEntry(_) => "StartEntry",
            Self::EndEntry(_) => "EndEntry",
            Self::DeferredLink(_) => "DeferredLink",
            Self::StartLinkContent(_) => "StartLinkContent",
            Self::EndLinkContent(_) => "EndLinkContent",
            Self::EntityReference(..) => "EntityReference",
            Self::Flush => "Flush",
            Self::FlushAsync => "FlushAsync",
        }
    }
}

/// [`FormatHooks`] that records every call into a shared log.
///
/// Clones share the log, so a test keeps one clone while the writer owns the
/// other. [`fail_on`](Self::fail_on) makes the named hook return an output
/// error instead of recording.
///
/// # Example
///
/// ```
/// use odata_dry_tests::RecordingHooks;
/// use odata_payload::ODataFeed;
/// use odata_writer::{ODataWriter, WriterSettings};
///
/// let hooks = RecordingHooks::new();
/// let mut writer = ODataWriter::feed_writer(hooks.clone(), WriterSettings::response());
/// writer.write_start_feed(ODataFeed::new()).unwrap();
/// writer.write_end().unwrap();
/// assert_eq!(
///     hooks.names(),
///     ["StartPayload", "StartFeed", "EndFeed", "EndPayload", "Flush"]
/// );
/// ```
#[derive(Clone, Default)]
pub struct RecordingHooks {
    inner: Arc<Mutex<RecordingHooksInner>>,
}

#[derive(Default)]
struct RecordingHooksInner {
    events: Vec<HookEvent>,
    fail_on: Option<&'static str>,
    scopes_created: usize,
    skipped_scopes_created: usize,
}

impl RecordingHooks {
    /// Create hooks with an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the hook named `name` (see [`HookEvent::name`]) fail from now on.
    pub fn fail_on(&self, name: &'static str) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.fail_on = Some(name);
    }

    /// Stop injecting failures.
    pub fn clear_failure(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.fail_on = None;
    }

    /// Recorded events, in call order.
    pub fn events(&self) -> Vec<HookEvent> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .events
            .clone()
    }

    /// Names of the recorded events, in call order.
    pub fn names(&self) -> Vec<&'static str> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .events
            .iter()
            .map(HookEvent::name)
            .collect()
    }

    /// How many times the hook named `name` was recorded.
    pub fn count(&self, name: &str) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .events
            .iter()
            .filter(|event| event.name() == name)
            .count()
    }

    /// Feed and entry scope states created through the factory hooks.
    pub fn scopes_created(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .scopes_created
    }

    /// Scope states created for skipped (projected-out) scopes.
    pub fn skipped_scopes_created(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .skipped_scopes_created
    }

    fn record(&self, event: HookEvent) -> Result<(), WriterError> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.fail_on == Some(event.name()) {
            return Err(WriterError::output(format!(
                "simulated {} failure",
                event.name()
            )));
        }
        inner.events.push(event);
        Ok(())
    }

    fn note_scope(&self, skip_writing: bool) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.scopes_created += 1;
        if skip_writing {
            inner.skipped_scopes_created += 1;
        }
    }
}

#[async_trait]
impl FormatHooks for RecordingHooks {
    type FeedState = ();
    type EntryState = ();

    fn create_feed_scope(&mut self, _feed: &ODataFeed, skip_writing: bool) {
        self.note_scope(skip_writing);
    }

    fn create_entry_scope(&mut self, _entry: Option<&ODataEntry>, skip_writing: bool) {
        self.note_scope(skip_writing);
    }

    fn start_payload(&mut self) -> Result<(), WriterError> {
        self.record(HookEvent::StartPayload)
    }

    fn end_payload(&mut self) -> Result<(), WriterError> {
        self.record(HookEvent::EndPayload)
    }

    fn start_feed(&mut self, feed: &ODataFeed, _state: &mut ()) -> Result<(), WriterError> {
        self.record(HookEvent::StartFeed(feed.id.clone()))
    }

    fn end_feed(&mut self, feed: &ODataFeed, _state: &mut ()) -> Result<(), WriterError> {
        self.record(HookEvent::EndFeed(feed.id.clone()))
    }

    fn start_entry(
        &mut self,
        entry: Option<&ODataEntry>,
        _state: &mut (),
    ) -> Result<(), WriterError> {
        self.record(HookEvent::StartEntry(entry.and_then(|e| e.id.clone())))
    }

    fn end_entry(&mut self, entry: Option<&ODataEntry>, _state: &mut ()) -> Result<(), WriterError> {
        self.record(HookEvent::EndEntry(entry.and_then(|e| e.id.clone())))
    }

    fn write_deferred_navigation_link(
        &mut self,
        link: &ODataNavigationLink,
    ) -> Result<(), WriterError> {
        self.record(HookEvent::DeferredLink(link.name.clone()))
    }

    fn start_navigation_link_with_content(
        &mut self,
        link: &ODataNavigationLink,
    ) -> Result<(), WriterError> {
        self.record(HookEvent::StartLinkContent(link.name.clone()))
    }

    fn end_navigation_link_with_content(
        &mut self,
        link: &ODataNavigationLink,
    ) -> Result<(), WriterError> {
        self.record(HookEvent::EndLinkContent(link.name.clone()))
    }

    fn write_entity_reference_in_navigation_link_content(
        &mut self,
        parent: &ODataNavigationLink,
        reference: &ODataEntityReferenceLink,
    ) -> Result<(), WriterError> {
        self.record(HookEvent::EntityReference(
            parent.name.clone(),
            reference.url.clone(),
        ))
    }

    fn flush_synchronously(&mut self) -> Result<(), WriterError> {
        self.record(HookEvent::Flush)
    }

    async fn flush_asynchronously(&mut self) -> Result<(), WriterError> {
        tokio::task::yield_now().await;
        self.record(HookEvent::FlushAsync)
    }
}
