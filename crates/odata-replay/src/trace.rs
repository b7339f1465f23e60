// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Hook traces and the format hooks that record them.

use std::fmt;

use odata_payload::{ODataEntityReferenceLink, ODataEntry, ODataFeed, ODataNavigationLink};
use odata_writer::{async_trait, FormatHooks, WriterError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::replay::ReplayError;

/// One recorded hook call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "hook", rename_all = "snake_case")]
pub enum TraceEvent {
    /// `start_payload`.
    StartPayload,
    /// `end_payload`.
    EndPayload,
    /// `start_feed`.
    StartFeed {
        /// Feed id.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
    /// `end_feed`.
    EndFeed {
        /// Feed id.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
    /// `start_entry`; no id for null entries.
    StartEntry {
        /// Entry id.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
    /// `end_entry`.
    EndEntry {
        /// Entry id.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
    /// `write_deferred_navigation_link`.
    DeferredLink {
        /// Link name.
        name: String,
    },
    /// `start_navigation_link_with_content`.
    StartLinkContent {
        /// Link name.
        name: String,
    },
    /// `end_navigation_link_with_content`.
    EndLinkContent {
        /// Link name.
        name: String,
    },
    /// `write_entity_reference_in_navigation_link_content`.
    EntityReference {
        /// Parent link name.
        link: String,
        /// Referenced URL.
        url: String,
    },
    /// `flush_synchronously`.
    Flush,
    /// `flush_asynchronously`.
    FlushAsync,
}

impl TraceEvent {
    /// Hook name in `UpperCamelCase`, e.g. `"StartEntry"`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartPayload => "StartPayload",
            Self::EndPayload => "EndPayload",
            Self::StartFeed { .. } => "StartFeed",
            Self::EndFeed { .. } => "EndFeed",
            Self::StartEntry { .. } => "StartEntry",
            Self::EndEntry { .. } => "EndEntry",
            Self::DeferredLink { .. } => "DeferredLink",
            Self::StartLinkContent { .. } => "StartLinkContent",
            Self::EndLinkContent { .. } => "EndLinkContent",
            Self::EntityReference { .. } => "EntityReference",
            Self::Flush => "Flush",
            Self::FlushAsync => "FlushAsync",
        }
    }
}

/// How a replay ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Every operation succeeded.
    Ok,
    /// Operation `step` (zero-based) failed; later operations were not run.
    Failed {
        /// Index of the failing operation.
        step: usize,
        /// Stable error code, e.g. `DUPLICATE_PROPERTY_NAME`.
        code: String,
    },
}

impl Outcome {
    pub(crate) fn failed(step: usize, err: &WriterError) -> Self {
        Self::Failed {
            step,
            code: err.code().to_owned(),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("ok"),
            Self::Failed { step, code } => write!(f, "{code} at op {step}"),
        }
    }
}

/// Hook events followed by the replay outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    /// Hook calls, in order.
    pub events: Vec<TraceEvent>,
    /// Replay outcome.
    pub outcome: Outcome,
}

impl Trace {
    /// Parse a trace from JSON.
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Hook names, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.events.iter().map(TraceEvent::name).collect()
    }
}

/// [`FormatHooks`] that keep every call as a [`TraceEvent`].
#[derive(Debug, Default)]
pub struct TraceHooks {
    events: Vec<TraceEvent>,
}

impl TraceHooks {
    /// Events recorded so far.
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Take the recorded events.
    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }

    fn record(&mut self, event: TraceEvent) {
        debug!(hook = event.name(), "hook");
        self.events.push(event);
    }
}

#[async_trait]
impl FormatHooks for TraceHooks {
    type FeedState = ();
    type EntryState = ();

    fn start_payload(&mut self) -> Result<(), WriterError> {
        self.record(TraceEvent::StartPayload);
        Ok(())
    }

    fn end_payload(&mut self) -> Result<(), WriterError> {
        self.record(TraceEvent::EndPayload);
        Ok(())
    }

    fn start_feed(&mut self, feed: &ODataFeed, _state: &mut ()) -> Result<(), WriterError> {
        self.record(TraceEvent::StartFeed {
            id: feed.id.clone(),
        });
        Ok(())
    }

    fn end_feed(&mut self, feed: &ODataFeed, _state: &mut ()) -> Result<(), WriterError> {
        self.record(TraceEvent::EndFeed {
            id: feed.id.clone(),
        });
        Ok(())
    }

    fn start_entry(
        &mut self,
        entry: Option<&ODataEntry>,
        _state: &mut (),
    ) -> Result<(), WriterError> {
        self.record(TraceEvent::StartEntry {
            id: entry.and_then(|e| e.id.clone()),
        });
        Ok(())
    }

    fn end_entry(&mut self, entry: Option<&ODataEntry>, _state: &mut ()) -> Result<(), WriterError> {
        self.record(TraceEvent::EndEntry {
            id: entry.and_then(|e| e.id.clone()),
        });
        Ok(())
    }

    fn write_deferred_navigation_link(
        &mut self,
        link: &ODataNavigationLink,
    ) -> Result<(), WriterError> {
        self.record(TraceEvent::DeferredLink {
            name: link.name.clone(),
        });
        Ok(())
    }

    fn start_navigation_link_with_content(
        &mut self,
        link: &ODataNavigationLink,
    ) -> Result<(), WriterError> {
        self.record(TraceEvent::StartLinkContent {
            name: link.name.clone(),
        });
        Ok(())
    }

    fn end_navigation_link_with_content(
        &mut self,
        link: &ODataNavigationLink,
    ) -> Result<(), WriterError> {
        self.record(TraceEvent::EndLinkContent {
            name: link.name.clone(),
        });
        Ok(())
    }

    fn write_entity_reference_in_navigation_link_content(
        &mut self,
        parent: &ODataNavigationLink,
        reference: &ODataEntityReferenceLink,
    ) -> Result<(), WriterError> {
        self.record(TraceEvent::EntityReference {
            link: parent.name.clone(),
            url: reference.url.clone(),
        });
        Ok(())
    }

    fn flush_synchronously(&mut self) -> Result<(), WriterError> {
        self.record(TraceEvent::Flush);
        Ok(())
    }

    async fn flush_asynchronously(&mut self) -> Result<(), WriterError> {
        self.record(TraceEvent::FlushAsync);
        Ok(())
    }
}
