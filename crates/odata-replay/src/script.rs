// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Replay scripts: a writer setup plus the operations to run against it.

use std::sync::Arc;

use odata_config::WriterProfile;
use odata_edm::SchemaModel;
use odata_payload::{ODataEntityReferenceLink, ODataEntry, ODataFeed, ODataNavigationLink};
use odata_writer::{ODataWriter, WriterError, WriterKind, WriterSettings};
use serde::{Deserialize, Serialize};

use crate::replay::ReplayError;
use crate::trace::TraceHooks;

/// Top-level item the scripted writer produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptWriter {
    /// A feed writer.
    Feed,
    /// An entry writer.
    Entry,
}

impl From<ScriptWriter> for WriterKind {
    fn from(writer: ScriptWriter) -> Self {
        match writer {
            ScriptWriter::Feed => Self::Feed,
            ScriptWriter::Entry => Self::Entry,
        }
    }
}

/// One writer call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    /// `write_start_feed`.
    StartFeed {
        /// Feed to start.
        #[serde(default)]
        feed: ODataFeed,
    },
    /// `write_start_entry`.
    StartEntry {
        /// Entry to start.
        #[serde(default)]
        entry: ODataEntry,
    },
    /// `write_start_null_entry`.
    StartNullEntry,
    /// `write_start_navigation_link`.
    StartNavigationLink {
        /// Link to start.
        link: ODataNavigationLink,
    },
    /// `write_entity_reference_link`.
    EntityReferenceLink {
        /// URL of the referenced resource.
        url: String,
    },
    /// `write_end`.
    End,
    /// `flush`.
    Flush,
    /// `on_in_stream_error`.
    InStreamError,
}

impl Op {
    /// Snake-case operation name, as written in scripts.
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartFeed { .. } => "start_feed",
            Self::StartEntry { .. } => "start_entry",
            Self::StartNullEntry => "start_null_entry",
            Self::StartNavigationLink { .. } => "start_navigation_link",
            Self::EntityReferenceLink { .. } => "entity_reference_link",
            Self::End => "end",
            Self::Flush => "flush",
            Self::InStreamError => "in_stream_error",
        }
    }

    pub(crate) fn apply(self, writer: &mut ODataWriter<TraceHooks>) -> Result<(), WriterError> {
        match self {
            Self::StartFeed { feed } => writer.write_start_feed(feed),
            Self::StartEntry { entry } => writer.write_start_entry(entry),
            Self::StartNullEntry => writer.write_start_null_entry(),
            Self::StartNavigationLink { link } => writer.write_start_navigation_link(link),
            Self::EntityReferenceLink { url } => {
                writer.write_entity_reference_link(ODataEntityReferenceLink::new(url))
            }
            Self::End => writer.write_end(),
            Self::Flush => writer.flush(),
            Self::InStreamError => writer.on_in_stream_error(),
        }
    }

    pub(crate) async fn apply_async(
        self,
        writer: &mut ODataWriter<TraceHooks>,
    ) -> Result<(), WriterError> {
        match self {
            Self::StartFeed { feed } => writer.write_start_feed_async(feed).await,
            Self::StartEntry { entry } => writer.write_start_entry_async(entry).await,
            Self::StartNullEntry => writer.write_start_null_entry_async().await,
            Self::StartNavigationLink { link } => {
                writer.write_start_navigation_link_async(link).await
            }
            Self::EntityReferenceLink { url } => {
                writer
                    .write_entity_reference_link_async(ODataEntityReferenceLink::new(url))
                    .await
            }
            Self::End => writer.write_end_async().await,
            Self::Flush => writer.flush_async().await,
            Self::InStreamError => writer.on_in_stream_error(),
        }
    }
}

/// A writer setup and the operations to replay against it.
///
/// ```json
/// {
///   "profile": { "writing_response": true },
///   "writer": "feed",
///   "ops": [{ "op": "start_feed" }, { "op": "end" }]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    /// Writer profile; the call discipline is chosen by the replay mode instead.
    #[serde(default)]
    pub profile: WriterProfile,
    /// Top-level item kind.
    pub writer: ScriptWriter,
    /// Expected type of top-level entries.
    #[serde(default)]
    pub expected_type: Option<String>,
    /// Entity model to validate against.
    #[serde(default)]
    pub model: Option<SchemaModel>,
    /// Operations, in call order.
    #[serde(default)]
    pub ops: Vec<Op>,
}

impl Script {
    /// Parse a script from JSON.
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the writer this script runs against.
    pub(crate) fn writer(&self, synchronous: bool) -> Result<ODataWriter<TraceHooks>, ReplayError> {
        self.profile.validate().map_err(ReplayError::Profile)?;
        let mut settings = WriterSettings::from_profile(&self.profile);
        settings.synchronous = synchronous;
        if let Some(model) = &self.model {
            settings = settings.with_model(Arc::new(model.clone()));
        }
        let writer = ODataWriter::new(TraceHooks::default(), settings, self.writer.into());
        Ok(match &self.expected_type {
            Some(type_name) => writer.with_expected_type(type_name)?,
            None => writer,
        })
    }
}
