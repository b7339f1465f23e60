// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Running scripts and comparing traces.

use odata_writer::WriterError;
use thiserror::Error;
use tracing::{debug, info};

use crate::script::Script;
use crate::trace::{Outcome, Trace};

/// Failures of the replay tool itself. Writer failures during a replay are
/// part of the [`Trace`], not errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// Script or trace JSON could not be parsed.
    #[error("invalid JSON: {0}")]
    Script(#[from] serde_json::Error),
    /// The script's profile is out of range.
    #[error("invalid profile: {0}")]
    Profile(String),
    /// The writer could not be set up (e.g. unknown expected type).
    #[error("writer setup failed: {0}")]
    Setup(#[from] WriterError),
    /// Traces diverge at an event both contain.
    #[error("event {index} differs: expected {expected}, got {actual}")]
    EventMismatch {
        /// Index of the first differing event.
        index: usize,
        /// Expected event.
        expected: String,
        /// Recorded event.
        actual: String,
    },
    /// One trace is a prefix of the other.
    #[error("expected {expected} events, got {actual}")]
    EventCountMismatch {
        /// Expected event count.
        expected: usize,
        /// Recorded event count.
        actual: usize,
    },
    /// Same events, different outcome.
    #[error("expected outcome {expected}, got {actual}")]
    OutcomeMismatch {
        /// Expected outcome.
        expected: Outcome,
        /// Recorded outcome.
        actual: Outcome,
    },
}

/// Replay `script` through the synchronous API. Stops at the first failing operation.
pub fn replay(script: &Script) -> Result<Trace, ReplayError> {
    let mut writer = script.writer(true)?;
    let mut outcome = Outcome::Ok;
    for (step, op) in script.ops.iter().cloned().enumerate() {
        debug!(step, op = op.name(), "replaying");
        if let Err(err) = op.apply(&mut writer) {
            info!(step, code = err.code(), "replay stopped: {err}");
            outcome = Outcome::failed(step, &err);
            break;
        }
    }
    Ok(Trace {
        events: writer.into_hooks().into_events(),
        outcome,
    })
}

/// Replay `script` through the asynchronous API. Stops at the first failing operation.
pub async fn replay_async(script: &Script) -> Result<Trace, ReplayError> {
    let mut writer = script.writer(false)?;
    let mut outcome = Outcome::Ok;
    for (step, op) in script.ops.iter().cloned().enumerate() {
        debug!(step, op = op.name(), "replaying");
        if let Err(err) = op.apply_async(&mut writer).await {
            info!(step, code = err.code(), "replay stopped: {err}");
            outcome = Outcome::failed(step, &err);
            break;
        }
    }
    Ok(Trace {
        events: writer.into_hooks().into_events(),
        outcome,
    })
}

/// Compare a recorded trace against the expected one; reports the first difference.
pub fn check(actual: &Trace, expected: &Trace) -> Result<(), ReplayError> {
    let diverging = actual
        .events
        .iter()
        .zip(&expected.events)
        .enumerate()
        .find(|(_, (a, e))| a != e);
    if let Some((index, (a, e))) = diverging {
        return Err(ReplayError::EventMismatch {
            index,
            expected: format!("{e:?}"),
            actual: format!("{a:?}"),
        });
    }
    if actual.events.len() != expected.events.len() {
        return Err(ReplayError::EventCountMismatch {
            expected: expected.events.len(),
            actual: actual.events.len(),
        });
    }
    if actual.outcome != expected.outcome {
        return Err(ReplayError::OutcomeMismatch {
            expected: expected.outcome.clone(),
            actual: actual.outcome.clone(),
        });
    }
    Ok(())
}
