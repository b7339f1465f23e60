// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Replay tool for the OData payload writer.
//!
//! A [`Script`] names a writer setup and a list of operations. [`replay`]
//! runs them against an [`ODataWriter`](odata_writer::ODataWriter) whose hooks
//! record a [`Trace`]; [`check`] compares two traces.

pub mod cli;
mod replay;
mod script;
mod trace;

pub use replay::{check, replay, replay_async, ReplayError};
pub use script::{Op, Script, ScriptWriter};
pub use trace::{Outcome, Trace, TraceEvent, TraceHooks};
