// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Format-independent OData payload writer.
//!
//! [`ODataWriter`] enforces the payload grammar (feeds contain entries,
//! entries contain navigation links, links contain feeds, entries or entity
//! reference links), validates items against [`WriterSettings`] and an
//! optional entity model, and drives a [`FormatHooks`] implementation that
//! produces the actual wire format.
//!
//! ```text
//! Start ─▶ Feed ─▶ Entry ─▶ NavigationLink ─▶ NavigationLinkWithContent ─▶ Feed | Entry
//!   └────▶ Entry                                                     (any) ─▶ Error
//! ```
//!
//! Any failure moves the writer to the absorbing `Error` state.

mod depth;
mod duplicate;
mod error;
mod feed_validator;
mod hooks;
mod scope;
mod settings;
mod state;
mod validation;
mod writer;

pub use depth::DepthGuard;
pub use duplicate::DuplicatePropertyNamesChecker;
pub use error::{ErrorCategory, WriterError};
pub use feed_validator::FeedTypeValidator;
pub use hooks::FormatHooks;
pub use scope::ODataItem;
pub use settings::{MessageQuotas, WriterBehavior, WriterSettings};
pub use state::{validate_transition, ContentKind, TransitionContext, WriterKind, WriterState};
pub use validation::NavigationTarget;
pub use writer::ODataWriter;

pub use async_trait::async_trait;
