// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for the OData writer crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`config`] - In-memory config store fake for testing without filesystem
//! - [`hooks`] - Recording format hooks with failure injection
//! - [`model`] - A small people/products entity model
//! - [`payload`] - Feed, entry and link builders matching the model

pub mod config;
pub mod hooks;
pub mod model;
pub mod payload;

pub use config::InMemoryConfigStore;
pub use hooks::{HookEvent, RecordingHooks};
pub use model::{people_model, people_schema};
pub use payload::{
    best_friend_link, customer, employee, friends_link, person, person_feed, photo, product,
};
