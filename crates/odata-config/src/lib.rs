// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Writer profiles and config storage for the OData payload writer.
//! Storage adapters live in their own crates (e.g. `odata-config-fs`).

pub mod config;
pub mod profile;

pub use config::{ConfigError, ConfigService, ConfigStore};
pub use profile::{BehaviorProfile, QuotaProfile, WriterProfile, DEFAULT_MAX_NESTING_DEPTH};
