// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Profile service and storage port.

use thiserror::Error;
use tracing::debug;

use crate::profile::WriterProfile;

/// Storage port for raw profile blobs (keyed by profile name).
pub trait ConfigStore {
    /// Load a raw blob. Returns `NotFound` when missing.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Persist a raw blob.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Error type for config operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Key not present in store.
    #[error("not found")]
    NotFound,
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// A stored profile decoded but holds unusable values.
    #[error("invalid profile '{key}': {reason}")]
    Invalid {
        /// Profile name.
        key: String,
        /// What is wrong with it.
        reason: String,
    },
    /// Catch-all error variant.
    #[error("other: {0}")]
    Other(String),
}

/// Serializes [`WriterProfile`]s as JSON and delegates storage to a `ConfigStore`.
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Create a new service using the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Consume the service and return the inner store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S> ConfigService<S>
where
    S: ConfigStore,
{
    /// Load and validate the profile `key`. Returns `Ok(None)` if missing or empty.
    pub fn load_profile(&self, key: &str) -> Result<Option<WriterProfile>, ConfigError> {
        let bytes = match self.store.load_raw(key) {
            Ok(bytes) if bytes.is_empty() => return Ok(None),
            Ok(bytes) => bytes,
            Err(ConfigError::NotFound) => return Ok(None),
            Err(e) => return Err(e),
        };
        let profile: WriterProfile = serde_json::from_slice(&bytes)?;
        profile.validate().map_err(|reason| ConfigError::Invalid {
            key: key.to_owned(),
            reason,
        })?;
        debug!(key, "loaded writer profile");
        Ok(Some(profile))
    }

    /// Load the profile `key`, falling back to `fallback` when it is missing.
    pub fn load_profile_or(
        &self,
        key: &str,
        fallback: WriterProfile,
    ) -> Result<WriterProfile, ConfigError> {
        Ok(self.load_profile(key)?.unwrap_or(fallback))
    }

    /// Validate, serialize and persist `profile` under `key`.
    pub fn save_profile(&self, key: &str, profile: &WriterProfile) -> Result<(), ConfigError> {
        profile.validate().map_err(|reason| ConfigError::Invalid {
            key: key.to_owned(),
            reason,
        })?;
        let data = serde_json::to_vec_pretty(profile)?;
        self.store.save_raw(key, &data)
    }
}
