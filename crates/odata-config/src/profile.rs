// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Persisted writer profile (everything in the output context except the model).

use odata_payload::ODataVersion;
use serde::{Deserialize, Serialize};

/// Default cap on nested entries.
pub const DEFAULT_MAX_NESTING_DEPTH: u32 = 100;

/// Saved settings for one kind of output (e.g. "response-json", "request").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterProfile {
    /// Writing a response (`true`) or a request (`false`).
    pub writing_response: bool,
    /// Synchronous (`true`) or asynchronous (`false`) call discipline.
    pub synchronous: bool,
    /// Negotiated protocol version.
    pub version: ODataVersion,
    /// Message quotas.
    pub quotas: QuotaProfile,
    /// Writer behavior flags.
    pub behavior: BehaviorProfile,
}

impl Default for WriterProfile {
    fn default() -> Self {
        Self {
            writing_response: true,
            synchronous: true,
            version: ODataVersion::default(),
            quotas: QuotaProfile::default(),
            behavior: BehaviorProfile::default(),
        }
    }
}

impl WriterProfile {
    /// Default profile for writing requests.
    pub fn request() -> Self {
        Self {
            writing_response: false,
            ..Self::default()
        }
    }

    /// Check values a deserializer cannot reject on its own.
    pub fn validate(&self) -> Result<(), String> {
        if self.quotas.max_nesting_depth == 0 {
            return Err("quotas.max_nesting_depth must be greater than zero".into());
        }
        Ok(())
    }
}

/// Message quotas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaProfile {
    /// Maximum depth of nested entries.
    pub max_nesting_depth: u32,
}

impl Default for QuotaProfile {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// Writer behavior flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorProfile {
    /// Accept repeated property names within one entry.
    pub allow_duplicate_property_names: bool,
    /// Check media resources against the entity type's stream flag.
    pub validate_media_resource: bool,
    /// Accept properties missing from a closed entity type.
    pub allow_undeclared_properties: bool,
}

impl Default for BehaviorProfile {
    fn default() -> Self {
        Self {
            allow_duplicate_property_names: false,
            validate_media_resource: true,
            allow_undeclared_properties: false,
        }
    }
}
