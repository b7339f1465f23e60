// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Writer settings.

use std::fmt;
use std::sync::Arc;

use odata_config::{WriterProfile, DEFAULT_MAX_NESTING_DEPTH};
use odata_edm::EdmModel;
use odata_payload::ODataVersion;

/// Limits on the shape of the written payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageQuotas {
    /// Maximum number of entries open at once.
    pub max_nesting_depth: u32,
}

impl Default for MessageQuotas {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

/// Validation switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterBehavior {
    /// Disable duplicate property and link detection.
    pub allow_duplicate_property_names: bool,
    /// Check media resources against the entity type's `has_stream`.
    pub validate_media_resource: bool,
    /// Accept properties not declared on closed entity types.
    pub allow_undeclared_properties: bool,
}

impl Default for WriterBehavior {
    fn default() -> Self {
        Self {
            allow_duplicate_property_names: false,
            validate_media_resource: true,
            allow_undeclared_properties: false,
        }
    }
}

/// Everything a writer needs to know about the message it writes.
#[derive(Clone)]
pub struct WriterSettings {
    /// Response (`true`) or request (`false`) payload.
    pub writing_response: bool,
    /// Whether the writer accepts the synchronous or the asynchronous API.
    pub synchronous: bool,
    /// Negotiated protocol version.
    pub version: ODataVersion,
    /// Payload shape limits.
    pub message_quotas: MessageQuotas,
    /// Entity model used for type validation, if any.
    pub model: Option<Arc<dyn EdmModel>>,
    /// Validation switches.
    pub behavior: WriterBehavior,
}

impl fmt::Debug for WriterSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriterSettings")
            .field("writing_response", &self.writing_response)
            .field("synchronous", &self.synchronous)
            .field("version", &self.version)
            .field("message_quotas", &self.message_quotas)
            .field("model", &self.model.as_ref().map(|_| "<model>"))
            .field("behavior", &self.behavior)
            .finish()
    }
}

impl Default for WriterSettings {
    fn default() -> Self {
        Self {
            writing_response: true,
            synchronous: true,
            version: ODataVersion::default(),
            message_quotas: MessageQuotas::default(),
            model: None,
            behavior: WriterBehavior::default(),
        }
    }
}

impl WriterSettings {
    /// Synchronous response settings without a model.
    pub fn response() -> Self {
        Self::default()
    }

    /// Synchronous request settings without a model.
    pub fn request() -> Self {
        Self {
            writing_response: false,
            ..Self::default()
        }
    }

    /// Settings described by a stored profile. The model is attached separately.
    pub fn from_profile(profile: &WriterProfile) -> Self {
        Self {
            writing_response: profile.writing_response,
            synchronous: profile.synchronous,
            version: profile.version,
            message_quotas: MessageQuotas {
                max_nesting_depth: profile.quotas.max_nesting_depth,
            },
            model: None,
            behavior: WriterBehavior {
                allow_duplicate_property_names: profile.behavior.allow_duplicate_property_names,
                validate_media_resource: profile.behavior.validate_media_resource,
                allow_undeclared_properties: profile.behavior.allow_undeclared_properties,
            },
        }
    }

    /// Attach an entity model.
    pub fn with_model(mut self, model: Arc<dyn EdmModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Switch to the asynchronous API.
    pub fn asynchronous(mut self) -> Self {
        self.synchronous = false;
        self
    }

    /// Use a different protocol version.
    pub fn with_version(mut self, version: ODataVersion) -> Self {
        self.version = version;
        self
    }

    /// Use a different nesting quota.
    pub fn with_max_nesting_depth(mut self, max: u32) -> Self {
        self.message_quotas.max_nesting_depth = max;
        self
    }

    /// Replace the validation switches.
    pub fn with_behavior(mut self, behavior: WriterBehavior) -> Self {
        self.behavior = behavior;
        self
    }
}
