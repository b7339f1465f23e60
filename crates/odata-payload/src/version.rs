// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Negotiated protocol version.

use serde::{Deserialize, Serialize};

/// OData protocol version negotiated for the output.
///
/// Ordered, so feature gates read as `version >= ODataVersion::V2`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum ODataVersion {
    /// Version 1.0.
    #[serde(rename = "1.0")]
    V1,
    /// Version 2.0: inline count and server-driven paging.
    #[serde(rename = "2.0")]
    V2,
    /// Version 3.0.
    #[default]
    #[serde(rename = "3.0")]
    V3,
}

impl std::fmt::Display for ODataVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V1 => write!(f, "1.0"),
            Self::V2 => write!(f, "2.0"),
            Self::V3 => write!(f, "3.0"),
        }
    }
}
