// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Property values.

use serde::{Deserialize, Serialize};

/// A property value. The writer never inspects values; format hooks do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ODataValue {
    /// Explicit null.
    Null,
    /// Boolean primitive.
    Boolean(bool),
    /// Integral primitive.
    Int64(i64),
    /// Floating point primitive.
    Double(f64),
    /// String primitive.
    String(String),
    /// Collection of values.
    Collection(Vec<ODataValue>),
    /// Complex value made of nested properties.
    Complex(Vec<ODataProperty>),
}

impl From<bool> for ODataValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i64> for ODataValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f64> for ODataValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for ODataValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for ODataValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// A named structural property of an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ODataProperty {
    /// Property name; case-sensitive.
    pub name: String,
    /// Property value.
    #[serde(default = "null_value")]
    pub value: ODataValue,
}

fn null_value() -> ODataValue {
    ODataValue::Null
}

impl ODataProperty {
    /// Build a property.
    pub fn new(name: impl Into<String>, value: impl Into<ODataValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}
