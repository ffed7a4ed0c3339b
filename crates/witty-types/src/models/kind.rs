//! The closed set of value kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PropertyError;

/// Kind of a published value.
///
/// The set is closed; each kind has a stable type string that is used on the
/// wire and in dashboard type markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    #[serde(rename = "boolean")]
    Bool,
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "double")]
    Double,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "raw")]
    Raw,
    #[serde(rename = "boolean[]")]
    BoolArray,
    #[serde(rename = "int[]")]
    IntArray,
    #[serde(rename = "float[]")]
    FloatArray,
    #[serde(rename = "double[]")]
    DoubleArray,
    #[serde(rename = "string[]")]
    StringArray,
}

impl Kind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::Bool,
        Self::Int,
        Self::Float,
        Self::Double,
        Self::String,
        Self::Raw,
        Self::BoolArray,
        Self::IntArray,
        Self::FloatArray,
        Self::DoubleArray,
        Self::StringArray,
    ];

    /// Wire type string.
    pub fn type_str(self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::Int => "int",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::Raw => "raw",
            Self::BoolArray => "boolean[]",
            Self::IntArray => "int[]",
            Self::FloatArray => "float[]",
            Self::DoubleArray => "double[]",
            Self::StringArray => "string[]",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_str())
    }
}

impl FromStr for Kind {
    type Err = PropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.type_str() == s)
            .ok_or_else(|| PropertyError::UnsupportedKind { found: s.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_strings_parse_back() {
        for kind in Kind::ALL {
            assert_eq!(kind.type_str().parse::<Kind>(), Ok(kind));
        }
    }

    #[test]
    fn test_unknown_type_string_is_unsupported() {
        let err = "long".parse::<Kind>().unwrap_err();
        assert_eq!(err, PropertyError::UnsupportedKind { found: "long".to_string() });
    }

    #[test]
    fn test_serde_uses_type_strings() {
        assert_eq!(serde_json::to_string(&Kind::DoubleArray).ok().as_deref(), Some("\"double[]\""));
        assert_eq!(serde_json::from_str::<Kind>("\"boolean\"").ok(), Some(Kind::Bool));
    }
}
