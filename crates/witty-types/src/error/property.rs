//! Property registration errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Kind;

/// Errors raised while a registrant populates a property table.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum PropertyError {
    /// The same key was registered twice in one pass with different kinds
    #[error("Non matching types for topic {key} ({existing} and {new})")]
    TypeConflict {
        /// Property key relative to the registrant
        key: String,
        /// Kind of the first registration
        existing: Kind,
        /// Kind of the rejected registration
        new: Kind,
    },

    /// A value or type tag outside the closed kind set
    #[error("Unsupported kind: {found}")]
    UnsupportedKind {
        /// Description of what was presented
        found: String,
    },

    /// Property keys must be non-empty
    #[error("Property key must not be empty")]
    EmptyKey,
}

impl PropertyError {
    /// Key the error is scoped to, when there is one.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::TypeConflict { key, .. } => Some(key),
            Self::UnsupportedKind { .. } | Self::EmptyKey => None,
        }
    }

    /// Same error with its key moved under `prefix/`.
    pub fn nested(self, prefix: &str) -> Self {
        match self {
            Self::TypeConflict { key, existing, new } => {
                Self::TypeConflict { key: format!("{prefix}/{key}"), existing, new }
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_display_names_both_kinds() {
        let err = PropertyError::TypeConflict {
            key: "Value".to_string(),
            existing: Kind::Double,
            new: Kind::String,
        };

        let msg = err.to_string();
        assert!(msg.contains("Value"));
        assert!(msg.contains("double"));
        assert!(msg.contains("string"));
    }

    #[test]
    fn test_nested_prefixes_conflict_key() {
        let err = PropertyError::TypeConflict {
            key: "running".to_string(),
            existing: Kind::Bool,
            new: Kind::Int,
        }
        .nested("Drive");

        assert_eq!(err.key(), Some("Drive/running"));
        assert_eq!(PropertyError::EmptyKey.nested("Drive"), PropertyError::EmptyKey);
    }
}
