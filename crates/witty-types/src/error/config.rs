//! Configuration-related errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading, validating, or saving dashboard configuration.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum ConfigError {
    /// No usable data directory (no home directory and no override)
    #[error("Cannot resolve data directory: {message}")]
    DataDir {
        /// Why the directory could not be resolved or created
        message: String,
    },

    /// Config file exists but is not valid JSON for the config schema
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// File that failed to parse
        path: String,
        /// Description of the parse failure
        message: String,
    },

    /// A field holds a value outside its allowed range
    #[error("Invalid value for {field}: {message}")]
    Invalid {
        /// Name of the offending field
        field: String,
        /// Description of the validation failure
        message: String,
    },

    /// An environment override could not be parsed
    #[error("Invalid override {var}={value}")]
    InvalidOverride {
        /// Environment variable name
        var: String,
        /// Raw value that failed to parse
        value: String,
    },

    /// Config file could not be written
    #[error("Failed to write {path}: {message}")]
    Write {
        /// Target file
        path: String,
        /// Description of the write failure
        message: String,
    },
}

impl ConfigError {
    /// Collapse validator output into the first offending field.
    pub fn from_validation(errors: &validator::ValidationErrors) -> Self {
        let first = errors.field_errors().into_iter().next();
        match first {
            Some((field, errs)) => Self::Invalid {
                field: field.to_string(),
                message: errs
                    .iter()
                    .map(|e| e.message.as_deref().map_or_else(|| e.code.to_string(), str::to_string))
                    .collect::<Vec<_>>()
                    .join(", "),
            },
            None => Self::Invalid { field: "config".to_string(), message: errors.to_string() },
        }
    }
}
