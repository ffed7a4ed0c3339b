//! Unified error types for Witty Core.

use serde::Serialize;
use thiserror::Error;
use witty_types::{ConfigError, PropertyError, StoreError};

/// Main error type for all dashboard operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DashboardError {
    /// `start` was called while the dashboard is running.
    #[error("Dashboard is already running")]
    AlreadyRunning,

    /// `stop` was called while the dashboard is not running.
    #[error("Dashboard is not running")]
    NotRunning,

    /// The remote store could not bind or connect during `start`.
    #[error("Server unavailable at {addr}: {message}")]
    ServerUnavailable { addr: String, message: String },

    /// The remote store rejected an operation (closed connection, missing topic).
    #[error("Transport error: {0}")]
    Transport(#[from] StoreError),

    /// A single registration or dynamic value was rejected.
    #[error("Property error: {0}")]
    Property(#[from] PropertyError),

    /// A publish cycle completed but skipped conflicting keys.
    #[error("Publish of {key} skipped {} conflicting key(s)", .conflicts.len())]
    Conflicts { key: String, conflicts: Vec<PropertyError> },

    /// Configuration loading or validation failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// File system I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Serialize for DashboardError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

/// Result type alias for dashboard operations.
pub type DashboardResult<T> = Result<T, DashboardError>;

impl DashboardError {
    /// Whether the error came from the transport rather than from the caller's data.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::ServerUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use witty_types::Kind;

    #[test]
    fn test_conflict_count_in_message() {
        let err = DashboardError::Conflicts {
            key: "servo1".to_string(),
            conflicts: vec![PropertyError::TypeConflict {
                key: "Value".to_string(),
                existing: Kind::Double,
                new: Kind::String,
            }],
        };
        assert_eq!(err.to_string(), "Publish of servo1 skipped 1 conflicting key(s)");
        assert!(!err.is_transport());
    }

    #[test]
    fn test_store_errors_are_transport() {
        let err: DashboardError = StoreError::Closed.into();
        assert!(err.is_transport());
        assert_eq!(serde_json::to_string(&err).ok().as_deref(), Some("\"Transport error: Remote store connection is closed\""));
    }
}
