//! Remote store errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by a remote store or its connector.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum StoreError {
    /// The connection has been closed (or was never opened)
    #[error("Remote store connection is closed")]
    Closed,

    /// The server could not bind its listening socket
    #[error("Failed to bind {addr}: {message}")]
    Bind {
        /// Address the bind was attempted on
        addr: String,
        /// Description of the bind failure
        message: String,
    },

    /// No topic is published at the given path
    #[error("Topic not found: {path}")]
    NotFound {
        /// Requested topic path
        path: String,
    },
}

impl StoreError {
    /// Create a bind error from an IO error.
    pub fn from_bind_error(addr: impl Into<String>, e: &std::io::Error) -> Self {
        Self::Bind { addr: addr.into(), message: e.to_string() }
    }
}
