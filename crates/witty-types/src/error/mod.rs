//! Typed error definitions for Witty Dashboard.
//!
//! This module provides a structured error hierarchy with specific error types
//! for different domains. All errors are designed to be:
//!
//! - **Serializable** for HTTP responses via serde
//! - **Displayable** for logging via Display trait
//! - **Matchable** for error handling logic via enum variants

mod config;
mod property;
mod store;

pub use config::ConfigError;
pub use property::PropertyError;
pub use store::StoreError;
