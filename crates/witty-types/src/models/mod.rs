//! Core domain models for Witty Dashboard.
//!
//! This module contains the value model shared by the registry, the remote
//! store adapters, and the configuration layer.

mod config;
mod kind;
mod value;

// Re-export all models
pub use config::DashboardConfig;
pub use kind::Kind;
pub use value::{PropertyType, Value};
