//! # Witty Types
//!
//! Core types, value kinds, and error definitions for Witty Dashboard.
//!
//! This crate provides the foundational type system shared by the dashboard
//! crates:
//!
//! - **`error`** - Typed errors for property registration, the remote store, and configuration
//! - **`models`** - Value kinds, the tagged [`Value`] union, and [`DashboardConfig`]
//!
//! ## Architecture Role
//!
//! `witty-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!          witty-types (this crate)
//!                 │
//!                 ▼
//!            witty-core
//!                 │
//!                 ▼
//!           witty-server
//! ```
//!
//! All types are designed to be:
//! - **Serializable** via serde for the HTTP front-end and config files
//! - **Clone** for cheap sharing across async boundaries
//! - **PartialEq** for testing and comparison

pub mod error;
pub mod models;

// Re-export error types for convenience
pub use error::{ConfigError, PropertyError, StoreError};

// Re-export core model types
pub use models::{DashboardConfig, Kind, PropertyType, Value};
