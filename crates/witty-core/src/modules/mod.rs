//! File-backed dashboard settings.

pub mod config;
