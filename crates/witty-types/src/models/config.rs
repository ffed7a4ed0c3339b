//! Dashboard configuration model.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Address the dashboard server binds when nothing else is configured
/// (the robot controller's Wi-Fi Direct address).
pub const DEFAULT_HOST: &str = "192.168.49.1";
/// Default server port.
pub const DEFAULT_PORT: u16 = 5810;
/// Default publish period in milliseconds.
pub const DEFAULT_PERIOD_MS: u64 = 200;
/// Top-level key the root registrant is published under.
pub const DEFAULT_ROOT_KEY: &str = "OpMode";

/// Full dashboard configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct DashboardConfig {
    /// Host the remote store server binds to
    #[validate(length(min = 1))]
    #[serde(default = "default_host")]
    pub host: String,
    /// Port the remote store server binds to
    #[validate(range(min = 1_u16))]
    #[serde(default = "default_port")]
    pub port: u16,
    /// Interval between root publish cycles
    #[validate(range(min = 10_u64))]
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
    /// Top-level key for the root registrant
    #[validate(length(min = 1))]
    #[serde(default = "default_root_key")]
    pub root_key: String,
}

impl DashboardConfig {
    /// Create default configuration.
    pub fn new() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            period_ms: default_period_ms(),
            root_key: default_root_key(),
        }
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// `host:port` as used for binding and logging.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_period_ms() -> u64 {
    DEFAULT_PERIOD_MS
}

fn default_root_key() -> String {
    DEFAULT_ROOT_KEY.to_string()
}
