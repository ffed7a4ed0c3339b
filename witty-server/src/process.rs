//! Demo registrant describing the daemon process itself.

use std::time::Instant;
use witty_core::{PropertyTable, Registrant};

pub struct ProcessInfo {
    hostname: String,
    started: Instant,
}

impl ProcessInfo {
    pub fn new() -> Self {
        let hostname = hostname::get().map(|h| h.to_string_lossy().into_owned()).unwrap_or_default();
        Self { hostname, started: Instant::now() }
    }
}

impl Default for ProcessInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl Registrant for ProcessInfo {
    fn populate(&self, table: &mut PropertyTable) {
        let hostname = self.hostname.clone();
        let started = self.started;
        table
            .set_type("Process")
            .add_read_only("Hostname", move || hostname.clone())
            .add_read_only("PID", || i64::from(std::process::id()))
            .add_read_only("Uptime", move || i64::try_from(started.elapsed().as_secs()).unwrap_or(i64::MAX))
            .add_read_only("Version", || env!("CARGO_PKG_VERSION").to_string());
    }
}
