use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::property::PropertyTable;
use crate::registrant::Registrant;

/// Oldest alerts are dropped past this many.
const MAX_ALERTS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Info,
    Warning,
    Error,
}

/// Alert log published as an `Alerts` widget.
#[derive(Debug, Default)]
pub struct Alerts {
    entries: RwLock<VecDeque<(AlertLevel, String)>>,
}

impl Alerts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, level: AlertLevel, message: impl Into<String>) {
        let mut entries = self.entries.write();
        record(&mut entries, level, message.into());
    }

    /// Like [`Alerts::push`] but gives up when the log is locked.
    ///
    /// Returns `false` if the entry was skipped.
    fn try_push(&self, level: AlertLevel, message: String) -> bool {
        match self.entries.try_write() {
            Some(mut entries) => {
                record(&mut entries, level, message);
                true
            },
            None => false,
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(AlertLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.push(AlertLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(AlertLevel::Error, message);
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn messages(&self, level: AlertLevel) -> Vec<String> {
        self.entries.read().iter().filter(|(l, _)| *l == level).map(|(_, m)| m.clone()).collect()
    }

    /// Record every panic as an error alert, then run the previous hook.
    pub fn install_panic_hook(self: &Arc<Self>) {
        let alerts = Arc::downgrade(self);
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            // A panic raised while the log is locked must not block on it.
            if let Some(alerts) = alerts.upgrade() {
                alerts.try_push(AlertLevel::Error, info.to_string());
            }
            previous(info);
        }));
    }
}

fn record(entries: &mut VecDeque<(AlertLevel, String)>, level: AlertLevel, message: String) {
    if entries.len() == MAX_ALERTS {
        entries.pop_front();
    }
    entries.push_back((level, message));
}

impl Registrant for Alerts {
    fn populate(&self, table: &mut PropertyTable) {
        let errors = self.messages(AlertLevel::Error);
        let warnings = self.messages(AlertLevel::Warning);
        let infos = self.messages(AlertLevel::Info);

        table
            .set_type("Alerts")
            .add_read_only("errors", move || errors.clone())
            .add_read_only("warnings", move || warnings.clone())
            .add_read_only("infos", move || infos.clone());
    }
}
