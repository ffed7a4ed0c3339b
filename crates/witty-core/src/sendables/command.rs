use std::sync::Arc;

use crate::property::PropertyTable;
use crate::registrant::Registrant;

/// A schedulable command, as exposed to the dashboard.
pub trait Command: Send + Sync {
    fn name(&self) -> String;
    fn is_scheduled(&self) -> bool;
    fn schedule(&self);
    fn cancel(&self);

    fn runs_when_disabled(&self) -> bool {
        false
    }
}

/// Publishes a command as a `Command` widget whose `running` flag starts
/// and cancels it.
pub struct CommandSendable {
    command: Arc<dyn Command>,
}

impl CommandSendable {
    pub fn new(command: Arc<dyn Command>) -> Self {
        Self { command }
    }

    pub fn name(&self) -> String {
        self.command.name()
    }
}

impl Registrant for CommandSendable {
    fn populate(&self, table: &mut PropertyTable) {
        let name = Arc::clone(&self.command);
        let (get, set) = (Arc::clone(&self.command), Arc::clone(&self.command));
        let disabled = Arc::clone(&self.command);

        table
            .set_type("Command")
            .add_read_only(".name", move || name.name())
            .add_read_write(
                "running",
                move || get.is_scheduled(),
                move |running: bool| match (running, set.is_scheduled()) {
                    (true, false) => set.schedule(),
                    (false, true) => set.cancel(),
                    _ => {},
                },
            )
            .add_read_only("interruptBehavior", || "kCancelSelf".to_string())
            .add_read_only("runsWhenDisabled", move || disabled.runs_when_disabled());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use witty_types::Value;

    #[derive(Default)]
    struct Counter {
        scheduled: AtomicBool,
        schedules: AtomicUsize,
        cancels: AtomicUsize,
    }

    impl Command for Counter {
        fn name(&self) -> String {
            "Intake".to_string()
        }

        fn is_scheduled(&self) -> bool {
            self.scheduled.load(Ordering::SeqCst)
        }

        fn schedule(&self) {
            self.schedules.fetch_add(1, Ordering::SeqCst);
            self.scheduled.store(true, Ordering::SeqCst);
        }

        fn cancel(&self) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
            self.scheduled.store(false, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_running_flag_schedules_and_cancels() {
        let command = Arc::new(Counter::default());
        let mut table = PropertyTable::new();
        CommandSendable::new(command.clone()).populate(&mut table);
        let running = table.get("running").unwrap().setter().unwrap().clone();

        running(Value::Bool(true));
        running(Value::Bool(true));
        assert_eq!(command.schedules.load(Ordering::SeqCst), 1);

        running(Value::Bool(false));
        running(Value::Bool(false));
        assert_eq!(command.cancels.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_static_properties() {
        let mut table = PropertyTable::new();
        CommandSendable::new(Arc::new(Counter::default())).populate(&mut table);

        assert_eq!(table.type_tag(), Some("Command"));
        assert_eq!(table.get(".name").unwrap().read(), Value::String("Intake".to_string()));
        assert_eq!(table.get("interruptBehavior").unwrap().read(), Value::String("kCancelSelf".to_string()));
        assert_eq!(table.get("runsWhenDisabled").unwrap().read(), Value::Bool(false));
    }
}
