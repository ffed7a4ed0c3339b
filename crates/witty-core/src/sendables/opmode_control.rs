use std::sync::Arc;

use super::command::{Command, CommandSendable};
use super::opmode::{op_mode_names, OpModeFlavor, OpModeMeta};
use crate::property::PropertyTable;
use crate::registrant::Registrant;

/// Control over which op mode runs.
pub trait OpModeManager: Send + Sync {
    fn registered_op_modes(&self) -> Vec<OpModeMeta>;
    fn active_op_mode(&self) -> Option<String>;
    fn init_op_mode(&self, name: &str);
    fn stop_active_op_mode(&self);
}

/// A tele-op seen as a command: scheduling initialises it, cancelling stops
/// whatever op mode is active.
struct OpModeCommand {
    name: String,
    manager: Arc<dyn OpModeManager>,
}

impl Command for OpModeCommand {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_scheduled(&self) -> bool {
        self.manager.active_op_mode().as_deref() == Some(self.name.as_str())
    }

    fn schedule(&self) {
        tracing::info!("Dashboard requested op mode {}", self.name);
        self.manager.init_op_mode(&self.name);
    }

    fn cancel(&self) {
        tracing::info!("Dashboard stopped op mode {}", self.name);
        self.manager.stop_active_op_mode();
    }
}

/// One `Command` child per registered tele-op, grouped as `OpModeControl`.
pub struct OpModeControl {
    manager: Arc<dyn OpModeManager>,
}

impl OpModeControl {
    pub fn new(manager: Arc<dyn OpModeManager>) -> Self {
        Self { manager }
    }
}

impl Registrant for OpModeControl {
    fn populate(&self, table: &mut PropertyTable) {
        table.set_type("OpModeControl");
        let metas = self.manager.registered_op_modes();
        for name in op_mode_names(&metas, Some(OpModeFlavor::TeleOp)) {
            let command = OpModeCommand { name: name.clone(), manager: Arc::clone(&self.manager) };
            table.add_child(&name, &CommandSendable::new(Arc::new(command)));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use witty_types::Value;

    #[derive(Default)]
    struct FakeManager {
        active: Mutex<Option<String>>,
    }

    impl OpModeManager for FakeManager {
        fn registered_op_modes(&self) -> Vec<OpModeMeta> {
            vec![
                OpModeMeta::new("Drive", OpModeFlavor::TeleOp),
                OpModeMeta::new("Tune", OpModeFlavor::TeleOp),
                OpModeMeta::new("Park", OpModeFlavor::Autonomous),
            ]
        }
        fn active_op_mode(&self) -> Option<String> {
            self.active.lock().clone()
        }
        fn init_op_mode(&self, name: &str) {
            *self.active.lock() = Some(name.to_string());
        }
        fn stop_active_op_mode(&self) {
            *self.active.lock() = None;
        }
    }

    #[test]
    fn test_one_command_per_teleop() {
        let mut table = PropertyTable::new();
        OpModeControl::new(Arc::new(FakeManager::default())).populate(&mut table);

        assert_eq!(table.type_tag(), Some("OpModeControl"));
        assert_eq!(table.get("Drive/.type").unwrap().read(), Value::String("Command".to_string()));
        assert!(table.get("Tune/running").is_some());
        assert!(table.get("Park/running").is_none());
    }

    #[test]
    fn test_running_flag_drives_the_manager() {
        let manager = Arc::new(FakeManager::default());
        let mut table = PropertyTable::new();
        OpModeControl::new(manager.clone()).populate(&mut table);

        let drive = table.get("Drive/running").unwrap().setter().unwrap().clone();
        drive(Value::Bool(true));
        assert_eq!(manager.active_op_mode().as_deref(), Some("Drive"));
        assert_eq!(table.get("Drive/running").unwrap().read(), Value::Bool(true));
        assert_eq!(table.get("Tune/running").unwrap().read(), Value::Bool(false));

        drive(Value::Bool(false));
        assert_eq!(manager.active_op_mode(), None);
    }
}
