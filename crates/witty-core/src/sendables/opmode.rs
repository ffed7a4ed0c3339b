use std::sync::Arc;
use std::time::Duration;

use crate::property::PropertyTable;
use crate::registrant::Registrant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpModeFlavor {
    TeleOp,
    Autonomous,
    /// Built-in op modes; never listed on the dashboard.
    System,
}

/// A registered op mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpModeMeta {
    pub name: String,
    pub flavor: OpModeFlavor,
}

impl OpModeMeta {
    pub fn new(name: impl Into<String>, flavor: OpModeFlavor) -> Self {
        Self { name: name.into(), flavor }
    }
}

/// Read access to the running op mode and the op mode registry.
pub trait OpModeInfo: Send + Sync {
    /// Names of every configured hardware device.
    fn hardware_names(&self) -> Vec<String>;
    fn is_started(&self) -> bool;
    /// Time since the active op mode was initialised.
    fn runtime(&self) -> Duration;
    fn active_op_mode(&self) -> Option<String>;
    fn registered_op_modes(&self) -> Vec<OpModeMeta>;
}

/// Display names of the registered op modes, optionally of one flavor.
/// System op modes are always left out.
pub(crate) fn op_mode_names(metas: &[OpModeMeta], flavor: Option<OpModeFlavor>) -> Vec<String> {
    metas
        .iter()
        .filter(|m| m.flavor != OpModeFlavor::System)
        .filter(|m| flavor.map_or(true, |f| m.flavor == f))
        .map(|m| m.name.clone())
        .collect()
}

/// Root registrant describing the active op mode.
pub struct OpModeSendable {
    info: Arc<dyn OpModeInfo>,
}

impl OpModeSendable {
    pub fn new(info: Arc<dyn OpModeInfo>) -> Self {
        Self { info }
    }
}

impl Registrant for OpModeSendable {
    fn populate(&self, table: &mut PropertyTable) {
        let info = &self.info;

        let get = Arc::clone(info);
        table.add_read_only("Registered Hardware", move || get.hardware_names());
        let get = Arc::clone(info);
        table.add_read_only("Is Started", move || get.is_started());
        let get = Arc::clone(info);
        table.add_read_only("Runtime", move || i64::try_from(get.runtime().as_secs()).unwrap_or(i64::MAX));
        let get = Arc::clone(info);
        table.add_read_only("Current OpMode", move || get.active_op_mode().unwrap_or_default());

        // Registry is read once per cycle.
        let metas = info.registered_op_modes();
        let all = op_mode_names(&metas, None);
        let teleop = op_mode_names(&metas, Some(OpModeFlavor::TeleOp));
        let autonomous = op_mode_names(&metas, Some(OpModeFlavor::Autonomous));
        table
            .add_read_only("Registered OpModes", move || all.clone())
            .add_read_only("Registered TeleOp", move || teleop.clone())
            .add_read_only("Registered Autonomous", move || autonomous.clone());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use witty_types::{Kind, Value};

    struct FakeRobot;

    impl OpModeInfo for FakeRobot {
        fn hardware_names(&self) -> Vec<String> {
            vec!["leftDrive".to_string(), "claw".to_string()]
        }
        fn is_started(&self) -> bool {
            true
        }
        fn runtime(&self) -> Duration {
            Duration::from_millis(12_700)
        }
        fn active_op_mode(&self) -> Option<String> {
            None
        }
        fn registered_op_modes(&self) -> Vec<OpModeMeta> {
            vec![
                OpModeMeta::new("Drive", OpModeFlavor::TeleOp),
                OpModeMeta::new("Park", OpModeFlavor::Autonomous),
                OpModeMeta::new("$Stop$Robot$", OpModeFlavor::System),
            ]
        }
    }

    #[test]
    fn test_op_mode_properties() {
        let mut table = PropertyTable::new();
        OpModeSendable::new(Arc::new(FakeRobot)).populate(&mut table);

        assert_eq!(table.len(), 7);
        assert_eq!(table.get("Runtime").unwrap().read(), Value::Int(12));
        assert_eq!(table.get("Is Started").unwrap().kind(), Kind::Bool);
        assert_eq!(table.get("Current OpMode").unwrap().read(), Value::String(String::new()));
        assert_eq!(
            table.get("Registered OpModes").unwrap().read(),
            Value::StringArray(vec!["Drive".to_string(), "Park".to_string()])
        );
        assert_eq!(
            table.get("Registered Autonomous").unwrap().read(),
            Value::StringArray(vec!["Park".to_string()])
        );
        assert!(table.iter().all(|(_, p)| !p.is_writable()));
    }
}
