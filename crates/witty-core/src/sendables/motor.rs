use std::fmt;
use std::sync::Arc;

use super::Direction;
use crate::property::PropertyTable;
use crate::registrant::Registrant;

/// What a motor does when its power is set to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroPowerBehavior {
    #[default]
    Unknown,
    Brake,
    Float,
}

impl fmt::Display for ZeroPowerBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "UNKNOWN"),
            Self::Brake => write!(f, "BRAKE"),
            Self::Float => write!(f, "FLOAT"),
        }
    }
}

/// Accessor for a DC motor with an encoder.
pub trait MotorDevice: Send + Sync {
    /// Power in `[-1, 1]`.
    fn power(&self) -> f64;
    fn set_power(&self, power: f64);
    fn current_position(&self) -> i64;
    fn target_position(&self) -> i64;
    fn set_target_position(&self, position: i64);
    fn direction(&self) -> Direction;
    fn set_direction(&self, direction: Direction);
    /// Current draw in amps.
    fn current(&self) -> f64;
    fn is_over_current(&self) -> bool;
    fn device_name(&self) -> String;
    fn zero_power_behavior(&self) -> ZeroPowerBehavior;
}

/// Publishes a motor as a `Motor Controller` widget.
pub struct DcMotorSendable {
    motor: Arc<dyn MotorDevice>,
}

impl DcMotorSendable {
    pub fn new(motor: Arc<dyn MotorDevice>) -> Self {
        Self { motor }
    }
}

impl Registrant for DcMotorSendable {
    fn populate(&self, table: &mut PropertyTable) {
        let m = &self.motor;
        table.set_type("Motor Controller");

        let (get, set) = (Arc::clone(m), Arc::clone(m));
        table.add_read_write("Value", move || get.power(), move |p: f64| set.set_power(p));

        let get = Arc::clone(m);
        table.add_read_only("Current Position", move || get.current_position());

        let (get, set) = (Arc::clone(m), Arc::clone(m));
        table.add_read_write(
            "Target Position",
            move || get.target_position(),
            move |p: i64| set.set_target_position(p),
        );

        let (get, set) = (Arc::clone(m), Arc::clone(m));
        table.add_read_write(
            "Direction",
            move || get.direction().is_forward(),
            move |forward: bool| set.set_direction(Direction::from_forward(forward)),
        );

        let get = Arc::clone(m);
        table.add_read_only("Current", move || get.current());
        let get = Arc::clone(m);
        table.add_read_only("Is Over Current", move || get.is_over_current());
        let get = Arc::clone(m);
        table.add_read_only("Device name", move || get.device_name());
        let get = Arc::clone(m);
        table.add_read_only("Zero Power Behaviour", move || get.zero_power_behavior().to_string());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use witty_types::{Kind, Value};

    #[derive(Default)]
    struct FakeMotor {
        target: Mutex<i64>,
    }

    impl MotorDevice for FakeMotor {
        fn power(&self) -> f64 {
            0.3
        }
        fn set_power(&self, _power: f64) {}
        fn current_position(&self) -> i64 {
            1200
        }
        fn target_position(&self) -> i64 {
            *self.target.lock()
        }
        fn set_target_position(&self, position: i64) {
            *self.target.lock() = position;
        }
        fn direction(&self) -> Direction {
            Direction::Reverse
        }
        fn set_direction(&self, _direction: Direction) {}
        fn current(&self) -> f64 {
            2.5
        }
        fn is_over_current(&self) -> bool {
            false
        }
        fn device_name(&self) -> String {
            "leftDrive".to_string()
        }
        fn zero_power_behavior(&self) -> ZeroPowerBehavior {
            ZeroPowerBehavior::Brake
        }
    }

    #[test]
    fn test_motor_properties() {
        let motor = Arc::new(FakeMotor::default());
        let mut table = PropertyTable::new();
        DcMotorSendable::new(motor.clone()).populate(&mut table);

        assert_eq!(table.type_tag(), Some("Motor Controller"));
        assert_eq!(table.len(), 8);
        assert_eq!(table.get("Current Position").unwrap().kind(), Kind::Int);
        assert!(!table.get("Current Position").unwrap().is_writable());
        assert_eq!(table.get("Direction").unwrap().read(), Value::Bool(false));
        assert_eq!(table.get("Zero Power Behaviour").unwrap().read(), Value::String("BRAKE".to_string()));

        (table.get("Target Position").unwrap().setter().unwrap())(Value::Int(2400));
        assert_eq!(motor.target_position(), 2400);
    }
}
