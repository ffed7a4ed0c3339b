use std::sync::Arc;

use super::Direction;
use crate::property::PropertyTable;
use crate::registrant::Registrant;

/// Accessor for a positional servo.
pub trait ServoDevice: Send + Sync {
    /// Commanded position in `[0, 1]`.
    fn position(&self) -> f64;
    fn set_position(&self, position: f64);
    fn direction(&self) -> Direction;
    fn set_direction(&self, direction: Direction);
    fn device_name(&self) -> String;
}

/// Publishes a servo as a `Servo` widget.
pub struct ServoSendable {
    servo: Arc<dyn ServoDevice>,
}

impl ServoSendable {
    pub fn new(servo: Arc<dyn ServoDevice>) -> Self {
        Self { servo }
    }
}

impl Registrant for ServoSendable {
    fn populate(&self, table: &mut PropertyTable) {
        let (get, set) = (Arc::clone(&self.servo), Arc::clone(&self.servo));
        table.set_type("Servo").add_read_write("Value", move || get.position(), move |p: f64| set.set_position(p));

        let (get, set) = (Arc::clone(&self.servo), Arc::clone(&self.servo));
        table.add_read_write(
            "Direction",
            move || get.direction().is_forward(),
            move |forward: bool| set.set_direction(Direction::from_forward(forward)),
        );

        let servo = Arc::clone(&self.servo);
        table.add_read_only("Device name", move || servo.device_name());
    }
}
