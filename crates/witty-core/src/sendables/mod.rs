//! Ready-made registrants for common robot objects.
//!
//! Hardware is reached through small accessor traits so the registrants stay
//! independent of any particular device SDK.

mod alerts;
mod command;
mod field2d;
mod group;
mod motor;
mod opmode;
mod opmode_control;
mod servo;

pub use alerts::{AlertLevel, Alerts};
pub use command::{Command, CommandSendable};
pub use field2d::{Field2d, FieldObject2d, Pose2d};
pub use group::SendableGroup;
pub use motor::{DcMotorSendable, MotorDevice, ZeroPowerBehavior};
pub use opmode::{OpModeFlavor, OpModeInfo, OpModeMeta, OpModeSendable};
pub use opmode_control::{OpModeControl, OpModeManager};
pub use servo::{ServoDevice, ServoSendable};

/// Rotation direction of a motor or servo. Published as a boolean,
/// `true` meaning [`Direction::Forward`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    pub fn is_forward(self) -> bool {
        self == Self::Forward
    }

    pub fn from_forward(forward: bool) -> Self {
        if forward {
            Self::Forward
        } else {
            Self::Reverse
        }
    }
}
