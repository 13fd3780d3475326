//! Domain types for device control

mod command;
mod message;
mod mode;

pub use command::{ControlCommand, Operation};
pub use message::{ControlMessage, StatusCode};
pub use mode::{DeviceMode, ScreenOrientation};
