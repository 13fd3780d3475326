//! Control command types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_COMMAND_ID: AtomicU64 = AtomicU64::new(1);

/// Remote method a command targets
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Operation {
    SetDeviceMode,
    SetScreenOrientation,
}

impl Operation {
    pub fn name(self) -> &'static str {
        match self {
            Operation::SetDeviceMode => "setDeviceMode",
            Operation::SetScreenOrientation => "setScreenOrientation",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Device-control request, alive only for the duration of one dispatch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ControlCommand {
    /// Correlation ID, echoed back in the response
    pub id: u64,
    /// Target remote method
    pub operation: Operation,
    /// Integer payload (device mode or orientation)
    pub argument: i32,
}

impl ControlCommand {
    /// Create new control command with a fresh ID
    pub fn new(operation: Operation, argument: i32) -> Self {
        Self {
            id: NEXT_COMMAND_ID.fetch_add(1, Ordering::Relaxed),
            operation,
            argument,
        }
    }

    pub fn set_device_mode(mode: i32) -> Self {
        Self::new(Operation::SetDeviceMode, mode)
    }

    pub fn set_screen_orientation(orientation: i32) -> Self {
        Self::new(Operation::SetScreenOrientation, orientation)
    }
}
