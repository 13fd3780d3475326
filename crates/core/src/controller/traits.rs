//! Device control capability traits

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::{ChannelError, ChannelResult, Result};
use crate::types::{ControlCommand, Operation, StatusCode};

/// Uniform device-control interface
///
/// Calls are synchronous and block the calling thread until the backend
/// answers. Implementations do not serialize concurrent calls; interleaved
/// calls from several threads have no defined relative order.
///
/// The same trait is the contract for host-supplied controllers discovered
/// at startup.
pub trait DeviceController: Send + Sync {
    /// Request a device mode (see [`crate::types::DeviceMode`])
    fn set_device_mode(&self, mode: i32) -> Result<()>;

    /// Request a screen orientation (see [`crate::types::ScreenOrientation`])
    fn set_screen_orientation(&self, orientation: i32) -> Result<()>;
}

/// Handle to the remote control service
///
/// Errors are channel-level; mapping them to the caller-facing taxonomy is
/// the controller's job.
pub trait RemoteController: Send + Sync {
    /// Remote "change device mode" call
    fn change_device_mode(&self, mode: i32) -> ChannelResult<()>;

    /// Remote "change screen orientation" call
    fn change_screen_orientation(&self, orientation: i32) -> ChannelResult<()>;
}

/// Mock remote controller for testing
///
/// Records every command it receives and can be switched into a failing state.
#[derive(Default)]
pub struct MockRemoteController {
    calls: Mutex<Vec<ControlCommand>>,
    call_count: AtomicUsize,
    failing: AtomicBool,
}

impl MockRemoteController {
    /// Create new mock remote that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Create mock remote whose calls all fail like a dead channel
    pub fn failing() -> Self {
        let mock = Self::default();
        mock.set_failing(true);
        mock
    }

    /// Toggle failure mode
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of remote calls attempted
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Commands received so far
    pub fn calls(&self) -> Vec<ControlCommand> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, operation: Operation, argument: i32) -> ChannelResult<()> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let command = ControlCommand::new(operation, argument);
        let id = command.id;
        match self.calls.lock() {
            Ok(mut calls) => calls.push(command),
            Err(poisoned) => poisoned.into_inner().push(command),
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(ChannelError::Remote {
                status: StatusCode::Internal,
                message: format!("mock remote failure for command {}", id),
            });
        }
        Ok(())
    }
}

impl RemoteController for MockRemoteController {
    fn change_device_mode(&self, mode: i32) -> ChannelResult<()> {
        self.record(Operation::SetDeviceMode, mode)
    }

    fn change_screen_orientation(&self, orientation: i32) -> ChannelResult<()> {
        self.record(Operation::SetScreenOrientation, orientation)
    }
}
