//! Device controller backends
//!
//! Exactly one backend is picked per process by
//! [`ControllerResolver`](crate::resolver::ControllerResolver).

use std::fmt;
use std::sync::Arc;

use devicectl_core::{
    DeviceControlError, DeviceController, DeviceMode, Operation, RemoteController, Result,
};

/// Delegates to a host-supplied controller
///
/// No local validation; the delegate's result is returned unchanged.
#[derive(Clone)]
pub struct PlatformAdapterController {
    delegate: Arc<dyn DeviceController>,
}

impl PlatformAdapterController {
    pub fn new(delegate: Arc<dyn DeviceController>) -> Self {
        Self { delegate }
    }
}

impl DeviceController for PlatformAdapterController {
    fn set_device_mode(&self, mode: i32) -> Result<()> {
        self.delegate.set_device_mode(mode)
    }

    fn set_screen_orientation(&self, orientation: i32) -> Result<()> {
        self.delegate.set_screen_orientation(orientation)
    }
}

/// Drives an emulator through its control service
#[derive(Clone)]
pub struct EmulatorController {
    remote: Arc<dyn RemoteController>,
}

impl EmulatorController {
    pub fn new(remote: Arc<dyn RemoteController>) -> Self {
        Self { remote }
    }
}

impl DeviceController for EmulatorController {
    /// Unknown modes are refused before anything is sent
    fn set_device_mode(&self, mode: i32) -> Result<()> {
        let mode = DeviceMode::try_from(mode).map_err(|value| {
            DeviceControlError::UnsupportedOperation(format!(
                "device mode {} is not supported by the emulator",
                value
            ))
        })?;

        tracing::debug!("Emulator device mode -> {}", mode);
        self.remote
            .change_device_mode(mode.as_i32())
            .map_err(|e| DeviceControlError::operation_failed(Operation::SetDeviceMode, e))
    }

    /// The control service decides which orientations are valid
    fn set_screen_orientation(&self, orientation: i32) -> Result<()> {
        tracing::debug!("Emulator screen orientation -> {}", orientation);
        self.remote
            .change_screen_orientation(orientation)
            .map_err(|e| DeviceControlError::operation_failed(Operation::SetScreenOrientation, e))
    }
}

/// Physical device without a host controller: nothing can be driven
#[derive(Debug, Clone, Copy, Default)]
pub struct PhysicalDeviceController;

impl DeviceController for PhysicalDeviceController {
    fn set_device_mode(&self, _mode: i32) -> Result<()> {
        Err(DeviceControlError::UnsupportedOperation(
            "setting the device mode is not supported on a physical device".to_string(),
        ))
    }

    fn set_screen_orientation(&self, _orientation: i32) -> Result<()> {
        Err(DeviceControlError::UnsupportedOperation(
            "setting the screen orientation is not supported on a physical device".to_string(),
        ))
    }
}

/// Which backend a [`Controller`] is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerKind {
    Platform,
    Emulator,
    Physical,
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControllerKind::Platform => "platform",
            ControllerKind::Emulator => "emulator",
            ControllerKind::Physical => "physical",
        };
        f.write_str(name)
    }
}

/// The resolved device controller
#[derive(Clone)]
pub enum Controller {
    Platform(PlatformAdapterController),
    Emulator(EmulatorController),
    Physical(PhysicalDeviceController),
}

impl Controller {
    pub fn kind(&self) -> ControllerKind {
        match self {
            Controller::Platform(_) => ControllerKind::Platform,
            Controller::Emulator(_) => ControllerKind::Emulator,
            Controller::Physical(_) => ControllerKind::Physical,
        }
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Controller").field(&self.kind()).finish()
    }
}

impl DeviceController for Controller {
    fn set_device_mode(&self, mode: i32) -> Result<()> {
        match self {
            Controller::Platform(c) => c.set_device_mode(mode),
            Controller::Emulator(c) => c.set_device_mode(mode),
            Controller::Physical(c) => c.set_device_mode(mode),
        }
    }

    fn set_screen_orientation(&self, orientation: i32) -> Result<()> {
        match self {
            Controller::Platform(c) => c.set_screen_orientation(orientation),
            Controller::Emulator(c) => c.set_screen_orientation(orientation),
            Controller::Physical(c) => c.set_screen_orientation(orientation),
        }
    }
}
