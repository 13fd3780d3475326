//! Process-wide device control handle

use std::sync::Arc;

use devicectl_core::{DeviceController, DeviceMode, Result, ScreenOrientation};

use crate::backends::{Controller, ControllerKind};
use crate::resolver::ControllerResolver;

/// Resolved controller shared by everything in a test run
///
/// Resolution happens once; clones share the same controller.
#[derive(Debug, Clone)]
pub struct DeviceContext {
    controller: Arc<Controller>,
}

impl DeviceContext {
    /// Resolve the controller for this environment
    pub fn resolve(resolver: &ControllerResolver) -> Result<Self> {
        Ok(Self::new(resolver.resolve_controller()?))
    }

    pub fn new(controller: Controller) -> Self {
        Self {
            controller: Arc::new(controller),
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn kind(&self) -> ControllerKind {
        self.controller.kind()
    }

    pub fn set_device_mode(&self, mode: DeviceMode) -> Result<()> {
        self.controller.set_device_mode(mode.as_i32())
    }

    pub fn set_screen_orientation(&self, orientation: ScreenOrientation) -> Result<()> {
        self.controller.set_screen_orientation(orientation.as_i32())
    }
}
