//! Backend selection
//!
//! Resolution order, first match wins:
//! 1. a host-supplied controller from the [`ControllerRegistry`]
//! 2. the emulator control channel, when the probe reports an emulator
//! 3. the physical-device controller

use std::sync::Arc;

use devicectl_core::{ChannelOptions, Result};

use crate::backends::{
    Controller, ControllerKind, EmulatorController, PhysicalDeviceController,
    PlatformAdapterController,
};
use crate::config::{ArgumentSource, ConfigurationResolver};
use crate::discovery::ControllerRegistry;
use crate::emulator::EmulatorConnection;
use crate::properties::{EmulatorProbe, PropertySource};

/// Picks the device controller for this process
pub struct ControllerResolver {
    registry: ControllerRegistry,
    probe: Box<dyn EmulatorProbe>,
    args: Box<dyn ArgumentSource>,
    properties: Box<dyn PropertySource>,
    channel_options: ChannelOptions,
}

impl ControllerResolver {
    pub fn new(
        registry: ControllerRegistry,
        probe: impl EmulatorProbe + 'static,
        args: impl ArgumentSource + 'static,
        properties: impl PropertySource + 'static,
    ) -> Self {
        Self {
            registry,
            probe: Box::new(probe),
            args: Box::new(args),
            properties: Box::new(properties),
            channel_options: ChannelOptions::default(),
        }
    }

    /// Options for the emulator channel, if one gets opened
    pub fn with_channel_options(mut self, options: ChannelOptions) -> Self {
        self.channel_options = options;
        self
    }

    /// Construct the backend for this environment
    ///
    /// Only fails when the emulator backend is chosen and its configuration
    /// or channel cannot be built.
    pub fn resolve_controller(&self) -> Result<Controller> {
        if let Some(delegate) = self.registry.discover() {
            tracing::info!("Using {} device controller", ControllerKind::Platform);
            return Ok(Controller::Platform(PlatformAdapterController::new(delegate)));
        }

        if self.probe.is_emulator() {
            let params =
                ConfigurationResolver::new(self.args.as_ref(), self.properties.as_ref()).resolve()?;
            let channel = Arc::new(EmulatorConnection::open_with(&params, self.channel_options)?);

            tracing::info!(
                "Using {} device controller via {}",
                ControllerKind::Emulator,
                channel.remote_addr()
            );
            return Ok(Controller::Emulator(EmulatorController::new(Arc::new(
                channel.controller_stub(),
            ))));
        }

        tracing::info!("Using {} device controller", ControllerKind::Physical);
        Ok(Controller::Physical(PhysicalDeviceController))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InstrumentationArgs, ARGS_GRPC_PORT, PROPERTY_GRPC_PORT};
    use crate::discovery::StaticProvider;
    use crate::properties::{FixedProbe, StaticProperties};
    use devicectl_core::{DeviceControlError, DeviceController};

    fn host_registry() -> ControllerRegistry {
        ControllerRegistry::new().with_provider(StaticProvider::new(
            "host",
            Arc::new(PhysicalDeviceController),
        ))
    }

    #[test]
    fn test_host_controller_takes_precedence() {
        for is_emulator in [true, false] {
            let resolver = ControllerResolver::new(
                host_registry(),
                FixedProbe(is_emulator),
                InstrumentationArgs::new(),
                StaticProperties::new(),
            );
            let controller = resolver.resolve_controller().unwrap();
            assert_eq!(controller.kind(), ControllerKind::Platform);
        }
    }

    #[test]
    fn test_emulator_with_port_argument() {
        let resolver = ControllerResolver::new(
            ControllerRegistry::new(),
            FixedProbe(true),
            InstrumentationArgs::new().with(ARGS_GRPC_PORT, "8554"),
            StaticProperties::new(),
        );
        assert_eq!(
            resolver.resolve_controller().unwrap().kind(),
            ControllerKind::Emulator
        );
    }

    #[test]
    fn test_emulator_with_property_port() {
        let resolver = ControllerResolver::new(
            ControllerRegistry::new(),
            FixedProbe(true),
            InstrumentationArgs::new(),
            StaticProperties::new().with(PROPERTY_GRPC_PORT, "8555"),
        );
        assert_eq!(
            resolver.resolve_controller().unwrap().kind(),
            ControllerKind::Emulator
        );
    }

    #[test]
    fn test_emulator_without_port_fails() {
        let resolver = ControllerResolver::new(
            ControllerRegistry::new(),
            FixedProbe(true),
            InstrumentationArgs::new(),
            StaticProperties::new(),
        );
        assert!(matches!(
            resolver.resolve_controller(),
            Err(DeviceControlError::Configuration(_))
        ));
    }

    #[test]
    fn test_physical_device() {
        let resolver = ControllerResolver::new(
            ControllerRegistry::new(),
            FixedProbe(false),
            InstrumentationArgs::new().with(ARGS_GRPC_PORT, "8554"),
            StaticProperties::new(),
        );
        let controller = resolver.resolve_controller().unwrap();
        assert_eq!(controller.kind(), ControllerKind::Physical);
        assert!(matches!(
            controller.set_screen_orientation(0),
            Err(DeviceControlError::UnsupportedOperation(_))
        ));
    }
}
