//! devicectl Controller - device control for instrumentation runs
//!
//! Resolves one [`Controller`] per process:
//! - a host-supplied controller, when a registered provider has one
//! - the emulator backend, talking QUIC to the emulator's control service
//! - the physical-device backend, which supports nothing
//!
//! ```no_run
//! use devicectl_controller::{
//!     ControllerRegistry, ControllerResolver, DeviceContext, InstrumentationArgs,
//!     PropertyEmulatorProbe, SystemProperties,
//! };
//! use devicectl_core::DeviceMode;
//!
//! let resolver = ControllerResolver::new(
//!     ControllerRegistry::new(),
//!     PropertyEmulatorProbe::new(SystemProperties::new()),
//!     InstrumentationArgs::new().with("grpc.port", "8554"),
//!     SystemProperties::new(),
//! );
//! let context = DeviceContext::resolve(&resolver)?;
//! context.set_device_mode(DeviceMode::Book)?;
//! # Ok::<(), devicectl_core::DeviceControlError>(())
//! ```

pub mod backends;
pub mod config;
pub mod context;
pub mod discovery;
pub mod emulator;
pub mod properties;
pub mod resolver;

pub use backends::{
    Controller, ControllerKind, EmulatorController, PhysicalDeviceController,
    PlatformAdapterController,
};
pub use config::{ArgumentSource, ConfigurationResolver, ConnectionParameters, InstrumentationArgs};
pub use context::DeviceContext;
pub use discovery::{ControllerProvider, ControllerRegistry, FnProvider, StaticProvider};
pub use emulator::{EmulatorConnection, EmulatorControllerStub};
pub use properties::{
    EmulatorProbe, FixedProbe, PropertyEmulatorProbe, PropertySource, StaticProperties,
    SystemProperties,
};
pub use resolver::ControllerResolver;
