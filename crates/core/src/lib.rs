//! devicectl Core - Shared logic for device control
//!
//! This crate provides:
//! - Domain types (device modes, orientations, control commands, channel messages)
//! - Protocol handling (Postcard serialization, length-prefixed frames)
//! - QUIC transport configuration
//! - Device control capability traits
//! - Error types

/// Address of the host loopback as seen from inside an emulator
pub const EMULATOR_HOST: &str = "10.0.2.2";

/// TLS server name used for the control channel
pub const CONTROL_SERVER_NAME: &str = "emulator-control";

pub mod controller;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod types;

// Re-export common types
pub use controller::{DeviceController, MockRemoteController, RemoteController};
pub use error::{ChannelError, ChannelResult, DeviceControlError, Result};
pub use protocol::MessageCodec;
pub use transport::ChannelOptions;
pub use types::{ControlCommand, ControlMessage, DeviceMode, Operation, ScreenOrientation, StatusCode};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_defined() {
        assert!(!CONTROL_SERVER_NAME.is_empty());
        assert_eq!(EMULATOR_HOST, "10.0.2.2");
    }
}
