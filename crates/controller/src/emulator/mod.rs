//! Emulator control channel

mod connection;
mod verifier;

pub use connection::{EmulatorConnection, EmulatorControllerStub};
