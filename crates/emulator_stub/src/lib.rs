//! Stub emulator control service
//!
//! Speaks the devicectl control channel protocol so device controllers can be
//! exercised without a running emulator.

pub mod handler;
pub mod server;

pub use handler::{ControlHandler, DeviceState, Rejection, RecordingHandler};
pub use server::StubServer;
