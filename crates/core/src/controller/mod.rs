//! Device control capabilities

mod traits;

pub use traits::{DeviceController, MockRemoteController, RemoteController};
