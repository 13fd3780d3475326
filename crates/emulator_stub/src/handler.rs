//! Control command handlers
//!
//! The server decodes requests and hands the integer argument to a
//! [`ControlHandler`]. [`RecordingHandler`] behaves like the emulator's
//! controller service: it accepts known values and remembers what it applied.

use async_trait::async_trait;
use devicectl_core::{DeviceMode, ScreenOrientation, StatusCode};
use tokio::sync::RwLock;

/// Rejection returned by a handler
pub type Rejection = (StatusCode, String);

/// Service-side implementation of the control methods
#[async_trait]
pub trait ControlHandler: Send + Sync {
    /// Apply a device mode change
    async fn change_device_mode(&self, mode: i32) -> Result<(), Rejection>;

    /// Apply a screen orientation change
    async fn change_screen_orientation(&self, orientation: i32) -> Result<(), Rejection>;
}

/// State applied so far by a [`RecordingHandler`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceState {
    pub device_mode: Option<DeviceMode>,
    pub orientation: Option<ScreenOrientation>,
    /// Commands applied successfully
    pub applied: usize,
    /// Commands rejected
    pub rejected: usize,
}

/// Handler that validates and records applied state
#[derive(Default)]
pub struct RecordingHandler {
    state: RwLock<DeviceState>,
}

impl RecordingHandler {
    /// Create new handler with empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the applied state
    pub async fn state(&self) -> DeviceState {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl ControlHandler for RecordingHandler {
    async fn change_device_mode(&self, mode: i32) -> Result<(), Rejection> {
        let mut state = self.state.write().await;
        match DeviceMode::try_from(mode) {
            Ok(mode) => {
                tracing::info!("Device mode -> {}", mode);
                state.device_mode = Some(mode);
                state.applied += 1;
                Ok(())
            }
            Err(value) => {
                state.rejected += 1;
                Err((
                    StatusCode::InvalidArgument,
                    format!("unknown device mode {}", value),
                ))
            }
        }
    }

    async fn change_screen_orientation(&self, orientation: i32) -> Result<(), Rejection> {
        let mut state = self.state.write().await;
        match ScreenOrientation::try_from(orientation) {
            Ok(orientation) => {
                tracing::info!("Screen orientation -> {}", orientation);
                state.orientation = Some(orientation);
                state.applied += 1;
                Ok(())
            }
            Err(value) => {
                state.rejected += 1;
                Err((
                    StatusCode::InvalidArgument,
                    format!("unknown screen orientation {}", value),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_device_mode() {
        let handler = RecordingHandler::new();
        handler.change_device_mode(3).await.unwrap();

        let state = handler.state().await;
        assert_eq!(state.device_mode, Some(DeviceMode::Closed));
        assert_eq!(state.applied, 1);
    }

    #[tokio::test]
    async fn test_rejects_unknown_mode() {
        let handler = RecordingHandler::new();
        let result = handler.change_device_mode(-1).await;
        assert!(matches!(result, Err((StatusCode::InvalidArgument, _))));

        let state = handler.state().await;
        assert_eq!(state.device_mode, None);
        assert_eq!(state.rejected, 1);
    }

    #[tokio::test]
    async fn test_records_orientation() {
        let handler = RecordingHandler::new();
        handler.change_screen_orientation(1).await.unwrap();
        handler.change_screen_orientation(0).await.unwrap();

        let state = handler.state().await;
        assert_eq!(state.orientation, Some(ScreenOrientation::Portrait));
        assert_eq!(state.applied, 2);
    }

    #[tokio::test]
    async fn test_rejects_unknown_orientation() {
        let handler = RecordingHandler::new();
        assert!(handler.change_screen_orientation(7).await.is_err());
    }
}
