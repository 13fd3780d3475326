//! Error types for devicectl-core
//!
//! Two layers:
//! - [`ChannelError`]: what went wrong on the control channel (framing, QUIC, remote status)
//! - [`DeviceControlError`]: the taxonomy surfaced to callers of a device controller
//!
//! Remote failures only become [`DeviceControlError::OperationFailed`] through
//! [`DeviceControlError::operation_failed`].

use thiserror::Error;

use crate::types::{Operation, StatusCode};

/// Control channel error
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Serialization failed: {0}")]
    Serialization(#[from] postcard::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid message format: {0}")]
    InvalidMessageFormat(String),

    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Channel closed: {0}")]
    Closed(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Remote call failed with {status}: {message}")]
    Remote { status: StatusCode, message: String },
}

/// Device control error taxonomy
#[derive(Debug, Error)]
pub enum DeviceControlError {
    /// A required connection parameter could not be resolved from any source
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The control channel could not be created
    #[error("Connection error: {0}")]
    Connection(String),

    /// Operation is not valid for the current backend or argument
    #[error("Unsupported device operation: {0}")]
    UnsupportedOperation(String),

    /// A remote call was attempted and failed
    #[error("Device controller operation {operation} failed: {source}")]
    OperationFailed {
        operation: Operation,
        #[source]
        source: ChannelError,
    },
}

impl DeviceControlError {
    /// Wrap a channel failure from an attempted remote call
    pub fn operation_failed(operation: Operation, cause: ChannelError) -> Self {
        tracing::debug!("Remote {} failed: {}", operation, cause);
        Self::OperationFailed {
            operation,
            source: cause,
        }
    }

    /// Name of the stage that failed, for user-facing messages
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Connection(_) => "connection",
            Self::UnsupportedOperation(_) => "validation",
            Self::OperationFailed { .. } => "remote call",
        }
    }

    /// Remote status code, if the failure came back from the control service
    pub fn remote_status(&self) -> Option<StatusCode> {
        match self {
            Self::OperationFailed {
                source: ChannelError::Remote { status, .. },
                ..
            } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, DeviceControlError>;

/// Result type alias for channel-level operations
pub type ChannelResult<T> = std::result::Result<T, ChannelError>;

impl From<quinn::ConnectError> for ChannelError {
    fn from(err: quinn::ConnectError) -> Self {
        ChannelError::Connection(err.to_string())
    }
}

impl From<quinn::ConnectionError> for ChannelError {
    fn from(err: quinn::ConnectionError) -> Self {
        ChannelError::Connection(err.to_string())
    }
}

impl From<quinn::WriteError> for ChannelError {
    fn from(err: quinn::WriteError) -> Self {
        ChannelError::Stream(err.to_string())
    }
}

impl From<quinn::ReadExactError> for ChannelError {
    fn from(err: quinn::ReadExactError) -> Self {
        match err {
            quinn::ReadExactError::FinishedEarly(read) => ChannelError::InvalidMessageFormat(
                format!("Stream finished after {} bytes", read),
            ),
            quinn::ReadExactError::ReadError(e) => ChannelError::Stream(e.to_string()),
        }
    }
}

impl From<quinn::ClosedStream> for ChannelError {
    fn from(err: quinn::ClosedStream) -> Self {
        ChannelError::Stream(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DeviceControlError::Configuration("gRPC port unavailable".into());
        assert_eq!(err.to_string(), "Configuration error: gRPC port unavailable");
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "test");
        let err: ChannelError = io_err.into();
        assert!(matches!(err, ChannelError::Io(_)));
    }

    #[test]
    fn test_operation_failed_keeps_cause() {
        use std::error::Error as _;

        let err = DeviceControlError::operation_failed(
            Operation::SetScreenOrientation,
            ChannelError::Connection("invalid remote address".into()),
        );
        assert_eq!(err.stage(), "remote call");
        assert!(err.to_string().contains("setScreenOrientation"));
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "Connection error: invalid remote address");
    }

    #[test]
    fn test_remote_status() {
        let err = DeviceControlError::operation_failed(
            Operation::SetDeviceMode,
            ChannelError::Remote {
                status: StatusCode::Unauthenticated,
                message: "bad token".into(),
            },
        );
        assert_eq!(err.remote_status(), Some(StatusCode::Unauthenticated));
        assert_eq!(
            DeviceControlError::UnsupportedOperation("x".into()).remote_status(),
            None
        );
    }

    #[test]
    fn test_stages() {
        assert_eq!(DeviceControlError::Configuration(String::new()).stage(), "configuration");
        assert_eq!(DeviceControlError::Connection(String::new()).stage(), "connection");
        assert_eq!(DeviceControlError::UnsupportedOperation(String::new()).stage(), "validation");
    }

    #[test]
    fn test_message_too_large_display() {
        let err = ChannelError::MessageTooLarge { size: 70000, max: 65536 };
        assert_eq!(err.to_string(), "Message too large: 70000 bytes (max: 65536)");
    }
}
