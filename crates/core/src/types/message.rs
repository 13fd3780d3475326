//! Control channel messages

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ControlCommand;

/// Status reported by the control service when it rejects a command
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StatusCode {
    InvalidArgument,
    Unauthenticated,
    Unimplemented,
    Internal,
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::InvalidArgument => "INVALID_ARGUMENT",
            StatusCode::Unauthenticated => "UNAUTHENTICATED",
            StatusCode::Unimplemented => "UNIMPLEMENTED",
            StatusCode::Internal => "INTERNAL",
        };
        f.write_str(name)
    }
}

/// Message exchanged on a control stream
///
/// One stream carries exactly one `Request` followed by one response
/// (`Ack` or `Failure`).
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ControlMessage {
    /// Command from client, with the auth token as call metadata
    Request {
        auth_token: Option<String>,
        command: ControlCommand,
    },

    /// Command applied
    Ack { command_id: u64 },

    /// Command rejected or failed on the service side
    Failure {
        command_id: u64,
        status: StatusCode,
        message: String,
    },
}

impl ControlMessage {
    /// Build a request; an empty token is sent as no token
    pub fn request(command: ControlCommand, auth_token: &str) -> Self {
        let auth_token = if auth_token.is_empty() {
            None
        } else {
            Some(auth_token.to_string())
        };
        Self::Request {
            auth_token,
            command,
        }
    }

    pub fn ack(command_id: u64) -> Self {
        Self::Ack { command_id }
    }

    pub fn failure(command_id: u64, status: StatusCode, message: impl Into<String>) -> Self {
        Self::Failure {
            command_id,
            status,
            message: message.into(),
        }
    }
}

// Manual Debug so tokens never end up in logs
impl fmt::Debug for ControlMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlMessage::Request {
                auth_token,
                command,
            } => f
                .debug_struct("Request")
                .field("auth_token", &auth_token.as_ref().map(|_| "<redacted>"))
                .field("command", command)
                .finish(),
            ControlMessage::Ack { command_id } => {
                f.debug_struct("Ack").field("command_id", command_id).finish()
            }
            ControlMessage::Failure {
                command_id,
                status,
                message,
            } => f
                .debug_struct("Failure")
                .field("command_id", command_id)
                .field("status", status)
                .field("message", message)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_empty_token_is_none() {
        let msg = ControlMessage::request(ControlCommand::set_device_mode(0), "");
        match msg {
            ControlMessage::Request { auth_token, .. } => assert!(auth_token.is_none()),
            _ => panic!("Expected Request"),
        }
    }

    #[test]
    fn test_request_keeps_token() {
        let msg = ControlMessage::request(ControlCommand::set_device_mode(0), "tok");
        match msg {
            ControlMessage::Request { auth_token, .. } => {
                assert_eq!(auth_token.as_deref(), Some("tok"))
            }
            _ => panic!("Expected Request"),
        }
    }

    #[test]
    fn test_debug_redacts_token() {
        let msg = ControlMessage::request(ControlCommand::set_device_mode(1), "secret-token");
        let debug = format!("{:?}", msg);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(StatusCode::Unauthenticated.to_string(), "UNAUTHENTICATED");
        assert_eq!(StatusCode::InvalidArgument.to_string(), "INVALID_ARGUMENT");
    }

    #[test]
    fn test_message_serialization() {
        let msg = ControlMessage::failure(7, StatusCode::Internal, "boom");
        let serialized = postcard::to_allocvec(&msg).unwrap();
        let deserialized: ControlMessage = postcard::from_bytes(&serialized).unwrap();
        assert_eq!(msg, deserialized);
    }
}
