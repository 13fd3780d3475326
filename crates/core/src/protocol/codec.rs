//! Postcard serialization codec for control messages

use crate::error::{ChannelError, ChannelResult};
use crate::types::ControlMessage;
use postcard::{from_bytes, to_allocvec};

/// Maximum payload size (64KB); control messages are tiny
pub const MAX_MESSAGE_SIZE: usize = 64 * 1024;

/// Message codec for serialization/deserialization
pub struct MessageCodec;

impl MessageCodec {
    /// Encode control message to bytes
    ///
    /// Returns Vec<u8> with length-prefixed format:
    /// [4 bytes length (big endian)] [message payload]
    pub fn encode(msg: &ControlMessage) -> ChannelResult<Vec<u8>> {
        let payload = to_allocvec(msg)?;

        if payload.len() > MAX_MESSAGE_SIZE {
            return Err(ChannelError::MessageTooLarge {
                size: payload.len(),
                max: MAX_MESSAGE_SIZE,
            });
        }

        let len = payload.len() as u32;
        let mut buf = Vec::with_capacity(4 + payload.len());
        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(&payload);

        Ok(buf)
    }

    /// Read and validate the payload length from a 4-byte prefix
    pub fn payload_len(prefix: [u8; 4]) -> ChannelResult<usize> {
        let len = u32::from_be_bytes(prefix) as usize;
        if len > MAX_MESSAGE_SIZE {
            return Err(ChannelError::MessageTooLarge {
                size: len,
                max: MAX_MESSAGE_SIZE,
            });
        }
        Ok(len)
    }

    /// Decode control message from bytes
    ///
    /// Expects length-prefixed format
    pub fn decode(buf: &[u8]) -> ChannelResult<ControlMessage> {
        if buf.len() < 4 {
            return Err(ChannelError::InvalidMessageFormat(
                "Buffer too small for length prefix".into(),
            ));
        }

        let len = Self::payload_len([buf[0], buf[1], buf[2], buf[3]])?;

        if buf.len() < 4 + len {
            return Err(ChannelError::InvalidMessageFormat(
                "Buffer too small for payload".into(),
            ));
        }

        Self::decode_payload(&buf[4..4 + len])
    }

    /// Decode a payload whose length prefix was already consumed
    pub fn decode_payload(payload: &[u8]) -> ChannelResult<ControlMessage> {
        Ok(from_bytes(payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ControlCommand, StatusCode};

    #[test]
    fn test_request_message() {
        let msg = ControlMessage::request(ControlCommand::set_device_mode(3), "tok");
        let encoded = MessageCodec::encode(&msg).unwrap();
        let decoded = MessageCodec::decode(&encoded).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_length_prefix() {
        let encoded = MessageCodec::encode(&ControlMessage::ack(42)).unwrap();
        let len = MessageCodec::payload_len([encoded[0], encoded[1], encoded[2], encoded[3]])
            .unwrap();
        assert_eq!(len + 4, encoded.len());
        assert_eq!(
            MessageCodec::decode_payload(&encoded[4..]).unwrap(),
            ControlMessage::ack(42)
        );
    }

    #[test]
    fn test_oversized_prefix_rejected() {
        let prefix = ((MAX_MESSAGE_SIZE + 1) as u32).to_be_bytes();
        let result = MessageCodec::payload_len(prefix);
        assert!(matches!(result, Err(ChannelError::MessageTooLarge { .. })));
    }

    #[test]
    fn test_oversized_message_rejected() {
        let msg = ControlMessage::failure(1, StatusCode::Internal, "x".repeat(MAX_MESSAGE_SIZE));
        let result = MessageCodec::encode(&msg);
        assert!(matches!(result, Err(ChannelError::MessageTooLarge { .. })));
    }

    #[test]
    fn test_truncated_payload() {
        let encoded = MessageCodec::encode(&ControlMessage::ack(1)).unwrap();
        let result = MessageCodec::decode(&encoded[..encoded.len() - 1]);
        assert!(matches!(result, Err(ChannelError::InvalidMessageFormat(_))));
    }

    #[test]
    fn test_invalid_buffer() {
        let result = MessageCodec::decode(&[1, 2, 3]);
        assert!(result.is_err());
    }
}
