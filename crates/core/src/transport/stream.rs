//! Framed message I/O on QUIC streams
//!
//! Protocol format: [4-byte big-endian length][N-byte postcard payload]

use quinn::{RecvStream, SendStream};

use crate::error::ChannelResult;
use crate::protocol::MessageCodec;
use crate::types::ControlMessage;

/// Write one framed message to a QUIC send stream
pub async fn write_message(send: &mut SendStream, msg: &ControlMessage) -> ChannelResult<()> {
    let encoded = MessageCodec::encode(msg)?;
    send.write_all(&encoded).await?;
    tracing::trace!("Wrote {} byte frame", encoded.len());
    Ok(())
}

/// Read one complete framed message from a QUIC receive stream
///
/// Blocks until the full message is received or the stream ends.
pub async fn read_message(recv: &mut RecvStream) -> ChannelResult<ControlMessage> {
    let mut len_buf = [0u8; 4];
    recv.read_exact(&mut len_buf).await?;

    // Validate size before allocating
    let len = MessageCodec::payload_len(len_buf)?;

    let mut payload = vec![0u8; len];
    recv.read_exact(&mut payload).await?;

    MessageCodec::decode_payload(&payload)
}
