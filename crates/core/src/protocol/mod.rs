//! Wire protocol for the control channel

mod codec;

pub use codec::{MessageCodec, MAX_MESSAGE_SIZE};
