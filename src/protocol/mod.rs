//! Remote-agent protocol: messages, framing, and transports.
//!
//! An agent talks to the engine over three one-way channels:
//! the engine writes [`StateMessage`]s on the state channel, reads
//! [`ActionMessage`]s from the action channel, and writes
//! [`ReturnMessage`]s on the result channel.

mod messages;
mod transport;
mod wire;

pub use messages::{ActionMessage, ReturnMessage, StateMessage};
pub use transport::{
    AgentConnection, AgentEndpoints, BoxedStream, ByteStream, ChannelListeners, Endpoint, Listener,
};
pub use wire::{MAX_ACTION_BYTES, MAX_STATE_BYTES, MessageReader, MessageWriter};
