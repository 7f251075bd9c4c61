//! Error types for the remote-agent channels.

use derive_more::{Display, Error};
use tracing::instrument;

/// One of the three byte streams shared with a remote agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Channel {
    /// Engine to agent: board state before the agent moves.
    State,
    /// Agent to engine: the chosen move.
    Action,
    /// Engine to agent: whether the move was accepted.
    Result,
}

/// What was being done on a channel when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ChannelOp {
    /// Binding the listener.
    Bind,
    /// Accepting the single peer.
    Accept,
    /// Connecting to the engine (agent side).
    Connect,
    /// Reading a message.
    Read,
    /// Writing a message.
    Write,
    /// Serializing a message.
    Encode,
    /// Deserializing a message.
    Decode,
    /// Closing the stream.
    Close,
}

/// A failure on a remote-agent channel, with the location that raised it.
#[derive(Debug, Clone, Display, Error)]
#[display("{} channel: {} failed: {} at {}:{}", channel, operation, message, file, line)]
pub struct ChannelError {
    /// Which channel failed.
    pub channel: Channel,
    /// What was being attempted.
    pub operation: ChannelOp,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ChannelError {
    /// Creates a new channel error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(channel: Channel, operation: ChannelOp, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            channel,
            operation,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Wraps an I/O error.
    #[track_caller]
    pub fn io(channel: Channel, operation: ChannelOp, err: std::io::Error) -> Self {
        Self::new(channel, operation, err.to_string())
    }
}
