//! Remote agent player speaking the state/action/result protocol.

use super::{MoveRequest, Player};
use crate::error::{Channel, ChannelError, ChannelOp};
use crate::games::ultimate::{Board, Owner};
use crate::protocol::{
    ActionMessage, AgentConnection, BoxedStream, MessageReader, MessageWriter, ReturnMessage,
    StateMessage,
};
use anyhow::Result;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// A player whose moves come from an external process.
///
/// Owns the agent's three channels for the length of one game. The agent
/// never quits; a closed or garbled action channel is an error.
pub struct RemoteAgent {
    name: String,
    seat: Owner,
    state: MessageWriter<BoxedStream>,
    action: MessageReader<BoxedStream>,
    result: MessageWriter<BoxedStream>,
}

impl RemoteAgent {
    /// Creates an agent player on an accepted connection.
    pub fn new(
        name: impl Into<String>,
        seat: Owner,
        connection: AgentConnection,
        max_action_bytes: usize,
    ) -> Self {
        let name = name.into();
        info!(agent = %name, %seat, "Creating remote agent player");

        Self {
            name,
            seat,
            state: MessageWriter::new(Channel::State, connection.state),
            action: MessageReader::new(Channel::Action, connection.action, max_action_bytes),
            result: MessageWriter::new(Channel::Result, connection.result),
        }
    }

    /// The side this agent plays.
    pub fn seat(&self) -> Owner {
        self.seat
    }

    /// Waits `grace` for final writes to drain, then closes every channel.
    #[instrument(skip(self), fields(agent = %self.name))]
    pub async fn shutdown(mut self, grace: Duration) {
        tokio::time::sleep(grace).await;

        for writer in [&mut self.state, &mut self.result] {
            if let Err(e) = writer.close().await {
                warn!(error = %e, "Failed to close channel");
            }
        }
        debug!("Agent channels closed");
    }
}

#[async_trait::async_trait]
impl Player for RemoteAgent {
    #[instrument(skip(self, board), fields(agent = %self.name))]
    async fn present_state(&mut self, board: &Board, mover: Owner) -> Result<()> {
        self.state.send(&StateMessage::new(board, mover)).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(agent = %self.name))]
    async fn request_move(&mut self) -> Result<MoveRequest> {
        debug!("Waiting for agent action");
        let message: ActionMessage = self.action.recv().await?.ok_or_else(|| {
            ChannelError::new(Channel::Action, ChannelOp::Read, "agent closed the channel")
        })?;

        debug!(mv = %message.mv, "Received move from agent");
        Ok(MoveRequest::Play(message.mv))
    }

    #[instrument(skip(self, board), fields(agent = %self.name))]
    async fn report_outcome(&mut self, board: &Board, valid: bool) -> Result<()> {
        let message = ReturnMessage::new(StateMessage::new(board, self.seat), valid);
        self.result.send(&message).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
