//! Agent side of the remote protocol.
//!
//! [`AgentClient`] connects to the engine's three channels and answers
//! every state message with a move. The bundled choice is the first legal
//! move, which is enough to drive a game end to end.

use crate::error::Channel;
use crate::games::ultimate::{Move, Owner};
use crate::protocol::{
    ActionMessage, AgentConnection, AgentEndpoints, BoxedStream, MAX_STATE_BYTES, MessageReader,
    MessageWriter, ReturnMessage, StateMessage,
};
use anyhow::{Context, Result};
use derive_getters::Getters;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Summary of one game from the agent's point of view.
#[derive(Debug, Clone, Default, Getters)]
pub struct ClientReport {
    /// Moves written to the action channel.
    moves_sent: usize,
    /// Moves the engine refused.
    rejected: usize,
    /// The last state seen, from either the state or the result channel.
    last_state: Option<StateMessage>,
}

/// Picks the first legal move of the board in `state`.
pub fn first_legal_move(state: &StateMessage) -> Option<Move> {
    state.board.moves().first().copied()
}

/// An agent connected to the engine.
pub struct AgentClient {
    seat: Owner,
    state: MessageReader<BoxedStream>,
    action: MessageWriter<BoxedStream>,
    result: MessageReader<BoxedStream>,
}

impl AgentClient {
    /// Wraps the agent side of a connection.
    pub fn new(seat: Owner, connection: AgentConnection) -> Self {
        Self {
            seat,
            state: MessageReader::new(Channel::State, connection.state, MAX_STATE_BYTES),
            action: MessageWriter::new(Channel::Action, connection.action),
            result: MessageReader::new(Channel::Result, connection.result, MAX_STATE_BYTES),
        }
    }

    /// Connects to `endpoints`, retrying while the engine is not yet
    /// listening.
    #[instrument(skip(endpoints))]
    pub async fn connect(
        seat: Owner,
        endpoints: &AgentEndpoints,
        attempts: u32,
        delay: Duration,
    ) -> Result<Self> {
        let mut attempt = 1;
        loop {
            match endpoints.connect().await {
                Ok(connection) => {
                    info!(attempt, "Connected to engine");
                    return Ok(Self::new(seat, connection));
                }
                Err(e) if attempt < attempts => {
                    debug!(attempt, error = %e, "Engine not ready, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(e)
                        .context(format!("Engine not reachable after {} attempts", attempt));
                }
            }
        }
    }

    /// Plays with [`first_legal_move`] until the game ends.
    pub async fn play(&mut self) -> Result<ClientReport> {
        self.play_with(first_legal_move).await
    }

    /// Plays until the game ends, asking `choose` for each move.
    ///
    /// Stops when a message reports `done`, when the engine closes the
    /// state channel, or when `choose` has no move.
    #[instrument(skip(self, choose), fields(seat = %self.seat))]
    pub async fn play_with<F>(&mut self, mut choose: F) -> Result<ClientReport>
    where
        F: FnMut(&StateMessage) -> Option<Move> + Send,
    {
        let mut report = ClientReport::default();

        loop {
            let Some(state) = self.state.recv::<StateMessage>().await? else {
                debug!("Engine closed the state channel");
                break;
            };

            let done = state.done;
            let choice = if done { None } else { choose(&state) };
            report.last_state = Some(state);

            let Some(mv) = choice else {
                if !done {
                    warn!("No move to offer, leaving the game");
                }
                break;
            };

            debug!(%mv, "Sending move");
            self.action.send(&ActionMessage::new(mv)).await?;
            report.moves_sent += 1;

            let Some(outcome) = self.result.recv::<ReturnMessage>().await? else {
                debug!("Engine closed the result channel");
                break;
            };
            if !outcome.valid {
                debug!(%mv, "Engine refused move");
                report.rejected += 1;
            }

            let done = outcome.state.done;
            report.last_state = Some(outcome.state);
            if done {
                break;
            }
        }

        info!(
            moves = report.moves_sent,
            rejected = report.rejected,
            "Agent finished"
        );
        Ok(report)
    }
}
