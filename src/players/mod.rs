//! Player trait and implementations.

mod agent;
mod terminal;

pub use agent::RemoteAgent;
pub use terminal::{SharedInput, TerminalPlayer};

use crate::games::ultimate::{Board, Move, Owner};
use anyhow::Result;

/// What a player answered when asked for a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRequest {
    /// Candidate move, still subject to validation.
    Play(Move),
    /// The player abandons the game.
    Quit,
}

/// Anything that can sit at the board and make moves.
///
/// The engine calls `present_state`, then `request_move`, then
/// `report_outcome` once per ply, always on the player whose turn it is.
#[async_trait::async_trait]
pub trait Player: Send {
    /// Tells the player the current board and whose turn it is.
    async fn present_state(&mut self, board: &Board, mover: Owner) -> Result<()>;

    /// Asks the player for a move.
    async fn request_move(&mut self) -> Result<MoveRequest>;

    /// Tells the player whether the last requested move was accepted.
    async fn report_outcome(&mut self, board: &Board, valid: bool) -> Result<()>;

    /// Returns the player's display name.
    fn name(&self) -> &str;

    /// True for players driven by a person at this terminal.
    fn is_local(&self) -> bool {
        false
    }
}
