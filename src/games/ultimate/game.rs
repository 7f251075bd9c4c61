//! Turn engine for ultimate tic-tac-toe.
//!
//! One ply: show the mover the board, ask for a move, validate it, apply
//! it, move the forced-cell pointer, and hand the turn over. Rejected moves
//! keep the same mover. The loop stops once the board is decided or the
//! mover quits.

use super::{Board, GameStatus, Move, Owner, check_move, validate_cell};
use crate::players::{MoveRequest, Player};
use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

/// Result of a single ply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The move was legal and is now on the board.
    Applied(Move),
    /// The move was illegal; the same side moves again.
    Rejected(Move),
    /// The mover abandoned the game.
    Quit,
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    /// A line of cells was completed.
    Won(Owner),
    /// No line was completed and no moves remain.
    Draw,
    /// A player quit before the game was decided.
    Quit {
        /// The side that quit.
        mover: Owner,
    },
}

impl GameOutcome {
    /// The winning side, or [`Owner::None`] on a draw or quit.
    pub fn winner(self) -> Owner {
        match self {
            GameOutcome::Won(owner) => owner,
            GameOutcome::Draw | GameOutcome::Quit { .. } => Owner::None,
        }
    }
}

impl std::fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameOutcome::Won(owner) => write!(f, "{} won", owner),
            GameOutcome::Draw => write!(f, "draw"),
            GameOutcome::Quit { mover } => write!(f, "game abandoned by {}", mover),
        }
    }
}

/// Drives a single game between two players.
#[derive(Debug, Clone)]
pub struct Engine {
    board: Board,
    player1_to_move: bool,
    history: Vec<(Owner, Move)>,
}

impl Engine {
    /// Creates a fresh game with `Player1` to move.
    #[instrument]
    pub fn new() -> Self {
        Self::from_board(Board::new())
    }

    /// Starts from an existing position, `Player1` to move.
    pub fn from_board(board: Board) -> Self {
        Self {
            board,
            player1_to_move: true,
            history: Vec::new(),
        }
    }

    /// The current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The side whose turn it is.
    pub fn mover(&self) -> Owner {
        if self.player1_to_move {
            Owner::Player1
        } else {
            Owner::Player2
        }
    }

    /// Every applied move, oldest first.
    pub fn history(&self) -> &[(Owner, Move)] {
        &self.history
    }

    /// Derived status of the game.
    pub fn status(&self) -> GameStatus {
        self.board.status()
    }

    /// Validates and applies `mv` for the current mover.
    ///
    /// Returns whether the move was accepted. Rejected moves change nothing.
    #[instrument(skip(self), fields(mover = %self.mover()))]
    pub fn apply(&mut self, mv: Move) -> bool {
        if let Err(reason) = check_move(&self.board, mv) {
            debug!(%reason, "Move rejected");
            return false;
        }

        let mover = self.mover();
        if let Err(e) = self.board.place(mv, mover) {
            // check_move already saw this space empty
            warn!(error = %e, "Validated move could not be placed");
            return false;
        }

        let next = validate_cell(&self.board, mv.small).then_some(mv.small);
        self.board.set_cur_cell(next);
        self.history.push((mover, mv));
        self.player1_to_move = !self.player1_to_move;

        debug!(%mv, cur_cell = ?next, "Move applied");
        true
    }

    /// Runs one ply against whichever of the two players is to move.
    #[instrument(skip_all, fields(mover = %self.mover()))]
    pub async fn play_turn(
        &mut self,
        player1: &mut dyn Player,
        player2: &mut dyn Player,
    ) -> Result<TurnOutcome> {
        let mover = self.mover();
        let player: &mut dyn Player = if self.player1_to_move {
            player1
        } else {
            player2
        };

        player
            .present_state(&self.board, mover)
            .await
            .with_context(|| format!("Failed to present state to {}", player.name()))?;

        let mv = match player
            .request_move()
            .await
            .with_context(|| format!("Failed to get a move from {}", player.name()))?
        {
            MoveRequest::Play(mv) => mv,
            MoveRequest::Quit => {
                info!(player = %player.name(), "Player quit");
                return Ok(TurnOutcome::Quit);
            }
        };

        let valid = self.apply(mv);
        player
            .report_outcome(&self.board, valid)
            .await
            .with_context(|| format!("Failed to report move outcome to {}", player.name()))?;

        Ok(if valid {
            TurnOutcome::Applied(mv)
        } else {
            TurnOutcome::Rejected(mv)
        })
    }

    /// Plays until the board is decided or a player quits.
    #[instrument(skip_all, fields(player1 = %player1.name(), player2 = %player2.name()))]
    pub async fn run(
        &mut self,
        player1: &mut dyn Player,
        player2: &mut dyn Player,
    ) -> Result<GameOutcome> {
        info!("Starting game");

        loop {
            match self.status() {
                GameStatus::Won(winner) => {
                    info!(%winner, plies = self.history.len(), "Game won");
                    return Ok(GameOutcome::Won(winner));
                }
                GameStatus::Draw => {
                    info!(plies = self.history.len(), "Game drawn");
                    return Ok(GameOutcome::Draw);
                }
                GameStatus::InProgress => {}
            }

            let mover = self.mover();
            if self.play_turn(player1, player2).await? == TurnOutcome::Quit {
                return Ok(GameOutcome::Quit { mover });
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
