//! Core domain types for ultimate tic-tac-toe.

use serde::{Deserialize, Serialize};

/// Which side (if any) controls a space, cell or board.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum Owner {
    /// Nobody controls it yet.
    #[default]
    None,
    /// The first player (moves first, renders as `X`).
    Player1,
    /// The second player (renders as `O`).
    Player2,
}

impl Owner {
    /// Returns true for `Player1` or `Player2`.
    pub fn is_claimed(self) -> bool {
        self != Owner::None
    }

    /// Returns the other side. `None` has no opponent.
    pub fn opponent(self) -> Self {
        match self {
            Owner::Player1 => Owner::Player2,
            Owner::Player2 => Owner::Player1,
            Owner::None => Owner::None,
        }
    }

    /// Single-character mark used in terminal rendering.
    pub fn mark(self) -> char {
        match self {
            Owner::Player1 => 'X',
            Owner::Player2 => 'O',
            Owner::None => '_',
        }
    }
}

/// One square inside a cell.
///
/// A space is claimed at most once; see [`Space::claim`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Space {
    owner: Owner,
}

impl Space {
    /// Creates an unclaimed space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the owner of this space.
    pub fn owner(&self) -> Owner {
        self.owner
    }

    /// Claims the space for `owner`.
    ///
    /// Returns false without changing anything if the space is already
    /// claimed or `owner` is [`Owner::None`].
    pub(crate) fn claim(&mut self, owner: Owner) -> bool {
        if self.owner.is_claimed() || !owner.is_claimed() {
            return false;
        }
        self.owner = owner;
        true
    }
}

/// Current status of a game, derived from the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Game is ongoing.
    InProgress,
    /// Game ended with a winning line of cells.
    Won(Owner),
    /// Every cell is owned or full and no line was completed.
    Draw,
}

impl GameStatus {
    /// Returns true once the game can no longer accept moves.
    pub fn is_finished(self) -> bool {
        self != GameStatus::InProgress
    }
}
