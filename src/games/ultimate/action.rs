//! Moves and the reasons a move can be refused.

use super::Coordinate;
use serde::{Deserialize, Serialize};

/// A move: which cell of the board, and which space inside that cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct Move {
    /// The target cell on the meta-board.
    pub large: Coordinate,
    /// The target space inside that cell.
    pub small: Coordinate,
}

impl Move {
    /// Builds a move from two linear indices (0-8).
    pub fn from_indices(large: usize, small: usize) -> Option<Self> {
        Some(Self {
            large: Coordinate::from_index(large)?,
            small: Coordinate::from_index(small)?,
        })
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cell {} space {}", self.large, self.small)
    }
}

/// Why a move was refused. Refusals are recoverable: the mover is told
/// and asked again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The target cell already has an owner or has no empty spaces.
    #[display("Cell {} is already decided", _0)]
    CellClosed(Coordinate),

    /// A different cell is forced.
    #[display("Cell {} was requested but cell {} is forced", requested, forced)]
    WrongCell {
        /// The cell the mover must play in.
        forced: Coordinate,
        /// The cell the mover asked for.
        requested: Coordinate,
    },

    /// The target space is already claimed.
    #[display("Space {} of cell {} is already taken", _1, _0)]
    SpaceTaken(Coordinate, Coordinate),
}

impl std::error::Error for MoveError {}
