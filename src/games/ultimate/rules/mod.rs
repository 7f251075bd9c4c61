//! Game rules shared by cells and the board.
//!
//! A cell is a 3x3 grid of spaces and the board is a 3x3 grid of cells.
//! Both answer "who owns this?" and "is this full?" with the same
//! algorithm, written once over the [`Grid`] abstraction.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::line_owner;

use super::{Coordinate, Owner};

/// A 3x3 grid of things that each have an owner.
pub trait Grid {
    /// Owner of the entry at `at`.
    fn owner_at(&self, at: Coordinate) -> Owner;
}
