//! Ultimate tic-tac-toe: a 3x3 board of 3x3 cells.

mod action;
mod board;
mod game;
mod position;
pub mod rules;
mod types;
mod validation;

pub use action::{Move, MoveError};
pub use board::{Board, BoardError, Cell};
pub use game::{Engine, GameOutcome, TurnOutcome};
pub use position::{Coordinate, GRID_CELLS, GRID_SIZE};
pub use types::{GameStatus, Owner, Space};
pub use validation::{check_move, validate_cell, validate_move, validate_move_cell};
