//! Validated coordinates into a 3x3 grid.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Side length of every grid in the game.
pub const GRID_SIZE: usize = 3;

/// Number of entries in a grid.
pub const GRID_CELLS: usize = GRID_SIZE * GRID_SIZE;

/// A `(row, col)` pair into a 3x3 grid.
///
/// Instances are always in bounds: the only constructors validate, and
/// deserialization goes through the same check. "No coordinate" (for
/// example "no forced cell") is expressed as `Option<Coordinate>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate", into = "RawCoordinate")]
pub struct Coordinate {
    row: u8,
    col: u8,
}

impl Coordinate {
    /// The center of a grid, where the first move is forced.
    pub const CENTER: Coordinate = Coordinate { row: 1, col: 1 };

    /// Creates a coordinate, or `None` if either component is out of range.
    pub fn new(row: i32, col: i32) -> Option<Self> {
        if Self::is_valid_pair(row, col) {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Bounds test for raw integers.
    pub fn is_valid_pair(row: i32, col: i32) -> bool {
        (0..GRID_SIZE as i32).contains(&row) && (0..GRID_SIZE as i32).contains(&col)
    }

    /// Creates a coordinate from a linear index (0-8), row-major.
    #[instrument(level = "trace")]
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= GRID_CELLS {
            return None;
        }
        Some(Self {
            row: (index / GRID_SIZE) as u8,
            col: (index % GRID_SIZE) as u8,
        })
    }

    /// Row, 0-2.
    pub fn row(self) -> usize {
        self.row as usize
    }

    /// Column, 0-2.
    pub fn col(self) -> usize {
        self.col as usize
    }

    /// Linear index `col + row * 3`.
    pub fn index(self) -> usize {
        self.col() + self.row() * GRID_SIZE
    }

    /// All nine coordinates in ascending index order.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..GRID_CELLS).filter_map(Coordinate::from_index)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Wire shape of a coordinate. Components are signed so that out-of-range
/// values from a peer decode far enough to be rejected with a clear error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawCoordinate {
    row: i32,
    col: i32,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = String;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.row, raw.col)
            .ok_or_else(|| format!("coordinate ({}, {}) is outside the 3x3 grid", raw.row, raw.col))
    }
}

impl From<Coordinate> for RawCoordinate {
    fn from(c: Coordinate) -> Self {
        Self {
            row: c.row as i32,
            col: c.col as i32,
        }
    }
}
