//! Line detection for any 3x3 grid.

use super::super::{Coordinate, Owner};
use super::Grid;
use tracing::instrument;

/// Every winning line as `(row, col)` triples, in evaluation order:
/// rows, then columns, then the left diagonal, then the right diagonal.
const LINES: [[(i32, i32); 3]; 8] = [
    // Rows
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    // Columns
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    // Diagonals
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// Returns the owner of the first fully-owned line, or [`Owner::None`].
///
/// With sound play at most one line can ever be complete. A grid built by
/// hand with two complete lines of different owners is undefined input;
/// the first match in the order above wins.
#[instrument(level = "trace", skip(grid))]
pub fn line_owner(grid: &impl Grid) -> Owner {
    for line in LINES {
        let [a, b, c] = line.map(|(row, col)| {
            Coordinate::new(row, col)
                .map(|at| grid.owner_at(at))
                .unwrap_or_default()
        });
        if a.is_claimed() && a == b && b == c {
            return a;
        }
    }

    Owner::None
}
