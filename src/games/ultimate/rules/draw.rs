//! Fullness detection for any 3x3 grid.

use super::super::Coordinate;
use super::Grid;
use tracing::instrument;

/// Checks if every entry of the grid has an owner.
///
/// Independent of [`super::line_owner`]: a full grid without a winning line
/// is a draw, and a won grid may still have empty entries.
#[instrument(level = "trace", skip(grid))]
pub fn is_full(grid: &impl Grid) -> bool {
    Coordinate::all().all(|at| grid.owner_at(at).is_claimed())
}
