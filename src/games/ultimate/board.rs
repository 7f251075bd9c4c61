//! Cells and the meta-board.

use super::rules::{self, Grid};
use super::{Coordinate, GRID_CELLS, GRID_SIZE, GameStatus, Move, Owner, Space};
use crossterm::style::Stylize;
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

/// Errors from writing to the board directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BoardError {
    /// The target space already has an owner.
    #[display("Space {} of cell {} is already claimed", _0.small, _0.large)]
    SpaceTaken(#[error(not(source))] Move),

    /// Only `Player1` or `Player2` can claim a space.
    #[display("A space cannot be claimed by nobody")]
    NoClaimant,
}

/// One 3x3 sub-board.
///
/// Owner and fullness are always recomputed from the spaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    spaces: [Space; GRID_CELLS],
}

impl Cell {
    /// Creates a cell with every space unclaimed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the space at `at`.
    pub fn get(&self, at: Coordinate) -> &Space {
        &self.spaces[at.index()]
    }

    /// Owner of the first complete line of spaces, or [`Owner::None`].
    pub fn owner(&self) -> Owner {
        rules::line_owner(self)
    }

    /// True when all nine spaces are claimed.
    pub fn is_full(&self) -> bool {
        rules::is_full(self)
    }

    /// Unclaimed spaces in ascending index order.
    pub fn empty_spaces(&self) -> impl Iterator<Item = Coordinate> + '_ {
        Coordinate::all().filter(|at| !self.get(*at).owner().is_claimed())
    }

    fn claim(&mut self, at: Coordinate, owner: Owner) -> bool {
        self.spaces[at.index()].claim(owner)
    }
}

impl Grid for Cell {
    fn owner_at(&self, at: Coordinate) -> Owner {
        self.get(at).owner()
    }
}

/// The meta-board: nine cells plus the cell the next mover is forced into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; GRID_CELLS],
    /// `None` means the next mover may pick any open cell.
    cur_cell: Option<Coordinate>,
}

impl Board {
    /// Creates an empty board with the center cell forced.
    #[instrument]
    pub fn new() -> Self {
        Self {
            cells: Default::default(),
            cur_cell: Some(Coordinate::CENTER),
        }
    }

    /// Returns the cell at `at`.
    pub fn get(&self, at: Coordinate) -> &Cell {
        &self.cells[at.index()]
    }

    /// All cells in ascending index order.
    pub fn cells(&self) -> &[Cell; GRID_CELLS] {
        &self.cells
    }

    /// The cell the next mover must play in, if any.
    pub fn cur_cell(&self) -> Option<Coordinate> {
        self.cur_cell
    }

    /// Sets the forced cell. The engine does this after each move; it is
    /// public for setting up positions.
    pub fn set_cur_cell(&mut self, cur_cell: Option<Coordinate>) {
        self.cur_cell = cur_cell;
    }

    /// Owner of the first complete line of cells, or [`Owner::None`].
    pub fn owner(&self) -> Owner {
        rules::line_owner(self)
    }

    /// True when every cell has an owner.
    ///
    /// A cell that is full without an owner counts as unowned here, which
    /// matches how cell owners feed the line check.
    pub fn is_full(&self) -> bool {
        rules::is_full(self)
    }

    /// The owner of each cell, in ascending index order.
    pub fn cell_owners(&self) -> [Owner; GRID_CELLS] {
        std::array::from_fn(|i| self.cells[i].owner())
    }

    /// Derived game status.
    pub fn status(&self) -> GameStatus {
        match self.owner() {
            Owner::None if self.is_full() || self.moves().is_empty() => GameStatus::Draw,
            Owner::None => GameStatus::InProgress,
            winner => GameStatus::Won(winner),
        }
    }

    /// Every legal move, ordered by cell index then space index.
    ///
    /// Empty once the board has an owner or is full.
    #[instrument(level = "trace", skip(self), fields(cur_cell = ?self.cur_cell))]
    pub fn moves(&self) -> Vec<Move> {
        if self.owner().is_claimed() || self.is_full() {
            return Vec::new();
        }

        let targets: Vec<Coordinate> = match self.cur_cell {
            Some(forced) => vec![forced],
            None => Coordinate::all().collect(),
        };

        let moves: Vec<Move> = targets
            .into_iter()
            .filter(|large| {
                let cell = self.get(*large);
                !cell.owner().is_claimed() && !cell.is_full()
            })
            .flat_map(|large| {
                self.get(large)
                    .empty_spaces()
                    .map(move |small| Move::new(large, small))
            })
            .collect();

        trace!(count = moves.len(), "Enumerated legal moves");
        moves
    }

    /// Claims the space named by `mv` for `owner`.
    ///
    /// This only refuses re-claiming a space; the forced-cell and
    /// closed-cell rules live in [`super::validate_move`]. The forced cell
    /// is left unchanged.
    #[instrument(skip(self))]
    pub fn place(&mut self, mv: Move, owner: Owner) -> Result<(), BoardError> {
        if !owner.is_claimed() {
            return Err(BoardError::NoClaimant);
        }
        if self.cells[mv.large.index()].claim(mv.small, owner) {
            Ok(())
        } else {
            Err(BoardError::SpaceTaken(mv))
        }
    }

    /// Renders the board with the forced cell highlighted in red.
    pub fn render_terminal(&self) -> String {
        self.render(true)
    }

    fn render(&self, color: bool) -> String {
        let coords: Vec<Coordinate> = Coordinate::all().collect();
        let mut out = String::new();
        for band in coords.chunks(GRID_SIZE) {
            for inner in coords.chunks(GRID_SIZE) {
                for &large in band {
                    let mut chunk = String::new();
                    for &small in inner {
                        chunk.push(self.get(large).get(small).owner().mark());
                        chunk.push(' ');
                    }
                    if color && self.cur_cell == Some(large) {
                        out.push_str(&chunk.red().to_string());
                    } else {
                        out.push_str(&chunk);
                    }
                    out.push_str("| ");
                }
                out.push('\n');
            }
            out.push_str("------------------------\n");
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Grid for Board {
    fn owner_at(&self, at: Coordinate) -> Owner {
        self.get(at).owner()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render(false))
    }
}
