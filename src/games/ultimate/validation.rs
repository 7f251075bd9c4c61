//! Move legality checks.
//!
//! Pure functions over a board; nothing here mutates.

use super::{Board, Coordinate, Move, MoveError};
use tracing::{debug, instrument};

/// A cell can be played in when it has no owner and is not full.
#[instrument(level = "trace", skip(board))]
pub fn validate_cell(board: &Board, at: Coordinate) -> bool {
    let cell = board.get(at);
    !cell.owner().is_claimed() && !cell.is_full()
}

/// The target cell must be open and, when a cell is forced, be that cell.
#[instrument(skip(board))]
pub fn validate_move_cell(board: &Board, large: Coordinate) -> bool {
    check_move_cell(board, large).is_ok()
}

/// Whether `mv` is legal on `board`.
#[instrument(skip(board))]
pub fn validate_move(board: &Board, mv: Move) -> bool {
    check_move(board, mv).is_ok()
}

/// Like [`validate_move`], but names the first failing condition.
#[instrument(skip(board))]
pub fn check_move(board: &Board, mv: Move) -> Result<(), MoveError> {
    check_move_cell(board, mv.large)?;

    if board.get(mv.large).get(mv.small).owner().is_claimed() {
        debug!(%mv, "Target space already taken");
        return Err(MoveError::SpaceTaken(mv.large, mv.small));
    }

    Ok(())
}

fn check_move_cell(board: &Board, large: Coordinate) -> Result<(), MoveError> {
    if !validate_cell(board, large) {
        debug!(%large, "Target cell is closed");
        return Err(MoveError::CellClosed(large));
    }

    match board.cur_cell() {
        Some(forced) if forced != large => {
            debug!(%forced, %large, "Move outside the forced cell");
            Err(MoveError::WrongCell {
                forced,
                requested: large,
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::ultimate::Owner;

    fn mv(large: usize, small: usize) -> Move {
        Move::from_indices(large, small).unwrap()
    }

    #[test]
    fn test_center_is_forced_on_fresh_board() {
        let board = Board::new();
        assert!(validate_move(&board, mv(4, 0)));
        assert_eq!(
            check_move(&board, mv(0, 0)),
            Err(MoveError::WrongCell {
                forced: Coordinate::CENTER,
                requested: Coordinate::from_index(0).unwrap(),
            })
        );
    }

    #[test]
    fn test_taken_space_rejected() {
        let mut board = Board::new();
        board.place(mv(4, 4), Owner::Player1).unwrap();
        assert!(!validate_move(&board, mv(4, 4)));
        assert!(validate_move(&board, mv(4, 5)));
    }

    #[test]
    fn test_won_cell_rejected_even_when_free_choice() {
        let mut board = Board::new();
        board.set_cur_cell(None);
        for small in [0, 1, 2] {
            board.place(mv(0, small), Owner::Player1).unwrap();
        }
        assert!(!validate_cell(&board, Coordinate::from_index(0).unwrap()));
        assert_eq!(
            check_move(&board, mv(0, 5)),
            Err(MoveError::CellClosed(Coordinate::from_index(0).unwrap()))
        );
        assert!(validate_move(&board, mv(3, 5)));
    }

    #[test]
    fn test_full_unowned_cell_rejected() {
        let mut board = Board::new();
        board.set_cur_cell(None);
        // X O X / O X X / O X O: full, no line
        let owners = [1, 2, 1, 2, 1, 1, 2, 1, 2];
        for (small, who) in owners.into_iter().enumerate() {
            let owner = if who == 1 { Owner::Player1 } else { Owner::Player2 };
            board.place(mv(7, small), owner).unwrap();
        }
        let cell = Coordinate::from_index(7).unwrap();
        assert_eq!(board.get(cell).owner(), Owner::None);
        assert!(board.get(cell).is_full());
        assert!(!validate_cell(&board, cell));
        assert!(!validate_move_cell(&board, cell));
    }
}
