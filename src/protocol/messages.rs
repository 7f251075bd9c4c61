//! Messages exchanged with a remote agent.

use crate::games::ultimate::{Board, GRID_CELLS, Move, Owner};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Sent on the state channel before the agent is asked to move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMessage {
    /// Full board snapshot, including the forced cell.
    pub board: Board,
    /// Owner of each cell in ascending index order.
    pub cell_owners: [Owner; GRID_CELLS],
    /// The side the message concerns.
    pub turn: Owner,
    /// Owner of the board, [`Owner::None`] while undecided.
    pub winner: Owner,
    /// True once the board has a winner or is full. Also true when no
    /// legal move is left.
    pub done: bool,
}

impl StateMessage {
    /// Snapshots `board` for `turn`.
    #[instrument(skip(board))]
    pub fn new(board: &Board, turn: Owner) -> Self {
        let winner = board.owner();
        Self {
            board: board.clone(),
            cell_owners: board.cell_owners(),
            turn,
            winner,
            done: winner.is_claimed() || board.is_full() || board.status().is_finished(),
        }
    }
}

/// Read from the action channel: exactly one move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct ActionMessage {
    /// The move the agent wants to make.
    #[serde(rename = "move")]
    pub mv: Move,
}

/// Sent on the result channel after every move the agent makes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct ReturnMessage {
    /// Board after the move (unchanged if it was refused).
    pub state: StateMessage,
    /// Whether the move was accepted.
    pub valid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_message_fresh_board() {
        let msg = StateMessage::new(&Board::new(), Owner::Player1);
        assert_eq!(msg.winner, Owner::None);
        assert!(!msg.done);
        assert_eq!(msg.cell_owners, [Owner::None; GRID_CELLS]);
    }

    #[test]
    fn test_state_message_done_when_won() {
        let mut board = Board::new();
        for large in [0, 1, 2] {
            for small in [0, 1, 2] {
                board
                    .place(Move::from_indices(large, small).unwrap(), Owner::Player1)
                    .unwrap();
            }
        }
        let msg = StateMessage::new(&board, Owner::Player2);
        assert_eq!(msg.winner, Owner::Player1);
        assert!(msg.done);
        assert_eq!(&msg.cell_owners[..3], &[Owner::Player1; 3]);
    }

    #[test]
    fn test_action_wire_shape() {
        let json = r#"{"move":{"large":{"row":1,"col":1},"small":{"row":0,"col":2}}}"#;
        let msg: ActionMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.mv, Move::from_indices(4, 2).unwrap());
    }

    #[test]
    fn test_action_out_of_grid_fails_to_decode() {
        let json = r#"{"move":{"large":{"row":3,"col":1},"small":{"row":0,"col":2}}}"#;
        assert!(serde_json::from_str::<ActionMessage>(json).is_err());
    }
}
