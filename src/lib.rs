//! Ultimate tic-tac-toe library
//!
//! A turn engine for ultimate tic-tac-toe plus the players that sit at it.
//!
//! # Architecture
//!
//! - **Games**: board, rules, and the [`Engine`] that runs plies
//! - **Players**: the [`Player`] trait with terminal and remote-agent seats
//! - **Protocol**: JSON-lines messages over state, action, and result channels
//! - **Client**: a reference agent that speaks the protocol
//!
//! # Example
//!
//! ```no_run
//! use ultimate_tictactoe::{AgentClient, AgentConnection, Engine, Owner, RemoteAgent};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let (engine_side1, agent_side1) = AgentConnection::pair(64 * 1024);
//! let (engine_side2, agent_side2) = AgentConnection::pair(64 * 1024);
//!
//! let mut p1 = RemoteAgent::new("a", Owner::Player1, engine_side1, 1024);
//! let mut p2 = RemoteAgent::new("b", Owner::Player2, engine_side2, 1024);
//! tokio::spawn(async move { AgentClient::new(Owner::Player1, agent_side1).play().await });
//! tokio::spawn(async move { AgentClient::new(Owner::Player2, agent_side2).play().await });
//!
//! let outcome = Engine::new().run(&mut p1, &mut p2).await?;
//! println!("{}", outcome);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod client;
mod config;
mod error;
mod games;
mod players;
mod protocol;
mod session;

// Crate-level exports - Game types
pub use games::ultimate::{
    Board, BoardError, Cell, Coordinate, Engine, GRID_CELLS, GRID_SIZE, GameOutcome, GameStatus,
    Move, MoveError, Owner, Space, TurnOutcome, check_move, rules, validate_cell, validate_move,
    validate_move_cell,
};

// Crate-level exports - Players
pub use players::{MoveRequest, Player, RemoteAgent, SharedInput, TerminalPlayer};

// Crate-level exports - Protocol
pub use protocol::{
    ActionMessage, AgentConnection, AgentEndpoints, BoxedStream, ByteStream, ChannelListeners,
    Endpoint, Listener, MAX_ACTION_BYTES, MAX_STATE_BYTES, MessageReader, MessageWriter,
    ReturnMessage, StateMessage,
};

// Crate-level exports - Errors and configuration
pub use config::{ConfigError, GameConfig};
pub use error::{Channel, ChannelError, ChannelOp};

// Crate-level exports - Agent client and game modes
pub use client::{AgentClient, ClientReport, first_legal_move};
pub use session::{Mode, accept_agent, final_report, run_mode};
