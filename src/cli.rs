//! Command-line interface for ultimate_tictactoe.

use clap::{Parser, Subcommand};

/// Ultimate tic-tac-toe engine with terminal and remote-agent players
#[derive(Parser, Debug)]
#[command(name = "ultimate_tictactoe")]
#[command(about = "Ultimate tic-tac-toe for people and socket agents", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file (defaults are used if it is missing)
    #[arg(short, long, global = true, default_value = "uttt.toml")]
    pub config: std::path::PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Two players at this terminal
    Pvp,

    /// Terminal player first, remote agent second
    Pvai,

    /// Remote agent first, terminal player second
    Aivp,

    /// Two remote agents
    Aivai,

    /// Connect to a running engine as the reference agent
    Agent {
        /// Seat to play (1 or 2)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=2))]
        seat: u8,

        /// Connection attempts before giving up
        #[arg(long, default_value = "30")]
        attempts: u32,

        /// Delay between connection attempts in milliseconds
        #[arg(long, default_value = "200")]
        retry_ms: u64,
    },
}
