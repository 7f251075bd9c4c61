//! Ultimate tic-tac-toe - unified CLI
//!
//! Runs a game in one of four seat arrangements, or plays as the
//! reference agent against a running engine.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::time::Duration;
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use ultimate_tictactoe::{AgentClient, GameConfig, Mode, Owner, run_mode};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing();

    let config = GameConfig::load_or_default(&cli.config)?;

    match cli.command {
        Command::Pvp => run_game(Mode::PlayerVsPlayer, &config).await,
        Command::Pvai => run_game(Mode::PlayerVsAgent, &config).await,
        Command::Aivp => run_game(Mode::AgentVsPlayer, &config).await,
        Command::Aivai => run_game(Mode::AgentVsAgent, &config).await,
        Command::Agent {
            seat,
            attempts,
            retry_ms,
        } => run_agent(seat, attempts, retry_ms, &config).await,
    }
}

/// Logs go to stderr so they never mix with the board on stdout.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ultimate_tictactoe=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Plays one game in `mode`.
#[instrument(skip(config))]
async fn run_game(mode: Mode, config: &GameConfig) -> Result<()> {
    info!(%mode, "Starting game");
    let outcome = run_mode(mode, config).await?;
    info!(%outcome, "Finished");
    Ok(())
}

/// Runs the reference agent for `seat`.
#[instrument(skip(config))]
async fn run_agent(seat: u8, attempts: u32, retry_ms: u64, config: &GameConfig) -> Result<()> {
    let seat = if seat == 1 {
        Owner::Player1
    } else {
        Owner::Player2
    };
    let endpoints = config.endpoints(seat)?;

    let mut client =
        AgentClient::connect(seat, endpoints, attempts, Duration::from_millis(retry_ms)).await?;
    let report = client.play().await?;

    let winner = report
        .last_state()
        .as_ref()
        .map(|state| state.winner)
        .unwrap_or_default();
    info!(
        moves = report.moves_sent(),
        rejected = report.rejected(),
        %winner,
        "Agent done"
    );
    Ok(())
}
