//! Wiring players to the engine for each game mode.

use crate::config::GameConfig;
use crate::games::ultimate::{Board, Engine, GameOutcome, Owner};
use crate::players::{Player, RemoteAgent, TerminalPlayer};
use crate::protocol::AgentConnection;
use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

/// Who sits in each seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum Mode {
    /// Two people at this terminal.
    PlayerVsPlayer,
    /// A person moves first against a remote agent.
    PlayerVsAgent,
    /// A remote agent moves first against a person.
    AgentVsPlayer,
    /// Two remote agents.
    AgentVsAgent,
}

/// Accepts the agent for `seat` on the endpoints configured for it.
#[instrument(skip(config))]
pub async fn accept_agent(config: &GameConfig, seat: Owner) -> Result<AgentConnection> {
    let endpoints = config.endpoints(seat)?;
    let listeners = endpoints
        .bind()
        .await
        .with_context(|| format!("Failed to listen for the {} agent", seat))?;

    info!(
        state = %endpoints.state(),
        action = %endpoints.action(),
        result = %endpoints.result(),
        "Waiting for agent to connect"
    );
    let connection = listeners
        .accept()
        .await
        .with_context(|| format!("Failed to accept the {} agent", seat))?;
    Ok(connection)
}

/// Plays one game in `mode` and reports the result on stdout when a
/// person took part.
#[instrument(skip(config))]
pub async fn run_mode(mode: Mode, config: &GameConfig) -> Result<GameOutcome> {
    let mut engine = Engine::new();
    let grace = config.shutdown_grace();
    let max_action = *config.max_action_bytes();

    let outcome = match mode {
        Mode::PlayerVsPlayer => {
            let stdin = TerminalPlayer::shared_stdin();
            let mut p1 = TerminalPlayer::stdio("Player1", stdin.clone());
            let mut p2 = TerminalPlayer::stdio("Player2", stdin);
            let outcome = engine.run(&mut p1, &mut p2).await?;
            announce(&engine, outcome, &p1, &p2).await?;
            outcome
        }
        Mode::PlayerVsAgent => {
            let connection = accept_agent(config, Owner::Player2).await?;
            let mut p1 = TerminalPlayer::stdio("Player1", TerminalPlayer::shared_stdin());
            let mut p2 = RemoteAgent::new("Agent2", Owner::Player2, connection, max_action);
            let outcome = engine.run(&mut p1, &mut p2).await?;
            announce(&engine, outcome, &p1, &p2).await?;
            p2.shutdown(grace).await;
            outcome
        }
        Mode::AgentVsPlayer => {
            let connection = accept_agent(config, Owner::Player1).await?;
            let mut p1 = RemoteAgent::new("Agent1", Owner::Player1, connection, max_action);
            let mut p2 = TerminalPlayer::stdio("Player2", TerminalPlayer::shared_stdin());
            let outcome = engine.run(&mut p1, &mut p2).await?;
            announce(&engine, outcome, &p1, &p2).await?;
            p1.shutdown(grace).await;
            outcome
        }
        Mode::AgentVsAgent => {
            let (first, second) = tokio::try_join!(
                accept_agent(config, Owner::Player1),
                accept_agent(config, Owner::Player2),
            )?;
            let mut p1 = RemoteAgent::new("Agent1", Owner::Player1, first, max_action);
            let mut p2 = RemoteAgent::new("Agent2", Owner::Player2, second, max_action);
            let outcome = engine.run(&mut p1, &mut p2).await?;
            tokio::join!(p1.shutdown(grace), p2.shutdown(grace));
            outcome
        }
    };

    info!(%outcome, plies = engine.history().len(), "Game over");
    Ok(outcome)
}

/// Prints the final board and result if either seat is a local player.
async fn announce(
    engine: &Engine,
    outcome: GameOutcome,
    player1: &dyn Player,
    player2: &dyn Player,
) -> Result<()> {
    if !player1.is_local() && !player2.is_local() {
        return Ok(());
    }

    let text = final_report(engine.board(), outcome);
    let mut stdout = tokio::io::stdout();
    stdout
        .write_all(text.as_bytes())
        .await
        .context("Failed to write final board")?;
    stdout.flush().await.context("Failed to flush stdout")
}

/// Final board rendering followed by the result line.
pub fn final_report(board: &Board, outcome: GameOutcome) -> String {
    format!("{}\n{}\n", board.render_terminal(), outcome)
}
