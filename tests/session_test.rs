//! End-to-end tests for game modes driven from a config file.

use std::io::Write;
use std::path::Path;
use std::time::Duration;
use ultimate_tictactoe::{
    AgentClient, Board, GameConfig, GameOutcome, Mode, Owner, final_report, run_mode,
};

fn unix_config(dir: &Path) -> GameConfig {
    let sock = |name: &str| format!("unix://{}", dir.join(name).display());
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
shutdown_grace_ms = 0

[player1]
state = "{}"
action = "{}"
result = "{}"

[player2]
state = "{}"
action = "{}"
result = "{}"
"#,
        sock("p1-state"),
        sock("p1-action"),
        sock("p1-result"),
        sock("p2-state"),
        sock("p2-action"),
        sock("p2-result"),
    )
    .unwrap();
    GameConfig::from_file(file.path()).unwrap()
}

#[cfg(unix)]
#[tokio::test]
async fn test_agent_vs_agent_mode() {
    let dir = tempfile::tempdir().unwrap();
    let config = unix_config(dir.path());

    let mut clients = Vec::new();
    for seat in [Owner::Player1, Owner::Player2] {
        let endpoints = config.endpoints(seat).unwrap().clone();
        clients.push(tokio::spawn(async move {
            let mut client =
                AgentClient::connect(seat, &endpoints, 200, Duration::from_millis(10)).await?;
            client.play().await
        }));
    }

    let outcome = run_mode(Mode::AgentVsAgent, &config).await.unwrap();
    assert!(!matches!(outcome, GameOutcome::Quit { .. }));

    for client in clients {
        let report = client.await.unwrap().unwrap();
        assert_eq!(*report.rejected(), 0);
        assert!(*report.moves_sent() > 0);
    }
}

#[test]
fn test_final_report_ends_with_outcome() {
    let text = final_report(&Board::new(), GameOutcome::Won(Owner::Player2));
    assert!(text.ends_with("Player2 won\n"));
    assert!(text.contains("_ _ _ | _ _ _ | _ _ _"));
}
