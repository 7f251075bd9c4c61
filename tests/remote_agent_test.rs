//! Tests for remote agents over in-memory, TCP, and Unix channels.

use std::time::Duration;
use tokio::io::AsyncWriteExt;
use ultimate_tictactoe::{
    AgentClient, AgentConnection, AgentEndpoints, Board, Channel, ChannelError, ChannelOp,
    Endpoint, Engine, GameOutcome, MAX_ACTION_BYTES, MAX_STATE_BYTES, Move, MoveRequest, Owner,
    Player, RemoteAgent, first_legal_move,
};

fn loopback_any() -> AgentEndpoints {
    AgentEndpoints::new(
        Endpoint::loopback(0),
        Endpoint::loopback(0),
        Endpoint::loopback(0),
    )
}

/// Quits as soon as it is asked to move.
struct Quitter;

#[async_trait::async_trait]
impl Player for Quitter {
    async fn present_state(&mut self, _board: &Board, _mover: Owner) -> anyhow::Result<()> {
        Ok(())
    }

    async fn request_move(&mut self) -> anyhow::Result<MoveRequest> {
        Ok(MoveRequest::Quit)
    }

    async fn report_outcome(&mut self, _board: &Board, _valid: bool) -> anyhow::Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "quitter"
    }
}

#[tokio::test]
async fn test_two_agents_play_to_the_end() {
    let (engine1, agent1) = AgentConnection::pair(MAX_STATE_BYTES);
    let (engine2, agent2) = AgentConnection::pair(MAX_STATE_BYTES);

    let client1 =
        tokio::spawn(async move { AgentClient::new(Owner::Player1, agent1).play().await });
    let client2 =
        tokio::spawn(async move { AgentClient::new(Owner::Player2, agent2).play().await });

    let mut p1 = RemoteAgent::new("agent1", Owner::Player1, engine1, MAX_ACTION_BYTES);
    let mut p2 = RemoteAgent::new("agent2", Owner::Player2, engine2, MAX_ACTION_BYTES);
    let mut engine = Engine::new();

    let outcome = engine.run(&mut p1, &mut p2).await.unwrap();
    assert!(!matches!(outcome, GameOutcome::Quit { .. }));
    assert!(engine.history().len() <= 81);

    tokio::join!(p1.shutdown(Duration::ZERO), p2.shutdown(Duration::ZERO));
    let report1 = client1.await.unwrap().unwrap();
    let report2 = client2.await.unwrap().unwrap();

    assert_eq!(report1.rejected() + report2.rejected(), 0);
    assert_eq!(
        report1.moves_sent() + report2.moves_sent(),
        engine.history().len()
    );

    // The side that made the last move saw the finished board.
    let (last_mover, _) = engine.history().last().copied().unwrap();
    let finisher = if last_mover == Owner::Player1 {
        &report1
    } else {
        &report2
    };
    let last = finisher.last_state().as_ref().unwrap();
    assert!(last.done);
    assert_eq!(last.winner, outcome.winner());
    assert_eq!(&last.board, engine.board());
}

#[tokio::test]
async fn test_rejected_move_reaches_agent() {
    let (engine_side, agent_side) = AgentConnection::pair(MAX_STATE_BYTES);

    let client = tokio::spawn(async move {
        let mut tries = 0;
        AgentClient::new(Owner::Player1, agent_side)
            .play_with(move |state| {
                tries += 1;
                if tries == 1 {
                    Move::from_indices(0, 0)
                } else {
                    first_legal_move(state)
                }
            })
            .await
    });

    let mut p1 = RemoteAgent::new("agent", Owner::Player1, engine_side, MAX_ACTION_BYTES);
    let mut p2 = Quitter;
    let mut engine = Engine::new();

    let outcome = engine.run(&mut p1, &mut p2).await.unwrap();
    assert_eq!(
        outcome,
        GameOutcome::Quit {
            mover: Owner::Player2
        }
    );
    assert_eq!(engine.history(), &[(Owner::Player1, Move::from_indices(4, 0).unwrap())]);

    p1.shutdown(Duration::ZERO).await;
    let report = client.await.unwrap().unwrap();
    assert_eq!(*report.moves_sent(), 2);
    assert_eq!(*report.rejected(), 1);

    let last = report.last_state().as_ref().unwrap();
    assert_eq!(last.turn, Owner::Player1);
    assert!(!last.done);
}

#[tokio::test]
async fn test_malformed_action_is_fatal() {
    let (engine_side, mut agent_side) = AgentConnection::pair(MAX_STATE_BYTES);
    agent_side.action.write_all(b"not json\n").await.unwrap();

    let mut p1 = RemoteAgent::new("agent", Owner::Player1, engine_side, MAX_ACTION_BYTES);
    let mut p2 = Quitter;
    let mut engine = Engine::new();

    let err = engine.play_turn(&mut p1, &mut p2).await.unwrap_err();
    let channel_err = err.downcast_ref::<ChannelError>().unwrap();
    assert_eq!(channel_err.channel, Channel::Action);
    assert_eq!(channel_err.operation, ChannelOp::Decode);
    assert!(engine.history().is_empty());
}

#[tokio::test]
async fn test_oversized_action_is_refused() {
    let (engine_side, mut agent_side) = AgentConnection::pair(MAX_STATE_BYTES);
    let mut junk = vec![b'x'; MAX_ACTION_BYTES * 2];
    junk.push(b'\n');
    agent_side.action.write_all(&junk).await.unwrap();

    let mut agent = RemoteAgent::new("agent", Owner::Player1, engine_side, MAX_ACTION_BYTES);
    let err = agent.request_move().await.unwrap_err();
    let channel_err = err.downcast_ref::<ChannelError>().unwrap();
    assert_eq!(channel_err.operation, ChannelOp::Read);
}

#[tokio::test]
async fn test_closed_action_channel_is_an_error() {
    let (engine_side, agent_side) = AgentConnection::pair(MAX_STATE_BYTES);
    drop(agent_side);

    let mut agent = RemoteAgent::new("agent", Owner::Player2, engine_side, MAX_ACTION_BYTES);
    let err = agent.request_move().await.unwrap_err();
    let channel_err = err.downcast_ref::<ChannelError>().unwrap();
    assert_eq!(channel_err.channel, Channel::Action);
}

#[tokio::test]
async fn test_agent_over_tcp() {
    let listeners = loopback_any().bind().await.unwrap();
    let endpoints = listeners.local_endpoints().unwrap();

    let client = tokio::spawn(async move {
        let mut client =
            AgentClient::connect(Owner::Player1, &endpoints, 5, Duration::from_millis(10)).await?;
        client.play().await
    });

    let engine_side = listeners.accept().await.unwrap();
    let (engine2, agent2) = AgentConnection::pair(MAX_STATE_BYTES);
    let client2 =
        tokio::spawn(async move { AgentClient::new(Owner::Player2, agent2).play().await });

    let mut p1 = RemoteAgent::new("tcp", Owner::Player1, engine_side, MAX_ACTION_BYTES);
    let mut p2 = RemoteAgent::new("mem", Owner::Player2, engine2, MAX_ACTION_BYTES);
    let outcome = Engine::new().run(&mut p1, &mut p2).await.unwrap();
    assert!(!matches!(outcome, GameOutcome::Quit { .. }));

    tokio::join!(p1.shutdown(Duration::ZERO), p2.shutdown(Duration::ZERO));
    let report = client.await.unwrap().unwrap();
    assert!(*report.moves_sent() > 0);
    client2.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_connect_gives_up_when_nothing_listens() {
    // Bind and drop to find a port nobody is listening on.
    let listeners = loopback_any().bind().await.unwrap();
    let endpoints = listeners.local_endpoints().unwrap();
    drop(listeners);

    let result =
        AgentClient::connect(Owner::Player1, &endpoints, 2, Duration::from_millis(1)).await;
    assert!(result.is_err());
}

#[cfg(unix)]
#[tokio::test]
async fn test_agent_over_unix_sockets() {
    let dir = tempfile::tempdir().unwrap();
    let path = |name: &str| Endpoint::Unix(dir.path().join(name));
    let endpoints = AgentEndpoints::new(
        path("state.sock"),
        path("action.sock"),
        path("result.sock"),
    );

    let listeners = endpoints.bind().await.unwrap();
    let connect_to = endpoints.clone();
    let client = tokio::spawn(async move {
        let mut client =
            AgentClient::connect(Owner::Player2, &connect_to, 5, Duration::from_millis(10)).await?;
        client.play().await
    });

    let engine_side = listeners.accept().await.unwrap();
    for name in ["state.sock", "action.sock", "result.sock"] {
        assert!(!dir.path().join(name).exists());
    }

    let mut p1 = Quitter;
    let mut p2 = RemoteAgent::new("unix", Owner::Player2, engine_side, MAX_ACTION_BYTES);
    let mut engine = Engine::new();
    assert!(engine.apply(Move::from_indices(4, 4).unwrap()));

    let outcome = engine.run(&mut p1, &mut p2).await.unwrap();
    // Player2 moves once, then Player1 quits.
    assert_eq!(
        outcome,
        GameOutcome::Quit {
            mover: Owner::Player1
        }
    );
    assert_eq!(engine.history().len(), 2);

    p2.shutdown(Duration::ZERO).await;
    let report = client.await.unwrap().unwrap();
    assert_eq!(*report.moves_sent(), 1);
}
