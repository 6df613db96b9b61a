use std::sync::{Arc, Mutex};

use tactics::{
    Client, ClientEvent, Controller, GameMode, GreedyAi, InMemoryTransport, Intent, Match, Message,
    Pos, Server, ServerConfig, Side, Snapshot, Transport, UnitId, PROTOCOL_VERSION,
};
use tokio::time::Duration;

fn server(seed: u64, turn_seconds: u64) -> Server {
    Server::new(ServerConfig {
        turn_seconds,
        seed: Some(seed),
        ..ServerConfig::default()
    })
}

async fn connect(server: &Server) -> Client<InMemoryTransport> {
    let (ours, theirs) = InMemoryTransport::pair();
    server.attach(theirs);
    Client::connect(ours, Some(1)).await.unwrap()
}

/// Host and guest in a started seeded match.
async fn started(
    server: &Server,
    seed: u64,
) -> (Client<InMemoryTransport>, Client<InMemoryTransport>) {
    let mut host = connect(server).await;
    let mut guest = connect(server).await;
    let code = host.create_room(GameMode::Seeded(seed)).await.unwrap();
    assert_eq!(guest.join_room(&code).await.unwrap(), Side::P2);
    host.start_game().await.unwrap();
    guest.wait_for_start().await.unwrap();
    (host, guest)
}

#[tokio::test]
async fn handshake_with_wrong_version_is_refused() {
    let server = server(1, 0);
    let (mut ours, theirs) = InMemoryTransport::pair();
    let session = server.attach(theirs);
    ours.send(Message::Handshake {
        version: PROTOCOL_VERSION + 1,
    })
    .await
    .unwrap();
    assert_eq!(
        ours.recv().await.unwrap(),
        Message::HandshakeAck {
            version: PROTOCOL_VERSION
        }
    );
    assert!(session.await.unwrap().is_err());
}

#[tokio::test]
async fn room_flow() {
    let server = server(2, 0);
    let mut host = connect(&server).await;
    let mut guest = connect(&server).await;
    let mut late = connect(&server).await;

    assert!(guest.join_room("NOPE42").await.is_err());

    let code = host.create_room(GameMode::Quick).await.unwrap();
    assert_eq!(host.side(), Some(Side::P1));
    assert_eq!(host.room(), Some(code.as_str()));
    assert!(host.join_room(&code).await.is_err());
    assert!(host.start_game().await.is_err());

    let side = guest.join_room(&code.to_lowercase()).await.unwrap();
    assert_eq!(side, Side::P2);
    assert!(late.join_room(&code).await.is_err());
    assert!(guest.start_game().await.is_err());
    assert_eq!(server.room_count().await, 1);

    let snap = host.start_game().await.unwrap();
    assert_eq!(snap.recipient, Side::P1);
    assert!(snap.is_my_turn());
    let snap = guest.wait_for_start().await.unwrap();
    assert_eq!(snap.recipient, Side::P2);
    assert!(!snap.is_my_turn());
    assert!(snap.phase.is_none());
}

#[tokio::test]
async fn actions_without_a_game_are_errors() {
    let server = server(3, 0);
    let mut solo = connect(&server).await;
    assert!(solo.submit(Intent::EndTurn).await.is_err());
    assert!(solo.request_state().await.is_err());
}

#[tokio::test]
async fn server_state_matches_a_local_replay() {
    let seed = 4242;
    let server = server(5, 0);
    let (mut host, _guest) = started(&server, seed).await;
    let mut local = Match::quick(seed).unwrap();
    assert_eq!(**host.snapshot().unwrap(), Snapshot::of(&local, Side::P1));

    let mut ai = GreedyAi::new();
    for _ in 0..30 {
        if local.side_to_act() != Side::P1 || local.winner().is_some() {
            break;
        }
        let intent = ai.choose(&Snapshot::of(&local, Side::P1));
        let remote = host.submit(intent).await;
        let here = local.apply(Side::P1, intent);
        assert_eq!(remote.is_ok(), here.is_ok(), "{:?}", intent);
        assert_eq!(**host.snapshot().unwrap(), Snapshot::of(&local, Side::P1));
    }
}

#[tokio::test]
async fn rejected_intent_leaves_state_alone() {
    let server = server(6, 0);
    let (mut host, mut guest) = started(&server, 9).await;
    let before = host.request_state().await.unwrap();

    assert!(host.submit(Intent::Select { unit: UnitId(999) }).await.is_err());
    assert!(guest.submit(Intent::EndTurn).await.is_err());
    assert!(host
        .submit(Intent::Tile {
            pos: Pos::new(30, 30)
        })
        .await
        .is_err());

    let after = host.request_state().await.unwrap();
    assert_eq!(before, after);
}

/// First seed whose P1 can step onto tall grass straight away.
fn grass_move() -> (u64, Intent) {
    for seed in 0..500 {
        let game = Match::quick(seed).unwrap();
        for unit in game.units().iter().filter(|u| u.side == Side::P1) {
            let mut trial = game.clone();
            if trial
                .apply(Side::P1, Intent::Select { unit: unit.id })
                .is_err()
            {
                continue;
            }
            let target = trial
                .context()
                .movement
                .iter_set_bits()
                .map(|(x, y)| Pos::new(x as u8, y as u8))
                .find(|&p| p != unit.pos && game.board().terrain(p).props().encounter);
            if let Some(to) = target {
                return (seed, Intent::Move { unit: unit.id, to });
            }
        }
    }
    panic!("no seed offers a tall grass move");
}

#[tokio::test]
async fn snapshot_replaces_the_prediction() {
    let (seed, intent) = grass_move();
    let server = server(7, 0);
    let (mut host, _guest) = started(&server, seed).await;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    host.bus_mut().subscribe(move |event| {
        let tag = match event {
            ClientEvent::Prediction(_) => "prediction",
            ClientEvent::Snapshot(_) => "snapshot",
            ClientEvent::Result { .. } => "result",
            _ => "other",
        };
        log.lock().unwrap().push(tag);
    });

    host.submit(intent).await.unwrap();
    assert!(host.prediction().is_none());
    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen, vec!["prediction", "snapshot", "result"]);

    let mut local = Match::quick(seed).unwrap();
    local.apply(Side::P1, intent).unwrap();
    assert_eq!(**host.snapshot().unwrap(), Snapshot::of(&local, Side::P1));
}

#[tokio::test]
async fn peer_hears_when_a_player_drops() {
    let server = server(8, 0);
    let (host, mut guest) = started(&server, 10).await;
    drop(host);
    loop {
        match guest.next_message().await.unwrap() {
            Message::PlayerLeft => break,
            _ => continue,
        }
    }
    assert_eq!(server.room_count().await, 0);
}

#[tokio::test]
async fn opponent_sees_the_turn_pass() {
    let server = server(11, 0);
    let (mut host, mut guest) = started(&server, 12).await;
    host.submit(Intent::EndTurn).await.unwrap();

    let snap = tactics::MatchApi::wait_turn(&mut guest, Side::P2).await.unwrap();
    assert!(snap.is_my_turn());
    assert_eq!(snap.side_to_act, Side::P2);
    assert!(snap.phase.is_some());
}

#[tokio::test(start_paused = true)]
async fn idle_turns_expire() {
    let server = server(13, 5);
    let (mut host, _guest) = started(&server, 14).await;
    assert_eq!(host.snapshot().unwrap().side_to_act, Side::P1);

    let result = loop {
        match host.next_message().await.unwrap() {
            Message::ActionResult { seq, actor, events } => break (seq, actor, events),
            _ => continue,
        }
    };
    assert_eq!(result.0, None);
    assert_eq!(result.1, Side::P1);
    assert!(result.2.iter().any(|e| matches!(
        e,
        tactics::Event::TurnEnded {
            next: Side::P2,
            expired: true,
            ..
        }
    )));
    assert_eq!(host.snapshot().unwrap().side_to_act, Side::P2);
}

#[tokio::test(start_paused = true)]
async fn valid_actions_rearm_the_timer() {
    let server = server(15, 5);
    let (mut host, _guest) = started(&server, 16).await;
    tokio::time::sleep(Duration::from_secs(3)).await;
    let unit = host.snapshot().unwrap().own_units().next().unwrap().id;
    host.submit(Intent::Select { unit }).await.unwrap();
    tokio::time::sleep(Duration::from_secs(3)).await;
    // Six seconds in, but only three since the last action.
    let snap = host.request_state().await.unwrap();
    assert_eq!(snap.side_to_act, Side::P1);
    assert!(matches!(snap.phase, Some(tactics::Phase::Moving { .. })));
}
