use tactics::transport::tcp::{encode_frame, MAX_MESSAGE_SIZE};
use tactics::{
    GameMode, HeartbeatTransport, InMemoryTransport, Intent, Match, Message, Pos, Side, Snapshot,
    TcpTransport, Transport, PROTOCOL_VERSION,
};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{timeout, Duration};

async fn tcp_pair() -> (TcpTransport, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let raw = TcpStream::connect(addr).await.unwrap();
    let (accepted, _) = listener.accept().await.unwrap();
    (TcpTransport::new(accepted), raw)
}

#[tokio::test]
async fn in_memory_pair_is_ordered_both_ways() {
    let (mut a, mut b) = InMemoryTransport::pair();
    a.send(Message::StartGame).await.unwrap();
    a.send(Message::RequestState).await.unwrap();
    b.send(Message::PlayerJoined).await.unwrap();
    assert_eq!(b.recv().await.unwrap(), Message::StartGame);
    assert_eq!(b.recv().await.unwrap(), Message::RequestState);
    assert_eq!(a.recv().await.unwrap(), Message::PlayerJoined);
    drop(b);
    assert!(a.recv().await.is_err());
    assert!(a.send(Message::LeaveRoom).await.is_err());
}

#[tokio::test]
async fn tcp_carries_snapshots() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let mut client = TcpTransport::connect(addr).await.unwrap();
    let (accepted, _) = listener.accept().await.unwrap();
    let mut server = TcpTransport::new(accepted);

    let snap = Snapshot::of(&Match::quick(21).unwrap(), Side::P1);
    server
        .send(Message::GameStarted(snap.clone()))
        .await
        .unwrap();
    assert_eq!(client.recv().await.unwrap(), Message::GameStarted(snap));

    let action = Message::Action {
        seq: 7,
        intent: Intent::Move {
            unit: tactics::UnitId(2),
            to: Pos::new(3, 4),
        },
    };
    client.send(action.clone()).await.unwrap();
    client
        .send(Message::CreateRoom {
            mode: GameMode::Seeded(5),
        })
        .await
        .unwrap();
    assert_eq!(server.recv().await.unwrap(), action);
    assert_eq!(
        server.recv().await.unwrap(),
        Message::CreateRoom {
            mode: GameMode::Seeded(5)
        }
    );
}

#[test]
fn frames_are_length_prefixed() {
    let frame = encode_frame(&Message::StartGame, MAX_MESSAGE_SIZE).unwrap();
    let len = u32::from_be_bytes([frame[0], frame[1], frame[2], frame[3]]) as usize;
    assert_eq!(len, frame.len() - 4);
    assert!(encode_frame(&Message::JoinRoom { code: "X".repeat(64) }, 16).is_err());
}

#[tokio::test]
async fn oversized_frames_are_rejected() {
    let (mut transport, mut raw) = tcp_pair().await;
    raw.write_all(&(MAX_MESSAGE_SIZE + 1).to_be_bytes())
        .await
        .unwrap();
    let err = transport.recv().await.unwrap_err();
    assert!(err.to_string().contains("too large"));
}

#[tokio::test]
async fn empty_frames_are_rejected() {
    let (mut transport, mut raw) = tcp_pair().await;
    raw.write_all(&0u32.to_be_bytes()).await.unwrap();
    assert!(transport.recv().await.is_err());
}

#[tokio::test]
async fn garbage_payload_is_an_error() {
    let (mut transport, mut raw) = tcp_pair().await;
    raw.write_all(&4u32.to_be_bytes()).await.unwrap();
    raw.write_all(&[0xff, 0xff, 0xff, 0xff]).await.unwrap();
    assert!(transport.recv().await.is_err());
}

#[tokio::test]
async fn cancelled_recv_keeps_partial_frames() {
    let (mut transport, mut raw) = tcp_pair().await;
    let frame = encode_frame(&Message::PlayerLeft, MAX_MESSAGE_SIZE).unwrap();
    let (head, tail) = frame.split_at(3);

    raw.write_all(head).await.unwrap();
    raw.flush().await.unwrap();
    assert!(timeout(Duration::from_millis(50), transport.recv())
        .await
        .is_err());

    raw.write_all(tail).await.unwrap();
    assert_eq!(transport.recv().await.unwrap(), Message::PlayerLeft);
}

#[tokio::test]
async fn closed_peer_is_reported() {
    let (mut transport, raw) = tcp_pair().await;
    drop(raw);
    let err = transport.recv().await.unwrap_err();
    assert!(err.to_string().contains("closed"));
}

#[tokio::test]
async fn heartbeats_are_filtered() {
    let (a, mut b) = InMemoryTransport::pair();
    let mut hb = HeartbeatTransport::disabled(a);
    b.send(Message::Heartbeat {
        version: PROTOCOL_VERSION,
    })
    .await
    .unwrap();
    b.send(Message::PlayerJoined).await.unwrap();
    assert_eq!(hb.recv().await.unwrap(), Message::PlayerJoined);

    b.send(Message::Heartbeat {
        version: PROTOCOL_VERSION + 1,
    })
    .await
    .unwrap();
    assert!(hb.recv().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn silent_peer_times_out() {
    let (a, mut b) = InMemoryTransport::pair();
    let mut hb = HeartbeatTransport::new(a, Duration::from_secs(1), Duration::from_secs(3));
    let err = hb.recv().await.unwrap_err();
    assert!(err.to_string().contains("idle"));

    let mut beats = 0;
    while let Ok(Ok(msg)) = timeout(Duration::from_millis(10), b.recv()).await {
        assert!(matches!(msg, Message::Heartbeat { .. }));
        beats += 1;
    }
    assert!(beats >= 2, "only {} heartbeats sent", beats);
}

#[tokio::test(start_paused = true)]
async fn traffic_keeps_the_link_alive() {
    let (a, mut b) = InMemoryTransport::pair();
    let mut hb = HeartbeatTransport::new(a, Duration::from_secs(1), Duration::from_secs(3));
    let peer = tokio::spawn(async move {
        for _ in 0..5 {
            tokio::time::sleep(Duration::from_secs(2)).await;
            b.send(Message::Heartbeat {
                version: PROTOCOL_VERSION,
            })
            .await
            .unwrap();
        }
        b.send(Message::StartGame).await.unwrap();
        b
    });
    assert_eq!(hb.recv().await.unwrap(), Message::StartGame);
    peer.await.unwrap();
}
