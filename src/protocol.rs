//! Messages exchanged between clients and the match server.

use serde::{Deserialize, Serialize};

use crate::core::{
    common::Side,
    game::{Event, Intent},
};
use crate::domain::Snapshot;

/// Bumped whenever [`Message`] changes shape.
pub const PROTOCOL_VERSION: u16 = 1;

/// How a room sets up its match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Random board and teams.
    Quick,
    /// Random board and teams from a fixed seed, for replays and tests.
    Seeded(u64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    Handshake {
        version: u16,
    },
    HandshakeAck {
        version: u16,
    },
    /// Link keep-alive, filtered out by the heartbeat transport.
    Heartbeat {
        version: u16,
    },

    // client -> server
    CreateRoom {
        mode: GameMode,
    },
    JoinRoom {
        code: String,
    },
    LeaveRoom,
    StartGame,
    Action {
        seq: u64,
        intent: Intent,
    },
    RequestState,

    // server -> client
    RoomCreated {
        code: String,
        side: Side,
    },
    RoomJoined {
        code: String,
        side: Side,
    },
    PlayerJoined,
    PlayerLeft,
    GameStarted(Snapshot),
    StateUpdate(Snapshot),
    /// Results of one applied intent or a turn expiry. `seq` echoes the
    /// sender's action and is `None` for everyone else.
    ActionResult {
        seq: Option<u64>,
        actor: Side,
        events: Vec<Event>,
    },
    Error {
        seq: Option<u64>,
        message: String,
    },
}

/// Anything a player can drive a match through: the local engine or a
/// networked client.
#[async_trait::async_trait]
pub trait MatchApi: Send {
    /// Submit one intent as `side`.
    async fn submit(&mut self, side: Side, intent: Intent) -> anyhow::Result<Vec<Event>>;

    /// Current view for `side`.
    async fn state(&mut self, side: Side) -> anyhow::Result<Snapshot>;

    /// Block until `side` may act or the match is over, then return its view.
    async fn wait_turn(&mut self, side: Side) -> anyhow::Result<Snapshot>;
}
