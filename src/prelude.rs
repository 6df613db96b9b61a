//! Commonly used types and utilities for ease of import.

pub use crate::{Event, Intent, Match, MatchStatus, Phase, Pos, Side, UnitId};

#[cfg(feature = "std")]
pub use crate::{
    Client, Controller, GameMode, GreedyAi, LocalMatch, MatchApi, PlayerNode, Server,
    ServerConfig, Snapshot,
};

#[cfg(feature = "std")]
pub use crate::transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Transport};
