#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod core;

#[cfg(feature = "std")]
pub mod client;
#[cfg(feature = "std")]
pub mod domain;
#[cfg(feature = "std")]
pub mod local;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod player;
#[cfg(feature = "std")]
pub mod prelude;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod server;
#[cfg(feature = "std")]
pub mod transport;
#[cfg(feature = "std")]
pub mod ui;

pub use crate::core::*;

#[cfg(feature = "std")]
pub use client::{Client, ClientEvent, EncounterPrediction, EventBus};
#[cfg(feature = "std")]
pub use domain::{Snapshot, UnitSummary, UnitView};
#[cfg(feature = "std")]
pub use local::LocalMatch;
#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use player::{CliController, Controller, GreedyAi, PlayerNode};
#[cfg(feature = "std")]
pub use protocol::{GameMode, MatchApi, Message, PROTOCOL_VERSION};
#[cfg(feature = "std")]
pub use server::{Server, ServerConfig};
#[cfg(feature = "std")]
pub use transport::{
    heartbeat::HeartbeatTransport, in_memory::InMemoryTransport, tcp::TcpTransport, Transport,
};
