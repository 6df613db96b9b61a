//! Controllers and the driver that feeds them.
//!
//! This module provides:
//! - GreedyAi: picks the most damaging reachable attack, otherwise advances
//! - CliController: interactive command-line controller
//! - PlayerNode: drives a controller against any [`MatchApi`](crate::protocol::MatchApi)

use crate::core::{common::Side, game::{Event, Intent}};
use crate::domain::Snapshot;

/// Decides one intent at a time for its side.
///
/// A controller only ever sees its own side's snapshot, so it plays under
/// the same fog of war as a human.
pub trait Controller: Send {
    /// Next intent for the phase in `snapshot`.
    fn choose(&mut self, snapshot: &Snapshot) -> Intent;

    /// Results of an applied intent.
    fn observe(&mut self, _actor: Side, _events: &[Event]) {}
}

pub mod ai;
pub use ai::GreedyAi;

pub mod cli;
pub use cli::CliController;

pub mod node;
pub use node::PlayerNode;
