//! Core tactical engine (no_std compatible)
//!
//! This module contains the pure simulation with no I/O: reference data,
//! the movement and attack solvers, combat and capture resolution, fog of
//! war and the turn state machine. It only needs `alloc`, `libm`,
//! `num-traits` and `rand` (small_rng).

pub mod abilities;
pub mod bitboard;
pub mod board;
pub mod capture;
pub mod combat;
pub mod common;
pub mod config;
pub mod element;
pub mod game;
pub mod movement;
pub mod setup;
pub mod species;
pub mod status;
pub mod terrain;
pub mod turn;
pub mod unit;
pub mod vision;

// Re-export commonly used types
pub use bitboard::{BitBoard, BitBoardError};
pub use board::Board;
pub use capture::{CaptureAttempt, CaptureRates, Timing, WildEncounter};
pub use combat::{CombatOutcome, Strike};
pub use common::{ActionError, Pos, Side, UnitId};
pub use config::*;
pub use element::{effectiveness, Element};
pub use game::{Event, HealSource, Intent, Match, MatchStatus};
pub use setup::{BoardSource, FixedSetup, Placement, RandomSetup, Setup, SetupError};
pub use species::{Ability, Category, Move, Species, SpeciesId, StatusCondition};
pub use terrain::Terrain;
pub use turn::{Phase, PhaseKind, Transition, TurnContext};
pub use unit::{Form, Unit};
pub use vision::{Sighting, Visibility};
