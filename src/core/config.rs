//! Rule constants for the tactical engine.

use super::bitboard::BitBoard;

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 12;

/// Tile mask covering the whole battlefield.
pub type TileMask = BitBoard<u128, BOARD_WIDTH, BOARD_HEIGHT>;

/// Units per side in a quick match.
pub const TEAM_SIZE: usize = 3;

/// Terrain costing more than this can never be entered.
pub const IMPASSABLE_COST: u8 = 10;

/// Manhattan radius lit by every unit.
pub const VISION_RANGE: u8 = 3;

pub const CRIT_CHANCE: f64 = 0.10;
pub const CRIT_MULTIPLIER: f64 = 1.5;
pub const STAB_MULTIPLIER: f64 = 1.5;
pub const COUNTER_DAMAGE_PENALTY: f64 = 0.75;
/// Damage variance is drawn uniformly from `1 ± DAMAGE_VARIANCE`.
pub const DAMAGE_VARIANCE: f64 = 0.10;
pub const TERRAIN_TYPE_BONUS: f64 = 1.25;

/// Kills needed per evolution stage.
pub const KILLS_TO_EVOLVE: u16 = 2;

/// Percentage of max HP restored on a healing tile at turn start.
pub const HEALING_TILE_PERCENT: u32 = 20;
/// Percentage of max HP restored by a berry bush.
pub const BERRY_HEAL_PERCENT: u32 = 10;

/// Chance that committing a move onto tall grass starts a wild encounter.
pub const ENCOUNTER_CHANCE: f64 = 0.30;

/// Capture base rate by wild stat total: `(exclusive upper bound, rate)`.
pub const CAPTURE_RATE_BANDS: [(u32, f64); 3] = [(250, 0.45), (300, 0.35), (350, 0.25)];
pub const CAPTURE_RATE_FLOOR: f64 = 0.15;
pub const CAPTURE_MAX_HP_BONUS: f64 = 0.30;
pub const CAPTURE_MAX_RATE: f64 = 0.95;
pub const CAPTURE_CHECKS: usize = 3;

/// Default turn duration for networked play, in seconds.
pub const DEFAULT_TURN_SECONDS: u64 = 45;
