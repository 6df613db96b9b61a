//! Wild encounters and the capture skill-check engine.

use libm::cbrt;
use rand::Rng;

use super::board::Board;
use super::common::{Pos, Side, UnitId};
use super::config::{
    CAPTURE_CHECKS, CAPTURE_MAX_HP_BONUS, CAPTURE_MAX_RATE, CAPTURE_RATE_BANDS,
    CAPTURE_RATE_FLOOR, ENCOUNTER_CHANCE,
};
use super::species::{SpeciesId, WILD_POOL};
use super::unit::Unit;

/// Quality of one timed throw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Timing {
    Best,
    Good,
    Fair,
    Miss,
}

impl Timing {
    /// Additive adjustment to a single check's pass probability.
    pub fn adjustment(self) -> f64 {
        match self {
            Timing::Best => 0.10,
            Timing::Good => 0.0,
            Timing::Fair => -0.10,
            Timing::Miss => -0.35,
        }
    }
}

/// A wild unit waiting to be captured or fled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct WildEncounter {
    /// Unit whose move triggered the encounter.
    pub trigger: UnitId,
    pub species: SpeciesId,
    pub hp: u16,
    /// Free tile next to the trigger where a capture would appear.
    pub spawn: Pos,
}

impl WildEncounter {
    pub fn max_hp(&self) -> u16 {
        self.species.template().stats.hp
    }
}

/// Probabilities for one capture attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct CaptureRates {
    pub base: f64,
    pub hp_bonus: f64,
    pub overall: f64,
    pub per_check: f64,
}

/// Outcome of a capture attempt.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct CaptureAttempt {
    pub species: SpeciesId,
    pub side: Side,
    pub rates: CaptureRates,
    /// One entry per check actually rolled; stops at the first failure.
    pub checks: [Option<bool>; CAPTURE_CHECKS],
    pub success: bool,
}

/// Base rate from the species' stat total.
pub fn base_rate(species: SpeciesId) -> f64 {
    let total = species.template().stats.total();
    CAPTURE_RATE_BANDS
        .iter()
        .find(|(limit, _)| total < *limit)
        .map_or(CAPTURE_RATE_FLOOR, |&(_, rate)| rate)
}

pub fn rates(encounter: &WildEncounter) -> CaptureRates {
    let base = base_rate(encounter.species);
    let max = encounter.max_hp().max(1) as f64;
    let lost = 1.0 - (encounter.hp as f64 / max).clamp(0.0, 1.0);
    let hp_bonus = CAPTURE_MAX_HP_BONUS * lost;
    let overall = (base + hp_bonus).min(CAPTURE_MAX_RATE);
    CaptureRates {
        base,
        hp_bonus,
        overall,
        per_check: cbrt(overall),
    }
}

/// Roll the three checks in order, stopping at the first failure.
pub fn attempt<R: Rng>(
    rng: &mut R,
    encounter: &WildEncounter,
    side: Side,
    timings: [Timing; CAPTURE_CHECKS],
) -> CaptureAttempt {
    let rates = rates(encounter);
    let mut checks = [None; CAPTURE_CHECKS];
    let mut success = true;
    for (slot, timing) in checks.iter_mut().zip(timings) {
        let p = (rates.per_check + timing.adjustment()).clamp(0.0, 1.0);
        let pass = rng.random_bool(p);
        *slot = Some(pass);
        if !pass {
            success = false;
            break;
        }
    }
    CaptureAttempt {
        species: encounter.species,
        side,
        rates,
        checks,
        success,
    }
}

/// First free enterable tile around `around`, cardinals before diagonals.
pub fn spawn_tile(board: &Board, units: &[Unit], around: Pos) -> Option<Pos> {
    around
        .surrounding()
        .find(|&p| board.terrain(p).is_passable() && units.iter().all(|u| u.pos != p))
}

/// Roll for a wild encounter after `unit` commits a move onto its tile.
pub fn roll_encounter<R: Rng>(
    rng: &mut R,
    board: &Board,
    units: &[Unit],
    unit: &Unit,
) -> Option<WildEncounter> {
    if !board.terrain(unit.pos).props().encounter || !rng.random_bool(ENCOUNTER_CHANCE) {
        return None;
    }
    let spawn = spawn_tile(board, units, unit.pos)?;
    let species = WILD_POOL[rng.random_range(0..WILD_POOL.len())];
    let max = species.template().stats.hp;
    let hp = rng.random_range(max.div_ceil(2)..=max);
    Some(WildEncounter {
        trigger: unit.id,
        species,
        hp,
        spawn,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::species::ids;

    fn encounter(hp_fraction: f64) -> WildEncounter {
        let max = ids::PIKACHU.template().stats.hp;
        WildEncounter {
            trigger: UnitId(1),
            species: ids::PIKACHU,
            hp: (max as f64 * hp_fraction) as u16,
            spawn: Pos::new(0, 0),
        }
    }

    #[test]
    fn bands_follow_stat_total() {
        assert_eq!(base_rate(ids::CHARMANDER), 0.45);
        assert_eq!(base_rate(ids::PIKACHU), 0.35);
        assert_eq!(base_rate(ids::CHARIZARD), 0.25);
        assert_eq!(base_rate(ids::DRAGONITE), CAPTURE_RATE_FLOOR);
    }

    #[test]
    fn hp_bonus_scales_with_damage() {
        let full = rates(&encounter(1.0));
        let half = rates(&encounter(0.5));
        assert_eq!(full.hp_bonus, 0.0);
        assert!((half.hp_bonus - 0.15).abs() < 1e-9);
        assert!((half.per_check.powi(3) - half.overall).abs() < 1e-9);
    }

    #[test]
    fn overall_is_capped() {
        let mut e = encounter(0.0);
        e.species = ids::CHARMANDER;
        let r = rates(&e);
        assert!(r.overall <= CAPTURE_MAX_RATE);
    }
}
