//! Start-of-turn status effects.

use libm::floor;
use rand::Rng;

use super::common::UnitId;
use super::species::StatusCondition;
use super::unit::Unit;

const BURN_CHIP: f64 = 0.06;
const POISON_CHIP: f64 = 0.12;
const PARALYSIS_SKIP: f64 = 0.25;
const SLEEP_WAKE: f64 = 0.5;
const SLEEP_MAX_TURNS: u8 = 3;
const FREEZE_THAW: f64 = 0.20;
const FREEZE_MAX_TURNS: u8 = 2;

/// What a status did to a unit at the start of its side's turn.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusTick {
    pub unit: UnitId,
    pub status: StatusCondition,
    pub damage: u16,
    /// The unit loses this turn's action.
    pub skipped: bool,
    /// The status wore off.
    pub cured: bool,
}

fn chip(unit: &Unit, fraction: f64) -> u16 {
    (floor(unit.max_hp() as f64 * fraction) as u16).max(1)
}

/// Apply one tick of `unit`'s status. Chip damage may leave it at 0 HP; the
/// caller removes fainted units.
pub fn tick<R: Rng>(rng: &mut R, unit: &mut Unit) -> Option<StatusTick> {
    let status = unit.status?;
    let held = unit.status_turns;
    let mut out = StatusTick {
        unit: unit.id,
        status,
        damage: 0,
        skipped: false,
        cured: false,
    };
    match status {
        StatusCondition::Burn => out.damage = unit.take_damage(chip(unit, BURN_CHIP)),
        StatusCondition::Poison => out.damage = unit.take_damage(chip(unit, POISON_CHIP)),
        StatusCondition::Paralysis => out.skipped = rng.random_bool(PARALYSIS_SKIP),
        StatusCondition::Sleep => {
            let wakes = held >= SLEEP_MAX_TURNS || (held >= 1 && rng.random_bool(SLEEP_WAKE));
            out.cured = wakes;
            out.skipped = !wakes;
        }
        StatusCondition::Freeze => {
            let thaws = held >= FREEZE_MAX_TURNS || rng.random_bool(FREEZE_THAW);
            out.cured = thaws;
            out.skipped = !thaws;
        }
    }
    if out.cured {
        unit.status = None;
        unit.status_turns = 0;
    } else {
        unit.status_turns = held.saturating_add(1);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::common::{Pos, Side};
    use crate::core::species::ids;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn poison_chips_twelve_percent() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut unit = Unit::new(UnitId(1), Side::P1, ids::VENUSAUR, Pos::new(0, 0));
        unit.status = Some(StatusCondition::Poison);
        let tick = tick(&mut rng, &mut unit).unwrap();
        assert_eq!(tick.damage, 15);
        assert_eq!(unit.hp, unit.max_hp() - 15);
    }

    #[test]
    fn sleep_always_ends() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut unit = Unit::new(UnitId(1), Side::P1, ids::RALTS, Pos::new(0, 0));
        unit.status = Some(StatusCondition::Sleep);
        let mut turns = 0;
        while unit.status.is_some() {
            tick(&mut rng, &mut unit);
            turns += 1;
            assert!(turns <= SLEEP_MAX_TURNS as usize + 1);
        }
    }

    #[test]
    fn healthy_units_do_not_tick() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut unit = Unit::new(UnitId(1), Side::P1, ids::RALTS, Pos::new(0, 0));
        assert!(tick(&mut rng, &mut unit).is_none());
    }
}
