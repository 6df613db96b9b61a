//! Attack range and combat resolution.
//!
//! One exchange is an attack plus an optional counter. Each side rolls its
//! own accuracy, critical hit and variance. Damage is
//!
//! ```text
//! base  = max(1, attack * effectiveness * terrain_attack - defense * terrain_defense)
//! final = max(1, floor(base * stab * abilities * crit * variance * counter_penalty))
//! ```
//!
//! with an ability immunity forcing the final value to zero.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use libm::floor;
use rand::Rng;

use super::abilities;
use super::board::Board;
use super::common::{ActionError, Pos, UnitId};
use super::config::{
    TileMask, COUNTER_DAMAGE_PENALTY, CRIT_CHANCE, CRIT_MULTIPLIER, DAMAGE_VARIANCE,
    STAB_MULTIPLIER, TERRAIN_TYPE_BONUS,
};
use super::element::effectiveness;
use super::species::{Ability, Category, Move, SpeciesId, StatusCondition, STRUGGLE};
use super::terrain::Terrain;
use super::unit::Unit;

/// One side's half of an exchange.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Strike {
    pub attacker: UnitId,
    pub defender: UnitId,
    pub move_name: String,
    /// `None` for Struggle.
    pub slot: Option<u8>,
    pub damage: u16,
    pub effectiveness: f64,
    pub same_type: bool,
    pub critical: bool,
    pub missed: bool,
    /// Ability that changed this strike's damage.
    pub ability: Option<Ability>,
    /// Status applied to the defender by this strike.
    pub inflicted: Option<StatusCondition>,
    /// Status thrown back at the attacker by the defender's ability.
    pub recoil_status: Option<StatusCondition>,
}

/// Result of a full exchange.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatOutcome {
    pub strike: Strike,
    pub counter: Option<Strike>,
    pub attacker_fainted: bool,
    pub defender_fainted: bool,
    /// Survivor that now qualifies for its next form.
    pub evolution: Option<(UnitId, SpeciesId)>,
}

/// Terrain both combatants stand on.
#[derive(Debug, Clone, Copy)]
pub struct Footing {
    pub attacker: Terrain,
    pub defender: Terrain,
}

impl Footing {
    pub fn of(board: &Board, attacker: Pos, defender: Pos) -> Self {
        Footing {
            attacker: board.terrain(attacker),
            defender: board.terrain(defender),
        }
    }
}

/// Enemy-occupied tiles `unit` could hit if it stood on `from`.
pub fn attack_targets(units: &[Unit], unit: &Unit, from: Pos) -> TileMask {
    let reach = unit.attack_range();
    units
        .iter()
        .filter(|u| u.side != unit.side && from.distance(u.pos) <= reach)
        .map(|u| (u.pos.x as usize, u.pos.y as usize))
        .collect()
}

/// The move in `slot` if it is known, has uses and reaches `distance`.
/// `None` picks Struggle, which is only allowed once every damaging move is
/// spent.
pub fn usable_move(
    unit: &Unit,
    slot: Option<usize>,
    distance: u8,
) -> Result<&'static Move, ActionError> {
    match slot {
        Some(i) => {
            let mv = unit.move_at(i).ok_or(ActionError::InvalidMove(i as u8))?;
            if unit.uses[i] == 0 || mv.range < distance {
                return Err(ActionError::InvalidMove(i as u8));
            }
            Ok(mv)
        }
        None if unit.must_struggle() && STRUGGLE.range >= distance => Ok(&STRUGGLE),
        None => Err(ActionError::InvalidMove(u8::MAX)),
    }
}

/// Deterministic pre-roll damage: no crit, no variance, no miss.
pub fn base_damage(attacker: &Unit, defender: &Unit, mv: &Move, footing: Footing) -> f64 {
    if !mv.is_damaging() {
        return 0.0;
    }
    let (atk, def) = match mv.category {
        Category::Physical => (
            attacker.template().stats.atk,
            defender.template().stats.def,
        ),
        _ => (
            attacker.template().stats.spa,
            defender.template().stats.spd,
        ),
    };
    let mut atk = atk as f64;
    if attacker.status == Some(StatusCondition::Burn) && mv.category == Category::Physical {
        atk = floor(atk * 0.5);
    }
    let eff = effectiveness(mv.element, defender.template().types);
    let terrain_attack = if footing.attacker.favours(attacker.template().types) {
        TERRAIN_TYPE_BONUS
    } else {
        1.0
    };
    let raw = atk * eff * terrain_attack - def as f64 * footing.defender.defense_multiplier();
    let base = raw.max(1.0);
    let stab = if attacker.template().has_type(mv.element) {
        STAB_MULTIPLIER
    } else {
        1.0
    };
    base * stab
        * abilities::attack_modifier(attacker, mv)
        * abilities::defense_modifier(defender, mv)
}

/// Expected damage for planning, ignoring accuracy.
pub fn estimate(attacker: &Unit, defender: &Unit, mv: &Move, footing: Footing) -> u16 {
    let dmg = base_damage(attacker, defender, mv, footing);
    if abilities::defense_modifier(defender, mv) == 0.0 || !mv.is_damaging() {
        0
    } else {
        (floor(dmg) as u16).max(1)
    }
}

/// Highest expected-value usable move against `defender` from `distance`.
pub fn best_move(
    attacker: &Unit,
    defender: &Unit,
    distance: u8,
    footing: Footing,
) -> Option<(Option<usize>, &'static Move)> {
    if attacker.must_struggle() {
        return (STRUGGLE.range >= distance).then_some((None, &STRUGGLE));
    }
    attacker
        .damaging_slots()
        .filter_map(|i| attacker.move_at(i).map(|m| (i, m)))
        .filter(|(_, m)| m.range >= distance)
        .map(|(i, m)| {
            let ev = estimate(attacker, defender, m, footing) as f64 * m.accuracy as f64;
            (i, m, ev)
        })
        .fold(None, |best: Option<(usize, &'static Move, f64)>, cur| match best {
            Some(b) if b.2 >= cur.2 => Some(b),
            _ => Some(cur),
        })
        .map(|(i, m, _)| (Some(i), m))
}

/// The defender's reply: first damaging move with uses that reaches.
pub fn counter_move(defender: &Unit, distance: u8) -> Option<(Option<usize>, &'static Move)> {
    if defender.must_struggle() {
        return (STRUGGLE.range >= distance).then_some((None, &STRUGGLE));
    }
    defender
        .damaging_slots()
        .filter_map(|i| defender.move_at(i).map(|m| (i, m)))
        .find(|(_, m)| m.range >= distance)
        .map(|(i, m)| (Some(i), m))
}

/// Roll one strike. Does not mutate either unit.
pub fn roll_strike<R: Rng>(
    rng: &mut R,
    attacker: &Unit,
    defender: &Unit,
    slot: Option<usize>,
    mv: &Move,
    footing: Footing,
    counter: bool,
) -> Strike {
    let mut strike = Strike {
        attacker: attacker.id,
        defender: defender.id,
        move_name: mv.name.to_string(),
        slot: slot.map(|s| s as u8),
        damage: 0,
        effectiveness: 1.0,
        same_type: false,
        critical: false,
        missed: false,
        ability: None,
        inflicted: None,
        recoil_status: None,
    };
    if mv.accuracy < 100 && rng.random_range(0..100u8) >= mv.accuracy {
        strike.missed = true;
        return strike;
    }
    if mv.is_damaging() {
        strike.effectiveness = effectiveness(mv.element, defender.template().types);
        strike.same_type = attacker.template().has_type(mv.element);
        strike.ability = abilities::modifies(attacker, defender, mv);
        let critical = rng.random_bool(CRIT_CHANCE);
        let variance = rng.random_range(1.0 - DAMAGE_VARIANCE..=1.0 + DAMAGE_VARIANCE);
        let mut dmg = base_damage(attacker, defender, mv, footing) * variance;
        if critical {
            dmg *= CRIT_MULTIPLIER;
        }
        if counter {
            dmg *= COUNTER_DAMAGE_PENALTY;
        }
        strike.critical = critical;
        strike.damage = if abilities::defense_modifier(defender, mv) == 0.0 {
            0
        } else {
            let raw = (floor(dmg) as u16).max(1);
            abilities::apply_sturdy(defender, raw)
        };
    }
    if let Some(sec) = mv.secondary {
        let lands = sec.chance >= 100 || rng.random_range(0..100u8) < sec.chance;
        let survives = strike.damage < defender.hp;
        if lands && survives && defender.status.is_none() {
            strike.inflicted = Some(sec.status);
        }
    }
    if mv.category == Category::Physical && strike.damage > 0 && attacker.status.is_none() {
        strike.recoil_status = abilities::contact_reaction(defender, mv, rng.random::<f64>());
    }
    strike
}

fn apply_strike(units: &mut [Unit], strike: &Strike) {
    if let Some(def) = units.iter_mut().find(|u| u.id == strike.defender) {
        def.take_damage(strike.damage);
        if let Some(status) = strike.inflicted {
            if def.status.is_none() && !def.is_fainted() {
                def.status = Some(status);
                def.status_turns = 0;
            }
        }
    }
    if let Some(status) = strike.recoil_status {
        if let Some(att) = units.iter_mut().find(|u| u.id == strike.attacker) {
            if att.status.is_none() {
                att.status = Some(status);
                att.status_turns = 0;
            }
        }
    }
}

fn spend(units: &mut [Unit], id: UnitId, slot: Option<u8>) {
    if let (Some(unit), Some(slot)) = (units.iter_mut().find(|u| u.id == id), slot) {
        if let Some(uses) = unit.uses.get_mut(slot as usize) {
            *uses = uses.saturating_sub(1);
        }
    }
}

fn credit_kill(units: &mut [Unit], killer: UnitId) -> Option<(UnitId, SpeciesId)> {
    let unit = units.iter_mut().find(|u| u.id == killer)?;
    unit.kills += 1;
    unit.pending_evolution().map(|next| (unit.id, next))
}

/// Resolve a full exchange between two units already in position.
///
/// Fainted units are removed from `units` before returning.
pub fn resolve_exchange<R: Rng>(
    rng: &mut R,
    board: &Board,
    units: &mut Vec<Unit>,
    attacker_id: UnitId,
    defender_id: UnitId,
    slot: Option<usize>,
) -> Result<CombatOutcome, ActionError> {
    let attacker = units
        .iter()
        .find(|u| u.id == attacker_id)
        .cloned()
        .ok_or(ActionError::UnknownUnit(attacker_id))?;
    let defender = units
        .iter()
        .find(|u| u.id == defender_id)
        .cloned()
        .ok_or(ActionError::UnknownUnit(defender_id))?;
    if attacker.side == defender.side {
        return Err(ActionError::NoTarget(defender.pos));
    }
    let distance = attacker.pos.distance(defender.pos);
    if distance > attacker.attack_range() {
        return Err(ActionError::NoTarget(defender.pos));
    }
    let mv = usable_move(&attacker, slot, distance)?;

    let footing = Footing::of(board, attacker.pos, defender.pos);
    let strike = roll_strike(rng, &attacker, &defender, slot, mv, footing, false);
    spend(units, attacker.id, strike.slot);
    apply_strike(units, &strike);

    let defender_fainted = units
        .iter()
        .find(|u| u.id == defender_id)
        .map_or(true, |u| u.is_fainted());

    let mut counter = None;
    if !defender_fainted && mv.priority <= 0 {
        // Re-read both: the strike may have changed status or health.
        let attacker_now = units.iter().find(|u| u.id == attacker_id).cloned();
        let defender_now = units.iter().find(|u| u.id == defender_id).cloned();
        if let (Some(att), Some(def)) = (attacker_now, defender_now) {
            if let Some((cslot, cmv)) = counter_move(&def, distance) {
                let reply_footing = Footing::of(board, def.pos, att.pos);
                let reply = roll_strike(rng, &def, &att, cslot, cmv, reply_footing, true);
                spend(units, def.id, reply.slot);
                apply_strike(units, &reply);
                counter = Some(reply);
            }
        }
    }

    let attacker_fainted = units
        .iter()
        .find(|u| u.id == attacker_id)
        .map_or(true, |u| u.is_fainted());

    let evolution = if defender_fainted && !attacker_fainted {
        credit_kill(units, attacker_id)
    } else if attacker_fainted && !defender_fainted {
        credit_kill(units, defender_id)
    } else {
        None
    };

    units.retain(|u| !u.is_fainted());

    Ok(CombatOutcome {
        strike,
        counter,
        attacker_fainted,
        defender_fainted,
        evolution,
    })
}
