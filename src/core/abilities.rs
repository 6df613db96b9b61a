//! Passive ability hooks consulted during damage resolution.

use super::element::Element;
use super::species::{Ability, Category, Move, StatusCondition};
use super::unit::Unit;

/// Health ratio under which the starter abilities kick in.
const PINCH_RATIO: f64 = 1.0 / 3.0;
const STATIC_CHANCE: f64 = 0.30;

/// Outgoing damage multiplier from the attacker's ability.
pub fn attack_modifier(attacker: &Unit, mv: &Move) -> f64 {
    let pinch = attacker.hp_ratio() < PINCH_RATIO;
    match attacker.template().ability {
        Ability::Blaze if pinch && mv.element == Element::Fire => 1.5,
        Ability::Torrent if pinch && mv.element == Element::Water => 1.5,
        Ability::Overgrow if pinch && mv.element == Element::Grass => 1.5,
        Ability::Guts if attacker.status.is_some() && mv.category == Category::Physical => 1.5,
        Ability::Technician if mv.power > 0 && mv.power <= 60 => 1.5,
        _ => 1.0,
    }
}

/// Incoming damage multiplier from the defender's ability. Zero means immune.
pub fn defense_modifier(defender: &Unit, mv: &Move) -> f64 {
    match defender.template().ability {
        Ability::ThickFat if matches!(mv.element, Element::Fire | Element::Ice) => 0.5,
        Ability::FlashFire if mv.element == Element::Fire => 0.0,
        Ability::Levitate if mv.element == Element::Ground => 0.0,
        Ability::Multiscale if defender.is_full_hp() => 0.5,
        _ => 1.0,
    }
}

/// Damage after Sturdy: a full-health holder survives any single hit at 1 HP.
pub fn apply_sturdy(defender: &Unit, damage: u16) -> u16 {
    if defender.template().ability == Ability::Sturdy
        && defender.is_full_hp()
        && damage >= defender.hp
        && defender.hp > 1
    {
        defender.hp - 1
    } else {
        damage
    }
}

/// Status the defender's ability throws back at a physical attacker, given
/// a uniform roll in `[0, 1)`.
pub fn contact_reaction(defender: &Unit, mv: &Move, roll: f64) -> Option<StatusCondition> {
    if mv.category != Category::Physical {
        return None;
    }
    match defender.template().ability {
        Ability::Static if roll < STATIC_CHANCE => Some(StatusCondition::Paralysis),
        _ => None,
    }
}

/// Abilities that can change a hit's damage, for result reporting.
pub fn modifies(attacker: &Unit, defender: &Unit, mv: &Move) -> Option<Ability> {
    if attack_modifier(attacker, mv) != 1.0 {
        Some(attacker.template().ability)
    } else if defense_modifier(defender, mv) != 1.0 {
        Some(defender.template().ability)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::common::{Pos, Side, UnitId};
    use crate::core::species::{ids, EARTHQUAKE, EMBER, TACKLE};

    fn unit(species: crate::core::species::SpeciesId) -> Unit {
        Unit::new(UnitId(1), Side::P1, species, Pos::new(0, 0))
    }

    #[test]
    fn blaze_needs_a_pinch() {
        let mut charmander = unit(ids::CHARMANDER);
        assert_eq!(attack_modifier(&charmander, &EMBER), 1.0);
        charmander.hp = 1;
        assert_eq!(attack_modifier(&charmander, &EMBER), 1.5);
        assert_eq!(attack_modifier(&charmander, &TACKLE), 1.0);
    }

    #[test]
    fn levitate_ignores_ground() {
        let gastly = unit(ids::GASTLY);
        assert_eq!(defense_modifier(&gastly, &EARTHQUAKE), 0.0);
    }

    #[test]
    fn sturdy_leaves_one_hp() {
        let geodude = unit(ids::GEODUDE);
        assert_eq!(apply_sturdy(&geodude, 500), geodude.hp - 1);
        let mut hurt = geodude.clone();
        hurt.hp -= 1;
        assert_eq!(apply_sturdy(&hurt, 500), 500);
    }
}
