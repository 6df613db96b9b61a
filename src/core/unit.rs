//! Units in play and their species forms.

use super::common::{Pos, Side, UnitId};
use super::config::KILLS_TO_EVOLVE;
use super::species::{Move, Species, SpeciesId, StatusCondition, STRUGGLE};

/// Most moves a species can know.
pub const MAX_MOVES: usize = 4;

/// The species template a unit currently fights as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Form {
    Base(SpeciesId),
    Evolved { species: SpeciesId, from: SpeciesId },
}

impl Form {
    pub fn species(self) -> SpeciesId {
        match self {
            Form::Base(id) => id,
            Form::Evolved { species, .. } => species,
        }
    }

    pub fn template(self) -> &'static Species {
        self.species().template()
    }
}

/// A unit on the battlefield.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit {
    pub id: UnitId,
    pub side: Side,
    pub form: Form,
    pub pos: Pos,
    pub hp: u16,
    /// Remaining uses per move slot.
    pub uses: [u8; MAX_MOVES],
    pub has_acted: bool,
    pub kills: u16,
    pub status: Option<StatusCondition>,
    /// Turns the current status has been held.
    pub status_turns: u8,
}

impl Unit {
    /// Fresh unit at full health and full uses.
    pub fn new(id: UnitId, side: Side, species: SpeciesId, pos: Pos) -> Self {
        let mut unit = Unit {
            id,
            side,
            form: Form::Base(species),
            pos,
            hp: 0,
            uses: [0; MAX_MOVES],
            has_acted: false,
            kills: 0,
            status: None,
            status_turns: 0,
        };
        unit.restore();
        unit
    }

    pub fn template(&self) -> &'static Species {
        self.form.template()
    }

    pub fn max_hp(&self) -> u16 {
        self.template().stats.hp
    }

    pub fn is_full_hp(&self) -> bool {
        self.hp >= self.max_hp()
    }

    /// Fraction of health remaining, in `[0, 1]`.
    pub fn hp_ratio(&self) -> f64 {
        self.hp as f64 / self.max_hp().max(1) as f64
    }

    /// Subtract damage, saturating at zero. Returns the health actually lost.
    pub fn take_damage(&mut self, amount: u16) -> u16 {
        let lost = amount.min(self.hp);
        self.hp -= lost;
        lost
    }

    /// Heal a percentage of max health. Returns the amount restored.
    pub fn heal_percent(&mut self, percent: u32) -> u16 {
        let max = self.max_hp();
        let amount = (max as u32 * percent / 100).max(1) as u16;
        let healed = amount.min(max.saturating_sub(self.hp));
        self.hp += healed;
        healed
    }

    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    /// Known move in `slot`, if any.
    pub fn move_at(&self, slot: usize) -> Option<&'static Move> {
        self.template().moves.get(slot)
    }

    /// Slots of damaging moves with uses left, in slot order.
    pub fn damaging_slots(&self) -> impl Iterator<Item = usize> + '_ {
        self.template()
            .moves
            .iter()
            .enumerate()
            .filter(move |(i, m)| m.is_damaging() && self.uses[*i] > 0)
            .map(|(i, _)| i)
    }

    /// True once no damaging move has uses left.
    pub fn must_struggle(&self) -> bool {
        self.damaging_slots().next().is_none()
    }

    /// Longest reach among damaging moves with uses left.
    pub fn attack_range(&self) -> u8 {
        if self.must_struggle() {
            return STRUGGLE.range;
        }
        self.damaging_slots()
            .filter_map(|i| self.move_at(i))
            .map(|m| m.range)
            .max()
            .unwrap_or(0)
    }

    /// Kill count needed before the next evolution.
    pub fn kills_needed(&self) -> u16 {
        KILLS_TO_EVOLVE * (self.template().stage as u16 + 1)
    }

    /// The form this unit would evolve into now, if it qualifies.
    pub fn pending_evolution(&self) -> Option<SpeciesId> {
        let next = self.template().evolves_to?;
        (self.kills >= self.kills_needed()).then_some(next)
    }

    /// Replace the template wholesale, restoring health and uses.
    pub fn evolve(&mut self, into: SpeciesId) {
        let from = self.form.species();
        self.form = Form::Evolved {
            species: into,
            from,
        };
        self.restore();
    }

    fn restore(&mut self) {
        let template = self.template();
        self.hp = template.stats.hp;
        self.uses = [0; MAX_MOVES];
        for (slot, m) in self.uses.iter_mut().zip(template.moves.iter()) {
            *slot = m.max_uses;
        }
    }
}
