//! Turn context, phases and the transition table.

use alloc::vec::Vec;

use super::capture::WildEncounter;
use super::common::{ActionError, Pos, Side, UnitId};
use super::config::TileMask;
use super::species::SpeciesId;

/// Where the side to act is within one unit's action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    Selecting,
    Moving {
        unit: UnitId,
    },
    ActionMenu {
        unit: UnitId,
        destination: Pos,
        /// The unit already stands on `destination`; it can no longer change.
        committed: bool,
    },
    Attacking {
        unit: UnitId,
    },
    Capturing {
        unit: UnitId,
    },
    Evolving {
        unit: UnitId,
    },
}

/// Phase without its payload, for the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum PhaseKind {
    Selecting,
    Moving,
    ActionMenu,
    Attacking,
    Capturing,
    Evolving,
}

/// Every state-machine input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Transition {
    Select,
    ChooseDestination,
    CommitMove,
    Act,
    Attack,
    Wait,
    Capture,
    Flee,
    ConfirmEvolution,
    Cancel,
    EndTurn,
    ExpireTurn,
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Phase::Selecting => PhaseKind::Selecting,
            Phase::Moving { .. } => PhaseKind::Moving,
            Phase::ActionMenu { .. } => PhaseKind::ActionMenu,
            Phase::Attacking { .. } => PhaseKind::Attacking,
            Phase::Capturing { .. } => PhaseKind::Capturing,
            Phase::Evolving { .. } => PhaseKind::Evolving,
        }
    }

    /// The unit this phase is about, if any.
    pub fn unit(&self) -> Option<UnitId> {
        match *self {
            Phase::Selecting => None,
            Phase::Moving { unit }
            | Phase::ActionMenu { unit, .. }
            | Phase::Attacking { unit }
            | Phase::Capturing { unit }
            | Phase::Evolving { unit } => Some(unit),
        }
    }
}

use PhaseKind as K;
use Transition as T;

/// `(from, input, possible landing phases)`. Anything absent is illegal.
pub const TRANSITIONS: &[(PhaseKind, Transition, &[PhaseKind])] = &[
    (K::Selecting, T::Select, &[K::Moving]),
    (K::Selecting, T::EndTurn, &[K::Selecting]),
    (K::Selecting, T::ExpireTurn, &[K::Selecting]),
    (K::Moving, T::Select, &[K::Moving]),
    (K::Moving, T::ChooseDestination, &[K::ActionMenu]),
    (K::Moving, T::Cancel, &[K::Selecting]),
    (K::Moving, T::EndTurn, &[K::Selecting]),
    (K::Moving, T::ExpireTurn, &[K::Selecting]),
    (K::ActionMenu, T::ChooseDestination, &[K::ActionMenu]),
    (K::ActionMenu, T::CommitMove, &[K::ActionMenu, K::Capturing]),
    (
        K::ActionMenu,
        T::Act,
        &[K::Attacking, K::Selecting, K::Evolving, K::Capturing],
    ),
    (K::ActionMenu, T::Attack, &[K::Selecting, K::Evolving, K::Capturing]),
    (K::ActionMenu, T::Wait, &[K::Selecting, K::Capturing]),
    (K::ActionMenu, T::Cancel, &[K::Selecting]),
    (K::ActionMenu, T::EndTurn, &[K::Selecting]),
    (K::ActionMenu, T::ExpireTurn, &[K::Selecting]),
    (K::Attacking, T::Attack, &[K::Selecting, K::Evolving]),
    (K::Attacking, T::Wait, &[K::Selecting]),
    (K::Attacking, T::Cancel, &[K::ActionMenu]),
    (K::Attacking, T::EndTurn, &[K::Selecting]),
    (K::Attacking, T::ExpireTurn, &[K::Selecting]),
    (K::Capturing, T::Capture, &[K::Selecting]),
    (K::Capturing, T::Flee, &[K::Selecting]),
    (K::Capturing, T::ExpireTurn, &[K::Selecting]),
    (K::Evolving, T::ConfirmEvolution, &[K::Selecting]),
    (K::Evolving, T::ExpireTurn, &[K::Selecting]),
];

fn landings(from: PhaseKind, transition: Transition) -> Option<&'static [PhaseKind]> {
    TRANSITIONS
        .iter()
        .find(|(f, t, _)| *f == from && *t == transition)
        .map(|(_, _, to)| *to)
}

/// Reject a transition the table does not list for `from`.
pub fn check(from: PhaseKind, transition: Transition) -> Result<(), ActionError> {
    landings(from, transition)
        .map(|_| ())
        .ok_or(ActionError::IllegalTransition {
            phase: from,
            transition,
        })
}

/// True when the table allows `transition` to land in `to`.
pub fn lands_in(from: PhaseKind, transition: Transition, to: PhaseKind) -> bool {
    landings(from, transition).is_some_and(|l| l.contains(&to))
}

/// Cross-phase data waiting for a later transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Deferred {
    Evolution { unit: UnitId, into: SpeciesId },
    Encounter(WildEncounter),
}

/// Authoritative per-turn state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnContext {
    pub side: Side,
    /// Starts at 1; bumps when play returns to [`Side::P1`].
    pub turn: u32,
    pub phase: Phase,
    /// Cached movement range of the selected unit.
    pub movement: TileMask,
    /// Cached attack targets from the provisional destination.
    pub targets: TileMask,
    deferred: Vec<Deferred>,
}

impl TurnContext {
    pub fn new() -> Self {
        TurnContext {
            side: Side::P1,
            turn: 1,
            phase: Phase::Selecting,
            movement: TileMask::new(),
            targets: TileMask::new(),
            deferred: Vec::new(),
        }
    }

    /// Back to `Selecting` with empty caches.
    pub fn reset_phase(&mut self) {
        self.phase = Phase::Selecting;
        self.movement.clear_all();
        self.targets.clear_all();
    }

    pub fn defer(&mut self, event: Deferred) {
        self.deferred.push(event);
    }

    pub fn deferred(&self) -> &[Deferred] {
        &self.deferred
    }

    pub fn take_evolution(&mut self) -> Option<(UnitId, SpeciesId)> {
        let idx = self
            .deferred
            .iter()
            .position(|d| matches!(d, Deferred::Evolution { .. }))?;
        match self.deferred.remove(idx) {
            Deferred::Evolution { unit, into } => Some((unit, into)),
            Deferred::Encounter(_) => None,
        }
    }

    pub fn take_encounter(&mut self) -> Option<WildEncounter> {
        let idx = self
            .deferred
            .iter()
            .position(|d| matches!(d, Deferred::Encounter(_)))?;
        match self.deferred.remove(idx) {
            Deferred::Encounter(e) => Some(e),
            Deferred::Evolution { .. } => None,
        }
    }

    pub fn pending_encounter(&self) -> Option<&WildEncounter> {
        self.deferred.iter().find_map(|d| match d {
            Deferred::Encounter(e) => Some(e),
            _ => None,
        })
    }

    pub fn pending_evolution(&self) -> Option<(UnitId, SpeciesId)> {
        self.deferred.iter().find_map(|d| match *d {
            Deferred::Evolution { unit, into } => Some((unit, into)),
            _ => None,
        })
    }
}

impl Default for TurnContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rejects_unknown_pairs() {
        assert!(check(PhaseKind::Selecting, Transition::Select).is_ok());
        assert_eq!(
            check(PhaseKind::Capturing, Transition::EndTurn),
            Err(ActionError::IllegalTransition {
                phase: PhaseKind::Capturing,
                transition: Transition::EndTurn,
            })
        );
        assert!(check(PhaseKind::Evolving, Transition::Attack).is_err());
    }

    #[test]
    fn every_phase_can_expire() {
        for kind in [
            PhaseKind::Selecting,
            PhaseKind::Moving,
            PhaseKind::ActionMenu,
            PhaseKind::Attacking,
            PhaseKind::Capturing,
            PhaseKind::Evolving,
        ] {
            assert!(lands_in(kind, Transition::ExpireTurn, PhaseKind::Selecting));
        }
    }

    #[test]
    fn deferred_events_are_taken_by_name() {
        let mut ctx = TurnContext::new();
        ctx.defer(Deferred::Evolution {
            unit: UnitId(3),
            into: SpeciesId(1),
        });
        assert!(ctx.take_encounter().is_none());
        assert_eq!(ctx.take_evolution(), Some((UnitId(3), SpeciesId(1))));
        assert!(ctx.deferred().is_empty());
    }
}
