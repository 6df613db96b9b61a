//! The match engine.
//!
//! [`Match`] owns the authoritative state and applies one [`Intent`] at a
//! time. Every intent is checked against the phase transition table and
//! applied to a scratch copy, so a rejected intent leaves the match (its RNG
//! stream included) exactly as it was.

use alloc::vec::Vec;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::board::Board;
use super::capture::{self, CaptureAttempt, Timing, WildEncounter};
use super::combat::{self, CombatOutcome, Footing};
use super::common::{ActionError, Pos, Side, UnitId};
use super::config::{TileMask, BERRY_HEAL_PERCENT, CAPTURE_CHECKS, HEALING_TILE_PERCENT};
use super::movement;
use super::setup::{BoardSource, RandomSetup, Setup, SetupError};
use super::species::SpeciesId;
use super::status::{self, StatusTick};
use super::turn::{self, Deferred, Phase, PhaseKind, Transition, TurnContext};
use super::unit::Unit;
use super::vision::Visibility;

/// Whether the match is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchStatus {
    Playing,
    Finished { winner: Side },
}

/// A request from the side to act.
///
/// `Select`, `Destination`, `Act` and `Tile` drive the step-by-step hot-seat
/// flow. `Move`, `Attack` and `Wait` are self-contained so a networked client
/// can send them from any point before the unit commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Intent {
    Select { unit: UnitId },
    Destination { unit: UnitId, to: Pos },
    /// Commit a move without ending the unit's action.
    Move { unit: UnitId, to: Pos },
    /// Commit the provisional destination and fight or finish.
    Act { unit: UnitId },
    /// `slot: None` lets the engine pick the best usable move.
    Attack {
        unit: UnitId,
        target: Pos,
        slot: Option<u8>,
    },
    Wait { unit: UnitId },
    /// `throw: None` flees the encounter.
    Capture {
        unit: UnitId,
        throw: Option<[Timing; CAPTURE_CHECKS]>,
    },
    ConfirmEvolution { unit: UnitId },
    Cancel,
    EndTurn,
    /// A tile click, interpreted according to the current phase.
    Tile { pos: Pos },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum HealSource {
    Center,
    Berry,
}

/// Something that happened while applying an intent.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    Moved {
        unit: UnitId,
        from: Pos,
        to: Pos,
    },
    Encounter(WildEncounter),
    Attacked(CombatOutcome),
    Fainted {
        unit: UnitId,
        side: Side,
    },
    EvolutionQueued {
        unit: UnitId,
        into: SpeciesId,
    },
    Evolved {
        unit: UnitId,
        from: SpeciesId,
        into: SpeciesId,
    },
    Captured {
        attempt: CaptureAttempt,
        unit: UnitId,
    },
    CaptureFailed(CaptureAttempt),
    Fled {
        unit: UnitId,
    },
    Waited {
        unit: UnitId,
    },
    Healed {
        unit: UnitId,
        amount: u16,
        source: HealSource,
    },
    StatusTick(StatusTick),
    TurnEnded {
        next: Side,
        turn: u32,
        expired: bool,
    },
    MatchFinished {
        winner: Side,
    },
}

fn covers(mask: &TileMask, pos: Pos) -> bool {
    mask.contains(pos.x as usize, pos.y as usize)
}

/// Authoritative match state.
#[derive(Debug, Clone)]
pub struct Match {
    board: Board,
    units: Vec<Unit>,
    ctx: TurnContext,
    status: MatchStatus,
    vision: [Visibility; 2],
    next_id: u32,
    rng: SmallRng,
}

impl Match {
    /// Start a match from a validated setup. Unit ids are assigned from 1 in
    /// placement order.
    pub fn new(setup: Setup, seed: u64) -> Result<Self, SetupError> {
        Self::with_rng(setup, SmallRng::seed_from_u64(seed))
    }

    /// Quick match on a seeded random board.
    pub fn quick(seed: u64) -> Result<Self, SetupError> {
        let mut rng = SmallRng::seed_from_u64(seed);
        let setup = RandomSetup::default().generate(&mut rng)?;
        Self::with_rng(setup, rng)
    }

    fn with_rng(setup: Setup, rng: SmallRng) -> Result<Self, SetupError> {
        setup.validate()?;
        let Setup { board, placements } = setup;
        let units: Vec<Unit> = placements
            .iter()
            .zip(1u32..)
            .map(|(p, id)| Unit::new(UnitId(id), p.side, p.species, p.pos))
            .collect();
        let next_id = units.len() as u32 + 1;
        let mut game = Match {
            board,
            units,
            ctx: TurnContext::new(),
            status: MatchStatus::Playing,
            vision: [Visibility::default(); 2],
            next_id,
            rng,
        };
        game.refresh_vision();
        Ok(game)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn unit_at(&self, pos: Pos) -> Option<&Unit> {
        self.units.iter().find(|u| u.pos == pos)
    }

    pub fn side_to_act(&self) -> Side {
        self.ctx.side
    }

    pub fn turn(&self) -> u32 {
        self.ctx.turn
    }

    pub fn phase(&self) -> Phase {
        self.ctx.phase
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn winner(&self) -> Option<Side> {
        match self.status {
            MatchStatus::Finished { winner } => Some(winner),
            MatchStatus::Playing => None,
        }
    }

    pub fn visibility(&self, side: Side) -> &Visibility {
        &self.vision[side.index()]
    }

    pub fn context(&self) -> &TurnContext {
        &self.ctx
    }

    pub fn pending_encounter(&self) -> Option<&WildEncounter> {
        self.ctx.pending_encounter()
    }

    /// Apply one intent from `side`. On error nothing changes.
    pub fn apply(&mut self, side: Side, intent: Intent) -> Result<Vec<Event>, ActionError> {
        let mut next = self.clone();
        match next.step(side, intent) {
            Ok(events) => {
                next.refresh_vision();
                *self = next;
                Ok(events)
            }
            Err(e) => {
                log::debug!("rejected {:?} from {}: {}", intent, side, e);
                Err(e)
            }
        }
    }

    /// The turn timer fired: settle whatever is pending, let every unacted
    /// unit of the current side wait, and pass the turn.
    pub fn expire_turn(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        if self.winner().is_some() {
            return events;
        }
        let from = self.ctx.phase.kind();
        if let Err(e) = turn::check(from, Transition::ExpireTurn) {
            log::warn!("turn {} cannot expire: {}", self.ctx.turn, e);
            return events;
        }
        log::info!("turn {} expired for {}", self.ctx.turn, self.ctx.side);
        match self.ctx.phase {
            Phase::Capturing { unit } => {
                self.ctx.take_encounter();
                if let Some(u) = self.unit_mut(unit) {
                    u.has_acted = true;
                }
                events.push(Event::Fled { unit });
            }
            Phase::Evolving { .. } => {
                if let Some((id, into)) = self.ctx.take_evolution() {
                    self.evolve(id, into, &mut events);
                }
            }
            _ => {}
        }
        self.ctx.reset_phase();
        let side = self.ctx.side;
        let idle: Vec<UnitId> = self
            .units
            .iter()
            .filter(|u| u.side == side && !u.has_acted)
            .map(|u| u.id)
            .collect();
        for id in idle {
            self.settle_wait(id, &mut events);
        }
        self.turn_boundary(true, &mut events);
        self.refresh_vision();
        debug_assert!(turn::lands_in(
            from,
            Transition::ExpireTurn,
            self.ctx.phase.kind()
        ));
        events
    }

    fn step(&mut self, side: Side, intent: Intent) -> Result<Vec<Event>, ActionError> {
        if self.winner().is_some() {
            return Err(ActionError::MatchFinished);
        }
        if side != self.ctx.side {
            return Err(ActionError::NotYourTurn(self.ctx.side));
        }
        let mut events = Vec::new();
        match intent {
            Intent::Select { unit } => self.select(unit)?,
            Intent::Destination { unit, to } => self.choose_destination(unit, to)?,
            Intent::Move { unit, to } => self.move_to(unit, to, &mut events)?,
            Intent::Act { unit } => self.act(unit, &mut events)?,
            Intent::Attack { unit, target, slot } => {
                self.attack(unit, target, slot, &mut events)?
            }
            Intent::Wait { unit } => self.wait(unit, &mut events)?,
            Intent::Capture { unit, throw } => self.capture(unit, throw, &mut events)?,
            Intent::ConfirmEvolution { unit } => self.confirm_evolution(unit, &mut events)?,
            Intent::Cancel => self.cancel()?,
            Intent::EndTurn => self.transit(Transition::EndTurn, |m| {
                m.turn_boundary(false, &mut events);
                Ok(())
            })?,
            Intent::Tile { pos } => self.click(pos, &mut events)?,
        }
        Ok(events)
    }

    /// Run one table transition. It is rejected when the current phase has
    /// no row for it, or when `f` leaves the match in a phase the row does
    /// not list.
    fn transit<T>(
        &mut self,
        transition: Transition,
        f: impl FnOnce(&mut Self) -> Result<T, ActionError>,
    ) -> Result<T, ActionError> {
        let from = self.ctx.phase.kind();
        turn::check(from, transition)?;
        let out = f(self)?;
        let to = self.ctx.phase.kind();
        if !turn::lands_in(from, transition, to) {
            return Err(ActionError::UnexpectedLanding {
                from,
                transition,
                to,
            });
        }
        Ok(out)
    }

    fn illegal(&self, transition: Transition) -> ActionError {
        ActionError::IllegalTransition {
            phase: self.ctx.phase.kind(),
            transition,
        }
    }

    fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    fn find(&self, id: UnitId) -> Result<&Unit, ActionError> {
        self.unit(id).ok_or(ActionError::UnknownUnit(id))
    }

    /// An unacted unit of the side to act.
    fn ready_unit(&self, id: UnitId) -> Result<&Unit, ActionError> {
        let unit = self.find(id)?;
        if unit.side != self.ctx.side {
            return Err(ActionError::NotYourUnit(id));
        }
        if unit.has_acted {
            return Err(ActionError::AlreadyActed(id));
        }
        Ok(unit)
    }

    fn expect_unit(&self, got: UnitId) -> Result<(), ActionError> {
        match self.ctx.phase.unit() {
            Some(expected) if expected != got => Err(ActionError::UnitMismatch { expected, got }),
            _ => Ok(()),
        }
    }

    fn select(&mut self, id: UnitId) -> Result<(), ActionError> {
        self.transit(Transition::Select, |m| {
            let unit = m.ready_unit(id)?;
            let range = movement::movement_range(&m.board, &m.units, unit);
            m.ctx.reset_phase();
            m.ctx.movement = range;
            m.ctx.phase = Phase::Moving { unit: id };
            Ok(())
        })
    }

    fn choose_destination(&mut self, id: UnitId, to: Pos) -> Result<(), ActionError> {
        self.transit(Transition::ChooseDestination, |m| {
            m.expect_unit(id)?;
            if let Phase::ActionMenu {
                committed: true, ..
            } = m.ctx.phase
            {
                return Err(m.illegal(Transition::ChooseDestination));
            }
            if !to.in_bounds() {
                return Err(ActionError::OutOfBounds(to));
            }
            let unit = m.find(id)?;
            if to != unit.pos && !covers(&m.ctx.movement, to) {
                return Err(ActionError::OutOfRange(to));
            }
            m.ctx.targets = combat::attack_targets(&m.units, unit, to);
            m.ctx.phase = Phase::ActionMenu {
                unit: id,
                destination: to,
                committed: false,
            };
            Ok(())
        })
    }

    /// Bring `id` to the action menu from wherever the side currently is,
    /// staying put if no destination was chosen yet.
    fn reach_menu(&mut self, id: UnitId) -> Result<(), ActionError> {
        if self.ctx.phase.kind() == PhaseKind::Selecting
            || matches!(self.ctx.phase, Phase::Moving { unit } if unit != id)
        {
            self.select(id)?;
        }
        if let Phase::Moving { .. } = self.ctx.phase {
            let here = self.find(id)?.pos;
            self.choose_destination(id, here)?;
        }
        Ok(())
    }

    /// Move the selected unit onto its provisional destination. Returns
    /// true when the move started a wild encounter.
    fn commit(&mut self, events: &mut Vec<Event>) -> Result<bool, ActionError> {
        self.transit(Transition::CommitMove, |m| m.commit_move(events))
    }

    fn commit_move(&mut self, events: &mut Vec<Event>) -> Result<bool, ActionError> {
        let (id, to) = match self.ctx.phase {
            Phase::ActionMenu {
                committed: true, ..
            } => return Ok(false),
            Phase::ActionMenu {
                unit, destination, ..
            } => (unit, destination),
            _ => return Err(self.illegal(Transition::CommitMove)),
        };
        let unit = self.unit_mut(id).ok_or(ActionError::UnknownUnit(id))?;
        let from = unit.pos;
        unit.pos = to;
        let moved = unit.clone();
        self.ctx.phase = Phase::ActionMenu {
            unit: id,
            destination: to,
            committed: true,
        };
        if from == to {
            return Ok(false);
        }
        events.push(Event::Moved { unit: id, from, to });
        match capture::roll_encounter(&mut self.rng, &self.board, &self.units, &moved) {
            Some(encounter) => {
                log::debug!("{} met a wild {}", id, encounter.species);
                self.ctx.defer(Deferred::Encounter(encounter));
                self.ctx.phase = Phase::Capturing { unit: id };
                events.push(Event::Encounter(encounter));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn move_to(&mut self, id: UnitId, to: Pos, events: &mut Vec<Event>) -> Result<(), ActionError> {
        if matches!(
            self.ctx.phase.kind(),
            PhaseKind::Selecting | PhaseKind::Moving
        ) {
            if self.ctx.phase.unit() != Some(id) {
                self.select(id)?;
            }
        } else {
            self.expect_unit(id)?;
        }
        self.choose_destination(id, to)?;
        self.commit(events)?;
        Ok(())
    }

    fn act(&mut self, id: UnitId, events: &mut Vec<Event>) -> Result<(), ActionError> {
        self.transit(Transition::Act, |m| {
            m.expect_unit(id)?;
            if m.commit(events)? {
                return Ok(());
            }
            let targets: Vec<Pos> = m
                .ctx
                .targets
                .iter_set_bits()
                .map(|(x, y)| Pos::new(x as u8, y as u8))
                .collect();
            match targets.as_slice() {
                [] => m.finish_unit(id, events),
                [only] => m.resolve_attack(id, *only, None, events)?,
                _ => m.ctx.phase = Phase::Attacking { unit: id },
            }
            Ok(())
        })
    }

    fn attack(
        &mut self,
        id: UnitId,
        target: Pos,
        slot: Option<u8>,
        events: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        self.reach_menu(id)?;
        self.transit(Transition::Attack, |m| {
            m.expect_unit(id)?;
            if m.ctx.phase.kind() == PhaseKind::ActionMenu && m.commit(events)? {
                return Ok(());
            }
            m.resolve_attack(id, target, slot, events)
        })
    }

    fn resolve_attack(
        &mut self,
        id: UnitId,
        target: Pos,
        slot: Option<u8>,
        events: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        if !target.in_bounds() {
            return Err(ActionError::OutOfBounds(target));
        }
        if !covers(&self.ctx.targets, target) {
            return Err(ActionError::NoTarget(target));
        }
        let attacker = self.find(id)?.clone();
        let defender = self
            .units
            .iter()
            .find(|u| u.pos == target && u.side != attacker.side)
            .cloned()
            .ok_or(ActionError::NoTarget(target))?;
        let slot = match slot {
            Some(s) => Some(s as usize),
            None => {
                let footing = Footing::of(&self.board, attacker.pos, defender.pos);
                combat::best_move(&attacker, &defender, attacker.pos.distance(target), footing)
                    .map(|(s, _)| s)
                    .ok_or(ActionError::NoTarget(target))?
            }
        };
        let outcome = combat::resolve_exchange(
            &mut self.rng,
            &self.board,
            &mut self.units,
            id,
            defender.id,
            slot,
        )?;
        let evolution = outcome.evolution;
        let (attacker_fainted, defender_fainted) =
            (outcome.attacker_fainted, outcome.defender_fainted);
        events.push(Event::Attacked(outcome));
        if defender_fainted {
            events.push(Event::Fainted {
                unit: defender.id,
                side: defender.side,
            });
        }
        if attacker_fainted {
            events.push(Event::Fainted {
                unit: id,
                side: attacker.side,
            });
        }
        if self.check_finished(events) {
            return Ok(());
        }
        match evolution {
            Some((unit, into)) => {
                if let Some(u) = self.unit_mut(id) {
                    u.has_acted = true;
                }
                self.ctx.defer(Deferred::Evolution { unit, into });
                self.ctx.phase = Phase::Evolving { unit };
                events.push(Event::EvolutionQueued { unit, into });
            }
            None => self.finish_unit(id, events),
        }
        Ok(())
    }

    fn wait(&mut self, id: UnitId, events: &mut Vec<Event>) -> Result<(), ActionError> {
        self.reach_menu(id)?;
        self.transit(Transition::Wait, |m| {
            m.expect_unit(id)?;
            if m.ctx.phase.kind() == PhaseKind::ActionMenu && m.commit(events)? {
                return Ok(());
            }
            m.settle_wait(id, events);
            m.ctx.reset_phase();
            m.maybe_end_turn(events);
            Ok(())
        })
    }

    /// Wait bookkeeping shared with turn expiry: eat a berry, mark acted.
    fn settle_wait(&mut self, id: UnitId, events: &mut Vec<Event>) {
        let Some(pos) = self.unit(id).map(|u| u.pos) else {
            return;
        };
        if self.board.consume(pos) {
            if let Some(u) = self.unit_mut(id) {
                let amount = u.heal_percent(BERRY_HEAL_PERCENT);
                events.push(Event::Healed {
                    unit: id,
                    amount,
                    source: HealSource::Berry,
                });
            }
        }
        if let Some(u) = self.unit_mut(id) {
            u.has_acted = true;
        }
        events.push(Event::Waited { unit: id });
    }

    fn capture(
        &mut self,
        id: UnitId,
        throw: Option<[Timing; CAPTURE_CHECKS]>,
        events: &mut Vec<Event>,
    ) -> Result<(), ActionError> {
        let transition = match throw {
            Some(_) => Transition::Capture,
            None => Transition::Flee,
        };
        self.transit(transition, |m| {
            m.expect_unit(id)?;
            let encounter = m
                .ctx
                .take_encounter()
                .ok_or_else(|| m.illegal(transition))?;
            match throw {
                None => events.push(Event::Fled { unit: id }),
                Some(timings) => {
                    let side = m.ctx.side;
                    let attempt = capture::attempt(&mut m.rng, &encounter, side, timings);
                    if attempt.success {
                        let new_id = UnitId(m.next_id);
                        m.next_id += 1;
                        let mut caught =
                            Unit::new(new_id, side, encounter.species, encounter.spawn);
                        caught.has_acted = true;
                        m.units.push(caught);
                        log::info!("{} captured {} as {}", side, encounter.species, new_id);
                        events.push(Event::Captured {
                            attempt,
                            unit: new_id,
                        });
                    } else {
                        events.push(Event::CaptureFailed(attempt));
                    }
                }
            }
            m.finish_unit(id, events);
            Ok(())
        })
    }

    fn confirm_evolution(&mut self, id: UnitId, events: &mut Vec<Event>) -> Result<(), ActionError> {
        self.transit(Transition::ConfirmEvolution, |m| {
            m.expect_unit(id)?;
            let (unit, into) = m
                .ctx
                .take_evolution()
                .ok_or_else(|| m.illegal(Transition::ConfirmEvolution))?;
            m.evolve(unit, into, events);
            m.ctx.reset_phase();
            m.maybe_end_turn(events);
            Ok(())
        })
    }

    fn evolve(&mut self, id: UnitId, into: SpeciesId, events: &mut Vec<Event>) {
        if let Some(u) = self.unit_mut(id) {
            let from = u.form.species();
            u.evolve(into);
            log::info!("{} evolved from {} into {}", id, from, into);
            events.push(Event::Evolved {
                unit: id,
                from,
                into,
            });
        }
    }

    fn cancel(&mut self) -> Result<(), ActionError> {
        self.transit(Transition::Cancel, |m| {
            match m.ctx.phase {
                Phase::Moving { .. }
                | Phase::ActionMenu {
                    committed: false, ..
                } => m.ctx.reset_phase(),
                Phase::Attacking { unit } => {
                    let destination = m.find(unit)?.pos;
                    m.ctx.phase = Phase::ActionMenu {
                        unit,
                        destination,
                        committed: true,
                    };
                }
                _ => return Err(m.illegal(Transition::Cancel)),
            }
            Ok(())
        })
    }

    /// Hot-seat tile click.
    fn click(&mut self, pos: Pos, events: &mut Vec<Event>) -> Result<(), ActionError> {
        if !pos.in_bounds() {
            return Err(ActionError::OutOfBounds(pos));
        }
        let side = self.ctx.side;
        let own_ready = self
            .unit_at(pos)
            .filter(|u| u.side == side && !u.has_acted)
            .map(|u| u.id);
        let home = self.ctx.phase.unit().and_then(|id| self.unit(id)).map(|u| u.pos);
        let reachable = home == Some(pos) || covers(&self.ctx.movement, pos);
        match self.ctx.phase {
            Phase::Selecting => match own_ready {
                Some(id) => self.select(id),
                None => Ok(()),
            },
            Phase::Moving { unit } => match own_ready {
                Some(id) if id != unit => self.select(id),
                _ if reachable => self.choose_destination(unit, pos),
                _ => self.cancel(),
            },
            Phase::ActionMenu {
                unit,
                committed: false,
                ..
            } if reachable => self.choose_destination(unit, pos),
            Phase::ActionMenu { .. } => Ok(()),
            Phase::Attacking { unit } => self.attack(unit, pos, None, events),
            Phase::Capturing { .. } | Phase::Evolving { .. } => {
                Err(self.illegal(Transition::ChooseDestination))
            }
        }
    }

    fn finish_unit(&mut self, id: UnitId, events: &mut Vec<Event>) {
        if let Some(u) = self.unit_mut(id) {
            u.has_acted = true;
        }
        self.ctx.reset_phase();
        self.maybe_end_turn(events);
    }

    fn maybe_end_turn(&mut self, events: &mut Vec<Event>) {
        let side = self.ctx.side;
        if self.winner().is_none()
            && self
                .units
                .iter()
                .filter(|u| u.side == side)
                .all(|u| u.has_acted)
        {
            self.turn_boundary(false, events);
        }
    }

    fn turn_boundary(&mut self, expired: bool, events: &mut Vec<Event>) {
        self.ctx.reset_phase();
        let side = self.ctx.side.opponent();
        if side == Side::P1 {
            self.ctx.turn += 1;
        }
        self.ctx.side = side;
        log::info!("turn {}: {} to act", self.ctx.turn, side);
        events.push(Event::TurnEnded {
            next: side,
            turn: self.ctx.turn,
            expired,
        });

        for unit in self.units.iter_mut() {
            unit.has_acted = false;
        }
        for unit in self.units.iter_mut().filter(|u| u.side == side) {
            if self.board.terrain(unit.pos).props().heals {
                let amount = unit.heal_percent(HEALING_TILE_PERCENT);
                if amount > 0 {
                    events.push(Event::Healed {
                        unit: unit.id,
                        amount,
                        source: HealSource::Center,
                    });
                }
            }
        }
        for unit in self.units.iter_mut().filter(|u| u.side == side) {
            if let Some(tick) = status::tick(&mut self.rng, unit) {
                if tick.skipped {
                    unit.has_acted = true;
                }
                events.push(Event::StatusTick(tick));
            }
        }
        for unit in self.units.iter().filter(|u| u.is_fainted()) {
            events.push(Event::Fainted {
                unit: unit.id,
                side: unit.side,
            });
        }
        self.units.retain(|u| !u.is_fainted());
        self.check_finished(events);
    }

    /// Finish the match the moment a side has no units left.
    fn check_finished(&mut self, events: &mut Vec<Event>) -> bool {
        if self.winner().is_some() {
            return true;
        }
        let Some(loser) = Side::ALL
            .into_iter()
            .find(|&s| !self.units.iter().any(|u| u.side == s))
        else {
            return false;
        };
        let winner = loser.opponent();
        self.status = MatchStatus::Finished { winner };
        self.ctx.reset_phase();
        log::info!("match finished on turn {}: {} wins", self.ctx.turn, winner);
        events.push(Event::MatchFinished { winner });
        true
    }

    fn refresh_vision(&mut self) {
        for side in Side::ALL {
            self.vision[side.index()].update(&self.board, &self.units, side);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::setup::Placement;
    use crate::core::species::ids;
    use crate::core::terrain::Terrain;
    use crate::core::unit::Form;
    use alloc::vec;

    fn duel(a: SpeciesId, a_pos: Pos, b: SpeciesId, b_pos: Pos) -> Match {
        let setup = Setup {
            board: Board::new(),
            placements: vec![
                Placement {
                    side: Side::P1,
                    species: a,
                    pos: a_pos,
                },
                Placement {
                    side: Side::P2,
                    species: b,
                    pos: b_pos,
                },
            ],
        };
        Match::new(setup, 1).unwrap()
    }

    fn skirmish(board: Board, units: &[(Side, SpeciesId, Pos)], seed: u64) -> Match {
        let placements = units
            .iter()
            .map(|&(side, species, pos)| Placement { side, species, pos })
            .collect();
        Match::new(Setup { board, placements }, seed).unwrap()
    }

    /// Two Riolus for P1 and a distant Ralts. Unit 1 steps onto tall grass
    /// at (1, 0); `None` when the step meets nothing.
    fn step_into_grass(seed: u64) -> Option<Match> {
        let mut board = Board::new();
        board.set(Pos::new(1, 0), Terrain::TallGrass).unwrap();
        let mut m = skirmish(
            board,
            &[
                (Side::P1, ids::RIOLU, Pos::new(0, 0)),
                (Side::P1, ids::RIOLU, Pos::new(0, 5)),
                (Side::P2, ids::RALTS, Pos::new(9, 11)),
            ],
            seed,
        );
        let step = Intent::Move {
            unit: UnitId(1),
            to: Pos::new(1, 0),
        };
        let events = m.apply(Side::P1, step).unwrap();
        events
            .iter()
            .any(|e| matches!(e, Event::Encounter(_)))
            .then_some(m)
    }

    #[test]
    fn select_then_destination_caches_targets() {
        let mut m = duel(ids::RIOLU, Pos::new(0, 0), ids::RALTS, Pos::new(0, 4));
        m.apply(Side::P1, Intent::Select { unit: UnitId(1) }).unwrap();
        assert_eq!(m.phase(), Phase::Moving { unit: UnitId(1) });
        m.apply(
            Side::P1,
            Intent::Destination {
                unit: UnitId(1),
                to: Pos::new(0, 3),
            },
        )
        .unwrap();
        assert!(covers(&m.context().targets, Pos::new(0, 4)));
        // Still provisional: the unit has not moved.
        assert_eq!(m.unit(UnitId(1)).unwrap().pos, Pos::new(0, 0));
    }

    #[test]
    fn wrong_side_is_rejected_without_change() {
        let mut m = duel(ids::RIOLU, Pos::new(0, 0), ids::RALTS, Pos::new(5, 5));
        let before = m.clone();
        let err = m
            .apply(Side::P2, Intent::Select { unit: UnitId(2) })
            .unwrap_err();
        assert_eq!(err, ActionError::NotYourTurn(Side::P1));
        assert_eq!(m.context(), before.context());
        assert_eq!(m.units(), before.units());
    }

    #[test]
    fn waiting_every_unit_passes_the_turn() {
        let mut m = duel(ids::RIOLU, Pos::new(0, 0), ids::RALTS, Pos::new(5, 5));
        let events = m.apply(Side::P1, Intent::Wait { unit: UnitId(1) }).unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            Event::TurnEnded {
                next: Side::P2,
                turn: 1,
                expired: false
            }
        )));
        assert_eq!(m.side_to_act(), Side::P2);
        m.apply(Side::P2, Intent::EndTurn).unwrap();
        assert_eq!(m.turn(), 2);
    }

    #[test]
    fn committed_move_cannot_change() {
        let mut m = duel(ids::RIOLU, Pos::new(0, 0), ids::RALTS, Pos::new(9, 11));
        m.apply(
            Side::P1,
            Intent::Move {
                unit: UnitId(1),
                to: Pos::new(1, 0),
            },
        )
        .unwrap();
        let err = m
            .apply(
                Side::P1,
                Intent::Move {
                    unit: UnitId(1),
                    to: Pos::new(2, 0),
                },
            )
            .unwrap_err();
        assert!(matches!(err, ActionError::IllegalTransition { .. }));
        assert_eq!(m.unit(UnitId(1)).unwrap().pos, Pos::new(1, 0));
    }

    #[test]
    fn cancel_from_moving_returns_to_selecting() {
        let mut m = duel(ids::RIOLU, Pos::new(0, 0), ids::RALTS, Pos::new(9, 11));
        m.apply(Side::P1, Intent::Tile { pos: Pos::new(0, 0) }).unwrap();
        assert_eq!(m.phase().kind(), PhaseKind::Moving);
        m.apply(Side::P1, Intent::Cancel).unwrap();
        assert_eq!(m.phase(), Phase::Selecting);
        assert!(m.context().movement.is_empty());
    }

    #[test]
    fn expiry_passes_the_turn() {
        let mut m = duel(ids::RIOLU, Pos::new(0, 0), ids::RALTS, Pos::new(9, 11));
        m.apply(Side::P1, Intent::Select { unit: UnitId(1) }).unwrap();
        let events = m.expire_turn();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::TurnEnded { expired: true, .. })));
        assert_eq!(m.side_to_act(), Side::P2);
        assert_eq!(m.phase(), Phase::Selecting);
    }

    #[test]
    fn single_target_resolves_on_act() {
        let mut m = skirmish(
            Board::new(),
            &[
                (Side::P1, ids::RIOLU, Pos::new(0, 0)),
                (Side::P2, ids::MAGIKARP, Pos::new(1, 0)),
                (Side::P2, ids::RALTS, Pos::new(9, 11)),
            ],
            1,
        );
        m.apply(Side::P1, Intent::Select { unit: UnitId(1) }).unwrap();
        m.apply(
            Side::P1,
            Intent::Destination {
                unit: UnitId(1),
                to: Pos::new(0, 0),
            },
        )
        .unwrap();
        let events = m.apply(Side::P1, Intent::Act { unit: UnitId(1) }).unwrap();
        assert!(events.iter().any(|e| matches!(e, Event::Attacked(_))));
        assert_ne!(m.phase().kind(), PhaseKind::Attacking);
    }

    #[test]
    fn several_targets_open_target_choice() {
        let mut m = skirmish(
            Board::new(),
            &[
                (Side::P1, ids::RIOLU, Pos::new(0, 0)),
                (Side::P2, ids::MAGIKARP, Pos::new(1, 0)),
                (Side::P2, ids::RALTS, Pos::new(0, 1)),
            ],
            1,
        );
        m.apply(Side::P1, Intent::Select { unit: UnitId(1) }).unwrap();
        m.apply(
            Side::P1,
            Intent::Destination {
                unit: UnitId(1),
                to: Pos::new(0, 0),
            },
        )
        .unwrap();
        let events = m.apply(Side::P1, Intent::Act { unit: UnitId(1) }).unwrap();
        assert!(events.is_empty());
        assert_eq!(m.phase(), Phase::Attacking { unit: UnitId(1) });
        let events = m
            .apply(Side::P1, Intent::Tile { pos: Pos::new(1, 0) })
            .unwrap();
        assert!(events.iter().any(|e| matches!(e, Event::Attacked(_))));
    }

    #[test]
    fn deciding_kill_queues_then_confirms_evolution() {
        let mut m = skirmish(
            Board::new(),
            &[
                (Side::P1, ids::RIOLU, Pos::new(0, 0)),
                (Side::P2, ids::MAGIKARP, Pos::new(1, 0)),
                (Side::P2, ids::RALTS, Pos::new(9, 11)),
            ],
            1,
        );
        {
            let riolu = m.unit_mut(UnitId(1)).unwrap();
            riolu.kills = riolu.kills_needed() - 1;
            riolu.hp = 10;
        }
        m.unit_mut(UnitId(2)).unwrap().hp = 1;

        // Quick Attack: sure to hit and too fast to be countered.
        let events = m
            .apply(
                Side::P1,
                Intent::Attack {
                    unit: UnitId(1),
                    target: Pos::new(1, 0),
                    slot: Some(0),
                },
            )
            .unwrap();
        assert!(events.contains(&Event::EvolutionQueued {
            unit: UnitId(1),
            into: ids::LUCARIO,
        }));
        assert_eq!(m.phase(), Phase::Evolving { unit: UnitId(1) });
        assert!(m.unit(UnitId(2)).is_none());
        assert!(m
            .apply(Side::P1, Intent::Wait { unit: UnitId(1) })
            .is_err());

        let events = m
            .apply(Side::P1, Intent::ConfirmEvolution { unit: UnitId(1) })
            .unwrap();
        assert!(events.contains(&Event::Evolved {
            unit: UnitId(1),
            from: ids::RIOLU,
            into: ids::LUCARIO,
        }));
        let lucario = m.unit(UnitId(1)).unwrap();
        assert_eq!(
            lucario.form,
            Form::Evolved {
                species: ids::LUCARIO,
                from: ids::RIOLU
            }
        );
        assert!(lucario.is_full_hp());
        for (uses, mv) in lucario.uses.iter().zip(lucario.template().moves) {
            assert_eq!(*uses, mv.max_uses);
        }
        assert_eq!(m.side_to_act(), Side::P2);
    }

    #[test]
    fn capture_adds_a_spent_unit_at_the_spawn_tile() {
        let throw = Some([Timing::Best; CAPTURE_CHECKS]);
        let (m, encounter, caught) = (0..400)
            .filter_map(step_into_grass)
            .find_map(|mut m| {
                assert_eq!(m.phase(), Phase::Capturing { unit: UnitId(1) });
                let encounter = *m.pending_encounter()?;
                let events = m
                    .apply(Side::P1, Intent::Capture { unit: UnitId(1), throw })
                    .unwrap();
                let caught = events.iter().find_map(|e| match e {
                    Event::Captured { unit, .. } => Some(*unit),
                    _ => None,
                })?;
                Some((m, encounter, caught))
            })
            .expect("no seed produced a capture");

        assert_eq!(caught, UnitId(4));
        let unit = m.unit(caught).unwrap();
        assert_eq!(unit.side, Side::P1);
        assert_eq!(unit.form, Form::Base(encounter.species));
        assert_eq!(unit.pos, encounter.spawn);
        assert!(unit.has_acted);
        assert!(m.unit(UnitId(1)).unwrap().has_acted);
        assert_eq!(m.phase(), Phase::Selecting);
        assert!(m.pending_encounter().is_none());
        assert_eq!(m.side_to_act(), Side::P1);
    }

    #[test]
    fn fleeing_spends_the_action() {
        let mut m = (0..200)
            .find_map(step_into_grass)
            .expect("no seed produced an encounter");
        let events = m
            .apply(
                Side::P1,
                Intent::Capture {
                    unit: UnitId(1),
                    throw: None,
                },
            )
            .unwrap();
        assert_eq!(events, vec![Event::Fled { unit: UnitId(1) }]);
        assert!(m.unit(UnitId(1)).unwrap().has_acted);
        assert_eq!(m.units().len(), 3);
        assert_eq!(m.phase(), Phase::Selecting);
        assert_eq!(m.side_to_act(), Side::P1);
    }

    #[test]
    fn healing_tiles_restore_the_incoming_side() {
        let mut board = Board::new();
        board.set(Pos::new(0, 0), Terrain::Center).unwrap();
        board.set(Pos::new(9, 11), Terrain::Center).unwrap();
        let mut m = skirmish(
            board,
            &[
                (Side::P1, ids::RIOLU, Pos::new(0, 0)),
                (Side::P2, ids::RALTS, Pos::new(9, 11)),
            ],
            1,
        );
        m.unit_mut(UnitId(1)).unwrap().hp = 10;
        m.unit_mut(UnitId(2)).unwrap().hp = 10;

        let events = m.apply(Side::P1, Intent::Wait { unit: UnitId(1) }).unwrap();
        // 20% of Ralts' 40 max health.
        assert!(events.contains(&Event::Healed {
            unit: UnitId(2),
            amount: 8,
            source: HealSource::Center,
        }));
        assert_eq!(m.unit(UnitId(2)).unwrap().hp, 18);
        assert_eq!(m.unit(UnitId(1)).unwrap().hp, 10);
    }

    #[test]
    fn berry_heals_once_then_turns_to_grass() {
        let mut board = Board::new();
        board.set(Pos::new(0, 0), Terrain::BerryBush).unwrap();
        let mut m = skirmish(
            board,
            &[
                (Side::P1, ids::RIOLU, Pos::new(0, 0)),
                (Side::P2, ids::RALTS, Pos::new(9, 11)),
            ],
            1,
        );
        m.unit_mut(UnitId(1)).unwrap().hp = 20;

        let events = m.apply(Side::P1, Intent::Wait { unit: UnitId(1) }).unwrap();
        // 10% of Riolu's 55 max health, rounded down.
        assert!(events.contains(&Event::Healed {
            unit: UnitId(1),
            amount: 5,
            source: HealSource::Berry,
        }));
        assert_eq!(m.board().terrain(Pos::new(0, 0)), Terrain::Grass);
        assert_eq!(m.unit(UnitId(1)).unwrap().hp, 25);

        m.apply(Side::P2, Intent::Wait { unit: UnitId(2) }).unwrap();
        let events = m.apply(Side::P1, Intent::Wait { unit: UnitId(1) }).unwrap();
        assert!(!events.iter().any(|e| matches!(e, Event::Healed { .. })));
        assert_eq!(m.unit(UnitId(1)).unwrap().hp, 25);
    }

    #[test]
    fn landing_outside_the_table_row_is_rejected() {
        let mut m = duel(ids::RIOLU, Pos::new(0, 0), ids::RALTS, Pos::new(9, 11));
        let err = m
            .transit(Transition::Select, |m| {
                m.ctx.phase = Phase::Attacking { unit: UnitId(1) };
                Ok(())
            })
            .unwrap_err();
        assert_eq!(
            err,
            ActionError::UnexpectedLanding {
                from: PhaseKind::Selecting,
                transition: Transition::Select,
                to: PhaseKind::Attacking,
            }
        );
    }

    #[test]
    fn expiry_during_an_encounter_flees_it() {
        let mut m = (0..200)
            .find_map(step_into_grass)
            .expect("no seed produced an encounter");
        let events = m.expire_turn();
        assert_eq!(events.first(), Some(&Event::Fled { unit: UnitId(1) }));
        assert!(m.pending_encounter().is_none());
        assert_eq!(m.phase(), Phase::Selecting);
        assert_eq!(m.side_to_act(), Side::P2);
    }
}
