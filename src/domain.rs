//! Wire-level views of a match.
//!
//! A [`Snapshot`] is always built for one recipient: enemy units are filtered
//! through that side's fog of war, and the in-progress phase and pending
//! encounter are only shown to the side that is acting.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::{
    board::Board,
    capture::WildEncounter,
    common::{Pos, Side, UnitId},
    config::TileMask,
    game::{Event, Match, MatchStatus},
    species::{SpeciesId, StatusCondition},
    turn::Phase,
    unit::{Form, Unit, MAX_MOVES},
    vision::Sighting,
};

/// Everything the recipient may know about one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSummary {
    pub id: UnitId,
    pub side: Side,
    pub species: SpeciesId,
    pub name: String,
    pub evolved_from: Option<SpeciesId>,
    pub pos: Pos,
    pub hp: u16,
    pub max_hp: u16,
    pub uses: [u8; MAX_MOVES],
    pub has_acted: bool,
    pub kills: u16,
    pub status: Option<StatusCondition>,
    pub status_turns: u8,
}

impl From<&Unit> for UnitSummary {
    fn from(unit: &Unit) -> Self {
        let evolved_from = match unit.form {
            Form::Base(_) => None,
            Form::Evolved { from, .. } => Some(from),
        };
        UnitSummary {
            id: unit.id,
            side: unit.side,
            species: unit.form.species(),
            name: unit.template().name.to_string(),
            evolved_from,
            pos: unit.pos,
            hp: unit.hp,
            max_hp: unit.max_hp(),
            uses: unit.uses,
            has_acted: unit.has_acted,
            kills: unit.kills,
            status: unit.status,
            status_turns: unit.status_turns,
        }
    }
}

impl UnitSummary {
    /// Rebuild an engine unit, for controllers that want to run the solvers
    /// against their own view.
    pub fn to_unit(&self) -> Unit {
        let mut unit = Unit::new(self.id, self.side, self.species, self.pos);
        if let Some(from) = self.evolved_from {
            unit.form = Form::Evolved {
                species: self.species,
                from,
            };
        }
        unit.hp = self.hp;
        unit.uses = self.uses;
        unit.has_acted = self.has_acted;
        unit.kills = self.kills;
        unit.status = self.status;
        unit.status_turns = self.status_turns;
        unit
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitView {
    Known(UnitSummary),
    /// An enemy remembered on an explored tile outside current vision.
    Unidentified { pos: Pos },
}

impl UnitView {
    pub fn pos(&self) -> Pos {
        match self {
            UnitView::Known(u) => u.pos,
            UnitView::Unidentified { pos } => *pos,
        }
    }

    pub fn known(&self) -> Option<&UnitSummary> {
        match self {
            UnitView::Known(u) => Some(u),
            UnitView::Unidentified { .. } => None,
        }
    }
}

/// One side's declarative view of the match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub recipient: Side,
    pub board: Board,
    pub units: Vec<UnitView>,
    pub turn: u32,
    pub side_to_act: Side,
    pub status: MatchStatus,
    pub visible: TileMask,
    pub explored: TileMask,
    /// Present only when `recipient` is acting.
    pub phase: Option<Phase>,
    pub encounter: Option<WildEncounter>,
    /// Cached ranges for the acting recipient's selected unit.
    pub movement: TileMask,
    pub targets: TileMask,
}

impl Snapshot {
    pub fn of(game: &Match, recipient: Side) -> Self {
        let vis = game.visibility(recipient);
        let units = game
            .units()
            .iter()
            .filter_map(|u| {
                match vis.sighting(game.board(), game.units(), recipient, u) {
                    Sighting::Seen => Some(UnitView::Known(UnitSummary::from(u))),
                    Sighting::Presence => Some(UnitView::Unidentified { pos: u.pos }),
                    Sighting::Hidden => None,
                }
            })
            .collect();
        let acting = game.side_to_act() == recipient;
        let ctx = game.context();
        Snapshot {
            recipient,
            board: game.board().clone(),
            units,
            turn: game.turn(),
            side_to_act: game.side_to_act(),
            status: game.status(),
            visible: vis.visible,
            explored: vis.explored,
            phase: acting.then_some(ctx.phase),
            encounter: if acting {
                game.pending_encounter().copied()
            } else {
                None
            },
            movement: if acting { ctx.movement } else { TileMask::new() },
            targets: if acting { ctx.targets } else { TileMask::new() },
        }
    }

    pub fn unit(&self, id: UnitId) -> Option<&UnitSummary> {
        self.units
            .iter()
            .filter_map(UnitView::known)
            .find(|u| u.id == id)
    }

    /// Known units of the recipient.
    pub fn own_units(&self) -> impl Iterator<Item = &UnitSummary> {
        self.units
            .iter()
            .filter_map(UnitView::known)
            .filter(move |u| u.side == self.recipient)
    }

    /// Enemy units in sight.
    pub fn enemies(&self) -> impl Iterator<Item = &UnitSummary> {
        self.units
            .iter()
            .filter_map(UnitView::known)
            .filter(move |u| u.side != self.recipient)
    }

    pub fn is_my_turn(&self) -> bool {
        self.side_to_act == self.recipient && self.status == MatchStatus::Playing
    }

    pub fn winner(&self) -> Option<Side> {
        match self.status {
            MatchStatus::Finished { winner } => Some(winner),
            MatchStatus::Playing => None,
        }
    }
}

/// Units `side` can identify right now: its own plus enemies in sight.
fn identified(game: &Match, side: Side) -> HashSet<UnitId> {
    let vis = game.visibility(side);
    game.units()
        .iter()
        .filter(|u| vis.sighting(game.board(), game.units(), side, u) == Sighting::Seen)
        .map(|u| u.id)
        .collect()
}

/// The unit an event is about, if it is about exactly one.
fn subject(event: &Event) -> Option<UnitId> {
    match event {
        Event::Moved { unit, .. }
        | Event::Fainted { unit, .. }
        | Event::EvolutionQueued { unit, .. }
        | Event::Evolved { unit, .. }
        | Event::Captured { unit, .. }
        | Event::Fled { unit }
        | Event::Waited { unit }
        | Event::Healed { unit, .. } => Some(*unit),
        Event::StatusTick(tick) => Some(tick.unit),
        Event::Encounter(_)
        | Event::CaptureFailed(_)
        | Event::Attacked(_)
        | Event::TurnEnded { .. }
        | Event::MatchFinished { .. } => None,
    }
}

/// Filters one side's copy of an action's events through its fog of war.
///
/// Build it before the action is applied and [`settle`](Self::settle) it
/// afterwards: an event about an enemy unit survives only if the recipient
/// could identify that unit at the relevant moment. A move needs the unit in
/// sight at both ends, a faint needs it in sight beforehand. Encounters and
/// failed captures stay private to the actor. Positions of enemies outside
/// sight reach the recipient only through its snapshot.
#[derive(Debug, Clone)]
pub struct Audience {
    recipient: Side,
    actor: Side,
    before: HashSet<UnitId>,
    after: HashSet<UnitId>,
}

impl Audience {
    pub fn new(game: &Match, recipient: Side, actor: Side) -> Self {
        let before = identified(game, recipient);
        Audience {
            recipient,
            actor,
            after: before.clone(),
            before,
        }
    }

    /// One audience per side, for an action by `actor`.
    pub fn both(game: &Match, actor: Side) -> [Audience; 2] {
        Side::ALL.map(|side| Audience::new(game, side, actor))
    }

    pub fn recipient(&self) -> Side {
        self.recipient
    }

    /// Record what the recipient can identify once the action is applied.
    pub fn settle(&mut self, game: &Match) {
        self.after = identified(game, self.recipient);
    }

    fn admits(&self, event: &Event) -> bool {
        let private = self.recipient == self.actor;
        match event {
            Event::Encounter(_) | Event::CaptureFailed(_) => private,
            Event::Moved { unit, .. } => {
                self.before.contains(unit) && self.after.contains(unit)
            }
            Event::Fainted { unit, .. } => self.before.contains(unit),
            Event::Captured { unit, .. } => self.after.contains(unit),
            other => subject(other)
                .map_or(true, |id| self.before.contains(&id) || self.after.contains(&id)),
        }
    }

    /// The subset of `events` the recipient may see.
    pub fn filter(&self, events: &[Event]) -> Vec<Event> {
        events.iter().filter(|e| self.admits(e)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::game::Intent;
    use crate::core::setup::{Placement, Setup};
    use crate::core::species::ids;

    /// Riolu for P1 in the top-left corner, Ralts for P2 at `ralts`.
    fn duel(ralts: Pos) -> Match {
        let setup = Setup {
            board: Board::new(),
            placements: vec![
                Placement {
                    side: Side::P1,
                    species: ids::RIOLU,
                    pos: Pos::new(0, 0),
                },
                Placement {
                    side: Side::P2,
                    species: ids::RALTS,
                    pos: ralts,
                },
            ],
        };
        Match::new(setup, 3).unwrap()
    }

    /// Pass P1's turn, then move P2's Ralts to `to`. Returns each side's copy
    /// of the move's events.
    fn ralts_moves(game: &mut Match, to: Pos) -> [Vec<Event>; 2] {
        game.apply(Side::P1, Intent::Wait { unit: UnitId(1) })
            .unwrap();
        let mut audiences = Audience::both(game, Side::P2);
        let events = game
            .apply(Side::P2, Intent::Move { unit: UnitId(2), to })
            .unwrap();
        audiences.each_mut().map(|a| {
            a.settle(game);
            a.filter(&events)
        })
    }

    #[test]
    fn distant_enemies_are_hidden() {
        let game = duel(Pos::new(9, 11));
        let snap = Snapshot::of(&game, Side::P1);
        assert_eq!(snap.units.len(), 1);
        assert!(snap.phase.is_some());
        let theirs = Snapshot::of(&game, Side::P2);
        assert!(theirs.phase.is_none());
        assert_eq!(theirs.own_units().count(), 1);
    }

    #[test]
    fn moves_in_the_fog_are_not_reported() {
        let mut game = duel(Pos::new(9, 11));
        let [p1, p2] = ralts_moves(&mut game, Pos::new(9, 10));
        assert!(p1.is_empty(), "{:?}", p1);
        assert!(p2.contains(&Event::Moved {
            unit: UnitId(2),
            from: Pos::new(9, 11),
            to: Pos::new(9, 10),
        }));
    }

    #[test]
    fn moves_in_sight_are_reported() {
        let mut game = duel(Pos::new(2, 0));
        let [p1, _] = ralts_moves(&mut game, Pos::new(2, 1));
        assert_eq!(
            p1,
            vec![Event::Moved {
                unit: UnitId(2),
                from: Pos::new(2, 0),
                to: Pos::new(2, 1),
            }]
        );
    }

    #[test]
    fn encounters_stay_with_the_actor() {
        let game = duel(Pos::new(9, 11));
        let events = [
            Event::Encounter(WildEncounter {
                trigger: UnitId(1),
                species: ids::PIKACHU,
                hp: 30,
                spawn: Pos::new(1, 0),
            }),
            Event::TurnEnded {
                next: Side::P2,
                turn: 1,
                expired: false,
            },
        ];
        let mine = Audience::new(&game, Side::P1, Side::P1).filter(&events);
        let theirs = Audience::new(&game, Side::P2, Side::P1).filter(&events);
        assert_eq!(mine.len(), 2);
        assert_eq!(theirs, vec![events[1].clone()]);
    }
}
