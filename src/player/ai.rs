use crate::core::{
    capture::Timing,
    combat::{self, Footing},
    common::{Pos, Side, UnitId},
    config::{TileMask, BOARD_HEIGHT, CAPTURE_CHECKS},
    game::Intent,
    movement::{self, MoveQuery},
    turn::Phase,
    unit::Unit,
};
use crate::domain::{Snapshot, UnitView};

use super::Controller;

/// Bonus for an attack expected to knock the target out.
const KO_BONUS: u32 = 1000;

/// Greedy controller: for the first unit that has not acted, take the
/// reachable attack with the highest expected damage, else close in on the
/// nearest known enemy.
#[derive(Debug, Clone)]
pub struct GreedyAi {
    throw: Option<[Timing; CAPTURE_CHECKS]>,
}

impl Default for GreedyAi {
    fn default() -> Self {
        Self::new()
    }
}

impl GreedyAi {
    pub fn new() -> Self {
        Self {
            throw: Some([Timing::Good; CAPTURE_CHECKS]),
        }
    }

    /// Always flee wild encounters.
    pub fn cautious() -> Self {
        Self { throw: None }
    }
}

/// One candidate attack: where to stand and whom to hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Plan {
    from: Pos,
    target: Pos,
    score: u32,
}

fn to_pos((x, y): (usize, usize)) -> Pos {
    Pos::new(x as u8, y as u8)
}

fn enemies(snapshot: &Snapshot) -> Vec<Unit> {
    snapshot.enemies().map(|u| u.to_unit()).collect()
}

/// Score hitting `defender` from `from` with the attacker's best move.
fn score(snapshot: &Snapshot, attacker: &Unit, from: Pos, defender: &Unit) -> Option<u32> {
    let distance = from.distance(defender.pos);
    if distance == 0 || distance > attacker.attack_range() {
        return None;
    }
    let mut placed = attacker.clone();
    placed.pos = from;
    let footing = Footing::of(&snapshot.board, from, defender.pos);
    let (_, mv) = combat::best_move(&placed, defender, distance, footing)?;
    let damage = combat::estimate(&placed, defender, mv, footing) as u32;
    let expected = damage * mv.accuracy as u32 / 100;
    Some(if damage >= defender.hp as u32 {
        expected + KO_BONUS
    } else {
        expected
    })
}

fn best_plan(snapshot: &Snapshot, unit: &Unit, stops: &TileMask, foes: &[Unit]) -> Option<Plan> {
    let mut best: Option<Plan> = None;
    for from in stops.iter_set_bits().map(to_pos) {
        for foe in foes {
            let Some(score) = score(snapshot, unit, from, foe) else {
                continue;
            };
            // Prefer not moving on ties.
            let better = match best {
                None => true,
                Some(b) => score > b.score || (score == b.score && from == unit.pos),
            };
            if better {
                best = Some(Plan {
                    from,
                    target: foe.pos,
                    score,
                });
            }
        }
    }
    best
}

fn movement_stops(snapshot: &Snapshot, unit: &Unit) -> TileMask {
    let mut blocked = TileMask::new();
    let mut occupied = TileMask::new();
    for view in &snapshot.units {
        let p = view.pos();
        let mask = match view {
            UnitView::Known(u) if u.id == unit.id => continue,
            UnitView::Known(u) if u.side == unit.side => &mut occupied,
            _ => &mut blocked,
        };
        let _ = mask.set(p.x as usize, p.y as usize);
    }
    movement::solve(
        &snapshot.board,
        &MoveQuery {
            start: unit.pos,
            allowance: movement::allowance(unit),
            flying: unit.template().is_flying(),
            blocked,
            occupied,
        },
    )
}

/// Where to head when nothing is in reach: the nearest enemy we know of,
/// or else the opponent's home row.
fn goal(snapshot: &Snapshot, unit: &Unit) -> Pos {
    snapshot
        .units
        .iter()
        .filter(|v| v.known().map_or(true, |u| u.side != unit.side))
        .map(UnitView::pos)
        .min_by_key(|p| p.distance(unit.pos))
        .unwrap_or_else(|| match unit.side {
            Side::P1 => Pos::new(unit.pos.x, 0),
            Side::P2 => Pos::new(unit.pos.x, BOARD_HEIGHT as u8 - 1),
        })
}

impl GreedyAi {
    fn plan_unit(&self, snapshot: &Snapshot, id: UnitId) -> Intent {
        let Some(unit) = snapshot.unit(id).map(|u| u.to_unit()) else {
            return Intent::EndTurn;
        };
        let foes = enemies(snapshot);
        let stops = movement_stops(snapshot, &unit);

        if let Some(plan) = best_plan(snapshot, &unit, &stops, &foes) {
            return if plan.from == unit.pos {
                Intent::Attack {
                    unit: id,
                    target: plan.target,
                    slot: None,
                }
            } else {
                Intent::Move {
                    unit: id,
                    to: plan.from,
                }
            };
        }

        let goal = goal(snapshot, &unit);
        let step = stops
            .iter_set_bits()
            .map(to_pos)
            .min_by_key(|p| (p.distance(goal), p.distance(unit.pos)));
        match step {
            Some(to) if to != unit.pos && to.distance(goal) < unit.pos.distance(goal) => {
                Intent::Move { unit: id, to }
            }
            _ => Intent::Wait { unit: id },
        }
    }

    /// Attack from where the unit now stands, or stop.
    fn strike_or_wait(&self, snapshot: &Snapshot, id: UnitId) -> Intent {
        let Some(unit) = snapshot.unit(id).map(|u| u.to_unit()) else {
            return Intent::Cancel;
        };
        let best = enemies(snapshot)
            .iter()
            .filter(|foe| snapshot.targets.contains(foe.pos.x as usize, foe.pos.y as usize))
            .filter_map(|foe| score(snapshot, &unit, unit.pos, foe).map(|s| (s, foe.pos)))
            .max_by_key(|(s, _)| *s);
        match best {
            Some((_, target)) => Intent::Attack {
                unit: id,
                target,
                slot: None,
            },
            None => Intent::Wait { unit: id },
        }
    }
}

impl Controller for GreedyAi {
    fn choose(&mut self, snapshot: &Snapshot) -> Intent {
        match snapshot.phase {
            Some(Phase::Selecting) => match snapshot.own_units().find(|u| !u.has_acted) {
                Some(u) => self.plan_unit(snapshot, u.id),
                None => Intent::EndTurn,
            },
            Some(Phase::ActionMenu {
                unit,
                committed: true,
                ..
            })
            | Some(Phase::Attacking { unit }) => self.strike_or_wait(snapshot, unit),
            Some(Phase::Capturing { unit }) => Intent::Capture {
                unit,
                throw: self.throw,
            },
            Some(Phase::Evolving { unit }) => Intent::ConfirmEvolution { unit },
            Some(Phase::Moving { .. }) | Some(Phase::ActionMenu { .. }) => Intent::Cancel,
            None => Intent::EndTurn,
        }
    }
}
