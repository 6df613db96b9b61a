//! Movement range solver: uniform-cost search over terrain costs.

use alloc::collections::BinaryHeap;
use alloc::vec;
use core::cmp::Reverse;

use super::board::Board;
use super::common::Pos;
use super::config::{TileMask, BOARD_HEIGHT, BOARD_WIDTH};
use super::species::StatusCondition;
use super::unit::Unit;

/// Inputs to a movement search.
#[derive(Debug, Clone, Copy)]
pub struct MoveQuery {
    pub start: Pos,
    pub allowance: u8,
    /// Every enterable tile costs 1.
    pub flying: bool,
    /// Tiles that can never be entered (enemy units).
    pub blocked: TileMask,
    /// Tiles that may be crossed but not stopped on (friendly units).
    pub occupied: TileMask,
}

/// Movement allowance after status penalties.
pub fn allowance(unit: &Unit) -> u8 {
    let base = unit.template().movement;
    match unit.status {
        Some(StatusCondition::Paralysis) => (base / 2).max(1),
        _ => base,
    }
}

/// Every tile the query's unit may legally stop on, its own tile included.
pub fn solve(board: &Board, query: &MoveQuery) -> TileMask {
    let mut stops = TileMask::new();
    if !query.start.in_bounds() {
        return stops;
    }
    let budget = query.allowance as u32;
    let mut dist = vec![u32::MAX; BOARD_WIDTH * BOARD_HEIGHT];
    let start = query.start.index();
    dist[start] = 0;

    let mut heap: BinaryHeap<Reverse<(u32, usize)>> = BinaryHeap::new();
    heap.push(Reverse((0, start)));

    while let Some(Reverse((cost, index))) = heap.pop() {
        if cost != dist[index] {
            continue;
        }
        let here = Pos::from_index(index);
        if index == start || !query.occupied.contains(here.x as usize, here.y as usize) {
            let _ = stops.set(here.x as usize, here.y as usize);
        }
        for next in here.neighbors() {
            let terrain = board.terrain(next);
            if !terrain.is_passable() || query.blocked.contains(next.x as usize, next.y as usize)
            {
                continue;
            }
            let step = if query.flying {
                1
            } else {
                terrain.move_cost() as u32
            };
            let new_cost = cost + step;
            if new_cost <= budget && new_cost < dist[next.index()] {
                dist[next.index()] = new_cost;
                heap.push(Reverse((new_cost, next.index())));
            }
        }
    }
    stops
}

/// Movement range of `unit` given everyone else on the board.
///
/// An acted unit has an empty range.
pub fn movement_range(board: &Board, units: &[Unit], unit: &Unit) -> TileMask {
    if unit.has_acted {
        return TileMask::new();
    }
    let mut blocked = TileMask::new();
    let mut occupied = TileMask::new();
    for other in units.iter().filter(|u| u.id != unit.id) {
        let (x, y) = (other.pos.x as usize, other.pos.y as usize);
        if other.side == unit.side {
            let _ = occupied.set(x, y);
        } else {
            let _ = blocked.set(x, y);
        }
    }
    solve(
        board,
        &MoveQuery {
            start: unit.pos,
            allowance: allowance(unit),
            flying: unit.template().is_flying(),
            blocked,
            occupied,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::common::{Side, UnitId};
    use crate::core::species::ids;
    use crate::core::terrain::Terrain;

    fn walker(pos: Pos) -> Unit {
        Unit::new(UnitId(1), Side::P1, ids::SQUIRTLE, pos)
    }

    #[test]
    fn open_field_is_a_diamond() {
        let board = Board::new();
        let unit = walker(Pos::new(5, 5));
        let range = movement_range(&board, &[unit.clone()], &unit);
        let allowance = unit.template().movement;
        for p in board.positions() {
            let inside = p.distance(unit.pos) <= allowance;
            assert_eq!(range.contains(p.x as usize, p.y as usize), inside, "{}", p);
        }
    }

    #[test]
    fn forest_costs_two() {
        let mut board = Board::new();
        board.set(Pos::new(5, 4), Terrain::Forest).unwrap();
        let unit = walker(Pos::new(5, 5));
        let range = movement_range(&board, &[unit.clone()], &unit);
        // (5, 2) costs 4 whichever way round the forest.
        assert!(range.contains(5, 4));
        assert!(range.contains(5, 3));
        assert!(!range.contains(5, 2));
    }

    #[test]
    fn friends_pass_but_do_not_stop() {
        let board = Board::new();
        let unit = walker(Pos::new(0, 0));
        let friend = Unit::new(UnitId(2), Side::P1, ids::CHARMANDER, Pos::new(1, 0));
        let units = [unit.clone(), friend];
        let range = movement_range(&board, &units, &unit);
        assert!(!range.contains(1, 0));
        assert!(range.contains(2, 0));
        assert!(range.contains(0, 0));
    }

    #[test]
    fn paralysis_halves_allowance() {
        let mut unit = walker(Pos::new(5, 5));
        unit.status = Some(StatusCondition::Paralysis);
        assert_eq!(allowance(&unit), (unit.template().movement / 2).max(1));
    }

    #[test]
    fn acted_unit_cannot_move() {
        let board = Board::new();
        let mut unit = walker(Pos::new(5, 5));
        unit.has_acted = true;
        assert!(movement_range(&board, &[unit.clone()], &unit).is_empty());
    }
}
