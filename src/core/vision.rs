//! Fog of war: per-side current vision and explored memory.

use super::board::Board;
use super::common::{Pos, Side};
use super::config::{TileMask, VISION_RANGE};
use super::unit::Unit;

/// What one side knows about the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Visibility {
    pub visible: TileMask,
    /// Running union of every tile ever visible. Never shrinks.
    pub explored: TileMask,
}

/// How an observer perceives a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sighting {
    /// Identity and stats are known.
    Seen,
    /// Only a presence on a remembered tile.
    Presence,
    Hidden,
}

/// Tiles lit by `side`'s units: Manhattan radius, widened on high ground.
pub fn lit_tiles(board: &Board, units: &[Unit], side: Side) -> TileMask {
    let mut lit = TileMask::new();
    for unit in units.iter().filter(|u| u.side == side) {
        let radius = VISION_RANGE + board.terrain(unit.pos).props().vision_bonus;
        for p in board.positions().filter(|p| p.distance(unit.pos) <= radius) {
            let _ = lit.set(p.x as usize, p.y as usize);
        }
    }
    lit
}

impl Visibility {
    /// Recompute current vision from scratch and fold it into memory.
    pub fn update(&mut self, board: &Board, units: &[Unit], side: Side) {
        self.visible = lit_tiles(board, units, side);
        self.explored |= self.visible;
    }

    pub fn is_visible(&self, pos: Pos) -> bool {
        self.visible.contains(pos.x as usize, pos.y as usize)
    }

    pub fn is_explored(&self, pos: Pos) -> bool {
        self.explored.contains(pos.x as usize, pos.y as usize)
    }

    /// How `side` perceives `target` given this visibility.
    pub fn sighting(&self, board: &Board, units: &[Unit], side: Side, target: &Unit) -> Sighting {
        if target.side == side {
            return Sighting::Seen;
        }
        if board.terrain(target.pos).props().conceals
            && !units
                .iter()
                .any(|u| u.side == side && u.pos.distance(target.pos) <= 1)
        {
            return Sighting::Hidden;
        }
        if self.is_visible(target.pos) {
            Sighting::Seen
        } else if self.is_explored(target.pos) {
            Sighting::Presence
        } else {
            Sighting::Hidden
        }
    }
}
