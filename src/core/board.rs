//! Battlefield terrain grid.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use super::bitboard::BitBoardError;
use super::common::Pos;
use super::config::{TileMask, BOARD_HEIGHT, BOARD_WIDTH};
use super::setup::SetupError;
use super::terrain::Terrain;

/// Fixed-size terrain grid, row-major.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Board {
    tiles: Vec<Terrain>,
}

impl Board {
    /// Board covered in plain grass.
    pub fn new() -> Self {
        Self::filled(Terrain::Grass)
    }

    pub fn filled(terrain: Terrain) -> Self {
        Board {
            tiles: vec![terrain; BOARD_WIDTH * BOARD_HEIGHT],
        }
    }

    /// Parse a board from one glyph string per row (see [`Terrain::glyph`]).
    pub fn from_rows(rows: &[&str]) -> Result<Self, SetupError> {
        if rows.len() != BOARD_HEIGHT {
            return Err(SetupError::BadDimensions {
                width: rows.first().map_or(0, |r| r.chars().count()),
                height: rows.len(),
            });
        }
        let mut tiles = Vec::with_capacity(BOARD_WIDTH * BOARD_HEIGHT);
        for row in rows {
            let width = row.chars().count();
            if width != BOARD_WIDTH {
                return Err(SetupError::BadDimensions {
                    width,
                    height: rows.len(),
                });
            }
            for c in row.chars() {
                tiles.push(Terrain::from_glyph(c).ok_or(SetupError::UnknownGlyph(c))?);
            }
        }
        Ok(Board { tiles })
    }

    /// Terrain at `pos`. Off-board reads as water, which nothing can enter.
    pub fn terrain(&self, pos: Pos) -> Terrain {
        if !pos.in_bounds() {
            return Terrain::Water;
        }
        self.tiles
            .get(pos.index())
            .copied()
            .unwrap_or(Terrain::Water)
    }

    pub fn set(&mut self, pos: Pos, terrain: Terrain) -> Result<(), BitBoardError> {
        let slot = pos
            .in_bounds()
            .then(|| self.tiles.get_mut(pos.index()))
            .flatten()
            .ok_or(BitBoardError::IndexOutOfBounds {
                x: pos.x as usize,
                y: pos.y as usize,
            })?;
        *slot = terrain;
        Ok(())
    }

    /// Turn a consumable tile back into grass. Returns whether it was consumed.
    pub fn consume(&mut self, pos: Pos) -> bool {
        self.terrain(pos).props().consumable && self.set(pos, Terrain::Grass).is_ok()
    }

    /// Mask of every tile whose terrain satisfies `pred`.
    pub fn mask_where(&self, pred: impl Fn(Terrain) -> bool) -> TileMask {
        self.positions()
            .filter(|&p| pred(self.terrain(p)))
            .map(|p| (p.x as usize, p.y as usize))
            .collect()
    }

    /// Every board coordinate, row-major.
    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        (0..BOARD_WIDTH * BOARD_HEIGHT).map(Pos::from_index)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, t) in self.tiles.iter().enumerate() {
            write!(f, "{}", t.glyph())?;
            if i % BOARD_WIDTH == BOARD_WIDTH - 1 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
