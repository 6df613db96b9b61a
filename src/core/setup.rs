//! Initial board and unit placement.
//!
//! The engine only consumes a [`Setup`]; where it comes from is up to the
//! caller. [`RandomSetup`] produces quick-match boards from a seed and
//! [`FixedSetup`] replays a hand-written layout.

use alloc::vec::Vec;
use core::fmt;

use rand::seq::IndexedRandom;
use rand::Rng;

use super::board::Board;
use super::common::{Pos, Side};
use super::config::{BOARD_HEIGHT, BOARD_WIDTH, TEAM_SIZE};
use super::species::{self, SpeciesId};
use super::terrain::Terrain;

/// Errors produced while building or validating a setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    BadDimensions { width: usize, height: usize },
    UnknownGlyph(char),
    /// Placement outside the board or on impassable terrain.
    BadPlacement(Pos),
    /// Two units share a tile.
    Overlap(Pos),
    /// A side has no units.
    EmptySide(Side),
    UnknownSpecies(SpeciesId),
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::BadDimensions { width, height } => write!(
                f,
                "BadDimensions: got {}x{}, expected {}x{}",
                width, height, BOARD_WIDTH, BOARD_HEIGHT
            ),
            SetupError::UnknownGlyph(c) => write!(f, "UnknownGlyph: {:?}", c),
            SetupError::BadPlacement(p) => write!(f, "BadPlacement: {}", p),
            SetupError::Overlap(p) => write!(f, "Overlap: {}", p),
            SetupError::EmptySide(s) => write!(f, "EmptySide: {}", s),
            SetupError::UnknownSpecies(id) => write!(f, "UnknownSpecies: {}", id.0),
        }
    }
}

/// One starting unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub side: Side,
    pub species: SpeciesId,
    pub pos: Pos,
}

/// Starting board and units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setup {
    pub board: Board,
    pub placements: Vec<Placement>,
}

impl Setup {
    /// Check every placement is on the board, enterable, unique and known.
    pub fn validate(&self) -> Result<(), SetupError> {
        for (i, p) in self.placements.iter().enumerate() {
            if species::lookup(p.species).is_none() {
                return Err(SetupError::UnknownSpecies(p.species));
            }
            if !p.pos.in_bounds() || !self.board.terrain(p.pos).is_passable() {
                return Err(SetupError::BadPlacement(p.pos));
            }
            if self.placements[..i].iter().any(|q| q.pos == p.pos) {
                return Err(SetupError::Overlap(p.pos));
            }
        }
        for side in Side::ALL {
            if !self.placements.iter().any(|p| p.side == side) {
                return Err(SetupError::EmptySide(side));
            }
        }
        Ok(())
    }
}

/// Anything that can produce a starting layout.
pub trait BoardSource {
    fn generate<R: Rng>(&mut self, rng: &mut R) -> Result<Setup, SetupError>;
}

/// A fixed layout, returned as-is.
#[derive(Debug, Clone)]
pub struct FixedSetup(pub Setup);

impl BoardSource for FixedSetup {
    fn generate<R: Rng>(&mut self, _rng: &mut R) -> Result<Setup, SetupError> {
        self.0.validate()?;
        Ok(self.0.clone())
    }
}

/// Seeded quick-match generator: scattered terrain, a base strip for each
/// side on the top and bottom rows, and `team_size` base-form units each.
#[derive(Debug, Clone, Copy)]
pub struct RandomSetup {
    pub team_size: usize,
}

impl Default for RandomSetup {
    fn default() -> Self {
        RandomSetup {
            team_size: TEAM_SIZE,
        }
    }
}

/// Terrain weights for the scatter pass, in percent.
const SCATTER: [(Terrain, u32); 12] = [
    (Terrain::Grass, 40),
    (Terrain::TallGrass, 14),
    (Terrain::Forest, 10),
    (Terrain::Mountain, 5),
    (Terrain::Water, 6),
    (Terrain::Sand, 5),
    (Terrain::Swamp, 4),
    (Terrain::Road, 5),
    (Terrain::Ruins, 3),
    (Terrain::Cave, 3),
    (Terrain::BerryBush, 3),
    (Terrain::Lava, 2),
];

fn scatter<R: Rng>(rng: &mut R) -> Terrain {
    let total: u32 = SCATTER.iter().map(|(_, w)| w).sum();
    let mut roll = rng.random_range(0..total);
    for (terrain, weight) in SCATTER {
        if roll < weight {
            return terrain;
        }
        roll -= weight;
    }
    Terrain::Grass
}

impl RandomSetup {
    fn home_row(side: Side) -> u8 {
        match side {
            Side::P1 => (BOARD_HEIGHT - 1) as u8,
            Side::P2 => 0,
        }
    }
}

impl BoardSource for RandomSetup {
    fn generate<R: Rng>(&mut self, rng: &mut R) -> Result<Setup, SetupError> {
        let mut board = Board::new();
        for pos in board.positions().collect::<Vec<_>>() {
            board.set(pos, scatter(rng)).map_err(|_| SetupError::BadPlacement(pos))?;
        }
        // Home strips are always open, and each side gets a healing center.
        for side in Side::ALL {
            let row = Self::home_row(side);
            for x in 0..BOARD_WIDTH as u8 {
                let pos = Pos::new(x, row);
                board.set(pos, Terrain::Base).map_err(|_| SetupError::BadPlacement(pos))?;
            }
            let center_row = match side {
                Side::P1 => row - 1,
                Side::P2 => row + 1,
            };
            let center = Pos::new(rng.random_range(0..BOARD_WIDTH as u8), center_row);
            board
                .set(center, Terrain::Center)
                .map_err(|_| SetupError::BadPlacement(center))?;
        }

        let pool: Vec<SpeciesId> = species::base_forms().map(|s| s.id).collect();
        let team = self.team_size.clamp(1, BOARD_WIDTH);
        let mut placements = Vec::with_capacity(team * 2);
        for side in Side::ALL {
            let row = Self::home_row(side);
            let first = ((BOARD_WIDTH - team) / 2) as u8;
            for i in 0..team as u8 {
                let species = *pool
                    .choose(rng)
                    .ok_or(SetupError::EmptySide(side))?;
                placements.push(Placement {
                    side,
                    species,
                    pos: Pos::new(first + i, row),
                });
            }
        }
        let setup = Setup { board, placements };
        setup.validate()?;
        Ok(setup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn random_setup_is_valid_and_seeded() {
        let a = RandomSetup::default()
            .generate(&mut SmallRng::seed_from_u64(5))
            .unwrap();
        let b = RandomSetup::default()
            .generate(&mut SmallRng::seed_from_u64(5))
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.placements.len(), TEAM_SIZE * 2);
    }

    #[test]
    fn overlapping_placements_are_rejected() {
        let pos = Pos::new(1, 1);
        let setup = Setup {
            board: Board::new(),
            placements: alloc::vec![
                Placement {
                    side: Side::P1,
                    species: species::ids::RIOLU,
                    pos,
                },
                Placement {
                    side: Side::P2,
                    species: species::ids::RALTS,
                    pos,
                },
            ],
        };
        assert_eq!(setup.validate(), Err(SetupError::Overlap(pos)));
    }
}
