//! Terrain kinds and their rule properties.

use core::fmt;

use super::config::IMPASSABLE_COST;
use super::element::Element;

/// One board cell's terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Terrain {
    #[default]
    Grass,
    Forest,
    Water,
    Mountain,
    Base,
    TallGrass,
    Center,
    Sand,
    Bridge,
    BerryBush,
    Ice,
    Lava,
    Swamp,
    Road,
    Ruins,
    Cave,
}

/// Static rule data for a terrain kind.
#[derive(Debug, Clone, Copy)]
pub struct TerrainProps {
    /// Cost to enter. Anything above [`IMPASSABLE_COST`] is a wall.
    pub move_cost: u8,
    /// Defensive bonus in percent for the unit standing here.
    pub defense: u8,
    /// Elements that get the offensive terrain bonus here.
    pub affinity: &'static [Element],
    /// Restores health to the owner's units at the start of their turn.
    pub heals: bool,
    /// Committing a move here may start a wild encounter.
    pub encounter: bool,
    pub vision_bonus: u8,
    /// Units here are hidden from non-adjacent enemies.
    pub conceals: bool,
    /// Consumed on wait, turning into grass.
    pub consumable: bool,
}

const PLAIN: TerrainProps = TerrainProps {
    move_cost: 1,
    defense: 0,
    affinity: &[],
    heals: false,
    encounter: false,
    vision_bonus: 0,
    conceals: false,
    consumable: false,
};

impl Terrain {
    pub const ALL: [Terrain; 16] = [
        Terrain::Grass,
        Terrain::Forest,
        Terrain::Water,
        Terrain::Mountain,
        Terrain::Base,
        Terrain::TallGrass,
        Terrain::Center,
        Terrain::Sand,
        Terrain::Bridge,
        Terrain::BerryBush,
        Terrain::Ice,
        Terrain::Lava,
        Terrain::Swamp,
        Terrain::Road,
        Terrain::Ruins,
        Terrain::Cave,
    ];

    pub fn props(self) -> TerrainProps {
        use Element::*;
        match self {
            Terrain::Grass => TerrainProps {
                affinity: &[Normal, Fighting],
                ..PLAIN
            },
            Terrain::Forest => TerrainProps {
                move_cost: 2,
                defense: 20,
                affinity: &[Grass, Bug, Poison],
                ..PLAIN
            },
            Terrain::Water => TerrainProps {
                move_cost: 99,
                affinity: &[Water, Ice],
                ..PLAIN
            },
            Terrain::Mountain => TerrainProps {
                move_cost: 3,
                defense: 40,
                affinity: &[Rock, Ground, Steel],
                vision_bonus: 2,
                ..PLAIN
            },
            Terrain::Base => TerrainProps {
                defense: 10,
                ..PLAIN
            },
            Terrain::TallGrass => TerrainProps {
                defense: 5,
                affinity: &[Grass, Bug],
                encounter: true,
                ..PLAIN
            },
            Terrain::Center => TerrainProps {
                defense: 15,
                heals: true,
                ..PLAIN
            },
            Terrain::Sand => TerrainProps {
                affinity: &[Fire, Ground],
                ..PLAIN
            },
            Terrain::Bridge => PLAIN,
            Terrain::BerryBush => TerrainProps {
                defense: 5,
                affinity: &[Grass, Bug],
                consumable: true,
                ..PLAIN
            },
            Terrain::Ice => TerrainProps {
                affinity: &[Ice, Water],
                ..PLAIN
            },
            Terrain::Lava => TerrainProps {
                move_cost: 99,
                affinity: &[Fire, Dragon],
                ..PLAIN
            },
            Terrain::Swamp => TerrainProps {
                move_cost: 2,
                defense: 10,
                affinity: &[Poison, Water],
                ..PLAIN
            },
            Terrain::Road => PLAIN,
            Terrain::Ruins => TerrainProps {
                move_cost: 2,
                defense: 25,
                affinity: &[Ghost, Psychic, Dragon],
                ..PLAIN
            },
            Terrain::Cave => TerrainProps {
                defense: 15,
                affinity: &[Rock, Ground, Dark],
                conceals: true,
                ..PLAIN
            },
        }
    }

    pub fn move_cost(self) -> u8 {
        self.props().move_cost
    }

    pub fn is_passable(self) -> bool {
        self.move_cost() <= IMPASSABLE_COST
    }

    /// Multiplier applied to incoming damage's defense term.
    pub fn defense_multiplier(self) -> f64 {
        1.0 + self.props().defense as f64 / 100.0
    }

    /// True when any of `types` matches this terrain's affinity.
    pub fn favours(self, types: &[Element]) -> bool {
        let affinity = self.props().affinity;
        types.iter().any(|t| affinity.contains(t))
    }

    /// One-character glyph for text boards.
    pub fn glyph(self) -> char {
        match self {
            Terrain::Grass => '.',
            Terrain::Forest => 'f',
            Terrain::Water => '~',
            Terrain::Mountain => '^',
            Terrain::Base => 'B',
            Terrain::TallGrass => '"',
            Terrain::Center => '+',
            Terrain::Sand => ':',
            Terrain::Bridge => '=',
            Terrain::BerryBush => '*',
            Terrain::Ice => 'i',
            Terrain::Lava => '%',
            Terrain::Swamp => 's',
            Terrain::Road => '-',
            Terrain::Ruins => 'r',
            Terrain::Cave => 'c',
        }
    }

    pub fn from_glyph(c: char) -> Option<Terrain> {
        Terrain::ALL.into_iter().find(|t| t.glyph() == c)
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
