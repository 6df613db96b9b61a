//! Element types and the type-effectiveness chart.

use core::fmt;

/// Elemental type of a species or a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Element {
    Normal,
    Fire,
    Water,
    Grass,
    Electric,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

/// Single-type matchup class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matchup {
    Immune,
    Resisted,
    Neutral,
    Super,
}

impl Matchup {
    pub fn multiplier(self) -> f64 {
        match self {
            Matchup::Immune => 0.0,
            Matchup::Resisted => 0.5,
            Matchup::Neutral => 1.0,
            Matchup::Super => 2.0,
        }
    }
}

use Element::*;

/// Chart row for one attacking type.
struct ChartRow {
    strong: &'static [Element],
    weak: &'static [Element],
    immune: &'static [Element],
}

fn chart_row(attack: Element) -> ChartRow {
    match attack {
        Normal => ChartRow {
            strong: &[],
            weak: &[Rock, Steel],
            immune: &[Ghost],
        },
        Fire => ChartRow {
            strong: &[Grass, Ice, Bug, Steel],
            weak: &[Fire, Water, Rock, Dragon],
            immune: &[],
        },
        Water => ChartRow {
            strong: &[Fire, Ground, Rock],
            weak: &[Water, Grass, Dragon],
            immune: &[],
        },
        Grass => ChartRow {
            strong: &[Water, Ground, Rock],
            weak: &[Fire, Grass, Poison, Flying, Bug, Dragon, Steel],
            immune: &[],
        },
        Electric => ChartRow {
            strong: &[Water, Flying],
            weak: &[Electric, Grass, Dragon],
            immune: &[Ground],
        },
        Ice => ChartRow {
            strong: &[Grass, Ground, Flying, Dragon],
            weak: &[Fire, Water, Ice, Steel],
            immune: &[],
        },
        Fighting => ChartRow {
            strong: &[Normal, Ice, Rock, Dark, Steel],
            weak: &[Poison, Flying, Psychic, Bug, Fairy],
            immune: &[Ghost],
        },
        Poison => ChartRow {
            strong: &[Grass, Fairy],
            weak: &[Poison, Ground, Rock, Ghost],
            immune: &[Steel],
        },
        Ground => ChartRow {
            strong: &[Fire, Electric, Poison, Rock, Steel],
            weak: &[Grass, Bug],
            immune: &[Flying],
        },
        Flying => ChartRow {
            strong: &[Grass, Fighting, Bug],
            weak: &[Electric, Rock, Steel],
            immune: &[],
        },
        Psychic => ChartRow {
            strong: &[Fighting, Poison],
            weak: &[Psychic, Steel],
            immune: &[Dark],
        },
        Bug => ChartRow {
            strong: &[Grass, Psychic, Dark],
            weak: &[Fire, Fighting, Poison, Flying, Ghost, Steel, Fairy],
            immune: &[],
        },
        Rock => ChartRow {
            strong: &[Fire, Ice, Flying, Bug],
            weak: &[Fighting, Ground, Steel],
            immune: &[],
        },
        Ghost => ChartRow {
            strong: &[Psychic, Ghost],
            weak: &[Dark],
            immune: &[Normal],
        },
        Dragon => ChartRow {
            strong: &[Dragon],
            weak: &[Steel],
            immune: &[Fairy],
        },
        Dark => ChartRow {
            strong: &[Psychic, Ghost],
            weak: &[Fighting, Dark, Fairy],
            immune: &[],
        },
        Steel => ChartRow {
            strong: &[Ice, Rock, Fairy],
            weak: &[Fire, Water, Electric, Steel],
            immune: &[],
        },
        Fairy => ChartRow {
            strong: &[Fighting, Dragon, Dark],
            weak: &[Fire, Poison, Steel],
            immune: &[],
        },
    }
}

/// Chart lookup for one attacking type against one defending type.
pub fn matchup(attack: Element, defend: Element) -> Matchup {
    let row = chart_row(attack);
    if row.immune.contains(&defend) {
        Matchup::Immune
    } else if row.strong.contains(&defend) {
        Matchup::Super
    } else if row.weak.contains(&defend) {
        Matchup::Resisted
    } else {
        Matchup::Neutral
    }
}

/// Product of the chart lookups against every defending type.
pub fn effectiveness(attack: Element, defender: &[Element]) -> f64 {
    defender
        .iter()
        .map(|&d| matchup(attack, d).multiplier())
        .product()
}

impl Element {
    pub const ALL: [Element; 18] = [
        Normal, Fire, Water, Grass, Electric, Ice, Fighting, Poison, Ground, Flying, Psychic,
        Bug, Rock, Ghost, Dragon, Dark, Steel, Fairy,
    ];
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
