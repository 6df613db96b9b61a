//! Static reference data: moves, abilities and the species roster.
//!
//! Species are addressed by [`SpeciesId`], which is the index into
//! [`ROSTER`]. Evolution chains are expressed by `evolves_to` links.

use core::fmt;

use super::element::Element::{self, *};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeciesId(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    Physical,
    Special,
    Status,
}

/// Persistent status conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusCondition {
    Burn,
    Poison,
    Paralysis,
    Sleep,
    Freeze,
}

impl StatusCondition {
    pub fn abbreviation(self) -> &'static str {
        match self {
            StatusCondition::Burn => "BRN",
            StatusCondition::Poison => "PSN",
            StatusCondition::Paralysis => "PAR",
            StatusCondition::Sleep => "SLP",
            StatusCondition::Freeze => "FRZ",
        }
    }
}

/// Status a move may inflict on hit, with its chance in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Secondary {
    pub status: StatusCondition,
    pub chance: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Move {
    pub name: &'static str,
    pub element: Element,
    pub category: Category,
    pub power: u8,
    /// Hit chance in percent; 100 never misses.
    pub accuracy: u8,
    pub max_uses: u8,
    pub range: u8,
    pub priority: i8,
    pub secondary: Option<Secondary>,
}

impl Move {
    pub fn is_damaging(&self) -> bool {
        self.category != Category::Status
    }
}

/// Passive abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Ability {
    None,
    Blaze,
    Torrent,
    Overgrow,
    Guts,
    Technician,
    ThickFat,
    Levitate,
    FlashFire,
    Multiscale,
    Sturdy,
    Static,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub hp: u16,
    pub atk: u16,
    pub def: u16,
    pub spa: u16,
    pub spd: u16,
    pub spe: u16,
}

impl Stats {
    pub fn total(&self) -> u32 {
        [self.hp, self.atk, self.def, self.spa, self.spd, self.spe]
            .iter()
            .map(|&s| s as u32)
            .sum()
    }
}

/// Immutable species template.
#[derive(Debug)]
pub struct Species {
    pub id: SpeciesId,
    pub name: &'static str,
    pub types: &'static [Element],
    pub stats: Stats,
    pub movement: u8,
    pub moves: &'static [Move],
    pub ability: Ability,
    /// Position in the evolution chain, 0 for base forms.
    pub stage: u8,
    pub evolves_to: Option<SpeciesId>,
}

impl Species {
    pub fn is_flying(&self) -> bool {
        self.types.contains(&Flying)
    }

    pub fn has_type(&self, element: Element) -> bool {
        self.types.contains(&element)
    }
}

impl SpeciesId {
    /// The template for an id produced by this module.
    ///
    /// Ids from untrusted input should go through [`lookup`] instead.
    pub fn template(self) -> &'static Species {
        &ROSTER[self.0 as usize]
    }
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match lookup(*self) {
            Some(s) => f.write_str(s.name),
            None => write!(f, "species#{}", self.0),
        }
    }
}

pub fn lookup(id: SpeciesId) -> Option<&'static Species> {
    ROSTER.get(id.0 as usize)
}

/// Species a side may draft at match start.
pub fn base_forms() -> impl Iterator<Item = &'static Species> {
    ROSTER.iter().filter(|s| s.stage == 0)
}

/// Built-in fallback used when every move is spent. Never consumes uses.
pub const STRUGGLE: Move = Move {
    name: "Struggle",
    element: Normal,
    category: Category::Physical,
    power: 50,
    accuracy: 100,
    max_uses: 0,
    range: 1,
    priority: 0,
    secondary: None,
};

const fn mv(
    name: &'static str,
    element: Element,
    category: Category,
    power: u8,
    accuracy: u8,
    max_uses: u8,
    range: u8,
) -> Move {
    Move {
        name,
        element,
        category,
        power,
        accuracy,
        max_uses,
        range,
        priority: 0,
        secondary: None,
    }
}

const fn with_status(mut m: Move, status: StatusCondition, chance: u8) -> Move {
    m.secondary = Some(Secondary { status, chance });
    m
}

const fn with_priority(mut m: Move, priority: i8) -> Move {
    m.priority = priority;
    m
}

use Category::{Physical as Phys, Special as Spec, Status as Stat};
use StatusCondition::{Burn, Freeze, Paralysis as Par, Poison as Psn, Sleep};

pub const TACKLE: Move = mv("Tackle", Normal, Phys, 40, 100, 35, 1);
pub const SCRATCH: Move = mv("Scratch", Normal, Phys, 40, 100, 35, 1);
pub const QUICK_ATTACK: Move = with_priority(mv("Quick Attack", Normal, Phys, 40, 100, 30, 1), 1);
pub const BODY_SLAM: Move = with_status(mv("Body Slam", Normal, Phys, 85, 100, 15, 1), Par, 30);
pub const EXTREME_SPEED: Move = with_priority(mv("Extreme Speed", Normal, Phys, 80, 100, 5, 1), 2);
pub const EMBER: Move = with_status(mv("Ember", Fire, Spec, 40, 100, 25, 2), Burn, 10);
pub const FLAMETHROWER: Move = with_status(mv("Flamethrower", Fire, Spec, 90, 100, 15, 2), Burn, 10);
pub const FIRE_BLAST: Move = with_status(mv("Fire Blast", Fire, Spec, 110, 85, 5, 3), Burn, 10);
pub const WILL_O_WISP: Move = with_status(mv("Will-O-Wisp", Fire, Stat, 0, 85, 15, 2), Burn, 100);
pub const WATER_GUN: Move = mv("Water Gun", Water, Spec, 40, 100, 25, 2);
pub const SURF: Move = mv("Surf", Water, Spec, 90, 100, 15, 2);
pub const HYDRO_PUMP: Move = mv("Hydro Pump", Water, Spec, 110, 80, 5, 3);
pub const AQUA_TAIL: Move = mv("Aqua Tail", Water, Phys, 90, 90, 10, 1);
pub const VINE_WHIP: Move = mv("Vine Whip", Grass, Phys, 45, 100, 25, 1);
pub const RAZOR_LEAF: Move = mv("Razor Leaf", Grass, Phys, 55, 95, 25, 2);
pub const SOLAR_BEAM: Move = mv("Solar Beam", Grass, Spec, 120, 100, 5, 2);
pub const SLUDGE_BOMB: Move = with_status(mv("Sludge Bomb", Poison, Spec, 90, 100, 10, 2), Psn, 30);
pub const TOXIC: Move = with_status(mv("Toxic", Poison, Stat, 0, 90, 10, 2), Psn, 100);
pub const THUNDER_SHOCK: Move = with_status(mv("Thunder Shock", Electric, Spec, 40, 100, 30, 2), Par, 10);
pub const THUNDERBOLT: Move = with_status(mv("Thunderbolt", Electric, Spec, 90, 100, 15, 2), Par, 10);
pub const THUNDER_WAVE: Move = with_status(mv("Thunder Wave", Electric, Stat, 0, 90, 20, 2), Par, 100);
pub const LICK: Move = with_status(mv("Lick", Ghost, Phys, 30, 100, 30, 1), Par, 30);
pub const SHADOW_BALL: Move = mv("Shadow Ball", Ghost, Spec, 80, 100, 15, 2);
pub const HYPNOSIS: Move = with_status(mv("Hypnosis", Psychic, Stat, 0, 60, 20, 2), Sleep, 100);
pub const CONFUSION: Move = mv("Confusion", Psychic, Spec, 50, 100, 25, 2);
pub const PSYCHIC_BLAST: Move = mv("Psychic", Psychic, Spec, 90, 100, 10, 2);
pub const KARATE_CHOP: Move = mv("Karate Chop", Fighting, Phys, 50, 100, 25, 1);
pub const CROSS_CHOP: Move = mv("Cross Chop", Fighting, Phys, 100, 80, 5, 1);
pub const AURA_SPHERE: Move = mv("Aura Sphere", Fighting, Spec, 80, 100, 20, 2);
pub const ROCK_THROW: Move = mv("Rock Throw", Rock, Phys, 50, 90, 15, 2);
pub const ROCK_SLIDE: Move = mv("Rock Slide", Rock, Phys, 75, 90, 10, 2);
pub const EARTHQUAKE: Move = mv("Earthquake", Ground, Phys, 100, 100, 10, 1);
pub const MUD_SLAP: Move = mv("Mud-Slap", Ground, Spec, 20, 100, 10, 1);
pub const DRAGON_BREATH: Move = with_status(mv("Dragon Breath", Dragon, Spec, 60, 100, 20, 2), Par, 30);
pub const DRAGON_CLAW: Move = mv("Dragon Claw", Dragon, Phys, 80, 100, 15, 1);
pub const METAL_CLAW: Move = mv("Metal Claw", Steel, Phys, 50, 95, 35, 1);
pub const BULLET_PUNCH: Move = with_priority(mv("Bullet Punch", Steel, Phys, 40, 100, 30, 1), 1);
pub const FLASH_CANNON: Move = mv("Flash Cannon", Steel, Spec, 80, 100, 10, 2);
pub const WING_ATTACK: Move = mv("Wing Attack", Flying, Phys, 60, 100, 35, 1);
pub const AIR_SLASH: Move = mv("Air Slash", Flying, Spec, 75, 95, 15, 2);
pub const X_SCISSOR: Move = mv("X-Scissor", Bug, Phys, 80, 100, 15, 1);
pub const ICE_SHARD: Move = with_priority(mv("Ice Shard", Ice, Phys, 40, 100, 30, 1), 1);
pub const POWDER_SNOW: Move = with_status(mv("Powder Snow", Ice, Spec, 40, 100, 25, 2), Freeze, 10);
pub const ICE_BEAM: Move = with_status(mv("Ice Beam", Ice, Spec, 90, 100, 10, 2), Freeze, 10);
pub const BITE: Move = mv("Bite", Dark, Phys, 60, 100, 25, 1);
pub const CRUNCH: Move = mv("Crunch", Dark, Phys, 80, 100, 15, 1);
pub const DISARMING_VOICE: Move = mv("Disarming Voice", Fairy, Spec, 40, 100, 15, 2);
pub const MOONBLAST: Move = mv("Moonblast", Fairy, Spec, 95, 100, 15, 2);

const fn stats(hp: u16, atk: u16, def: u16, spa: u16, spd: u16, spe: u16) -> Stats {
    Stats {
        hp,
        atk,
        def,
        spa,
        spd,
        spe,
    }
}

/// Chain starter ids, in roster order.
pub mod ids {
    use super::SpeciesId;

    pub const CHARMANDER: SpeciesId = SpeciesId(0);
    pub const CHARMELEON: SpeciesId = SpeciesId(1);
    pub const CHARIZARD: SpeciesId = SpeciesId(2);
    pub const SQUIRTLE: SpeciesId = SpeciesId(3);
    pub const WARTORTLE: SpeciesId = SpeciesId(4);
    pub const BLASTOISE: SpeciesId = SpeciesId(5);
    pub const BULBASAUR: SpeciesId = SpeciesId(6);
    pub const IVYSAUR: SpeciesId = SpeciesId(7);
    pub const VENUSAUR: SpeciesId = SpeciesId(8);
    pub const PICHU: SpeciesId = SpeciesId(9);
    pub const PIKACHU: SpeciesId = SpeciesId(10);
    pub const RAICHU: SpeciesId = SpeciesId(11);
    pub const GASTLY: SpeciesId = SpeciesId(12);
    pub const HAUNTER: SpeciesId = SpeciesId(13);
    pub const GENGAR: SpeciesId = SpeciesId(14);
    pub const MACHOP: SpeciesId = SpeciesId(15);
    pub const MACHOKE: SpeciesId = SpeciesId(16);
    pub const MACHAMP: SpeciesId = SpeciesId(17);
    pub const GEODUDE: SpeciesId = SpeciesId(18);
    pub const GRAVELER: SpeciesId = SpeciesId(19);
    pub const GOLEM: SpeciesId = SpeciesId(20);
    pub const DRATINI: SpeciesId = SpeciesId(21);
    pub const DRAGONAIR: SpeciesId = SpeciesId(22);
    pub const DRAGONITE: SpeciesId = SpeciesId(23);
    pub const RIOLU: SpeciesId = SpeciesId(24);
    pub const LUCARIO: SpeciesId = SpeciesId(25);
    pub const MAGIKARP: SpeciesId = SpeciesId(26);
    pub const GYARADOS: SpeciesId = SpeciesId(27);
    pub const SCYTHER: SpeciesId = SpeciesId(28);
    pub const SCIZOR: SpeciesId = SpeciesId(29);
    pub const VULPIX: SpeciesId = SpeciesId(30);
    pub const NINETALES: SpeciesId = SpeciesId(31);
    pub const SWINUB: SpeciesId = SpeciesId(32);
    pub const PILOSWINE: SpeciesId = SpeciesId(33);
    pub const MAMOSWINE: SpeciesId = SpeciesId(34);
    pub const RALTS: SpeciesId = SpeciesId(35);
    pub const KIRLIA: SpeciesId = SpeciesId(36);
    pub const GARDEVOIR: SpeciesId = SpeciesId(37);
}

use ids::*;

/// Species wild encounters are drawn from.
pub const WILD_POOL: [SpeciesId; 10] = [
    CHARIZARD, BLASTOISE, VENUSAUR, PIKACHU, GYARADOS, GENGAR, LUCARIO, SCIZOR, NINETALES,
    GARDEVOIR,
];

#[rustfmt::skip]
pub static ROSTER: [Species; 38] = [
    Species { id: CHARMANDER, name: "Charmander", types: &[Fire], stats: stats(55, 24, 6, 27, 8, 65), movement: 4,
        moves: &[SCRATCH, EMBER], ability: Ability::Blaze, stage: 0, evolves_to: Some(CHARMELEON) },
    Species { id: CHARMELEON, name: "Charmeleon", types: &[Fire], stats: stats(75, 30, 9, 34, 11, 80), movement: 4,
        moves: &[SCRATCH, EMBER, FLAMETHROWER], ability: Ability::Blaze, stage: 1, evolves_to: Some(CHARIZARD) },
    Species { id: CHARIZARD, name: "Charizard", types: &[Fire, Flying], stats: stats(100, 35, 12, 42, 15, 100), movement: 4,
        moves: &[WING_ATTACK, FLAMETHROWER, FIRE_BLAST, AIR_SLASH], ability: Ability::Blaze, stage: 2, evolves_to: None },
    Species { id: SQUIRTLE, name: "Squirtle", types: &[Water], stats: stats(65, 20, 12, 20, 12, 43), movement: 3,
        moves: &[TACKLE, WATER_GUN], ability: Ability::Torrent, stage: 0, evolves_to: Some(WARTORTLE) },
    Species { id: WARTORTLE, name: "Wartortle", types: &[Water], stats: stats(90, 25, 16, 26, 16, 58), movement: 3,
        moves: &[TACKLE, WATER_GUN, AQUA_TAIL], ability: Ability::Torrent, stage: 1, evolves_to: Some(BLASTOISE) },
    Species { id: BLASTOISE, name: "Blastoise", types: &[Water], stats: stats(120, 28, 20, 32, 22, 78), movement: 3,
        moves: &[AQUA_TAIL, SURF, HYDRO_PUMP, FLASH_CANNON], ability: Ability::Torrent, stage: 2, evolves_to: None },
    Species { id: BULBASAUR, name: "Bulbasaur", types: &[Grass, Poison], stats: stats(70, 20, 10, 24, 12, 45), movement: 3,
        moves: &[VINE_WHIP, TACKLE], ability: Ability::Overgrow, stage: 0, evolves_to: Some(IVYSAUR) },
    Species { id: IVYSAUR, name: "Ivysaur", types: &[Grass, Poison], stats: stats(95, 24, 13, 29, 15, 60), movement: 3,
        moves: &[VINE_WHIP, RAZOR_LEAF, TOXIC], ability: Ability::Overgrow, stage: 1, evolves_to: Some(VENUSAUR) },
    Species { id: VENUSAUR, name: "Venusaur", types: &[Grass, Poison], stats: stats(130, 25, 15, 34, 20, 80), movement: 3,
        moves: &[RAZOR_LEAF, SOLAR_BEAM, SLUDGE_BOMB, TOXIC], ability: Ability::Overgrow, stage: 2, evolves_to: None },
    Species { id: PICHU, name: "Pichu", types: &[Electric], stats: stats(40, 26, 3, 28, 4, 90), movement: 5,
        moves: &[QUICK_ATTACK, THUNDER_SHOCK], ability: Ability::Static, stage: 0, evolves_to: Some(PIKACHU) },
    Species { id: PIKACHU, name: "Pikachu", types: &[Electric], stats: stats(60, 34, 5, 40, 8, 110), movement: 5,
        moves: &[QUICK_ATTACK, THUNDERBOLT, THUNDER_WAVE], ability: Ability::Static, stage: 1, evolves_to: Some(RAICHU) },
    Species { id: RAICHU, name: "Raichu", types: &[Electric], stats: stats(80, 40, 9, 46, 12, 115), movement: 5,
        moves: &[QUICK_ATTACK, THUNDERBOLT, THUNDER_WAVE, BODY_SLAM], ability: Ability::Static, stage: 2, evolves_to: None },
    Species { id: GASTLY, name: "Gastly", types: &[Ghost, Poison], stats: stats(45, 22, 3, 32, 4, 80), movement: 5,
        moves: &[LICK, HYPNOSIS], ability: Ability::Levitate, stage: 0, evolves_to: Some(HAUNTER) },
    Species { id: HAUNTER, name: "Haunter", types: &[Ghost, Poison], stats: stats(55, 28, 4, 40, 5, 95), movement: 5,
        moves: &[LICK, SHADOW_BALL, HYPNOSIS], ability: Ability::Levitate, stage: 1, evolves_to: Some(GENGAR) },
    Species { id: GENGAR, name: "Gengar", types: &[Ghost, Poison], stats: stats(70, 30, 5, 45, 8, 110), movement: 5,
        moves: &[LICK, SHADOW_BALL, SLUDGE_BOMB, HYPNOSIS], ability: Ability::Levitate, stage: 2, evolves_to: None },
    Species { id: MACHOP, name: "Machop", types: &[Fighting], stats: stats(75, 32, 8, 15, 8, 35), movement: 3,
        moves: &[KARATE_CHOP, ROCK_THROW], ability: Ability::Guts, stage: 0, evolves_to: Some(MACHOKE) },
    Species { id: MACHOKE, name: "Machoke", types: &[Fighting], stats: stats(95, 40, 12, 18, 12, 45), movement: 3,
        moves: &[KARATE_CHOP, ROCK_THROW, CROSS_CHOP], ability: Ability::Guts, stage: 1, evolves_to: Some(MACHAMP) },
    Species { id: MACHAMP, name: "Machamp", types: &[Fighting], stats: stats(110, 45, 15, 22, 15, 55), movement: 3,
        moves: &[KARATE_CHOP, CROSS_CHOP, ROCK_SLIDE, BULLET_PUNCH], ability: Ability::Guts, stage: 2, evolves_to: None },
    Species { id: GEODUDE, name: "Geodude", types: &[Rock, Ground], stats: stats(60, 26, 25, 10, 10, 20), movement: 2,
        moves: &[TACKLE, ROCK_THROW, MUD_SLAP], ability: Ability::Sturdy, stage: 0, evolves_to: Some(GRAVELER) },
    Species { id: GRAVELER, name: "Graveler", types: &[Rock, Ground], stats: stats(80, 30, 30, 14, 14, 35), movement: 2,
        moves: &[ROCK_THROW, ROCK_SLIDE, MUD_SLAP], ability: Ability::Sturdy, stage: 1, evolves_to: Some(GOLEM) },
    Species { id: GOLEM, name: "Golem", types: &[Rock, Ground], stats: stats(100, 32, 35, 16, 18, 45), movement: 2,
        moves: &[ROCK_SLIDE, EARTHQUAKE, BODY_SLAM], ability: Ability::Sturdy, stage: 2, evolves_to: None },
    Species { id: DRATINI, name: "Dratini", types: &[Dragon], stats: stats(60, 26, 8, 22, 8, 50), movement: 4,
        moves: &[TACKLE, DRAGON_BREATH], ability: Ability::Multiscale, stage: 0, evolves_to: Some(DRAGONAIR) },
    Species { id: DRAGONAIR, name: "Dragonair", types: &[Dragon], stats: stats(85, 33, 12, 28, 12, 70), movement: 4,
        moves: &[DRAGON_BREATH, DRAGON_CLAW, THUNDER_WAVE], ability: Ability::Multiscale, stage: 1, evolves_to: Some(DRAGONITE) },
    Species { id: DRAGONITE, name: "Dragonite", types: &[Dragon, Flying], stats: stats(130, 42, 18, 38, 20, 110), movement: 5,
        moves: &[DRAGON_CLAW, EXTREME_SPEED, WING_ATTACK, FIRE_BLAST], ability: Ability::Multiscale, stage: 2, evolves_to: None },
    Species { id: RIOLU, name: "Riolu", types: &[Fighting], stats: stats(55, 28, 6, 20, 6, 60), movement: 4,
        moves: &[QUICK_ATTACK, KARATE_CHOP], ability: Ability::None, stage: 0, evolves_to: Some(LUCARIO) },
    Species { id: LUCARIO, name: "Lucario", types: &[Fighting, Steel], stats: stats(80, 38, 10, 40, 10, 90), movement: 5,
        moves: &[BULLET_PUNCH, AURA_SPHERE, METAL_CLAW, FLASH_CANNON], ability: Ability::None, stage: 1, evolves_to: None },
    Species { id: MAGIKARP, name: "Magikarp", types: &[Water], stats: stats(40, 10, 8, 8, 8, 80), movement: 3,
        moves: &[TACKLE], ability: Ability::None, stage: 0, evolves_to: Some(GYARADOS) },
    Species { id: GYARADOS, name: "Gyarados", types: &[Water, Flying], stats: stats(110, 38, 12, 20, 18, 81), movement: 4,
        moves: &[AQUA_TAIL, BITE, CRUNCH, HYDRO_PUMP], ability: Ability::None, stage: 1, evolves_to: None },
    Species { id: SCYTHER, name: "Scyther", types: &[Bug, Flying], stats: stats(70, 36, 10, 12, 10, 105), movement: 5,
        moves: &[QUICK_ATTACK, WING_ATTACK, X_SCISSOR], ability: Ability::Technician, stage: 0, evolves_to: Some(SCIZOR) },
    Species { id: SCIZOR, name: "Scizor", types: &[Bug, Steel], stats: stats(90, 42, 25, 15, 16, 65), movement: 4,
        moves: &[BULLET_PUNCH, X_SCISSOR, METAL_CLAW, QUICK_ATTACK], ability: Ability::Technician, stage: 1, evolves_to: None },
    Species { id: VULPIX, name: "Vulpix", types: &[Fire], stats: stats(50, 20, 6, 26, 10, 65), movement: 4,
        moves: &[QUICK_ATTACK, EMBER, WILL_O_WISP], ability: Ability::FlashFire, stage: 0, evolves_to: Some(NINETALES) },
    Species { id: NINETALES, name: "Ninetales", types: &[Fire], stats: stats(80, 28, 10, 38, 16, 100), movement: 4,
        moves: &[QUICK_ATTACK, FLAMETHROWER, FIRE_BLAST, WILL_O_WISP], ability: Ability::FlashFire, stage: 1, evolves_to: None },
    Species { id: SWINUB, name: "Swinub", types: &[Ice, Ground], stats: stats(60, 24, 10, 14, 8, 50), movement: 3,
        moves: &[TACKLE, POWDER_SNOW, MUD_SLAP], ability: Ability::ThickFat, stage: 0, evolves_to: Some(PILOSWINE) },
    Species { id: PILOSWINE, name: "Piloswine", types: &[Ice, Ground], stats: stats(95, 32, 18, 20, 12, 50), movement: 3,
        moves: &[ICE_SHARD, POWDER_SNOW, EARTHQUAKE], ability: Ability::ThickFat, stage: 1, evolves_to: Some(MAMOSWINE) },
    Species { id: MAMOSWINE, name: "Mamoswine", types: &[Ice, Ground], stats: stats(120, 38, 22, 22, 14, 80), movement: 3,
        moves: &[ICE_SHARD, ICE_BEAM, EARTHQUAKE, ROCK_SLIDE], ability: Ability::ThickFat, stage: 2, evolves_to: None },
    Species { id: RALTS, name: "Ralts", types: &[Psychic, Fairy], stats: stats(40, 12, 4, 28, 10, 40), movement: 4,
        moves: &[CONFUSION, DISARMING_VOICE], ability: Ability::None, stage: 0, evolves_to: Some(KIRLIA) },
    Species { id: KIRLIA, name: "Kirlia", types: &[Psychic, Fairy], stats: stats(55, 16, 6, 36, 14, 50), movement: 4,
        moves: &[CONFUSION, DISARMING_VOICE, HYPNOSIS], ability: Ability::None, stage: 1, evolves_to: Some(GARDEVOIR) },
    Species { id: GARDEVOIR, name: "Gardevoir", types: &[Psychic, Fairy], stats: stats(75, 20, 10, 42, 20, 95), movement: 4,
        moves: &[PSYCHIC_BLAST, MOONBLAST, SHADOW_BALL, HYPNOSIS], ability: Ability::None, stage: 2, evolves_to: None },
];
