use proptest::prelude::*;
use rand::{rngs::SmallRng, seq::IndexedRandom, Rng, SeedableRng};
use tactics::core::movement::{self, movement_range};
use tactics::{Board, Pos, Side, SpeciesId, Terrain, Unit, UnitId, BOARD_HEIGHT, BOARD_WIDTH};

fn random_pos<R: Rng>(rng: &mut R) -> Pos {
    Pos::new(
        rng.random_range(0..BOARD_WIDTH as u8),
        rng.random_range(0..BOARD_HEIGHT as u8),
    )
}

/// A random board with a handful of units on distinct tiles.
fn random_field(seed: u64) -> (Board, Vec<Unit>) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut board = Board::new();
    for p in Board::new().positions() {
        let t = *Terrain::ALL.choose(&mut rng).unwrap();
        board.set(p, t).unwrap();
    }
    let mut units: Vec<Unit> = Vec::new();
    let count = rng.random_range(2..8);
    while units.len() < count {
        let pos = random_pos(&mut rng);
        if units.iter().any(|u| u.pos == pos) {
            continue;
        }
        let side = if units.len() % 2 == 0 { Side::P1 } else { Side::P2 };
        let species = SpeciesId(rng.random_range(0..38));
        units.push(Unit::new(UnitId(units.len() as u32 + 1), side, species, pos));
    }
    (board, units)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn range_avoids_enemies_and_impassable(seed in any::<u64>()) {
        let (board, units) = random_field(seed);
        for unit in &units {
            let range = movement_range(&board, &units, unit);
            prop_assert!(range.contains(unit.pos.x as usize, unit.pos.y as usize));
            for (x, y) in range.iter_set_bits() {
                let p = Pos::new(x as u8, y as u8);
                if p == unit.pos {
                    continue;
                }
                prop_assert!(board.terrain(p).is_passable(), "{} is impassable", p);
                prop_assert!(units.iter().all(|o| o.pos != p), "{} is occupied", p);
                prop_assert!(p.distance(unit.pos) <= movement::allowance(unit));
            }
        }
    }

    #[test]
    fn range_grows_with_allowance(seed in any::<u64>()) {
        let (board, units) = random_field(seed);
        let unit = &units[0];
        let mut query = movement::MoveQuery {
            start: unit.pos,
            allowance: 1,
            flying: false,
            blocked: Default::default(),
            occupied: Default::default(),
        };
        let mut previous = movement::solve(&board, &query);
        for allowance in 2..8 {
            query.allowance = allowance;
            let next = movement::solve(&board, &query);
            prop_assert!(previous.is_subset_of(&next));
            previous = next;
        }
    }

    #[test]
    fn flying_reaches_at_least_as_far(seed in any::<u64>()) {
        let (board, units) = random_field(seed);
        let unit = &units[0];
        let walk = movement::MoveQuery {
            start: unit.pos,
            allowance: 4,
            flying: false,
            blocked: Default::default(),
            occupied: Default::default(),
        };
        let fly = movement::MoveQuery { flying: true, ..walk };
        prop_assert!(movement::solve(&board, &walk).is_subset_of(&movement::solve(&board, &fly)));
    }
}
