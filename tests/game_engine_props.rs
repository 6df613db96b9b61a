use proptest::prelude::*;
use rand::{rngs::SmallRng, seq::IndexedRandom, Rng, SeedableRng};
use tactics::{
    Controller, GreedyAi, Intent, Match, Pos, Side, Snapshot, Timing, UnitId, BOARD_HEIGHT,
    BOARD_WIDTH,
};

const TIMINGS: [Timing; 4] = [Timing::Best, Timing::Good, Timing::Fair, Timing::Miss];

/// Positions slightly past the board edges so out-of-bounds intents get
/// exercised too.
fn any_pos<R: Rng>(rng: &mut R) -> Pos {
    Pos::new(
        rng.random_range(0..BOARD_WIDTH as u8 + 2),
        rng.random_range(0..BOARD_HEIGHT as u8 + 2),
    )
}

fn any_unit<R: Rng>(rng: &mut R, game: &Match) -> UnitId {
    UnitId(rng.random_range(1..game.units().len() as u32 + 3))
}

/// Mostly noise, with enough sensible play mixed in that matches progress
/// through every phase.
fn random_intent<R: Rng>(rng: &mut R, game: &Match, ai: &mut GreedyAi) -> (Side, Intent) {
    let side = if rng.random_bool(0.9) {
        game.side_to_act()
    } else {
        game.side_to_act().opponent()
    };
    if rng.random_bool(0.4) {
        return (side, ai.choose(&Snapshot::of(game, side)));
    }
    let unit = match game.phase().unit() {
        Some(id) if rng.random_bool(0.7) => id,
        _ => any_unit(rng, game),
    };
    let intent = match rng.random_range(0..11) {
        0 => Intent::Select { unit },
        1 => Intent::Destination {
            unit,
            to: any_pos(rng),
        },
        2 => Intent::Move {
            unit,
            to: any_pos(rng),
        },
        3 => Intent::Act { unit },
        4 => Intent::Attack {
            unit,
            target: any_pos(rng),
            slot: if rng.random_bool(0.5) {
                Some(rng.random_range(0..5))
            } else {
                None
            },
        },
        5 => Intent::Wait { unit },
        6 => Intent::Capture {
            unit,
            throw: if rng.random_bool(0.8) {
                Some([
                    *TIMINGS.choose(rng).unwrap(),
                    *TIMINGS.choose(rng).unwrap(),
                    *TIMINGS.choose(rng).unwrap(),
                ])
            } else {
                None
            },
        },
        7 => Intent::ConfirmEvolution { unit },
        8 => Intent::Cancel,
        9 => Intent::EndTurn,
        _ => Intent::Tile { pos: any_pos(rng) },
    };
    (side, intent)
}

fn views(game: &Match) -> [Snapshot; 2] {
    [Snapshot::of(game, Side::P1), Snapshot::of(game, Side::P2)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn random_play_keeps_invariants(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut game = Match::quick(seed).unwrap();
        let mut ai = GreedyAi::new();

        for _ in 0..400 {
            if game.winner().is_some() {
                break;
            }
            let (side, intent) = random_intent(&mut rng, &game, &mut ai);
            let before = game.clone();
            let before_views = views(&game);

            match game.apply(side, intent) {
                Err(_) => {
                    prop_assert_eq!(views(&game), before_views);
                    // The RNG did not advance either: both copies settle a
                    // forced expiry identically.
                    let mut a = before.clone();
                    let mut b = game.clone();
                    prop_assert_eq!(a.expire_turn(), b.expire_turn());
                }
                Ok(_) => {
                    for unit in game.units() {
                        prop_assert!(unit.hp > 0, "{} left on the board at 0 hp", unit.id);
                        prop_assert!(unit.hp <= unit.max_hp());
                    }
                    for (i, a) in game.units().iter().enumerate() {
                        for b in &game.units()[i + 1..] {
                            prop_assert_ne!(a.pos, b.pos);
                        }
                    }
                    for s in Side::ALL {
                        prop_assert!(before
                            .visibility(s)
                            .explored
                            .is_subset_of(&game.visibility(s).explored));
                    }
                    let wrapped = before.side_to_act() == Side::P2
                        && game.side_to_act() == Side::P1;
                    prop_assert_eq!(game.turn(), before.turn() + wrapped as u32);
                }
            }
        }
    }

    #[test]
    fn expiry_always_passes_the_turn(seed in any::<u64>(), steps in 0usize..30) {
        let mut rng = SmallRng::seed_from_u64(seed ^ 0x5eed);
        let mut game = Match::quick(seed).unwrap();
        let mut ai = GreedyAi::new();
        for _ in 0..steps {
            let (side, intent) = random_intent(&mut rng, &game, &mut ai);
            let _ = game.apply(side, intent);
        }
        prop_assume!(game.winner().is_none());
        let side = game.side_to_act();
        game.expire_turn();
        if game.winner().is_none() {
            prop_assert_eq!(game.side_to_act(), side.opponent());
            prop_assert_eq!(game.phase(), tactics::Phase::Selecting);
            prop_assert!(game.pending_encounter().is_none());
        }
    }
}

#[test]
fn quick_matches_are_reproducible() {
    let a = Match::quick(77).unwrap();
    let b = Match::quick(77).unwrap();
    assert_eq!(views(&a), views(&b));
    let c = Match::quick(78).unwrap();
    assert_ne!(views(&a)[0], views(&c)[0]);
}

#[test]
fn wrong_side_is_rejected() {
    let mut game = Match::quick(3).unwrap();
    let err = game.apply(Side::P2, Intent::EndTurn).unwrap_err();
    assert_eq!(err, tactics::ActionError::NotYourTurn(Side::P1));
    assert_eq!(game.turn(), 1);
}

#[test]
fn end_turn_counts_full_rounds() {
    let mut game = Match::quick(3).unwrap();
    let start = game.turn();
    game.apply(Side::P1, Intent::EndTurn).unwrap();
    assert_eq!(game.turn(), start);
    assert_eq!(game.side_to_act(), Side::P2);
    game.apply(Side::P2, Intent::EndTurn).unwrap();
    assert_eq!(game.turn(), start + 1);
    assert_eq!(game.side_to_act(), Side::P1);
}
