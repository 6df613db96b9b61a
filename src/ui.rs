//! Text rendering of a snapshot for the terminal.

use std::fmt::Write;

use crate::core::{
    common::Pos,
    config::{BOARD_HEIGHT, BOARD_WIDTH},
    game::{Event, MatchStatus},
    turn::Phase,
};
use crate::domain::{Snapshot, UnitView};

/// Board coordinate as shown to players: column letter, 1-based row.
pub fn coord_name(pos: Pos) -> String {
    format!("{}{}", (b'A' + pos.x) as char, pos.y as usize + 1)
}

fn unit_glyph(snapshot: &Snapshot, view: &UnitView) -> char {
    match view {
        UnitView::Known(u) => {
            let c = u.name.chars().next().unwrap_or('?');
            if u.side == snapshot.recipient {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            }
        }
        UnitView::Unidentified { .. } => '?',
    }
}

/// Grid, unit roster and phase line for `snapshot`.
pub fn render(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let _ = write!(out, "    ");
    for x in 0..BOARD_WIDTH {
        let _ = write!(out, " {}", (b'A' + x as u8) as char);
    }
    let _ = writeln!(out);
    for y in 0..BOARD_HEIGHT {
        let _ = write!(out, " {:2} ", y + 1);
        for x in 0..BOARD_WIDTH {
            let pos = Pos::new(x as u8, y as u8);
            let glyph = match snapshot.units.iter().find(|v| v.pos() == pos) {
                Some(view) => unit_glyph(snapshot, view),
                None if snapshot.movement.contains(x, y) => 'o',
                None => snapshot.board.terrain(pos).glyph(),
            };
            let fog = if snapshot.visible.contains(x, y) { ' ' } else { ',' };
            let _ = write!(out, "{}{}", fog, glyph);
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out);
    for view in &snapshot.units {
        match view {
            UnitView::Known(u) => {
                let _ = write!(
                    out,
                    "  {} {} {:<10} {} hp {}/{} kills {}",
                    unit_glyph(snapshot, view),
                    u.id,
                    u.name,
                    coord_name(u.pos),
                    u.hp,
                    u.max_hp,
                    u.kills
                );
                if let Some(status) = u.status {
                    let _ = write!(out, " {:?}", status);
                }
                if u.has_acted {
                    let _ = write!(out, " (done)");
                }
                let _ = writeln!(out);
            }
            UnitView::Unidentified { pos } => {
                let _ = writeln!(out, "  ? unknown unit at {}", coord_name(*pos));
            }
        }
    }

    let _ = writeln!(out);
    match snapshot.status {
        MatchStatus::Finished { winner } => {
            let _ = writeln!(out, "Match over: {} wins", winner);
        }
        MatchStatus::Playing if !snapshot.is_my_turn() => {
            let _ = writeln!(
                out,
                "Turn {}: waiting for {}",
                snapshot.turn, snapshot.side_to_act
            );
        }
        MatchStatus::Playing => {
            let _ = writeln!(out, "Turn {}: {}", snapshot.turn, phase_line(snapshot));
        }
    }
    out
}

fn phase_line(snapshot: &Snapshot) -> String {
    match snapshot.phase {
        Some(Phase::Selecting) | None => "select a unit".to_string(),
        Some(Phase::Moving { unit }) => format!("choose where {} goes", unit),
        Some(Phase::ActionMenu {
            unit, destination, ..
        }) => format!("{} at {}: act, attack or wait", unit, coord_name(destination)),
        Some(Phase::Attacking { unit }) => format!("choose a target for {}", unit),
        Some(Phase::Capturing { unit }) => match snapshot.encounter {
            Some(e) => format!(
                "{} found a wild {} at {}: capture or flee",
                unit,
                e.species,
                coord_name(e.spawn)
            ),
            None => format!("{} found a wild unit: capture or flee", unit),
        },
        Some(Phase::Evolving { unit }) => format!("{} is ready to evolve", unit),
    }
}

/// One line per event, for logs and the CLI.
pub fn describe(event: &Event) -> String {
    match event {
        Event::Moved { unit, to, .. } => format!("{} moved to {}", unit, coord_name(*to)),
        Event::Encounter(e) => format!("a wild {} appeared", e.species),
        Event::Attacked(outcome) => {
            let s = &outcome.strike;
            let mut line = if s.missed {
                format!("{} used {} and missed", s.attacker, s.move_name)
            } else {
                format!(
                    "{} used {} on {} for {}{}",
                    s.attacker,
                    s.move_name,
                    s.defender,
                    s.damage,
                    if s.critical { " (critical)" } else { "" }
                )
            };
            if let Some(c) = &outcome.counter {
                let _ = write!(line, "; {} countered for {}", c.attacker, c.damage);
            }
            line
        }
        Event::Fainted { unit, .. } => format!("{} fainted", unit),
        Event::EvolutionQueued { unit, into } => format!("{} can evolve into {}", unit, into),
        Event::Evolved { unit, into, .. } => format!("{} evolved into {}", unit, into),
        Event::Captured { unit, attempt } => {
            format!("captured {} as {}", attempt.species, unit)
        }
        Event::CaptureFailed(attempt) => format!("{} broke free", attempt.species),
        Event::Fled { unit } => format!("{} fled", unit),
        Event::Waited { unit } => format!("{} waits", unit),
        Event::Healed { unit, amount, .. } => format!("{} recovered {} hp", unit, amount),
        Event::StatusTick(tick) => format!("{:?}", tick),
        Event::TurnEnded { next, turn, expired } => format!(
            "turn {} passes to {}{}",
            turn,
            next,
            if *expired { " (time)" } else { "" }
        ),
        Event::MatchFinished { winner } => format!("{} wins the match", winner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_are_letter_then_row() {
        assert_eq!(coord_name(Pos::new(0, 0)), "A1");
        assert_eq!(coord_name(Pos::new(9, 11)), "J12");
    }

    #[test]
    fn render_shows_every_row() {
        let game = crate::core::game::Match::quick(5).unwrap();
        let text = render(&Snapshot::of(&game, crate::core::common::Side::P1));
        assert!(text.contains(" 12 "));
        assert!(text.contains("select a unit"));
    }
}
