use std::io::{self, BufRead, Write};

use crate::core::{
    capture::Timing,
    common::{Pos, Side, UnitId},
    config::{BOARD_HEIGHT, BOARD_WIDTH, CAPTURE_CHECKS},
    game::{Event, Intent},
};
use crate::domain::Snapshot;
use crate::ui;

use super::Controller;

const HELP: &str = "\
Commands:
  select <id>            pick a unit (e.g. select 2)
  go <tile>              choose a destination (e.g. go C7)
  move <id> <tile>       move a unit straight away
  act                    commit the move and fight if anything is in reach
  attack <tile> [slot]   attack the unit on <tile>, optionally with move slot 1-4
  wait [id]              end a unit's action
  capture <t> <t> <t>    throw with timings best/good/fair/miss
  flee                   leave a wild encounter
  evolve                 confirm a pending evolution
  cancel                 step back
  end                    end the turn
  <tile>                 click a tile";

/// Human controller reading commands from stdin.
#[derive(Debug, Default)]
pub struct CliController;

impl CliController {
    pub fn new() -> Self {
        Self
    }
}

/// Parse a tile such as `C7`: column letter then 1-based row.
pub fn parse_coord(input: &str) -> Result<Pos, String> {
    let mut chars = input.trim().chars();
    let col_ch = chars
        .next()
        .ok_or("Empty tile")?
        .to_ascii_uppercase();
    if !col_ch.is_ascii_alphabetic() {
        return Err(format!("Invalid column '{}'", col_ch));
    }
    let col = (col_ch as u8 - b'A') as usize;
    if col >= BOARD_WIDTH {
        return Err(format!("Column '{}' is off the board", col_ch));
    }
    let row_str: String = chars.collect();
    let row: usize = row_str
        .parse()
        .map_err(|_| format!("Invalid row '{}'", row_str))?;
    if row == 0 || row > BOARD_HEIGHT {
        return Err(format!("Row {} is off the board", row));
    }
    Ok(Pos::new(col as u8, (row - 1) as u8))
}

fn parse_unit(token: Option<&str>) -> Result<UnitId, String> {
    let token = token.ok_or("Missing unit id")?;
    token
        .trim_start_matches('#')
        .parse()
        .map(UnitId)
        .map_err(|_| format!("Invalid unit id '{}'", token))
}

fn parse_timing(token: &str) -> Result<Timing, String> {
    match token.to_ascii_lowercase().as_str() {
        "best" | "b" => Ok(Timing::Best),
        "good" | "g" => Ok(Timing::Good),
        "fair" | "f" => Ok(Timing::Fair),
        "miss" | "m" => Ok(Timing::Miss),
        other => Err(format!("Unknown timing '{}'", other)),
    }
}

fn phase_unit(snapshot: &Snapshot) -> Result<UnitId, String> {
    snapshot
        .phase
        .and_then(|p| p.unit())
        .ok_or_else(|| "Select a unit first".to_string())
}

/// Turn one command line into an intent, using the snapshot's phase for
/// commands that act on the current unit.
pub fn parse_command(input: &str, snapshot: &Snapshot) -> Result<Intent, String> {
    let mut words = input.split_whitespace();
    let cmd = words.next().ok_or("Empty command")?.to_ascii_lowercase();
    let intent = match cmd.as_str() {
        "select" | "s" => Intent::Select {
            unit: parse_unit(words.next())?,
        },
        "go" => Intent::Destination {
            unit: phase_unit(snapshot)?,
            to: parse_coord(words.next().ok_or("Missing tile")?)?,
        },
        "move" => Intent::Move {
            unit: parse_unit(words.next())?,
            to: parse_coord(words.next().ok_or("Missing tile")?)?,
        },
        "act" => Intent::Act {
            unit: phase_unit(snapshot)?,
        },
        "attack" | "a" => {
            let unit = phase_unit(snapshot)?;
            let target = parse_coord(words.next().ok_or("Missing target tile")?)?;
            let slot = match words.next() {
                Some(s) => {
                    let n: u8 = s.parse().map_err(|_| format!("Invalid slot '{}'", s))?;
                    if !(1..=4).contains(&n) {
                        return Err("Slot must be 1-4".to_string());
                    }
                    Some(n - 1)
                }
                None => None,
            };
            Intent::Attack { unit, target, slot }
        }
        "wait" | "w" => Intent::Wait {
            unit: match words.next() {
                Some(id) => parse_unit(Some(id))?,
                None => phase_unit(snapshot)?,
            },
        },
        "capture" | "c" => {
            let timings = words.map(parse_timing).collect::<Result<Vec<_>, _>>()?;
            let throw: [Timing; CAPTURE_CHECKS] = timings
                .try_into()
                .map_err(|_| format!("Give exactly {} timings", CAPTURE_CHECKS))?;
            Intent::Capture {
                unit: phase_unit(snapshot)?,
                throw: Some(throw),
            }
        }
        "flee" => Intent::Capture {
            unit: phase_unit(snapshot)?,
            throw: None,
        },
        "evolve" => Intent::ConfirmEvolution {
            unit: phase_unit(snapshot)?,
        },
        "cancel" | "back" => Intent::Cancel,
        "end" => Intent::EndTurn,
        _ => Intent::Tile {
            pos: parse_coord(&cmd).map_err(|_| format!("Unknown command '{}'", cmd))?,
        },
    };
    Ok(intent)
}

impl Controller for CliController {
    fn choose(&mut self, snapshot: &Snapshot) -> Intent {
        println!("\n{}", ui::render(snapshot));
        let stdin = io::stdin();
        loop {
            print!("> ");
            let _ = io::stdout().flush();
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => return Intent::EndTurn,
                Ok(_) => {}
            }
            if line.trim().eq_ignore_ascii_case("help") {
                println!("{}", HELP);
                continue;
            }
            match parse_command(&line, snapshot) {
                Ok(intent) => return intent,
                Err(e) => println!("{} (type 'help' for commands)", e),
            }
        }
    }

    fn observe(&mut self, _actor: Side, events: &[Event]) {
        for event in events {
            println!("  {}", ui::describe(event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::game::Match;
    use crate::core::turn::Phase;

    fn snapshot() -> Snapshot {
        Snapshot::of(&Match::quick(9).unwrap(), Side::P1)
    }

    #[test]
    fn coords_parse_case_insensitively() {
        assert_eq!(parse_coord("c7"), Ok(Pos::new(2, 6)));
        assert_eq!(parse_coord("J12"), Ok(Pos::new(9, 11)));
        assert!(parse_coord("K1").is_err());
        assert!(parse_coord("A13").is_err());
        assert!(parse_coord("A0").is_err());
    }

    #[test]
    fn unit_commands_need_a_selection() {
        let snap = snapshot();
        assert!(parse_command("act", &snap).is_err());
        assert_eq!(
            parse_command("select #3", &snap),
            Ok(Intent::Select { unit: UnitId(3) })
        );
        assert_eq!(parse_command("end", &snap), Ok(Intent::EndTurn));
        assert_eq!(
            parse_command("b4", &snap),
            Ok(Intent::Tile {
                pos: Pos::new(1, 3)
            })
        );
    }

    #[test]
    fn capture_takes_three_timings() {
        let mut snap = snapshot();
        snap.phase = Some(Phase::Capturing { unit: UnitId(1) });
        assert_eq!(
            parse_command("capture best good miss", &snap),
            Ok(Intent::Capture {
                unit: UnitId(1),
                throw: Some([Timing::Best, Timing::Good, Timing::Miss]),
            })
        );
        assert!(parse_command("capture best", &snap).is_err());
        assert_eq!(
            parse_command("flee", &snap),
            Ok(Intent::Capture {
                unit: UnitId(1),
                throw: None
            })
        );
    }
}
