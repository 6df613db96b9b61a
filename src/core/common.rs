//! Common types for the tactical engine: sides, coordinates, ids and errors.

use core::fmt;

use super::config::{BOARD_HEIGHT, BOARD_WIDTH};
use super::turn::{PhaseKind, Transition};

/// One of the two competing sides. `P1` always opens the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    P1,
    P2,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::P1, Side::P2];

    pub fn opponent(self) -> Side {
        match self {
            Side::P1 => Side::P2,
            Side::P2 => Side::P1,
        }
    }

    /// Index into per-side arrays.
    pub fn index(self) -> usize {
        match self {
            Side::P1 => 0,
            Side::P2 => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::P1 => write!(f, "P1"),
            Side::P2 => write!(f, "P2"),
        }
    }
}

/// Board coordinate; `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct Pos {
    pub x: u8,
    pub y: u8,
}

const CARDINALS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];
/// Spawn search order: cardinals first, then diagonals.
const SURROUNDING: [(i8, i8); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (1, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
];

impl Pos {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    pub fn in_bounds(self) -> bool {
        (self.x as usize) < BOARD_WIDTH && (self.y as usize) < BOARD_HEIGHT
    }

    /// Row-major tile index.
    pub fn index(self) -> usize {
        self.y as usize * BOARD_WIDTH + self.x as usize
    }

    pub fn from_index(idx: usize) -> Self {
        Self::new((idx % BOARD_WIDTH) as u8, (idx / BOARD_WIDTH) as u8)
    }

    /// Manhattan distance.
    pub fn distance(self, other: Pos) -> u8 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    fn offset(self, dx: i8, dy: i8) -> Option<Pos> {
        let x = self.x as i16 + dx as i16;
        let y = self.y as i16 + dy as i16;
        if x < 0 || y < 0 {
            return None;
        }
        let p = Pos::new(x as u8, y as u8);
        p.in_bounds().then_some(p)
    }

    /// In-bounds orthogonal neighbours.
    pub fn neighbors(self) -> impl Iterator<Item = Pos> {
        CARDINALS
            .into_iter()
            .filter_map(move |(dx, dy)| self.offset(dx, dy))
    }

    /// In-bounds tiles of the surrounding ring, cardinals first.
    pub fn surrounding(self) -> impl Iterator<Item = Pos> {
        SURROUNDING
            .into_iter()
            .filter_map(move |(dx, dy)| self.offset(dx, dy))
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Unique unit identity within a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitId(pub u32);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reasons an intent is rejected. A rejected intent never changes state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionError {
    /// The match already has a winner.
    MatchFinished,
    /// The sender is not the side to act.
    NotYourTurn(Side),
    /// No unit with this id is in play.
    UnknownUnit(UnitId),
    /// The unit belongs to the other side.
    NotYourUnit(UnitId),
    /// The unit has already acted this turn.
    AlreadyActed(UnitId),
    /// The intent names a unit other than the one in play this phase.
    UnitMismatch { expected: UnitId, got: UnitId },
    /// Coordinate outside the board.
    OutOfBounds(Pos),
    /// Tile is not in the cached movement range.
    OutOfRange(Pos),
    /// Tile holds no enemy in the cached attack range.
    NoTarget(Pos),
    /// Move slot does not exist, is spent, or cannot reach the target.
    InvalidMove(u8),
    /// The phase does not accept this transition.
    IllegalTransition {
        phase: PhaseKind,
        transition: Transition,
    },
    /// The transition ended in a phase its table row does not list.
    UnexpectedLanding {
        from: PhaseKind,
        transition: Transition,
        to: PhaseKind,
    },
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::MatchFinished => write!(f, "The match is over"),
            ActionError::NotYourTurn(side) => write!(f, "It is {}'s turn", side),
            ActionError::UnknownUnit(id) => write!(f, "Unit {} is not in play", id),
            ActionError::NotYourUnit(id) => write!(f, "Unit {} belongs to the opponent", id),
            ActionError::AlreadyActed(id) => write!(f, "Unit {} has already acted", id),
            ActionError::UnitMismatch { expected, got } => {
                write!(f, "Unit {} is in play, not {}", expected, got)
            }
            ActionError::OutOfBounds(p) => write!(f, "Tile {} is off the board", p),
            ActionError::OutOfRange(p) => write!(f, "Tile {} is out of movement range", p),
            ActionError::NoTarget(p) => write!(f, "No attackable enemy at {}", p),
            ActionError::InvalidMove(slot) => write!(f, "Move slot {} cannot be used", slot),
            ActionError::IllegalTransition { phase, transition } => {
                write!(f, "{:?} is not allowed while {:?}", transition, phase)
            }
            ActionError::UnexpectedLanding {
                from,
                transition,
                to,
            } => write!(f, "{:?} from {:?} cannot end in {:?}", transition, from, to),
        }
    }
}
