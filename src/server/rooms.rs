//! Room bookkeeping: codes, hosts and guests.

use std::collections::HashMap;
use std::fmt;

use rand::Rng;
use tokio::time::{Duration, Instant};

use super::match_actor::MatchHandle;
use super::SessionId;
use crate::core::common::Side;
use crate::protocol::GameMode;

/// Room code alphabet, without look-alike characters.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const CODE_LEN: usize = 6;
/// Rooms older than this are swept.
pub const ROOM_MAX_AGE: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    NotFound(String),
    Full,
    OwnRoom,
    NotInRoom,
    NotHost,
    WaitingForGuest,
    AlreadyStarted,
}

impl fmt::Display for RoomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomError::NotFound(code) => write!(f, "Room {} not found", code),
            RoomError::Full => write!(f, "The room is full"),
            RoomError::OwnRoom => write!(f, "You cannot join your own room"),
            RoomError::NotInRoom => write!(f, "You are not in a room"),
            RoomError::NotHost => write!(f, "Only the host can start the game"),
            RoomError::WaitingForGuest => write!(f, "Waiting for another player"),
            RoomError::AlreadyStarted => write!(f, "The game has already started"),
        }
    }
}

impl std::error::Error for RoomError {}

pub struct Room {
    pub code: String,
    pub host: SessionId,
    pub guest: Option<SessionId>,
    pub mode: GameMode,
    pub created_at: Instant,
    pub game: Option<MatchHandle>,
}

impl Room {
    pub fn is_full(&self) -> bool {
        self.guest.is_some()
    }

    pub fn side_of(&self, session: SessionId) -> Option<Side> {
        if self.host == session {
            Some(Side::P1)
        } else if self.guest == Some(session) {
            Some(Side::P2)
        } else {
            None
        }
    }

    /// The other participant, if any.
    pub fn peer_of(&self, session: SessionId) -> Option<SessionId> {
        if self.host == session {
            self.guest
        } else {
            Some(self.host)
        }
    }
}

/// What a departure did to its room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub code: String,
    /// The host left and the room is gone.
    pub destroyed: bool,
    /// Whoever is left to be told.
    pub peer: Option<SessionId>,
}

#[derive(Default)]
pub struct RoomManager {
    rooms: HashMap<String, Room>,
    members: HashMap<SessionId, String>,
}

impl RoomManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_code<R: Rng>(&self, rng: &mut R) -> String {
        loop {
            let code: String = (0..CODE_LEN)
                .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
                .collect();
            if !self.rooms.contains_key(&code) {
                return code;
            }
        }
    }

    /// Open a room hosted by `host`, leaving any room it was in.
    pub fn create_room<R: Rng>(&mut self, rng: &mut R, host: SessionId, mode: GameMode) -> String {
        self.leave(host);
        let code = self.fresh_code(rng);
        self.rooms.insert(
            code.clone(),
            Room {
                code: code.clone(),
                host,
                guest: None,
                mode,
                created_at: Instant::now(),
                game: None,
            },
        );
        self.members.insert(host, code.clone());
        code
    }

    /// Join by code, case-insensitively. Returns the normalised code.
    pub fn join_room(&mut self, code: &str, guest: SessionId) -> Result<String, RoomError> {
        let code = code.trim().to_ascii_uppercase();
        let room = self
            .rooms
            .get(&code)
            .ok_or_else(|| RoomError::NotFound(code.clone()))?;
        if room.host == guest {
            return Err(RoomError::OwnRoom);
        }
        if room.is_full() {
            return Err(RoomError::Full);
        }
        self.leave(guest);
        if let Some(room) = self.rooms.get_mut(&code) {
            room.guest = Some(guest);
        }
        self.members.insert(guest, code.clone());
        Ok(code)
    }

    /// Remove `session` from its room. A departing host destroys the room;
    /// a departing guest frees the slot.
    pub fn leave(&mut self, session: SessionId) -> Option<Departure> {
        let code = self.members.remove(&session)?;
        let room = self.rooms.get_mut(&code)?;
        let peer = room.peer_of(session);
        if room.host == session {
            if let Some(guest) = room.guest {
                self.members.remove(&guest);
            }
            self.rooms.remove(&code);
            Some(Departure {
                code,
                destroyed: true,
                peer,
            })
        } else {
            room.guest = None;
            // A started match cannot continue with one side missing.
            room.game = None;
            Some(Departure {
                code,
                destroyed: false,
                peer,
            })
        }
    }

    pub fn room_of(&self, session: SessionId) -> Option<&Room> {
        self.members.get(&session).and_then(|c| self.rooms.get(c))
    }

    pub fn room_of_mut(&mut self, session: SessionId) -> Option<&mut Room> {
        let code = self.members.get(&session)?;
        self.rooms.get_mut(code)
    }

    pub fn get(&self, code: &str) -> Option<&Room> {
        self.rooms.get(code)
    }

    /// Check that `session` may start its room's match.
    pub fn can_start(&self, session: SessionId) -> Result<&Room, RoomError> {
        let room = self.room_of(session).ok_or(RoomError::NotInRoom)?;
        if room.host != session {
            return Err(RoomError::NotHost);
        }
        if !room.is_full() {
            return Err(RoomError::WaitingForGuest);
        }
        if room.game.is_some() {
            return Err(RoomError::AlreadyStarted);
        }
        Ok(room)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Drop rooms created more than `max_age` before `now`. Returns the
    /// sessions that lost their room.
    pub fn sweep(&mut self, now: Instant, max_age: Duration) -> Vec<SessionId> {
        let stale: Vec<String> = self
            .rooms
            .values()
            .filter(|r| now.saturating_duration_since(r.created_at) > max_age)
            .map(|r| r.code.clone())
            .collect();
        let mut evicted = Vec::new();
        for code in stale {
            if let Some(room) = self.rooms.remove(&code) {
                log::info!("sweeping stale room {}", code);
                evicted.push(room.host);
                evicted.extend(room.guest);
            }
        }
        for session in &evicted {
            self.members.remove(session);
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn codes_use_the_alphabet() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut rooms = RoomManager::new();
        let code = rooms.create_room(&mut rng, SessionId(1), GameMode::Quick);
        assert_eq!(code.len(), CODE_LEN);
        assert!(code.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn join_rules() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut rooms = RoomManager::new();
        let code = rooms.create_room(&mut rng, SessionId(1), GameMode::Quick);
        assert_eq!(
            rooms.join_room(&code, SessionId(1)),
            Err(RoomError::OwnRoom)
        );
        let joined = rooms
            .join_room(&code.to_ascii_lowercase(), SessionId(2))
            .unwrap();
        assert_eq!(joined, code);
        assert_eq!(rooms.join_room(&code, SessionId(3)), Err(RoomError::Full));
        assert_eq!(
            rooms.room_of(SessionId(2)).and_then(|r| r.side_of(SessionId(2))),
            Some(Side::P2)
        );
    }

    #[test]
    fn host_leaving_destroys_the_room() {
        let mut rng = SmallRng::seed_from_u64(3);
        let mut rooms = RoomManager::new();
        let code = rooms.create_room(&mut rng, SessionId(1), GameMode::Quick);
        rooms.join_room(&code, SessionId(2)).unwrap();
        let gone = rooms.leave(SessionId(1)).unwrap();
        assert!(gone.destroyed);
        assert_eq!(gone.peer, Some(SessionId(2)));
        assert!(rooms.is_empty());
        assert!(rooms.room_of(SessionId(2)).is_none());
    }

    #[test]
    fn guest_leaving_frees_the_slot() {
        let mut rng = SmallRng::seed_from_u64(4);
        let mut rooms = RoomManager::new();
        let code = rooms.create_room(&mut rng, SessionId(1), GameMode::Quick);
        rooms.join_room(&code, SessionId(2)).unwrap();
        let left = rooms.leave(SessionId(2)).unwrap();
        assert!(!left.destroyed);
        assert!(rooms.join_room(&code, SessionId(3)).is_ok());
    }

    #[test]
    fn only_a_full_room_starts() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut rooms = RoomManager::new();
        let code = rooms.create_room(&mut rng, SessionId(1), GameMode::Quick);
        assert_eq!(
            rooms.can_start(SessionId(1)).err(),
            Some(RoomError::WaitingForGuest)
        );
        rooms.join_room(&code, SessionId(2)).unwrap();
        assert_eq!(rooms.can_start(SessionId(2)).err(), Some(RoomError::NotHost));
        assert!(rooms.can_start(SessionId(1)).is_ok());
    }
}
