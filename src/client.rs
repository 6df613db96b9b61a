//! Networked client.
//!
//! The client keeps the last snapshot the server sent and nothing else of
//! the match. When it moves a unit onto encounter terrain it may guess the
//! outcome as an [`EncounterPrediction`], but that guess lives beside the
//! snapshot and is thrown away as soon as the next snapshot arrives.

use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::core::{
    common::{Pos, Side, UnitId},
    config::ENCOUNTER_CHANCE,
    game::{Event, Intent},
};
use crate::domain::Snapshot;
use crate::protocol::{GameMode, MatchApi, Message, PROTOCOL_VERSION};
use crate::transport::Transport;

/// A local guess at whether a move will trigger a wild encounter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncounterPrediction {
    pub unit: UnitId,
    pub at: Pos,
    pub encounter: bool,
}

/// What observers on the client's [`EventBus`] are told.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    RoomJoined { code: String, side: Side },
    PlayerJoined,
    PlayerLeft,
    Snapshot(Arc<Snapshot>),
    Result { actor: Side, events: Arc<Vec<Event>> },
    Prediction(EncounterPrediction),
    Error(String),
}

type Handler = Box<dyn Fn(&ClientEvent) + Send + Sync>;

/// Typed observer list. Handlers run synchronously, in subscription order.
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<Handler>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: impl Fn(&ClientEvent) + Send + Sync + 'static) {
        self.handlers.push(Box::new(handler));
    }

    pub fn publish(&self, event: &ClientEvent) {
        for handler in &self.handlers {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

pub struct Client<T: Transport> {
    transport: T,
    side: Option<Side>,
    room: Option<String>,
    next_seq: u64,
    snapshot: Option<Arc<Snapshot>>,
    prediction: Option<EncounterPrediction>,
    bus: EventBus,
    rng: SmallRng,
}

impl<T: Transport> Client<T> {
    /// Handshake over `transport`. `seed` only drives local predictions.
    pub async fn connect(mut transport: T, seed: Option<u64>) -> anyhow::Result<Self> {
        transport
            .send(Message::Handshake {
                version: PROTOCOL_VERSION,
            })
            .await?;
        match transport.recv().await? {
            Message::HandshakeAck { version } if version == PROTOCOL_VERSION => {}
            Message::HandshakeAck { version } => {
                log::warn!(
                    "handshake version mismatch: expected {}, server responded with {}",
                    PROTOCOL_VERSION,
                    version
                );
                return Err(anyhow::anyhow!(
                    "Protocol version mismatch in HandshakeAck: expected {}, got {}",
                    PROTOCOL_VERSION,
                    version
                ));
            }
            other => {
                return Err(anyhow::anyhow!(
                    "Expected HandshakeAck, got unexpected message: {:?}",
                    other
                ))
            }
        }
        let rng = match seed {
            Some(s) => SmallRng::seed_from_u64(s),
            None => SmallRng::from_rng(&mut rand::rng()),
        };
        Ok(Self {
            transport,
            side: None,
            room: None,
            next_seq: 0,
            snapshot: None,
            prediction: None,
            bus: EventBus::new(),
            rng,
        })
    }

    pub fn side(&self) -> Option<Side> {
        self.side
    }

    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    /// Last authoritative snapshot.
    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        self.snapshot.as_ref()
    }

    /// Outstanding guess, if no snapshot has arrived since it was made.
    pub fn prediction(&self) -> Option<EncounterPrediction> {
        self.prediction
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub async fn create_room(&mut self, mode: GameMode) -> anyhow::Result<String> {
        self.transport.send(Message::CreateRoom { mode }).await?;
        loop {
            match self.next_message().await? {
                Message::RoomCreated { code, .. } => return Ok(code),
                Message::Error { message, .. } => return Err(anyhow::anyhow!(message)),
                _ => {}
            }
        }
    }

    pub async fn join_room(&mut self, code: &str) -> anyhow::Result<Side> {
        self.transport
            .send(Message::JoinRoom {
                code: code.to_string(),
            })
            .await?;
        loop {
            match self.next_message().await? {
                Message::RoomJoined { side, .. } => return Ok(side),
                Message::Error { message, .. } => return Err(anyhow::anyhow!(message)),
                _ => {}
            }
        }
    }

    /// Host only: start the match and wait for the first snapshot.
    pub async fn start_game(&mut self) -> anyhow::Result<Arc<Snapshot>> {
        self.transport.send(Message::StartGame).await?;
        self.wait_for_start().await
    }

    pub async fn wait_for_start(&mut self) -> anyhow::Result<Arc<Snapshot>> {
        loop {
            match self.next_message().await? {
                Message::GameStarted(_) => {
                    if let Some(snap) = &self.snapshot {
                        return Ok(snap.clone());
                    }
                }
                Message::Error { message, .. } => return Err(anyhow::anyhow!(message)),
                _ => {}
            }
        }
    }

    /// Send one intent and wait for the server's verdict on it.
    pub async fn submit(&mut self, intent: Intent) -> anyhow::Result<Vec<Event>> {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.predict(intent);
        self.transport.send(Message::Action { seq, intent }).await?;
        loop {
            match self.next_message().await? {
                Message::ActionResult {
                    seq: Some(s),
                    events,
                    ..
                } if s == seq => return Ok(events),
                Message::Error {
                    seq: Some(s),
                    message,
                } if s == seq => {
                    self.prediction = None;
                    return Err(anyhow::anyhow!(message));
                }
                _ => {}
            }
        }
    }

    /// Ask for a fresh snapshot, e.g. after reconnecting.
    pub async fn request_state(&mut self) -> anyhow::Result<Arc<Snapshot>> {
        self.transport.send(Message::RequestState).await?;
        loop {
            match self.next_message().await? {
                Message::StateUpdate(_) | Message::GameStarted(_) => {
                    if let Some(snap) = &self.snapshot {
                        return Ok(snap.clone());
                    }
                }
                Message::Error { message, .. } => return Err(anyhow::anyhow!(message)),
                _ => {}
            }
        }
    }

    /// Receive and apply one message from the server, returning it.
    pub async fn next_message(&mut self) -> anyhow::Result<Message> {
        let msg = self.transport.recv().await?;
        self.apply(&msg);
        Ok(msg)
    }

    fn apply(&mut self, msg: &Message) {
        match msg {
            Message::RoomCreated { code, side } | Message::RoomJoined { code, side } => {
                self.side = Some(*side);
                self.room = Some(code.clone());
                self.bus.publish(&ClientEvent::RoomJoined {
                    code: code.clone(),
                    side: *side,
                });
            }
            Message::PlayerJoined => self.bus.publish(&ClientEvent::PlayerJoined),
            Message::PlayerLeft => self.bus.publish(&ClientEvent::PlayerLeft),
            Message::GameStarted(snap) | Message::StateUpdate(snap) => {
                // Server state wins outright; any guess is dropped.
                self.prediction = None;
                self.side = Some(snap.recipient);
                let snap = Arc::new(snap.clone());
                self.snapshot = Some(snap.clone());
                self.bus.publish(&ClientEvent::Snapshot(snap));
            }
            Message::ActionResult { actor, events, .. } => {
                self.bus.publish(&ClientEvent::Result {
                    actor: *actor,
                    events: Arc::new(events.clone()),
                });
            }
            Message::Error { message, .. } => {
                log::debug!("server error: {}", message);
                self.bus.publish(&ClientEvent::Error(message.clone()));
            }
            other => log::debug!("ignoring {:?}", other),
        }
    }

    fn predict(&mut self, intent: Intent) {
        let (unit, to) = match intent {
            Intent::Move { unit, to } => (unit, to),
            _ => return,
        };
        let Some(snap) = &self.snapshot else { return };
        let moves = snap.unit(unit).is_some_and(|u| u.pos != to);
        if !moves || !snap.board.terrain(to).props().encounter {
            return;
        }
        let prediction = EncounterPrediction {
            unit,
            at: to,
            encounter: self.rng.random_bool(ENCOUNTER_CHANCE),
        };
        self.prediction = Some(prediction);
        self.bus.publish(&ClientEvent::Prediction(prediction));
    }
}

#[async_trait::async_trait]
impl<T: Transport> MatchApi for Client<T> {
    async fn submit(&mut self, side: Side, intent: Intent) -> anyhow::Result<Vec<Event>> {
        if self.side != Some(side) {
            return Err(anyhow::anyhow!("This client does not play {}", side));
        }
        Client::submit(self, intent).await
    }

    async fn state(&mut self, _side: Side) -> anyhow::Result<Snapshot> {
        if let Some(snap) = &self.snapshot {
            return Ok((**snap).clone());
        }
        Ok((*self.request_state().await?).clone())
    }

    async fn wait_turn(&mut self, _side: Side) -> anyhow::Result<Snapshot> {
        loop {
            if let Some(snap) = &self.snapshot {
                if snap.is_my_turn() || snap.winner().is_some() {
                    return Ok((**snap).clone());
                }
            }
            match self.next_message().await? {
                Message::PlayerLeft => return Err(anyhow::anyhow!("Opponent left the match")),
                Message::Error { seq: None, message } => {
                    log::warn!("server: {}", message);
                }
                _ => {}
            }
        }
    }
}
