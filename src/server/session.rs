//! One task per connection: handshake, then requests in and pushes out.

use std::sync::Arc;

use rand::Rng;
use tokio::sync::mpsc;

use super::match_actor::{self, MatchCommand, MatchHandle};
use super::{SessionId, Shared};
use crate::core::{common::Side, game::Match};
use crate::protocol::{GameMode, Message, PROTOCOL_VERSION};
use crate::transport::Transport;

/// Wait for the client's `Handshake` and acknowledge it.
async fn handshake<T: Transport>(transport: &mut T) -> anyhow::Result<()> {
    match transport.recv().await? {
        Message::Handshake { version } if version == PROTOCOL_VERSION => {
            transport
                .send(Message::HandshakeAck {
                    version: PROTOCOL_VERSION,
                })
                .await
        }
        Message::Handshake { version } => {
            log::warn!(
                "handshake version mismatch: expected {}, peer sent {}",
                PROTOCOL_VERSION,
                version
            );
            // Tell the peer which version we speak before closing.
            let _ = transport
                .send(Message::HandshakeAck {
                    version: PROTOCOL_VERSION,
                })
                .await;
            Err(anyhow::anyhow!(
                "Protocol version mismatch in Handshake: expected {}, got {}",
                PROTOCOL_VERSION,
                version
            ))
        }
        other => Err(anyhow::anyhow!(
            "Expected Handshake, got unexpected message: {:?}",
            other
        )),
    }
}

pub(crate) async fn run<T: Transport>(
    mut transport: T,
    id: SessionId,
    shared: Arc<Shared>,
) -> anyhow::Result<()> {
    handshake(&mut transport).await?;
    log::info!("session {} connected", id.0);

    let (tx, mut rx) = mpsc::unbounded_channel();
    shared.state.lock().await.outboxes.insert(id, tx);

    let result = loop {
        tokio::select! {
            inbound = transport.recv() => match inbound {
                Ok(msg) => handle(&shared, id, msg).await,
                Err(e) => break Err(e),
            },
            Some(out) = rx.recv() => {
                if let Err(e) = transport.send(out).await {
                    break Err(e);
                }
            }
        }
    };

    disconnect(&shared, id).await;
    log::info!("session {} closed", id.0);
    result
}

async fn disconnect(shared: &Shared, id: SessionId) {
    let mut state = shared.state.lock().await;
    state.outboxes.remove(&id);
    if let Some(departure) = state.rooms.leave(id) {
        log::info!("session {} left room {}", id.0, departure.code);
        if let Some(peer) = departure.peer {
            state.push(peer, Message::PlayerLeft);
        }
    }
}

async fn handle(shared: &Shared, id: SessionId, msg: Message) {
    let mut state = shared.state.lock().await;
    match msg {
        Message::CreateRoom { mode } => {
            let super::State { rooms, rng, .. } = &mut *state;
            let code = rooms.create_room(rng, id, mode);
            log::info!("room {} created by session {}", code, id.0);
            state.push(
                id,
                Message::RoomCreated {
                    code,
                    side: Side::P1,
                },
            );
        }
        Message::JoinRoom { code } => match state.rooms.join_room(&code, id) {
            Ok(code) => {
                let host = state.rooms.get(&code).map(|r| r.host);
                log::info!("session {} joined room {}", id.0, code);
                state.push(
                    id,
                    Message::RoomJoined {
                        code,
                        side: Side::P2,
                    },
                );
                if let Some(host) = host {
                    state.push(host, Message::PlayerJoined);
                }
            }
            Err(e) => state.error(id, None, e),
        },
        Message::LeaveRoom => {
            if let Some(departure) = state.rooms.leave(id) {
                if let Some(peer) = departure.peer {
                    state.push(peer, Message::PlayerLeft);
                }
            }
        }
        Message::StartGame => {
            let (mode, host, guest) = match state.rooms.can_start(id) {
                Ok(room) => (room.mode, room.host, room.guest),
                Err(e) => return state.error(id, None, e),
            };
            let seed = match mode {
                GameMode::Quick => state.rng.random(),
                GameMode::Seeded(seed) => seed,
            };
            let game = match Match::quick(seed) {
                Ok(game) => game,
                Err(e) => return state.error(id, None, e),
            };
            let outboxes = match guest.and_then(|g| {
                Some([
                    state.outboxes.get(&host)?.clone(),
                    state.outboxes.get(&g)?.clone(),
                ])
            }) {
                Some(o) => o,
                None => return state.error(id, None, "Both players must be connected"),
            };
            let handle = match_actor::spawn(game, outboxes, shared.config.turn_limit());
            if let Some(room) = state.rooms.room_of_mut(id) {
                log::info!("match started in room {} (seed {})", room.code, seed);
                room.game = Some(handle);
            }
        }
        Message::Action { seq, intent } => match game_of(&state, id) {
            Some((side, handle)) => {
                drop(state);
                if let Err(e) = handle.send(MatchCommand::Intent { side, seq, intent }).await {
                    shared.state.lock().await.error(id, Some(seq), e);
                }
            }
            None => state.error(id, Some(seq), "No game in progress"),
        },
        Message::RequestState => match game_of(&state, id) {
            Some((side, handle)) => {
                drop(state);
                if let Err(e) = handle.send(MatchCommand::RequestState { side }).await {
                    shared.state.lock().await.error(id, None, e);
                }
            }
            None => state.error(id, None, "No game in progress"),
        },
        other => {
            log::debug!("session {} sent unexpected {:?}", id.0, other);
            state.error(id, None, "Unexpected message");
        }
    }
}

fn game_of(state: &super::State, id: SessionId) -> Option<(Side, MatchHandle)> {
    let room = state.rooms.room_of(id)?;
    Some((room.side_of(id)?, room.game.clone()?))
}
