//! Authoritative match server.
//!
//! Each connection runs a session task; each started room runs a
//! [`match_actor`] that owns the [`Match`](crate::core::game::Match) and is
//! the only writer of its state.

pub mod match_actor;
pub mod rooms;
mod session;

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, Instant};

use crate::core::config::DEFAULT_TURN_SECONDS;
use crate::protocol::Message;
use crate::transport::{heartbeat::HeartbeatTransport, tcp::TcpTransport, Transport};
use match_actor::Outbox;
use rooms::{RoomManager, ROOM_MAX_AGE};

/// How often stale rooms are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

/// Runtime options for the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    /// Seconds per turn; 0 disables the turn timer.
    pub turn_seconds: u64,
    pub heartbeat_interval: Duration,
    pub idle_timeout: Duration,
    /// Seeds room codes and quick-match boards.
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            turn_seconds: DEFAULT_TURN_SECONDS,
            heartbeat_interval: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(45),
            seed: None,
        }
    }
}

impl ServerConfig {
    pub fn turn_limit(&self) -> Option<Duration> {
        (self.turn_seconds > 0).then(|| Duration::from_secs(self.turn_seconds))
    }
}

pub(crate) struct State {
    pub(crate) rooms: RoomManager,
    pub(crate) outboxes: HashMap<SessionId, Outbox>,
    pub(crate) rng: SmallRng,
}

impl State {
    pub(crate) fn push(&self, session: SessionId, msg: Message) {
        if let Some(outbox) = self.outboxes.get(&session) {
            let _ = outbox.send(msg);
        }
    }

    pub(crate) fn error(&self, session: SessionId, seq: Option<u64>, e: impl Display) {
        self.push(
            session,
            Message::Error {
                seq,
                message: e.to_string(),
            },
        );
    }
}

pub(crate) struct Shared {
    pub(crate) config: ServerConfig,
    pub(crate) state: Mutex<State>,
}

pub struct Server {
    shared: Arc<Shared>,
    next_session: AtomicU64,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rand::rng()),
        };
        Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(State {
                    rooms: RoomManager::new(),
                    outboxes: HashMap::new(),
                    rng,
                }),
            }),
            next_session: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.shared.config
    }

    /// Serve one already-connected client.
    pub fn attach<T: Transport + 'static>(&self, transport: T) -> JoinHandle<anyhow::Result<()>> {
        let id = SessionId(self.next_session.fetch_add(1, Ordering::SeqCst));
        tokio::spawn(session::run(transport, id, self.shared.clone()))
    }

    pub async fn room_count(&self) -> usize {
        self.shared.state.lock().await.rooms.len()
    }

    /// Drop rooms older than an hour, telling their members.
    pub async fn sweep(&self) {
        let mut state = self.shared.state.lock().await;
        for session in state.rooms.sweep(Instant::now(), ROOM_MAX_AGE) {
            state.error(session, None, "Room expired");
        }
    }

    /// Accept TCP clients on `config.bind` until the listener fails.
    pub async fn listen(self: Arc<Self>) -> anyhow::Result<()> {
        let listener = TcpListener::bind(&self.shared.config.bind).await?;
        log::info!("listening on {}", listener.local_addr()?);

        let sweeper = self.clone();
        tokio::spawn(async move {
            let mut tick = interval(SWEEP_INTERVAL);
            loop {
                tick.tick().await;
                sweeper.sweep().await;
            }
        });

        loop {
            let (stream, addr) = listener.accept().await?;
            log::info!("connection from {}", addr);
            let config = &self.shared.config;
            let transport = HeartbeatTransport::new(
                TcpTransport::new(stream),
                config.heartbeat_interval,
                config.idle_timeout,
            );
            let session = self.attach(transport);
            tokio::spawn(async move {
                match session.await {
                    Ok(Err(e)) => log::debug!("session from {} ended: {}", addr, e),
                    Err(e) => log::warn!("session task from {} failed: {}", addr, e),
                    Ok(Ok(())) => {}
                }
            });
        }
    }
}
