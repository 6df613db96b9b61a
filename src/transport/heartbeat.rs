#![cfg(feature = "std")]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::time::{interval, Duration, Instant};

use crate::protocol::{Message, PROTOCOL_VERSION};
use crate::transport::Transport;

/// Transport wrapper that keeps an idle link alive.
///
/// While waiting in `recv` it sends a heartbeat every `heartbeat_interval`
/// and fails once nothing has been exchanged for `idle_timeout`. Heartbeats
/// from the peer are validated and never returned to the caller.
pub struct HeartbeatTransport<T: Transport> {
    inner: T,
    heartbeat_interval: Duration,
    idle_timeout: Duration,
    last_activity: Instant,
    enabled: bool,
    shutdown: Arc<AtomicBool>,
}

impl<T: Transport> HeartbeatTransport<T> {
    pub fn new(inner: T, heartbeat_interval: Duration, idle_timeout: Duration) -> Self {
        Self {
            inner,
            heartbeat_interval,
            idle_timeout,
            last_activity: Instant::now(),
            enabled: true,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Pass-through wrapper that still filters incoming heartbeats.
    pub fn disabled(inner: T) -> Self {
        Self {
            enabled: false,
            ..Self::new(inner, Duration::from_secs(10), Duration::from_secs(45))
        }
    }

    fn mark_activity(&mut self) {
        self.last_activity = Instant::now();
    }

    fn is_idle_timeout(&self) -> bool {
        self.last_activity.elapsed() > self.idle_timeout
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    fn check_version(version: u16) -> anyhow::Result<()> {
        if version != PROTOCOL_VERSION {
            log::warn!(
                "heartbeat version mismatch: expected {}, got {}",
                PROTOCOL_VERSION,
                version
            );
            return Err(anyhow::anyhow!(
                "Heartbeat version mismatch: expected {}, got {}",
                PROTOCOL_VERSION,
                version
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<T: Transport> Transport for HeartbeatTransport<T> {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        if self.is_shutdown() {
            return Err(anyhow::anyhow!("Transport is shut down"));
        }
        if self.enabled && self.is_idle_timeout() {
            return Err(anyhow::anyhow!("Connection idle timeout exceeded"));
        }
        let result = self.inner.send(msg).await;
        if result.is_ok() {
            self.mark_activity();
        }
        result
    }

    async fn recv(&mut self) -> anyhow::Result<Message> {
        if self.is_shutdown() {
            return Err(anyhow::anyhow!("Transport is shut down"));
        }

        if !self.enabled {
            loop {
                match self.inner.recv().await? {
                    Message::Heartbeat { version } => Self::check_version(version)?,
                    msg => return Ok(msg),
                }
            }
        }

        let mut heartbeat_timer = interval(self.heartbeat_interval);
        heartbeat_timer.tick().await; // First tick completes immediately, skip it

        loop {
            tokio::select! {
                msg = self.inner.recv() => {
                    match msg? {
                        Message::Heartbeat { version } => {
                            Self::check_version(version)?;
                            self.mark_activity();
                        }
                        msg => {
                            self.mark_activity();
                            return Ok(msg);
                        }
                    }
                }
                _ = heartbeat_timer.tick() => {
                    if self.is_idle_timeout() {
                        log::warn!("idle timeout exceeded ({:?})", self.idle_timeout);
                        return Err(anyhow::anyhow!(
                            "Connection idle timeout exceeded ({:?})",
                            self.idle_timeout
                        ));
                    }
                    self.inner
                        .send(Message::Heartbeat { version: PROTOCOL_VERSION })
                        .await?;
                }
            }
        }
    }
}
