#![cfg(feature = "std")]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time::{timeout, Duration, Instant};

use crate::protocol::{Message, PROTOCOL_VERSION};
use crate::transport::Transport;

/// Default timeout for a single write (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum frame size (1 MB).
pub const MAX_MESSAGE_SIZE: u32 = 1_000_000;

/// Default idle timeout before considering connection dead (45 seconds).
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(45);

const READ_CHUNK: usize = 4096;

/// Length-prefixed bincode frames over TCP: a 4-byte big-endian length
/// followed by the payload.
///
/// Received bytes are buffered inside the transport, so a cancelled `recv`
/// never loses a partially read frame.
pub struct TcpTransport {
    stream: TcpStream,
    pending: Vec<u8>,
    timeout_duration: Duration,
    max_message_size: u32,
    idle_timeout: Duration,
    last_activity: Instant,
    shutdown: Arc<AtomicBool>,
}

impl TcpTransport {
    pub fn new(stream: TcpStream) -> Self {
        Self::with_config(stream, DEFAULT_TIMEOUT, MAX_MESSAGE_SIZE, DEFAULT_IDLE_TIMEOUT)
    }

    pub fn with_config(
        stream: TcpStream,
        timeout_duration: Duration,
        max_message_size: u32,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            stream,
            pending: Vec::new(),
            timeout_duration,
            max_message_size,
            idle_timeout,
            last_activity: Instant::now(),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn connect<A: ToSocketAddrs>(addr: A) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    /// Request graceful shutdown of the transport.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub fn is_idle_timeout(&self) -> bool {
        self.last_activity.elapsed() > self.idle_timeout
    }

    pub async fn send_heartbeat(&mut self) -> anyhow::Result<()> {
        self.send(Message::Heartbeat {
            version: PROTOCOL_VERSION,
        })
        .await
    }

    fn mark_activity(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Pop one complete frame off the buffer, if there is one.
    fn take_frame(&mut self) -> anyhow::Result<Option<Vec<u8>>> {
        if self.pending.len() < 4 {
            return Ok(None);
        }
        let len = u32::from_be_bytes([
            self.pending[0],
            self.pending[1],
            self.pending[2],
            self.pending[3],
        ]);
        if len > self.max_message_size {
            return Err(anyhow::anyhow!(
                "Message too large: {} bytes (max: {})",
                len,
                self.max_message_size
            ));
        }
        if len == 0 {
            return Err(anyhow::anyhow!("Invalid message length: 0"));
        }
        let end = 4 + len as usize;
        if self.pending.len() < end {
            return Ok(None);
        }
        let frame = self.pending[4..end].to_vec();
        self.pending.drain(..end);
        Ok(Some(frame))
    }
}

/// Encode `msg` as one length-prefixed frame.
pub fn encode_frame(msg: &Message, max_message_size: u32) -> anyhow::Result<Vec<u8>> {
    let data =
        bincode::serialize(msg).map_err(|e| anyhow::anyhow!("Serialization error: {}", e))?;
    if data.len() as u64 > max_message_size as u64 {
        return Err(anyhow::anyhow!(
            "Message too large: {} bytes (max: {})",
            data.len(),
            max_message_size
        ));
    }
    let mut frame = Vec::with_capacity(4 + data.len());
    frame.extend_from_slice(&(data.len() as u32).to_be_bytes());
    frame.extend_from_slice(&data);
    Ok(frame)
}

fn io_error(e: std::io::Error) -> anyhow::Error {
    match e.kind() {
        std::io::ErrorKind::BrokenPipe
        | std::io::ErrorKind::ConnectionReset
        | std::io::ErrorKind::UnexpectedEof => anyhow::anyhow!("Connection closed by peer"),
        _ => anyhow::anyhow!("I/O error: {}", e),
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, msg: Message) -> anyhow::Result<()> {
        if self.is_shutdown() {
            return Err(anyhow::anyhow!("Transport is shut down"));
        }
        let frame = encode_frame(&msg, self.max_message_size)?;
        timeout(self.timeout_duration, self.stream.write_all(&frame))
            .await
            .map_err(|_| anyhow::anyhow!("Send timeout after {:?}", self.timeout_duration))?
            .map_err(io_error)?;
        self.mark_activity();
        Ok(())
    }

    async fn recv(&mut self) -> anyhow::Result<Message> {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if self.is_shutdown() {
                return Err(anyhow::anyhow!("Transport is shut down"));
            }
            if let Some(frame) = self.take_frame()? {
                self.mark_activity();
                return bincode::deserialize(&frame)
                    .map_err(|e| anyhow::anyhow!("Deserialization error: {}", e));
            }
            let n = self.stream.read(&mut chunk).await.map_err(io_error)?;
            if n == 0 {
                return Err(anyhow::anyhow!("Connection closed by peer"));
            }
            self.pending.extend_from_slice(&chunk[..n]);
        }
    }
}
