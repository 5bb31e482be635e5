//! Accept loop and per-client serving.
//!
//! One client at a time. While a client is connected the sender only drains
//! the mailbox into it; new connections queue in the listen backlog until
//! the current client goes away.

use std::{
    fmt,
    future::Future,
    net::SocketAddr,
    sync::Arc,
    time::Duration,
};

use gsvc_core::{FrameMailbox, FrameRecord, FrameWriter, ProtocolError, WriteError};
use tokio::{
    io::AsyncWrite,
    net::{TcpListener, TcpStream},
    time::{Instant, sleep_until},
};
use tracing::{debug, error, info, warn};

use crate::{Result, SenderConfig, SenderError};

/// Per-client send counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SendStats {
    /// Frames written to the client
    pub sent: u64,
    /// Payload bytes written to the client
    pub payload_bytes: u64,
    /// Frames refused for exceeding the payload limit
    pub oversize: u64,
}

impl SendStats {
    fn is_log_due(&self, log_every: u64) -> bool {
        log_every > 0 && self.sent > 0 && self.sent.is_multiple_of(log_every)
    }
}

/// How a client session ended.
#[derive(Debug)]
pub struct ClientSummary {
    /// Counters for the session
    pub stats: SendStats,
    /// Write failure that ended the session; `None` if the mailbox stopped
    pub disconnect: Option<std::io::Error>,
}

/// Frame sender draining a shared mailbox.
pub struct Sender {
    config: SenderConfig,
    mailbox: Arc<FrameMailbox>,
}

impl fmt::Debug for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender")
            .field("bind", &self.config.bind)
            .field("source_count", &self.config.source_count)
            .field("max_fps", &self.config.max_fps)
            .finish_non_exhaustive()
    }
}

impl Sender {
    /// Sender over `mailbox`.
    pub fn new(config: SenderConfig, mailbox: Arc<FrameMailbox>) -> Self {
        Self { config, mailbox }
    }

    /// Sender config.
    pub fn config(&self) -> &SenderConfig {
        &self.config
    }

    /// Shared frame mailbox.
    pub fn mailbox(&self) -> &Arc<FrameMailbox> {
        &self.mailbox
    }

    /// Bind the configured listen address.
    pub async fn bind(&self) -> Result<TcpListener> {
        self.config.validate()?;
        let listener = TcpListener::bind(&self.config.bind).await.map_err(|source| {
            SenderError::Bind { addr: self.config.bind.clone(), source }
        })?;
        info!(addr = %self.config.bind, "listening");
        Ok(listener)
    }

    /// Serve clients one after another until `shutdown` resolves.
    ///
    /// Stops the mailbox on shutdown so producers wind down too.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            let (stream, peer) = tokio::select! {
                biased;
                () = &mut shutdown => break,
                accepted = listener.accept() => accepted.map_err(SenderError::Accept)?,
            };

            tokio::select! {
                biased;
                () = &mut shutdown => break,
                summary = self.serve_stream(stream, peer) => {
                    if summary.disconnect.is_none() {
                        break;
                    }
                },
            }
        }

        info!("sender shutting down");
        self.mailbox.stop();
        Ok(())
    }

    async fn serve_stream(&self, stream: TcpStream, peer: SocketAddr) -> ClientSummary {
        info!(%peer, "client connected");
        if let Err(err) = stream.set_nodelay(true) {
            debug!(%peer, %err, "failed to set TCP_NODELAY");
        }
        self.serve_client(stream).await
    }

    /// Drain the mailbox into one client until a write fails or the mailbox
    /// stops.
    ///
    /// Oversize frames are dropped with a warning before pacing and never
    /// reach the wire.
    pub async fn serve_client<W>(&self, stream: W) -> ClientSummary
    where
        W: AsyncWrite + Unpin,
    {
        let mut writer = FrameWriter::with_config(stream, self.config.protocol);
        let mut stats = SendStats::default();
        let mut pacer = Pacer::new(self.config.send_interval());

        while let Some(frame) = self.mailbox.next().await {
            if let Err(err) = frame.header(&self.config.protocol) {
                drop_oversize(&mut stats, &frame, &err);
                continue;
            }
            pacer.wait().await;

            match writer.write_frame(&frame).await {
                Ok(()) => {
                    stats.sent += 1;
                    stats.payload_bytes += frame.payload.len() as u64;
                },
                Err(WriteError::Protocol(err)) => {
                    drop_oversize(&mut stats, &frame, &err);
                    continue;
                },
                Err(WriteError::Io(err)) => {
                    info!(%err, sent = stats.sent, "client disconnected");
                    return ClientSummary { stats, disconnect: Some(err) };
                },
            }

            if stats.is_log_due(self.config.log_every) {
                info!(
                    captured = self.mailbox.pushed_count(),
                    sent = stats.sent,
                    overwritten = self.mailbox.dropped_count(),
                    oversize = stats.oversize,
                    "send stats"
                );
            }
        }

        if let Err(err) = writer.shutdown().await {
            error!(%err, "failed to shut down client stream");
        }
        ClientSummary { stats, disconnect: None }
    }
}

fn drop_oversize(stats: &mut SendStats, frame: &FrameRecord, err: &ProtocolError) {
    stats.oversize += 1;
    warn!(source_id = frame.source_id, frame_id = frame.frame_id, %err, "dropping frame");
}

/// Spaces sends at least `interval` apart.
#[derive(Debug)]
struct Pacer {
    interval: Option<Duration>,
    next: Option<Instant>,
}

impl Pacer {
    fn new(interval: Option<Duration>) -> Self {
        Self { interval, next: None }
    }

    async fn wait(&mut self) {
        let Some(interval) = self.interval else {
            return;
        };
        if let Some(next) = self.next {
            sleep_until(next).await;
        }
        self.next = Some(Instant::now() + interval);
    }
}
