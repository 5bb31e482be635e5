//! Receive loop.
//!
//! One [`Receiver`] per connection. It owns the decoder and therefore the
//! stream; nothing is shared with other connections.

use std::{
    future::Future,
    time::{Duration, Instant},
};

use gsvc_core::{AsyncFrameDecoder, ReceiveStats};
use tokio::{io::AsyncRead, net::TcpStream, time::timeout};
use tracing::info;

use crate::{FrameSink, ReceiverConfig, ReceiverError, SinkOutcome};

/// Why a receive session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Peer closed the stream on a frame boundary
    PeerClosed,
    /// Sink asked to stop
    SinkStopped,
    /// Shutdown signal fired
    Shutdown,
}

/// Totals for a finished session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReceiveSummary {
    /// Why the session ended
    pub reason: StopReason,
    /// Frames decoded
    pub frames: u64,
    /// Payload bytes decoded
    pub payload_bytes: u64,
    /// Bytes discarded by resynchronization
    pub skipped_bytes: u64,
    /// Session length
    pub elapsed: Duration,
}

/// Receive loop over one stream.
#[derive(Debug)]
pub struct Receiver<R> {
    decoder: AsyncFrameDecoder<R>,
    log_every: u64,
}

impl Receiver<TcpStream> {
    /// Connect to `config.addr`, giving up after `config.connect_timeout`.
    ///
    /// The timeout covers connection setup only.
    pub async fn connect(config: &ReceiverConfig) -> Result<Self, ReceiverError> {
        config.validate()?;
        let addr = config.addr.clone();
        let stream = timeout(config.connect_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| ReceiverError::ConnectTimeout {
                addr: addr.clone(),
                timeout: config.connect_timeout,
            })?
            .map_err(|source| ReceiverError::Connect { addr: addr.clone(), source })?;

        stream
            .set_nodelay(true)
            .map_err(|source| ReceiverError::Connect { addr: addr.clone(), source })?;

        info!(%addr, "connected");
        Ok(Self::new(stream, config))
    }
}

impl<R: AsyncRead + Unpin> Receiver<R> {
    /// Receive loop over an already established stream.
    pub fn new(stream: R, config: &ReceiverConfig) -> Self {
        let decoder =
            AsyncFrameDecoder::with_config(stream, config.protocol).with_resync(config.resync);
        Self { decoder, log_every: config.log_every }
    }

    /// Decode frames into `sink` until the peer closes, the sink stops, or
    /// `shutdown` resolves.
    ///
    /// A clean close on a frame boundary is a normal end. Every other decode
    /// failure ends the session with an error.
    pub async fn run<S, F>(&mut self, sink: &mut S, shutdown: F) -> Result<ReceiveSummary, ReceiverError>
    where
        S: FrameSink + ?Sized,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let started = Instant::now();
        let mut stats = ReceiveStats::new(started);

        let reason = loop {
            let result = tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!("shutdown requested");
                    break StopReason::Shutdown;
                },
                result = self.decoder.decode_next() => result,
            };

            let frame = match result {
                Ok(frame) => frame,
                Err(err) if err.is_clean_close() => {
                    info!("peer closed the connection");
                    break StopReason::PeerClosed;
                },
                Err(err) => return Err(err.into()),
            };

            stats.record(&frame);
            if stats.is_log_due(self.log_every) {
                info!("{}", stats.snapshot(Instant::now()));
            }

            if sink.handle_frame(&frame).await == SinkOutcome::Stop {
                info!("sink requested stop");
                break StopReason::SinkStopped;
            }
        };

        Ok(ReceiveSummary {
            reason,
            frames: stats.frames(),
            payload_bytes: stats.payload_bytes(),
            skipped_bytes: self.decoder.skipped_bytes(),
            elapsed: stats.elapsed(Instant::now()),
        })
    }

    /// Give back the stream.
    pub fn into_inner(self) -> R {
        self.decoder.into_inner()
    }
}
