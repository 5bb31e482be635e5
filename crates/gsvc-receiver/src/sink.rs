//! Downstream consumers of decoded frames.

use async_trait::async_trait;
use gsvc_proto::FrameRecord;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// JPEG start-of-image marker.
const JPEG_SOI: [u8; 2] = [0xff, 0xd8];

/// Whether the receive loop should keep going after a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkOutcome {
    /// Keep receiving
    Continue,
    /// Stop receiving and close the connection
    Stop,
}

/// Consumer of decoded frames.
///
/// Receives every frame the decoder produces, in stream order. A payload the
/// sink cannot interpret is the sink's problem: log it and return
/// [`SinkOutcome::Continue`]. Only the sink decides when to stop for reasons
/// of its own (a closed window, a full recording).
#[async_trait]
pub trait FrameSink: Send {
    /// Handle one frame.
    async fn handle_frame(&mut self, frame: &FrameRecord) -> SinkOutcome;
}

/// Sink that checks for a JPEG signature and logs each frame.
#[derive(Debug, Default)]
pub struct LoggingSink {
    accepted: u64,
    rejected: u64,
}

impl LoggingSink {
    /// New sink with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames whose payload looked like a JPEG.
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Frames whose payload did not.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

#[async_trait]
impl FrameSink for LoggingSink {
    async fn handle_frame(&mut self, frame: &FrameRecord) -> SinkOutcome {
        if frame.payload.starts_with(&JPEG_SOI) {
            self.accepted += 1;
            debug!(
                source_id = frame.source_id,
                frame_id = frame.frame_id,
                timestamp_us = frame.timestamp_us,
                bytes = frame.payload.len(),
                "frame"
            );
        } else {
            self.rejected += 1;
            warn!(
                source_id = frame.source_id,
                frame_id = frame.frame_id,
                "failed to decode JPEG"
            );
        }
        SinkOutcome::Continue
    }
}

/// Sink that forwards frames to a channel.
///
/// Stops the receive loop once the receiving half is dropped. Sending waits
/// for channel capacity, so a slow consumer slows the reads.
#[derive(Debug)]
pub struct ChannelSink {
    tx: mpsc::Sender<FrameRecord>,
}

impl ChannelSink {
    /// Sink and the receiver it feeds.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<FrameRecord>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl FrameSink for ChannelSink {
    async fn handle_frame(&mut self, frame: &FrameRecord) -> SinkOutcome {
        match self.tx.send(frame.clone()).await {
            Ok(()) => SinkOutcome::Continue,
            Err(_) => SinkOutcome::Stop,
        }
    }
}
