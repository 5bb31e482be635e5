//! Synthetic frame producers.
//!
//! Stand-ins for camera capture: each source emits frames at a fixed rate
//! into the shared mailbox, never waiting on the network.

use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use bytes::Bytes;
use gsvc_core::{FrameMailbox, PushOutcome};
use gsvc_proto::FrameRecord;
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::debug;

use crate::SenderConfig;

/// JPEG start-of-image marker.
const JPEG_SOI: [u8; 2] = [0xff, 0xd8];
/// JPEG end-of-image marker.
const JPEG_EOI: [u8; 2] = [0xff, 0xd9];

/// Frame generator for one source.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    source_id: u16,
    next_frame_id: u32,
    payload_size: usize,
}

impl SyntheticSource {
    /// Source emitting payloads of `payload_size` bytes, ids starting at 0.
    pub fn new(source_id: u16, payload_size: usize) -> Self {
        Self { source_id, next_frame_id: 0, payload_size }
    }

    /// Source identifier.
    pub fn source_id(&self) -> u16 {
        self.source_id
    }

    /// Produce the next frame, stamped with `timestamp_us`.
    ///
    /// Frame ids increase by one per call and wrap at `u32::MAX`.
    pub fn next_frame(&mut self, timestamp_us: u64) -> FrameRecord {
        let frame_id = self.next_frame_id;
        self.next_frame_id = self.next_frame_id.wrapping_add(1);

        FrameRecord::new(self.source_id, frame_id, timestamp_us, self.payload(frame_id))
    }

    fn payload(&self, frame_id: u32) -> Bytes {
        let len = self.payload_size;
        let fill = (frame_id as u8) ^ (self.source_id as u8);
        let mut payload = vec![fill; len];

        let soi = JPEG_SOI.len().min(len);
        payload[..soi].copy_from_slice(&JPEG_SOI[..soi]);
        if len >= JPEG_SOI.len() + JPEG_EOI.len() {
            payload[len - JPEG_EOI.len()..].copy_from_slice(&JPEG_EOI);
        }
        Bytes::from(payload)
    }

    /// Push a frame every `period` until the mailbox stops.
    pub async fn run(mut self, mailbox: Arc<FrameMailbox>, period: Duration) {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if mailbox.is_stopped() {
                break;
            }

            let frame = self.next_frame(wall_clock_us());
            let frame_id = frame.frame_id;
            if mailbox.push(frame) == PushOutcome::Replaced {
                debug!(source_id = self.source_id, frame_id, "overwrote unsent frame");
            }
        }
        debug!(source_id = self.source_id, "source stopped");
    }
}

/// Microseconds since the Unix epoch.
pub fn wall_clock_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX))
}

/// Start one synthetic source per configured source id.
pub fn spawn_sources(config: &SenderConfig, mailbox: &Arc<FrameMailbox>) -> Vec<JoinHandle<()>> {
    let period = config.capture_interval();
    (0..config.source_count)
        .map(|source_id| {
            let source = SyntheticSource::new(source_id, config.payload_size);
            tokio::spawn(source.run(Arc::clone(mailbox), period))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_ids_increment_per_source() {
        let mut source = SyntheticSource::new(3, 16);

        let first = source.next_frame(100);
        let second = source.next_frame(200);

        assert_eq!((first.source_id, first.frame_id, first.timestamp_us), (3, 0, 100));
        assert_eq!((second.source_id, second.frame_id, second.timestamp_us), (3, 1, 200));
    }

    #[test]
    fn payload_looks_like_jpeg() {
        let frame = SyntheticSource::new(0, 32).next_frame(0);
        assert_eq!(frame.payload.len(), 32);
        assert_eq!(&frame.payload[..2], &JPEG_SOI);
        assert_eq!(&frame.payload[30..], &JPEG_EOI);
    }

    #[test]
    fn tiny_payloads_are_truncated_markers() {
        assert!(SyntheticSource::new(0, 0).next_frame(0).payload.is_empty());
        assert_eq!(&SyntheticSource::new(0, 1).next_frame(0).payload[..], &[0xff]);
    }

    #[tokio::test]
    async fn run_fills_the_mailbox_until_stopped() {
        let mailbox = Arc::new(FrameMailbox::new(1));
        let task = tokio::spawn(
            SyntheticSource::new(0, 8).run(Arc::clone(&mailbox), Duration::from_millis(10)),
        );

        let frame = mailbox.next().await.unwrap();
        assert_eq!(frame.source_id, 0);

        mailbox.stop();
        tokio::time::sleep(Duration::from_millis(20)).await;
        task.await.unwrap();
    }
}
