//! Receive-side counters.
//!
//! Pure bookkeeping: time is passed in by the caller, nothing here reads a
//! clock or logs.

use std::{
    collections::BTreeMap,
    fmt,
    time::{Duration, Instant},
};

use gsvc_proto::FrameRecord;

/// Identity of the most recently recorded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastFrame {
    /// Producer identifier
    pub source_id: u16,
    /// Per-source sequence number
    pub frame_id: u32,
    /// Capture time in microseconds
    pub timestamp_us: u64,
}

/// Running totals for one connection.
#[derive(Debug, Clone)]
pub struct ReceiveStats {
    started: Instant,
    frames: u64,
    payload_bytes: u64,
    per_source: BTreeMap<u16, u64>,
    last: Option<LastFrame>,
}

impl ReceiveStats {
    /// Empty stats, measuring rate from `now`.
    pub fn new(now: Instant) -> Self {
        Self { started: now, frames: 0, payload_bytes: 0, per_source: BTreeMap::new(), last: None }
    }

    /// Count one delivered frame.
    pub fn record(&mut self, frame: &FrameRecord) {
        self.frames += 1;
        self.payload_bytes += frame.payload.len() as u64;
        *self.per_source.entry(frame.source_id).or_insert(0) += 1;
        self.last = Some(LastFrame {
            source_id: frame.source_id,
            frame_id: frame.frame_id,
            timestamp_us: frame.timestamp_us,
        });
    }

    /// Frames recorded.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Payload bytes recorded.
    pub fn payload_bytes(&self) -> u64 {
        self.payload_bytes
    }

    /// Frames recorded from one source.
    pub fn frames_from(&self, source_id: u16) -> u64 {
        self.per_source.get(&source_id).copied().unwrap_or(0)
    }

    /// Sources seen so far, ascending.
    pub fn sources(&self) -> impl Iterator<Item = u16> + '_ {
        self.per_source.keys().copied()
    }

    /// Most recent frame.
    pub fn last(&self) -> Option<LastFrame> {
        self.last
    }

    /// Time since the stats were created.
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }

    /// Average frame rate since creation.
    pub fn fps(&self, now: Instant) -> f64 {
        let secs = self.elapsed(now).as_secs_f64().max(1e-6);
        self.frames as f64 / secs
    }

    /// A periodic report is due every `log_every` frames. Zero disables it.
    pub fn is_log_due(&self, log_every: u64) -> bool {
        log_every > 0 && self.frames > 0 && self.frames.is_multiple_of(log_every)
    }

    /// Point-in-time view for reporting.
    pub fn snapshot(&self, now: Instant) -> StatsSnapshot {
        StatsSnapshot {
            frames: self.frames,
            payload_bytes: self.payload_bytes,
            fps: self.fps(now),
            last: self.last,
        }
    }
}

/// Point-in-time copy of [`ReceiveStats`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSnapshot {
    /// Frames recorded
    pub frames: u64,
    /// Payload bytes recorded
    pub payload_bytes: u64,
    /// Average frame rate
    pub fps: f64,
    /// Most recent frame
    pub last: Option<LastFrame>,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frames={} fps={:.2}", self.frames, self.fps)?;
        if let Some(last) = self.last {
            write!(
                f,
                " last_source={} last_frame_id={} timestamp_us={}",
                last.source_id, last.frame_id, last.timestamp_us
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_frames_and_sources() {
        let t0 = Instant::now();
        let mut stats = ReceiveStats::new(t0);

        stats.record(&FrameRecord::new(0, 1, 10, vec![0; 100]));
        stats.record(&FrameRecord::new(1, 1, 11, vec![0; 50]));
        stats.record(&FrameRecord::new(0, 2, 12, vec![0; 25]));

        assert_eq!(stats.frames(), 3);
        assert_eq!(stats.payload_bytes(), 175);
        assert_eq!(stats.frames_from(0), 2);
        assert_eq!(stats.frames_from(1), 1);
        assert_eq!(stats.frames_from(9), 0);
        assert_eq!(stats.sources().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(
            stats.last(),
            Some(LastFrame { source_id: 0, frame_id: 2, timestamp_us: 12 })
        );
    }

    #[test]
    fn fps_uses_supplied_clock() {
        let t0 = Instant::now();
        let mut stats = ReceiveStats::new(t0);
        for id in 0..30 {
            stats.record(&FrameRecord::new(0, id, u64::from(id), Vec::new()));
        }

        let fps = stats.fps(t0 + Duration::from_secs(2));
        assert!((fps - 15.0).abs() < 1e-9);
    }

    #[test]
    fn log_due_every_n_frames() {
        let mut stats = ReceiveStats::new(Instant::now());
        assert!(!stats.is_log_due(2));

        stats.record(&FrameRecord::new(0, 1, 1, Vec::new()));
        assert!(!stats.is_log_due(2));
        stats.record(&FrameRecord::new(0, 2, 2, Vec::new()));
        assert!(stats.is_log_due(2));
        assert!(!stats.is_log_due(0));
    }

    #[test]
    fn snapshot_formats_like_a_log_line() {
        let t0 = Instant::now();
        let mut stats = ReceiveStats::new(t0);
        stats.record(&FrameRecord::new(3, 42, 999, Vec::new()));

        let line = stats.snapshot(t0 + Duration::from_secs(1)).to_string();
        assert_eq!(line, "frames=1 fps=1.00 last_source=3 last_frame_id=42 timestamp_us=999");
    }
}
