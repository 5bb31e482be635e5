//! Opt-in recovery after a protocol error.
//!
//! The wire format has no delimiter besides the declared length, so once a
//! header fails validation the receiver no longer knows where frames start.
//! By default that is fatal. With [`ResyncPolicy::ScanForMagic`] the decoder
//! instead slides a header-sized window forward one byte at a time until the
//! window holds a header that passes validation, giving up after a bounded
//! number of discarded bytes.
//!
//! Scanning can lock onto payload bytes that happen to look like a header.
//! Validation of version, codec and size makes that unlikely but not
//! impossible, which is why it is never on by default.

use gsvc_proto::{FrameHeader, ProtocolConfig};

/// What the decoder does after a header fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResyncPolicy {
    /// Return the protocol error. The connection is dead.
    #[default]
    Disabled,
    /// Discard up to `max_skip` bytes looking for the next valid header.
    ScanForMagic {
        /// Most bytes discarded before giving up
        max_skip: usize,
    },
}

/// Sliding header window used while scanning.
///
/// Holds the last [`FrameHeader::SIZE`] bytes seen. Reading is left to the
/// caller so the same scan serves blocking and async decoders.
#[derive(Debug, Clone)]
pub struct ResyncScan {
    window: [u8; FrameHeader::SIZE],
    skipped: usize,
    max_skip: usize,
}

impl ResyncScan {
    /// Start scanning from the header bytes that failed validation.
    pub fn new(rejected: [u8; FrameHeader::SIZE], max_skip: usize) -> Self {
        Self { window: rejected, skipped: 0, max_skip }
    }

    /// Bytes discarded so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Skip budget used up.
    pub fn exhausted(&self) -> bool {
        self.skipped >= self.max_skip
    }

    /// Drop the oldest byte and append `byte`.
    pub fn push(&mut self, byte: u8) {
        self.window.copy_within(1.., 0);
        self.window[FrameHeader::SIZE - 1] = byte;
        self.skipped += 1;
    }

    /// Header in the window, if it passes validation.
    pub fn candidate(&self, config: &ProtocolConfig) -> Option<FrameHeader> {
        if self.window[..4] != config.magic.to_be_bytes() {
            return None;
        }
        let header = FrameHeader::from_bytes(&self.window).ok()?;
        header.validate(config).ok().map(|()| *header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_header_after_garbage() {
        let config = ProtocolConfig::default();
        let good = FrameHeader::new(&config, 3, 7, 11, 0).to_bytes();

        let mut scan = ResyncScan::new([0xaa; FrameHeader::SIZE], 64);
        assert!(scan.candidate(&config).is_none());

        for byte in good {
            scan.push(byte);
        }

        let header = scan.candidate(&config).unwrap();
        assert_eq!(header.source_id(), 3);
        assert_eq!(header.frame_id(), 7);
        assert_eq!(scan.skipped(), FrameHeader::SIZE);
    }

    #[test]
    fn magic_alone_is_not_enough() {
        let config = ProtocolConfig::default();
        let mut bytes = FrameHeader::new(&config, 0, 0, 0, 0).to_bytes();
        bytes[4] = 99;

        let scan = ResyncScan::new(bytes, 64);
        assert!(scan.candidate(&config).is_none());
    }

    #[test]
    fn budget_is_counted_per_byte() {
        let mut scan = ResyncScan::new([0; FrameHeader::SIZE], 2);
        assert!(!scan.exhausted());
        scan.push(1);
        assert!(!scan.exhausted());
        scan.push(2);
        assert!(scan.exhausted());
    }

    #[test]
    fn default_policy_is_disabled() {
        assert_eq!(ResyncPolicy::default(), ResyncPolicy::Disabled);
    }
}
