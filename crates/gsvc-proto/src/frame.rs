//! Decoded frame records and their wire encoding.

use bytes::{BufMut, Bytes};

use crate::{FrameHeader, ProtocolConfig, ProtocolError, Result};

/// One validated frame: header metadata plus the opaque payload.
///
/// Produced fresh by every successful decode and owned by the caller. The
/// payload is exactly the number of bytes the header declared; what those
/// bytes mean is the codec's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRecord {
    /// Producer identifier
    pub source_id: u16,
    /// Per-source sequence number
    pub frame_id: u32,
    /// Capture time in microseconds, producer clock domain
    pub timestamp_us: u64,
    /// Reserved header flags, passed through
    pub flags: u16,
    /// Compressed image bytes
    pub payload: Bytes,
}

impl FrameRecord {
    /// Record with zero flags.
    pub fn new(source_id: u16, frame_id: u32, timestamp_us: u64, payload: impl Into<Bytes>) -> Self {
        Self { source_id, frame_id, timestamp_us, flags: 0, payload: payload.into() }
    }

    /// Combine a validated header with the payload read after it.
    pub fn from_parts(header: &FrameHeader, payload: Bytes) -> Self {
        debug_assert_eq!(payload.len(), header.payload_size() as usize);
        Self {
            source_id: header.source_id(),
            frame_id: header.frame_id(),
            timestamp_us: header.timestamp_us(),
            flags: header.flags(),
            payload,
        }
    }

    /// Header describing this record under `config`.
    ///
    /// Fails with [`ProtocolError::PayloadTooLarge`] if the payload would not
    /// be accepted by a receiver using the same config.
    pub fn header(&self, config: &ProtocolConfig) -> Result<FrameHeader> {
        let size = self.payload.len();
        let declared = u32::try_from(size)
            .ok()
            .filter(|len| *len <= config.max_payload_size)
            .ok_or(ProtocolError::PayloadTooLarge { size, max: config.max_payload_size })?;

        Ok(FrameHeader::new(config, self.source_id, self.frame_id, self.timestamp_us, declared)
            .with_flags(self.flags))
    }

    /// Bytes this record occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        FrameHeader::SIZE + self.payload.len()
    }

    /// Append the wire encoding (header then payload) to `dst`.
    ///
    /// Nothing is written if the payload is over the limit.
    pub fn encode(&self, config: &ProtocolConfig, dst: &mut impl BufMut) -> Result<()> {
        let header = self.header(config)?;
        dst.put_slice(&header.to_bytes());
        dst.put_slice(&self.payload);
        Ok(())
    }

    /// Wire encoding as a fresh buffer.
    pub fn to_wire(&self, config: &ProtocolConfig) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode(config, &mut buf)?;
        Ok(buf)
    }
}
