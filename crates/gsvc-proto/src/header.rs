//! Fixed 28-byte frame header.
//!
//! ```text
//!  0       4   5   6       8       10      12      16              24      28
//!  ┌───────┬───┬───┬───────┬───────┬───────┬───────┬───────────────┬───────┐
//!  │ magic │ver│cdc│ flags │source │reservd│frame  │ timestamp_us  │payload│
//!  │  u32  │u8 │u8 │  u16  │  u16  │  u16  │  u32  │      u64      │  u32  │
//!  └───────┴───┴───┴───────┴───────┴───────┴───────┴───────────────┴───────┘
//! ```
//!
//! All multi-byte fields are big-endian. The struct is `repr(C)` over
//! alignment-1 field types, so its in-memory layout is the wire layout and
//! parsing is a checked cast rather than a field-by-field copy.

use std::fmt;

use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned,
    byteorder::{BigEndian, U16, U32, U64},
};

use crate::{ProtocolConfig, ProtocolError, Result};

/// Frame header as it appears on the wire.
#[derive(Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct FrameHeader {
    magic: U32<BigEndian>,
    version: u8,
    codec: u8,
    flags: U16<BigEndian>,
    source_id: U16<BigEndian>,
    reserved: U16<BigEndian>,
    frame_id: U32<BigEndian>,
    timestamp_us: U64<BigEndian>,
    payload_size: U32<BigEndian>,
}

const _: () = assert!(size_of::<FrameHeader>() == FrameHeader::SIZE);

impl FrameHeader {
    /// Header size in bytes.
    pub const SIZE: usize = 28;

    /// Build a header for an outgoing frame.
    ///
    /// `flags` and `reserved` are zero. The payload size is not checked here;
    /// see [`FrameHeader::validate`].
    pub fn new(
        config: &ProtocolConfig,
        source_id: u16,
        frame_id: u32,
        timestamp_us: u64,
        payload_size: u32,
    ) -> Self {
        Self {
            magic: U32::new(config.magic),
            version: config.version,
            codec: config.codec,
            flags: U16::new(0),
            source_id: U16::new(source_id),
            reserved: U16::new(0),
            frame_id: U32::new(frame_id),
            timestamp_us: U64::new(timestamp_us),
            payload_size: U32::new(payload_size),
        }
    }

    /// Copy of this header with `flags` set.
    #[must_use]
    pub fn with_flags(mut self, flags: u16) -> Self {
        self.flags = U16::new(flags);
        self
    }

    /// View the first [`FrameHeader::SIZE`] bytes of `bytes` as a header.
    ///
    /// Performs no validation beyond length; call [`FrameHeader::validate`]
    /// before trusting any field.
    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        Self::ref_from_prefix(bytes)
            .map(|(header, _rest)| header)
            .map_err(|_| ProtocolError::FrameTooShort { expected: Self::SIZE, actual: bytes.len() })
    }

    /// Serialize to wire bytes.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out.copy_from_slice(self.as_bytes());
        out
    }

    /// Check the header against `config`.
    ///
    /// Checks run in a fixed order and stop at the first failure: magic,
    /// version, codec, then payload size. The cheap structural checks come
    /// first so a wrong-protocol peer is reported as such rather than as an
    /// oversized frame, and all of them run before any payload I/O.
    pub fn validate(&self, config: &ProtocolConfig) -> Result<()> {
        if self.magic() != config.magic {
            return Err(ProtocolError::BadMagic { found: self.magic() });
        }
        if self.version != config.version {
            return Err(ProtocolError::UnsupportedVersion { found: self.version });
        }
        if self.codec != config.codec {
            return Err(ProtocolError::UnsupportedCodec { found: self.codec });
        }
        if self.payload_size() > config.max_payload_size {
            return Err(ProtocolError::PayloadTooLarge {
                size: self.payload_size() as usize,
                max: config.max_payload_size,
            });
        }
        Ok(())
    }

    /// Protocol sentinel.
    pub fn magic(&self) -> u32 {
        self.magic.get()
    }

    /// Protocol version.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Payload codec byte.
    pub fn codec(&self) -> u8 {
        self.codec
    }

    /// Reserved flags, passed through unvalidated.
    pub fn flags(&self) -> u16 {
        self.flags.get()
    }

    /// Producer identifier.
    pub fn source_id(&self) -> u16 {
        self.source_id.get()
    }

    /// Reserved field, unvalidated.
    pub fn reserved(&self) -> u16 {
        self.reserved.get()
    }

    /// Per-source sequence number.
    pub fn frame_id(&self) -> u32 {
        self.frame_id.get()
    }

    /// Capture time in microseconds, producer clock domain.
    pub fn timestamp_us(&self) -> u64 {
        self.timestamp_us.get()
    }

    /// Declared payload length in bytes.
    pub fn payload_size(&self) -> u32 {
        self.payload_size.get()
    }
}

impl fmt::Debug for FrameHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameHeader")
            .field("magic", &format_args!("{:#010x}", self.magic()))
            .field("version", &self.version)
            .field("codec", &self.codec)
            .field("flags", &self.flags())
            .field("source_id", &self.source_id())
            .field("reserved", &self.reserved())
            .field("frame_id", &self.frame_id())
            .field("timestamp_us", &self.timestamp_us())
            .field("payload_size", &self.payload_size())
            .finish()
    }
}
