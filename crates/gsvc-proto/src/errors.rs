//! Protocol-level errors.
//!
//! Every variant is a structural violation of the wire format. None of them
//! are recoverable on the connection that produced them: the stream has no
//! self-healing framing, so the receiver cannot know where the next header
//! starts.

/// Result alias for wire-format operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Structural violation of the wire format.
///
/// Each variant carries the offending value so callers can log exactly what
/// arrived on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Header magic did not match the protocol sentinel.
    #[error("bad magic: {found:#010x}")]
    BadMagic {
        /// Magic value read from the wire
        found: u32,
    },

    /// Header version is not the supported version.
    #[error("unsupported version: {found}")]
    UnsupportedVersion {
        /// Version byte read from the wire
        found: u8,
    },

    /// Header codec is not the supported codec.
    #[error("unsupported codec: {found}")]
    UnsupportedCodec {
        /// Codec byte read from the wire
        found: u8,
    },

    /// Declared payload length exceeds the configured ceiling.
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Declared or actual payload length
        size: usize,
        /// Configured ceiling
        max: u32,
    },

    /// Fewer bytes than a full header were supplied to a header parse.
    #[error("frame too short: expected {expected} bytes, got {actual}")]
    FrameTooShort {
        /// Required length
        expected: usize,
        /// Supplied length
        actual: usize,
    },
}

impl ProtocolError {
    /// Short machine-friendly reason, stable across releases.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::BadMagic { .. } => "bad magic",
            Self::UnsupportedVersion { .. } => "unsupported version",
            Self::UnsupportedCodec { .. } => "unsupported codec",
            Self::PayloadTooLarge { .. } => "payload too large",
            Self::FrameTooShort { .. } => "frame too short",
        }
    }

    /// The offending value, widened for logging.
    pub fn value(&self) -> u64 {
        match *self {
            Self::BadMagic { found } => u64::from(found),
            Self::UnsupportedVersion { found } | Self::UnsupportedCodec { found } => {
                u64::from(found)
            },
            Self::PayloadTooLarge { size, .. } => size as u64,
            Self::FrameTooShort { actual, .. } => actual as u64,
        }
    }
}
