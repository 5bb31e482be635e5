//! Protocol constants and the configuration value that carries them.

use crate::Codec;

/// Protocol sentinel, ASCII "GSVC".
pub const MAGIC: u32 = 0x4753_5643;

/// The only supported protocol version.
pub const VERSION: u8 = 1;

/// Default ceiling on the declared payload length (1 MiB).
pub const MAX_PAYLOAD_SIZE: u32 = 1024 * 1024;

/// Values a header must match to be accepted.
///
/// Passed to decoders and encoders at construction so tests (and deployments
/// with smaller frames) can use different limits without touching any
/// process-wide state. [`Default`] gives the wire constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Expected header magic
    pub magic: u32,
    /// Supported protocol version
    pub version: u8,
    /// Supported payload codec
    pub codec: u8,
    /// Largest accepted payload, in bytes
    pub max_payload_size: u32,
}

impl ProtocolConfig {
    /// Copy of this config with a different payload ceiling.
    #[must_use]
    pub const fn with_max_payload_size(mut self, max_payload_size: u32) -> Self {
        self.max_payload_size = max_payload_size;
        self
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            codec: Codec::Jpeg.to_u8(),
            max_payload_size: MAX_PAYLOAD_SIZE,
        }
    }
}
