//! Payload codec identifiers.

/// Codec of the frame payload.
///
/// The payload is never interpreted by this crate; the codec byte only tells
/// the downstream decoder what it is about to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Codec {
    /// Baseline JPEG still image
    Jpeg = 1,
}

impl Codec {
    /// Wire value of this codec.
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Codec for a wire value, if known.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Jpeg),
            _ => None,
        }
    }
}
