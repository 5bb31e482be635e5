//! Decode error taxonomy.
//!
//! Three failure kinds, all fatal to the connection that produced them:
//! the stream ended, the bytes violated the protocol, or the transport
//! failed. The decoder never retries or skips past any of them on its own.

use std::{fmt, io};

use gsvc_proto::ProtocolError;

/// Result alias for decode operations.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Which read was in progress when the stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStage {
    /// Reading the fixed-size header
    Header,
    /// Reading the declared payload
    Payload,
    /// Scanning for the next magic after a protocol error
    Resync,
}

impl fmt::Display for ReadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Header => "header",
            Self::Payload => "payload",
            Self::Resync => "resync",
        })
    }
}

/// Failure to decode the next frame.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Peer closed the stream before the requested bytes arrived.
    ///
    /// At the header stage with nothing received, this is the orderly end of
    /// the stream; see [`DecodeError::is_clean_close`]. Anywhere else the
    /// peer went away mid-frame.
    #[error("peer closed the connection during {stage} ({received} of {expected} bytes)")]
    ConnectionClosed {
        /// Read that was interrupted
        stage: ReadStage,
        /// Bytes of that read that did arrive
        received: usize,
        /// Bytes that read asked for
        expected: usize,
    },

    /// Header violated the protocol.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Underlying transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),
}

impl DecodeError {
    /// Stream ended exactly on a frame boundary.
    pub fn is_clean_close(&self) -> bool {
        matches!(self, Self::ConnectionClosed { stage: ReadStage::Header, received: 0, .. })
    }

    /// Protocol violation, if that is what this is.
    pub fn as_protocol(&self) -> Option<&ProtocolError> {
        match self {
            Self::Protocol(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_close_is_header_stage_with_nothing_received() {
        let clean =
            DecodeError::ConnectionClosed { stage: ReadStage::Header, received: 0, expected: 28 };
        assert!(clean.is_clean_close());

        let torn_header =
            DecodeError::ConnectionClosed { stage: ReadStage::Header, received: 5, expected: 28 };
        assert!(!torn_header.is_clean_close());

        let torn_payload =
            DecodeError::ConnectionClosed { stage: ReadStage::Payload, received: 0, expected: 10 };
        assert!(!torn_payload.is_clean_close());
    }

    #[test]
    fn messages_carry_context() {
        let err =
            DecodeError::ConnectionClosed { stage: ReadStage::Payload, received: 3, expected: 10 };
        assert_eq!(
            err.to_string(),
            "peer closed the connection during payload (3 of 10 bytes)"
        );

        let err = DecodeError::from(ProtocolError::UnsupportedVersion { found: 2 });
        assert_eq!(err.to_string(), "protocol error: unsupported version: 2");
        assert_eq!(err.as_protocol(), Some(&ProtocolError::UnsupportedVersion { found: 2 }));
    }
}
