//! Receiver errors.

use std::{io, time::Duration};

use gsvc_core::DecodeError;

/// Failure that ends a receive session.
#[derive(Debug, thiserror::Error)]
pub enum ReceiverError {
    /// Connection not established within the connect timeout.
    #[error("timed out connecting to {addr} after {timeout:?}")]
    ConnectTimeout {
        /// Address dialled
        addr: String,
        /// Timeout that elapsed
        timeout: Duration,
    },

    /// Connection attempt failed.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        /// Address dialled
        addr: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Decoding failed; the connection is unusable.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Configuration rejected before connecting.
    #[error("invalid configuration: {0}")]
    Config(String),
}
