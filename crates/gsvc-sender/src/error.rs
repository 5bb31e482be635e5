//! Sender errors.

use std::io;

/// Failure that stops the sender.
///
/// Client-side failures are not errors here: a client that goes away ends
/// its session and the sender accepts the next one.
#[derive(Debug, thiserror::Error)]
pub enum SenderError {
    /// Listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address requested
        addr: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Accepting a connection failed.
    #[error("accept failed: {0}")]
    Accept(#[source] io::Error),

    /// Configuration rejected before binding.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for sender operations
pub type Result<T> = std::result::Result<T, SenderError>;
