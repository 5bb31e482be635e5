//! Wire format for the GSVC framed video stream protocol.
//!
//! Each frame on the wire is a fixed 28-byte big-endian header followed by
//! exactly `payload_size` opaque bytes (one compressed still image). There is
//! no delimiter other than the declared length, so a receiver that loses
//! framing cannot recover it from the bytes alone.
//!
//! # Security
//!
//! Headers are parsed through compile-time verified layouts via `zerocopy`.
//! The payload length is checked against a configured ceiling (1 MiB by
//! default) before anything sized by it is allocated.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod config;
pub mod errors;
pub mod frame;
pub mod header;

pub use codec::Codec;
pub use config::{MAGIC, MAX_PAYLOAD_SIZE, ProtocolConfig, VERSION};
pub use errors::{ProtocolError, Result};
pub use frame::FrameRecord;
pub use header::FrameHeader;
