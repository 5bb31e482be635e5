//! GSVC stream decoding core
//!
//! Turns an unstructured byte stream into a validated sequence of
//! [`FrameRecord`]s. The only suspension points are the reads issued by the
//! exact-read primitive; everything else is pure parsing and validation.
//!
//! # Architecture
//!
//! Each decode performs two exact reads: the fixed header, then exactly the
//! payload length it declared. The header is validated against a
//! [`ProtocolConfig`] before the payload is allocated, so a corrupt or
//! hostile length field costs at most one header read.
//!
//! The transport is whatever implements [`std::io::Read`] (blocking) or
//! [`tokio::io::AsyncRead`] (async). Choosing threads, tasks or an event loop
//! is left to the driver. Decoders hold no state shared across connections;
//! run one per stream.
//!
//! # Components
//!
//! - [`exact_read`]: read exactly N bytes or fail with a typed closure
//! - [`decoder`]: blocking frame decoder
//! - [`async_decoder`]: async frame decoder
//! - [`resync`]: opt-in scan-for-magic recovery after protocol errors
//! - [`writer`]: async frame writer for senders
//! - [`mailbox`]: latest-frame-per-source buffer for senders
//! - [`stats`]: receive-side counters
//! - [`error`]: decode error taxonomy

pub mod async_decoder;
pub mod decoder;
pub mod error;
pub mod exact_read;
pub mod mailbox;
pub mod resync;
pub mod stats;
pub mod writer;

pub use async_decoder::AsyncFrameDecoder;
pub use decoder::{FrameDecoder, Frames};
pub use error::{DecodeError, ReadStage, Result};
pub use gsvc_proto::{FrameHeader, FrameRecord, ProtocolConfig, ProtocolError};
pub use mailbox::{FrameMailbox, PushOutcome};
pub use resync::ResyncPolicy;
pub use stats::{ReceiveStats, StatsSnapshot};
pub use writer::{FrameWriter, WriteError};
