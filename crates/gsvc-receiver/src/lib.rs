//! GSVC stream receiver
//!
//! Drives an [`gsvc_core::AsyncFrameDecoder`] over one connection and hands
//! each frame to a [`FrameSink`]. The sink stands in for everything past the
//! protocol: image decoding, display, recording. A sink that fails to make
//! sense of a payload deals with it itself; only protocol and transport
//! failures end the receive loop.
//!
//! # Components
//!
//! - [`ReceiverConfig`]: address, connect timeout, stats cadence, protocol
//! - [`Receiver`]: connect with timeout, then decode until told to stop
//! - [`FrameSink`]: downstream consumer of decoded frames
//! - [`ReceiverError`]: connection and decode failures

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod receiver;
pub mod sink;

pub use config::ReceiverConfig;
pub use error::ReceiverError;
pub use receiver::{ReceiveSummary, Receiver, StopReason};
pub use sink::{ChannelSink, FrameSink, LoggingSink, SinkOutcome};
