//! GSVC stream sender
//!
//! Producers push frames into a shared [`gsvc_core::FrameMailbox`], which
//! keeps only the newest unsent frame per source. A [`Sender`] drains the
//! mailbox into one client connection at a time, pacing to a frame-rate
//! ceiling. Slow clients therefore see dropped frames, never growing
//! latency.
//!
//! # Components
//!
//! - [`SenderConfig`]: bind address, source count, pacing, stats cadence
//! - [`Sender`]: accept loop and per-client serving loop
//! - [`SyntheticSource`]: stand-in frame producer for the binary
//! - [`SenderError`]: setup and accept failures

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod sender;
pub mod source;

pub use config::SenderConfig;
pub use error::{Result, SenderError};
pub use sender::{ClientSummary, SendStats, Sender};
pub use source::{SyntheticSource, spawn_sources};
