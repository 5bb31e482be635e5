//! Test harness for GSVC stream decoding.
//!
//! Transports that deliver the same bytes in controlled chunk sizes (or fail
//! at a chosen offset), plus frame fixtures. Chunking is reproducible from a
//! seed so a failing property case can be replayed exactly.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod chunked;
pub mod fixtures;

pub use chunked::{ChunkPlan, ChunkedReader};
pub use fixtures::{jpeg_like_payload, sample_frame, wire};
