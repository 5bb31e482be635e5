//! Async frame decoder.
//!
//! Same decode sequence as [`crate::FrameDecoder`], over a
//! [`tokio::io::AsyncRead`]. The reads are the only await points, so dropping
//! a pending [`AsyncFrameDecoder::decode_next`] future abandons at most one
//! partially read frame, after which the stream is no longer usable.

use bytes::Bytes;
use gsvc_proto::{FrameHeader, FrameRecord, ProtocolConfig, ProtocolError};
use tokio::io::AsyncRead;
use tracing::{trace, warn};

use crate::{
    ReadStage, Result,
    decoder::checked_header,
    exact_read::{read_exact_into_async, read_exact_vec_async},
    resync::{ResyncPolicy, ResyncScan},
};

/// Decodes frames from an async byte stream.
#[derive(Debug)]
pub struct AsyncFrameDecoder<R> {
    reader: R,
    config: ProtocolConfig,
    resync: ResyncPolicy,
    skipped_bytes: u64,
}

impl<R: AsyncRead + Unpin> AsyncFrameDecoder<R> {
    /// Decoder using the standard wire constants.
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, ProtocolConfig::default())
    }

    /// Decoder validating against `config`.
    pub fn with_config(reader: R, config: ProtocolConfig) -> Self {
        Self { reader, config, resync: ResyncPolicy::Disabled, skipped_bytes: 0 }
    }

    /// Opt into resynchronization after protocol errors.
    #[must_use]
    pub fn with_resync(mut self, policy: ResyncPolicy) -> Self {
        self.resync = policy;
        self
    }

    /// Decode the next frame.
    pub async fn decode_next(&mut self) -> Result<FrameRecord> {
        let mut raw = [0u8; FrameHeader::SIZE];
        read_exact_into_async(&mut self.reader, &mut raw)
            .await
            .map_err(|e| e.at(ReadStage::Header))?;

        let header = match checked_header(&raw, &self.config) {
            Ok(header) => header,
            Err(err) => self.recover(raw, err).await?,
        };

        let payload = read_exact_vec_async(&mut self.reader, header.payload_size() as usize)
            .await
            .map_err(|e| e.at(ReadStage::Payload))?;

        trace!(
            source_id = header.source_id(),
            frame_id = header.frame_id(),
            payload_size = header.payload_size(),
            "decoded frame"
        );

        Ok(FrameRecord::from_parts(&header, Bytes::from(payload)))
    }

    async fn recover(
        &mut self,
        rejected: [u8; FrameHeader::SIZE],
        err: ProtocolError,
    ) -> Result<FrameHeader> {
        let ResyncPolicy::ScanForMagic { max_skip } = self.resync else {
            return Err(err.into());
        };

        let mut scan = ResyncScan::new(rejected, max_skip);
        while !scan.exhausted() {
            let mut byte = [0u8; 1];
            read_exact_into_async(&mut self.reader, &mut byte)
                .await
                .map_err(|e| e.at(ReadStage::Resync))?;
            scan.push(byte[0]);

            if let Some(header) = scan.candidate(&self.config) {
                self.skipped_bytes += scan.skipped() as u64;
                warn!(skipped = scan.skipped(), %err, "resynchronized after protocol error");
                return Ok(header);
            }
        }

        self.skipped_bytes += scan.skipped() as u64;
        Err(err.into())
    }
}

impl<R> AsyncFrameDecoder<R> {
    /// Validation settings in use.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Total bytes discarded by resynchronization.
    pub fn skipped_bytes(&self) -> u64 {
        self.skipped_bytes
    }

    /// Borrow the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Give back the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}
