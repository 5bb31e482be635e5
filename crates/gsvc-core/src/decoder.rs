//! Blocking frame decoder.
//!
//! # Decode sequence
//!
//! 1. Exact-read [`FrameHeader::SIZE`] bytes.
//! 2. Validate magic, version, codec, payload size, in that order.
//! 3. Exact-read `payload_size` bytes.
//! 4. Return the [`FrameRecord`].
//!
//! On success the stream is positioned at the next header. On failure the
//! connection should be dropped: the decoder does not know where the next
//! frame starts (unless [`ResyncPolicy::ScanForMagic`] was opted into).

use std::io::Read;

use bytes::Bytes;
use gsvc_proto::{FrameHeader, FrameRecord, ProtocolConfig, ProtocolError};
use tracing::{trace, warn};

use crate::{
    DecodeError, ReadStage, Result,
    exact_read::{read_exact_into, read_exact_vec},
    resync::{ResyncPolicy, ResyncScan},
};

/// Parse and validate raw header bytes.
pub(crate) fn checked_header(
    raw: &[u8; FrameHeader::SIZE],
    config: &ProtocolConfig,
) -> std::result::Result<FrameHeader, ProtocolError> {
    let header = FrameHeader::from_bytes(raw)?;
    header.validate(config)?;
    Ok(*header)
}

/// Decodes frames from a blocking byte stream.
///
/// Owns the reader. Each [`FrameDecoder::decode_next`] call consumes exactly
/// one frame's bytes on success.
#[derive(Debug)]
pub struct FrameDecoder<R> {
    reader: R,
    config: ProtocolConfig,
    resync: ResyncPolicy,
    skipped_bytes: u64,
}

impl<R: Read> FrameDecoder<R> {
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
    pub fn decode_next(&mut self) -> Result<FrameRecord> {
        let mut raw = [0u8; FrameHeader::SIZE];
        read_exact_into(&mut self.reader, &mut raw).map_err(|e| e.at(ReadStage::Header))?;

        let header = match checked_header(&raw, &self.config) {
            Ok(header) => header,
            Err(err) => self.recover(raw, err)?,
        };

        let payload = read_exact_vec(&mut self.reader, header.payload_size() as usize)
            .map_err(|e| e.at(ReadStage::Payload))?;

        trace!(
            source_id = header.source_id(),
            frame_id = header.frame_id(),
            payload_size = header.payload_size(),
            "decoded frame"
        );

        Ok(FrameRecord::from_parts(&header, Bytes::from(payload)))
    }

    /// Iterator over the remaining frames.
    pub fn frames(&mut self) -> Frames<'_, R> {
        Frames { decoder: self, done: false }
    }

    fn recover(
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
            read_exact_into(&mut self.reader, &mut byte).map_err(|e| e.at(ReadStage::Resync))?;
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

impl<R> FrameDecoder<R> {
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

    /// Mutably borrow the underlying reader.
    ///
    /// Reading from it directly will desynchronize the decoder.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Give back the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Iterator returned by [`FrameDecoder::frames`].
///
/// Ends quietly on a clean close at a frame boundary. Any other failure is
/// yielded once, after which the iterator is exhausted.
#[derive(Debug)]
pub struct Frames<'a, R> {
    decoder: &'a mut FrameDecoder<R>,
    done: bool,
}

impl<R: Read> Iterator for Frames<'_, R> {
    type Item = Result<FrameRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.decoder.decode_next() {
            Ok(frame) => Some(Ok(frame)),
            Err(err) => {
                self.done = true;
                if err.is_clean_close() { None } else { Some(Err(err)) }
            },
        }
    }
}

impl<R: Read> std::iter::FusedIterator for Frames<'_, R> {}
