//! Async frame writer for senders.

use std::io;

use gsvc_proto::{FrameHeader, FrameRecord, ProtocolConfig, ProtocolError};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::trace;

/// Failure to write a frame.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// Frame cannot be represented on the wire; nothing was written.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Transport failed, possibly after a partial write. The stream is no
    /// longer frame-aligned.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
}

/// Writes frames to an async byte stream.
#[derive(Debug)]
pub struct FrameWriter<W> {
    writer: W,
    config: ProtocolConfig,
    frames_written: u64,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    /// Writer using the standard wire constants.
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, ProtocolConfig::default())
    }

    /// Writer stamping headers from `config`.
    pub fn with_config(writer: W, config: ProtocolConfig) -> Self {
        Self { writer, config, frames_written: 0 }
    }

    /// Write header and payload, then flush.
    ///
    /// Oversize payloads are refused before any byte is written, so the
    /// stream stays aligned and the caller may simply drop the frame.
    pub async fn write_frame(&mut self, frame: &FrameRecord) -> Result<(), WriteError> {
        let header: FrameHeader = frame.header(&self.config)?;

        self.writer.write_all(&header.to_bytes()).await?;
        self.writer.write_all(&frame.payload).await?;
        self.writer.flush().await?;
        self.frames_written += 1;

        trace!(
            source_id = frame.source_id,
            frame_id = frame.frame_id,
            payload_size = frame.payload.len(),
            "wrote frame"
        );
        Ok(())
    }

    /// Shut down the write half.
    pub async fn shutdown(&mut self) -> io::Result<()> {
        self.writer.shutdown().await
    }
}

impl<W> FrameWriter<W> {
    /// Header settings in use.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Frames written successfully.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AsyncFrameDecoder;

    #[tokio::test]
    async fn written_frames_decode() {
        let frames = vec![
            FrameRecord::new(0, 1, 10, vec![1, 2, 3]),
            FrameRecord::new(2, 9, 20, Vec::new()),
        ];

        let mut writer = FrameWriter::new(Vec::new());
        for frame in &frames {
            writer.write_frame(frame).await.unwrap();
        }
        assert_eq!(writer.frames_written(), 2);

        let wire = writer.into_inner();
        let mut decoder = AsyncFrameDecoder::new(&wire[..]);
        for frame in &frames {
            assert_eq!(&decoder.decode_next().await.unwrap(), frame);
        }
    }

    #[tokio::test]
    async fn oversize_frame_writes_nothing() {
        let config = ProtocolConfig::default().with_max_payload_size(2);
        let mut writer = FrameWriter::with_config(Vec::new(), config);

        let err = writer.write_frame(&FrameRecord::new(0, 1, 1, vec![0; 3])).await.unwrap_err();
        assert!(matches!(err, WriteError::Protocol(ProtocolError::PayloadTooLarge { .. })));
        assert_eq!(writer.frames_written(), 0);
        assert!(writer.into_inner().is_empty());
    }
}
