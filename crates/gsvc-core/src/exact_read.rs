//! Exact-length reads over a stream transport.
//!
//! A stream read returns however many bytes happen to be available, anywhere
//! from one to the requested count. These helpers loop until the whole
//! request is satisfied, hiding the transport's chunking from the decoder.
//!
//! A zero-length read while bytes are still outstanding means the peer closed
//! the stream. That is reported as [`ExactReadError::Closed`] and never
//! retried: a half-received frame cannot be completed. Any other error is
//! returned as-is, except [`io::ErrorKind::Interrupted`], which reports that
//! no data moved and the read is simply re-issued.

use std::io::{self, Read};

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{DecodeError, ReadStage};

/// Failure of a single exact read.
#[derive(Debug, thiserror::Error)]
pub enum ExactReadError {
    /// Zero-length read before the request was satisfied.
    #[error("peer closed the connection after {received} of {expected} bytes")]
    Closed {
        /// Bytes accumulated before the close
        received: usize,
        /// Bytes requested
        expected: usize,
    },

    /// Transport error.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ExactReadError {
    /// Attach the decode stage this read belonged to.
    pub fn at(self, stage: ReadStage) -> DecodeError {
        match self {
            Self::Closed { received, expected } => {
                DecodeError::ConnectionClosed { stage, received, expected }
            },
            Self::Io(err) => DecodeError::Transport(err),
        }
    }
}

/// Fill `buf` completely from `reader`.
pub fn read_exact_into<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<(), ExactReadError> {
    let expected = buf.len();
    let mut filled = 0;

    while filled < expected {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Err(ExactReadError::Closed { received: filled, expected }),
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {},
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

/// Read exactly `len` bytes from `reader` into a new buffer.
///
/// Callers are responsible for bounding `len` before calling.
pub fn read_exact_vec<R: Read + ?Sized>(
    reader: &mut R,
    len: usize,
) -> Result<Vec<u8>, ExactReadError> {
    let mut buf = vec![0u8; len];
    read_exact_into(reader, &mut buf)?;
    Ok(buf)
}

/// Async counterpart of [`read_exact_into`].
///
/// Cancel-safe only in the sense that dropping the future discards the
/// partial accumulation; the bytes already taken from the stream are gone.
pub async fn read_exact_into_async<R: AsyncRead + Unpin + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<(), ExactReadError> {
    let expected = buf.len();
    let mut filled = 0;

    while filled < expected {
        match reader.read(&mut buf[filled..]).await {
            Ok(0) => return Err(ExactReadError::Closed { received: filled, expected }),
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {},
            Err(err) => return Err(err.into()),
        }
    }

    Ok(())
}

/// Async counterpart of [`read_exact_vec`].
pub async fn read_exact_vec_async<R: AsyncRead + Unpin + ?Sized>(
    reader: &mut R,
    len: usize,
) -> Result<Vec<u8>, ExactReadError> {
    let mut buf = vec![0u8; len];
    read_exact_into_async(reader, &mut buf).await?;
    Ok(buf)
}
