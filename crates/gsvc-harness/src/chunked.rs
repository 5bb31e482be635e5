//! Byte source with controlled chunking.

use std::{
    io::{self, Read},
    pin::Pin,
    task::{Context, Poll},
};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::io::{AsyncRead, ReadBuf};

/// How many bytes each read may hand out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkPlan {
    /// Everything the caller asks for
    Whole,
    /// At most this many bytes per read
    Fixed(usize),
    /// Cycle through these sizes
    Cycle(Vec<usize>),
    /// Random sizes in `1..=max`, reproducible from `seed`
    Seeded {
        /// RNG seed
        seed: u64,
        /// Largest chunk
        max: usize,
    },
}

#[derive(Debug)]
enum Chunker {
    Whole,
    Fixed(usize),
    Cycle { sizes: Vec<usize>, next: usize },
    Seeded { rng: ChaCha8Rng, max: usize },
}

impl Chunker {
    fn from_plan(plan: ChunkPlan) -> Self {
        match plan {
            ChunkPlan::Whole => Self::Whole,
            ChunkPlan::Fixed(size) => Self::Fixed(size.max(1)),
            ChunkPlan::Cycle(sizes) if sizes.is_empty() => Self::Whole,
            ChunkPlan::Cycle(sizes) => Self::Cycle { sizes, next: 0 },
            ChunkPlan::Seeded { seed, max } => {
                Self::Seeded { rng: ChaCha8Rng::seed_from_u64(seed), max: max.max(1) }
            },
        }
    }

    fn next_size(&mut self) -> usize {
        match self {
            Self::Whole => usize::MAX,
            Self::Fixed(size) => *size,
            Self::Cycle { sizes, next } => {
                let size = sizes[*next % sizes.len()].max(1);
                *next += 1;
                size
            },
            Self::Seeded { rng, max } => rng.gen_range(1..=*max),
        }
    }
}

/// In-memory stream that delivers its bytes in planned chunks.
///
/// Implements both [`Read`] and [`AsyncRead`]. Records how far it has been
/// read so tests can check that a decoder stopped where it should.
#[derive(Debug)]
pub struct ChunkedReader {
    data: Vec<u8>,
    position: usize,
    chunker: Chunker,
    reads: usize,
    fail_at: Option<(usize, io::ErrorKind)>,
}

impl ChunkedReader {
    /// Stream over `data` chunked according to `plan`.
    pub fn new(data: impl Into<Vec<u8>>, plan: ChunkPlan) -> Self {
        Self {
            data: data.into(),
            position: 0,
            chunker: Chunker::from_plan(plan),
            reads: 0,
            fail_at: None,
        }
    }

    /// Fail with `kind` once `offset` bytes have been delivered, instead of
    /// delivering the rest.
    #[must_use]
    pub fn fail_at(mut self, offset: usize, kind: io::ErrorKind) -> Self {
        self.fail_at = Some((offset, kind));
        self
    }

    /// Bytes delivered so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes not yet delivered.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Read calls served, including the final zero-length one.
    pub fn reads(&self) -> usize {
        self.reads
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        if buf.is_empty() {
            return Ok(0);
        }

        let mut end = self.data.len();
        if let Some((offset, kind)) = self.fail_at {
            if self.position >= offset {
                return Err(io::Error::new(kind, "injected transport failure"));
            }
            end = end.min(offset);
        }

        let available = end - self.position;
        let len = buf.len().min(available).min(self.chunker.next_size());
        buf[..len].copy_from_slice(&self.data[self.position..self.position + len]);
        self.position += len;
        Ok(len)
    }
}

impl Read for ChunkedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_chunk(buf)
    }
}

impl AsyncRead for ChunkedReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let n = this.read_chunk(buf.initialize_unfilled())?;
        buf.advance(n);
        Poll::Ready(Ok(()))
    }
}
