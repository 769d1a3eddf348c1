// Chunk header of the block container.
//
// Each chunk is framed by four bytes:
//
//   compressed_len:   u16 LE  (payload bytes that follow)
//   uncompressed_len: u16 LE  (output bytes the payload decodes to)
//
// A header with either field zero marks the end of the container.

use std::io::{self, Write};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Size of an encoded chunk header.
pub const CHUNK_HEADER_LEN: usize = 4;

/// Default uncompressed size of one chunk.
pub const DEFAULT_BLOCK_SIZE: usize = 8192;

/// Largest chunk (compressed or not) a header can describe.
pub const MAX_CHUNK_LEN: usize = u16::MAX as usize;

// ---------------------------------------------------------------------------
// ChunkHeader
// ---------------------------------------------------------------------------

/// Parsed chunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChunkHeader {
    pub compressed_len: u16,
    pub uncompressed_len: u16,
}

impl ChunkHeader {
    /// Header for a chunk, or `None` if either length exceeds 16 bits.
    pub fn new(compressed_len: usize, uncompressed_len: usize) -> Option<Self> {
        Some(Self {
            compressed_len: u16::try_from(compressed_len).ok()?,
            uncompressed_len: u16::try_from(uncompressed_len).ok()?,
        })
    }

    /// Parse the first four bytes of `bytes`.
    ///
    /// Returns `None` if fewer than four bytes are available.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let raw = bytes.get(..CHUNK_HEADER_LEN)?;
        Some(Self {
            compressed_len: u16::from_le_bytes([raw[0], raw[1]]),
            uncompressed_len: u16::from_le_bytes([raw[2], raw[3]]),
        })
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; CHUNK_HEADER_LEN] {
        let c = self.compressed_len.to_le_bytes();
        let u = self.uncompressed_len.to_le_bytes();
        [c[0], c[1], u[0], u[1]]
    }

    /// Encode the header to a writer.
    pub fn encode<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.to_bytes())
    }

    /// Whether this header ends the container.
    #[inline]
    pub fn is_terminator(&self) -> bool {
        self.compressed_len == 0 || self.uncompressed_len == 0
    }

    #[inline]
    pub fn compressed_len(&self) -> usize {
        self.compressed_len as usize
    }

    #[inline]
    pub fn uncompressed_len(&self) -> usize {
        self.uncompressed_len as usize
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
