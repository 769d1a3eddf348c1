// Container decoding.
//
// Walks the chunk headers, checks each against what is left of the stream
// and of the destination, and decodes every payload straight into its slot
// of the destination. Cursors advance by the header-declared sizes; the
// codec's own output count must agree or the chunk is treated as corrupt.

use thiserror::Error;

use super::codec::{BlockCodec, CodecError, CodecKind};
use super::header::{CHUNK_HEADER_LEN, ChunkHeader};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A corrupt container. Every variant records how many output bytes were
/// produced before the problem was found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnpackError {
    #[error(
        "chunk {index} at offset {offset}: header truncated ({available} of 4 bytes), {written} bytes written"
    )]
    TruncatedHeader {
        index: usize,
        offset: usize,
        available: usize,
        written: usize,
    },
    #[error(
        "chunk {index} at offset {offset}: declares {declared} payload bytes but {available} remain, {written} bytes written"
    )]
    PayloadOverrun {
        index: usize,
        offset: usize,
        declared: usize,
        available: usize,
        written: usize,
    },
    #[error(
        "chunk {index}: declares {declared} output bytes but the destination has room for {available}, {written} bytes written"
    )]
    DestinationOverrun {
        index: usize,
        declared: usize,
        available: usize,
        written: usize,
    },
    #[error("chunk {index}: decoded to {actual} bytes, header declares {declared}, {written} bytes written")]
    LengthMismatch {
        index: usize,
        declared: usize,
        actual: usize,
        written: usize,
    },
    #[error("stream ended after {written} of {expected} bytes without an end marker")]
    MissingChunk { written: usize, expected: usize },
    #[error("chunk {index}: {source}")]
    Codec {
        index: usize,
        written: usize,
        #[source]
        source: CodecError,
    },
}

impl UnpackError {
    /// Output bytes produced before the failure.
    pub fn written(&self) -> usize {
        match *self {
            Self::TruncatedHeader { written, .. }
            | Self::PayloadOverrun { written, .. }
            | Self::DestinationOverrun { written, .. }
            | Self::LengthMismatch { written, .. }
            | Self::MissingChunk { written, .. }
            | Self::Codec { written, .. } => written,
        }
    }
}

// ---------------------------------------------------------------------------
// Chunk iteration
// ---------------------------------------------------------------------------

/// One framed chunk of a container stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Position of the chunk in the stream, starting at 0.
    pub index: usize,
    /// Byte offset of the chunk header in the stream.
    pub offset: usize,
    pub header: ChunkHeader,
    pub payload: &'a [u8],
    /// Output offset the chunk decodes to.
    pub output_offset: usize,
}

/// Iterator over the chunks of a container stream.
///
/// Ends at the end of the stream or at a terminator header. A partial
/// header or an oversized payload yields one error and ends the iteration.
pub struct ChunkIter<'a> {
    stream: &'a [u8],
    pos: usize,
    index: usize,
    output: usize,
    done: bool,
    terminated: bool,
}

/// Iterate the chunks of `stream` without decoding them.
pub fn chunks(stream: &[u8]) -> ChunkIter<'_> {
    ChunkIter {
        stream,
        pos: 0,
        index: 0,
        output: 0,
        done: false,
        terminated: false,
    }
}

impl ChunkIter<'_> {
    /// Stream bytes consumed so far, including a terminator header.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Whether iteration stopped at a terminator header.
    #[inline]
    pub fn terminated(&self) -> bool {
        self.terminated
    }

    /// Stream bytes not covered by any chunk or terminator.
    #[inline]
    pub fn trailing(&self) -> usize {
        self.stream.len() - self.pos
    }

    /// Declared output bytes of the chunks yielded so far.
    #[inline]
    pub fn output_len(&self) -> usize {
        self.output
    }
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = Result<Chunk<'a>, UnpackError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos == self.stream.len() {
            self.done = true;
            return None;
        }

        let rest = &self.stream[self.pos..];
        let Some(header) = ChunkHeader::parse(rest) else {
            self.done = true;
            return Some(Err(UnpackError::TruncatedHeader {
                index: self.index,
                offset: self.pos,
                available: rest.len(),
                written: self.output,
            }));
        };

        if header.is_terminator() {
            self.done = true;
            self.terminated = true;
            self.pos += CHUNK_HEADER_LEN;
            return None;
        }

        let body = &rest[CHUNK_HEADER_LEN..];
        if header.compressed_len() > body.len() {
            self.done = true;
            return Some(Err(UnpackError::PayloadOverrun {
                index: self.index,
                offset: self.pos,
                declared: header.compressed_len(),
                available: body.len(),
                written: self.output,
            }));
        }

        let chunk = Chunk {
            index: self.index,
            offset: self.pos,
            header,
            payload: &body[..header.compressed_len()],
            output_offset: self.output,
        };
        self.pos += CHUNK_HEADER_LEN + header.compressed_len();
        self.index += 1;
        self.output += header.uncompressed_len();
        Some(Ok(chunk))
    }
}

// ---------------------------------------------------------------------------
// Unpacking
// ---------------------------------------------------------------------------

/// Unpack `stream` into `dst`, returning the number of bytes written.
///
/// Succeeds when `dst` is full or a terminator header is reached, so the
/// result may be shorter than `dst` for an intentionally short container.
pub fn unpack_into(
    stream: &[u8],
    dst: &mut [u8],
    codec: &dyn BlockCodec,
) -> Result<usize, UnpackError> {
    let mut iter = chunks(stream);
    let mut written = 0usize;

    while written < dst.len() {
        let chunk = match iter.next() {
            Some(chunk) => chunk?,
            None if iter.terminated() => break,
            None => {
                return Err(UnpackError::MissingChunk {
                    written,
                    expected: dst.len(),
                });
            }
        };

        let declared = chunk.header.uncompressed_len();
        let available = dst.len() - written;
        if declared > available {
            return Err(UnpackError::DestinationOverrun {
                index: chunk.index,
                declared,
                available,
                written,
            });
        }

        let slot = &mut dst[written..written + declared];
        let actual = codec
            .decompress_into(chunk.payload, slot)
            .map_err(|source| UnpackError::Codec {
                index: chunk.index,
                written,
                source,
            })?;
        if actual != declared {
            return Err(UnpackError::LengthMismatch {
                index: chunk.index,
                declared,
                actual,
                written,
            });
        }

        written += declared;
    }

    Ok(written)
}

/// Unpack `stream` into a new buffer of at most `expected_len` bytes.
///
/// The result holds exactly the bytes written.
pub fn unpack(
    stream: &[u8],
    expected_len: usize,
    codec: &dyn BlockCodec,
) -> Result<Vec<u8>, UnpackError> {
    let mut out = vec![0u8; expected_len];
    let written = unpack_into(stream, &mut out, codec)?;
    out.truncate(written);
    Ok(out)
}

/// Unpack with a codec chosen by `CodecKind`.
pub fn unpack_with(
    stream: &[u8],
    expected_len: usize,
    codec: &CodecKind,
) -> Result<Vec<u8>, UnpackError> {
    let backend = codec.backend().map_err(|source| UnpackError::Codec {
        index: 0,
        written: 0,
        source,
    })?;
    unpack(stream, expected_len, backend.as_ref())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
