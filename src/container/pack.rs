// Container encoding.
//
// The source is cut into chunks of at most `block_size` bytes. Each chunk is
// compressed on its own and framed by a four-byte header:
//   - chunks are emitted in source order
//   - no terminator is written; the reader knows the output size
//   - an empty source packs to an empty stream

use thiserror::Error;

use super::codec::{BlockCodec, CodecError, CodecKind};
use super::header::{CHUNK_HEADER_LEN, ChunkHeader, DEFAULT_BLOCK_SIZE, MAX_CHUNK_LEN};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for packing a container.
#[derive(Debug, Clone)]
pub struct PackOptions {
    /// Maximum uncompressed bytes per chunk (1..=65535).
    pub block_size: usize,
    /// Codec applied to every chunk.
    pub codec: CodecKind,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            codec: CodecKind::Lcw,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    #[error("block size {0} is outside 1..=65535")]
    InvalidBlockSize(usize),
    #[error("chunk {index} compressed to {len} bytes, more than a header can describe")]
    ChunkTooLarge { index: usize, len: usize },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

// ---------------------------------------------------------------------------
// Packing
// ---------------------------------------------------------------------------

/// Pack `source` into a container using `codec` for every chunk.
pub fn pack(
    source: &[u8],
    codec: &dyn BlockCodec,
    block_size: usize,
) -> Result<Vec<u8>, PackError> {
    check_block_size(block_size)?;

    let mut out = Vec::with_capacity(source.len() / 2 + CHUNK_HEADER_LEN);
    for (index, block) in source.chunks(block_size).enumerate() {
        let payload = codec.compress(block)?;
        append_chunk(&mut out, index, block.len(), &payload)?;
    }
    Ok(out)
}

/// Pack `source` as configured by `opts`.
pub fn pack_with(source: &[u8], opts: &PackOptions) -> Result<Vec<u8>, PackError> {
    let backend = opts.codec.backend()?;
    pack(source, backend.as_ref(), opts.block_size)
}

/// Pack `source` with chunks compressed on the rayon pool.
///
/// The output is identical to [`pack_with`].
#[cfg(feature = "parallel")]
pub fn pack_parallel(source: &[u8], opts: &PackOptions) -> Result<Vec<u8>, PackError> {
    check_block_size(opts.block_size)?;
    let backend = opts.codec.backend()?;
    let codec = backend.as_ref();

    let payloads: Vec<Vec<u8>> = source
        .par_chunks(opts.block_size)
        .map(|block| codec.compress(block))
        .collect::<Result<_, _>>()?;

    let total: usize = payloads.iter().map(|p| p.len() + CHUNK_HEADER_LEN).sum();
    let mut out = Vec::with_capacity(total);
    for (index, (block, payload)) in source
        .chunks(opts.block_size)
        .zip(&payloads)
        .enumerate()
    {
        append_chunk(&mut out, index, block.len(), payload)?;
    }
    Ok(out)
}

fn check_block_size(block_size: usize) -> Result<(), PackError> {
    if block_size == 0 || block_size > MAX_CHUNK_LEN {
        return Err(PackError::InvalidBlockSize(block_size));
    }
    Ok(())
}

fn append_chunk(
    out: &mut Vec<u8>,
    index: usize,
    raw_len: usize,
    payload: &[u8],
) -> Result<(), PackError> {
    let header = ChunkHeader::new(payload.len(), raw_len).ok_or(PackError::ChunkTooLarge {
        index,
        len: payload.len(),
    })?;
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(payload);
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::codec::{LcwCodec, StoreCodec};
    use crate::container::unpack::{chunks, unpack};

    #[test]
    fn empty_source_packs_to_nothing() {
        assert!(pack(&[], &LcwCodec, DEFAULT_BLOCK_SIZE).unwrap().is_empty());
    }

    #[test]
    fn single_chunk_layout() {
        let stream = pack(&[0x41], &LcwCodec, DEFAULT_BLOCK_SIZE).unwrap();
        assert_eq!(stream, vec![3, 0, 1, 0, 0x81, 0x41, 0x80]);
    }

    #[test]
    fn chunks_follow_block_size() {
        let data = vec![7u8; 20_000];
        let stream = pack_with(&data, &PackOptions::default()).unwrap();
        let sizes: Vec<usize> = chunks(&stream)
            .map(|c| c.unwrap().header.uncompressed_len())
            .collect();
        assert_eq!(sizes, vec![8192, 8192, 3616]);
        assert_eq!(unpack(&stream, data.len(), &LcwCodec).unwrap(), data);
    }

    #[test]
    fn stored_payload_equals_source() {
        let stream = pack(b"abcdef", &StoreCodec, 4).unwrap();
        assert_eq!(stream, b"\x04\x00\x04\x00abcd\x02\x00\x02\x00ef");
    }

    #[test]
    fn block_size_bounds() {
        assert_eq!(
            pack(b"x", &LcwCodec, 0),
            Err(PackError::InvalidBlockSize(0))
        );
        assert_eq!(
            pack(b"x", &LcwCodec, 65_536),
            Err(PackError::InvalidBlockSize(65_536))
        );
        assert!(pack(b"x", &LcwCodec, 65_535).is_ok());
    }

    #[test]
    fn oversized_payload_is_rejected() {
        struct Bloat;
        impl BlockCodec for Bloat {
            fn name(&self) -> &'static str {
                "bloat"
            }
            fn compress(&self, _block: &[u8]) -> Result<Vec<u8>, CodecError> {
                Ok(vec![0; MAX_CHUNK_LEN + 1])
            }
            fn decompress_into(&self, _payload: &[u8], _dst: &mut [u8]) -> Result<usize, CodecError> {
                Ok(0)
            }
        }
        assert_eq!(
            pack(b"abc", &Bloat, 16),
            Err(PackError::ChunkTooLarge {
                index: 0,
                len: MAX_CHUNK_LEN + 1
            })
        );
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_matches_sequential() {
        let data: Vec<u8> = (0..100_000u32).map(|i| (i / 7 % 251) as u8).collect();
        let opts = PackOptions {
            block_size: 4096,
            ..PackOptions::default()
        };
        assert_eq!(
            pack_parallel(&data, &opts).unwrap(),
            pack_with(&data, &opts).unwrap()
        );
    }
}
