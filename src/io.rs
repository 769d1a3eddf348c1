// File-level helpers for packing and unpacking containers.
//
// Provides `pack_file()` and `unpack_file()`, which read the input fully,
// run the container codec and write the result through a `BufWriter`.
// Optionally computes a SHA-256 of the raw payload (feature-gated behind
// `file-io`) so the two directions can be cross-checked.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;
use thiserror::Error;

use crate::container::{self, CodecKind, PackError, PackOptions, UnpackError};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `pack_file()`.
#[derive(Debug, Clone)]
pub struct PackStats {
    /// Raw input size in bytes.
    pub input_size: u64,
    /// Container size in bytes.
    pub output_size: u64,
    /// Number of chunks written.
    pub chunks: u64,
    /// Codec used for the chunks.
    pub codec: &'static str,
    /// SHA-256 of the raw input (if `file-io` feature is enabled).
    pub raw_sha256: Option<[u8; 32]>,
}

/// Statistics returned by `unpack_file()`.
#[derive(Debug, Clone)]
pub struct UnpackStats {
    /// Container size in bytes.
    pub input_size: u64,
    /// Unpacked output size in bytes.
    pub output_size: u64,
    /// Number of chunks decoded.
    pub chunks: u64,
    /// Container bytes left after the last chunk used.
    pub trailing: u64,
    /// SHA-256 of the unpacked output (if `file-io` feature is enabled).
    pub raw_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file operations.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("pack error: {0}")]
    Pack(#[from] PackError),
    #[error("unpack error: {0}")]
    Unpack(#[from] UnpackError),
}

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// pack_file
// ---------------------------------------------------------------------------

/// Pack `input_path` into a container written to `output_path`.
pub fn pack_file(
    input_path: &Path,
    output_path: &Path,
    opts: &PackOptions,
) -> Result<PackStats, IoError> {
    let raw = fs::read(input_path)?;
    log::debug!(
        "packing {} ({} bytes, codec {}, block size {})",
        input_path.display(),
        raw.len(),
        opts.codec.name(),
        opts.block_size
    );

    let stream = pack_bytes(&raw, opts)?;
    write_all_buffered(output_path, &stream)?;

    let stats = PackStats {
        input_size: raw.len() as u64,
        output_size: stream.len() as u64,
        chunks: raw.len().div_ceil(opts.block_size) as u64,
        codec: opts.codec.name(),
        raw_sha256: sha256(&raw),
    };
    log::info!(
        "packed {} bytes into {} bytes ({} chunks)",
        stats.input_size,
        stats.output_size,
        stats.chunks
    );
    Ok(stats)
}

#[cfg(feature = "parallel")]
fn pack_bytes(raw: &[u8], opts: &PackOptions) -> Result<Vec<u8>, PackError> {
    container::pack_parallel(raw, opts)
}

#[cfg(not(feature = "parallel"))]
fn pack_bytes(raw: &[u8], opts: &PackOptions) -> Result<Vec<u8>, PackError> {
    container::pack_with(raw, opts)
}

// ---------------------------------------------------------------------------
// unpack_file
// ---------------------------------------------------------------------------

/// Unpack the container in `input_path` to `output_path`.
///
/// `expected_len` is the raw size; the container does not record it.
pub fn unpack_file(
    input_path: &Path,
    output_path: &Path,
    expected_len: usize,
    codec: &CodecKind,
) -> Result<UnpackStats, IoError> {
    let stream = fs::read(input_path)?;
    log::debug!(
        "unpacking {} ({} bytes, codec {}, expecting {} bytes)",
        input_path.display(),
        stream.len(),
        codec.name(),
        expected_len
    );

    let raw = container::unpack_with(&stream, expected_len, codec)?;
    if raw.len() < expected_len {
        log::warn!(
            "container ended after {} of {} bytes",
            raw.len(),
            expected_len
        );
    }

    let (chunks, consumed) = chunks_covering(&stream, raw.len());
    let trailing = stream.len() - consumed;
    if trailing > 0 {
        log::warn!("{trailing} trailing bytes after the last chunk");
    }

    write_all_buffered(output_path, &raw)?;

    let stats = UnpackStats {
        input_size: stream.len() as u64,
        output_size: raw.len() as u64,
        chunks,
        trailing: trailing as u64,
        raw_sha256: sha256(&raw),
    };
    log::info!(
        "unpacked {} chunks into {} bytes",
        stats.chunks,
        stats.output_size
    );
    Ok(stats)
}

/// Chunks that produced the first `produced` output bytes, and the stream
/// bytes they (plus a terminator, if one follows) occupy.
fn chunks_covering(stream: &[u8], produced: usize) -> (u64, usize) {
    let mut iter = container::chunks(stream);
    let mut count = 0u64;
    let mut consumed = 0usize;
    while iter.output_len() < produced {
        match iter.next() {
            Some(Ok(chunk)) => {
                count += 1;
                consumed = chunk.offset + container::CHUNK_HEADER_LEN + chunk.payload.len();
            }
            _ => break,
        }
    }
    if iter.output_len() >= produced
        && let Some(h) = container::ChunkHeader::parse(&stream[consumed..])
        && h.is_terminator()
    {
        consumed += container::CHUNK_HEADER_LEN;
    }
    (count, consumed)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn write_all_buffered(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(path)?);
    writer.write_all(bytes)?;
    writer.flush()
}

/// SHA-256 of `bytes` when the `file-io` feature is enabled.
pub fn sha256(bytes: &[u8]) -> Option<[u8; 32]> {
    #[cfg(feature = "file-io")]
    {
        Some(sha2::Sha256::digest(bytes).into())
    }
    #[cfg(not(feature = "file-io"))]
    {
        let _ = bytes;
        None
    }
}

/// Lowercase hex rendering of a digest.
pub fn hex(digest: &[u8]) -> String {
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
