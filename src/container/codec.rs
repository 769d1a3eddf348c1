// Pluggable chunk codecs.
//
// The container frames chunks but never looks inside them. A `BlockCodec`
// turns one chunk into a payload and back:
//   - `LcwCodec`:   LCW / Format80 (the default)
//   - `LzoCodec`:   LZO1X via lzokay (feature-gated `lzo`)
//   - `StoreCodec`: payload is the chunk itself, for tests and inspection
//   - custom codecs through the trait

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::lcw;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("{codec} compression failed: {reason}")]
    Compress { codec: &'static str, reason: String },
    #[error("{codec} decompression failed: {reason}")]
    Decompress { codec: &'static str, reason: String },
    #[error("{0} support is not compiled in")]
    Unavailable(&'static str),
}

// ---------------------------------------------------------------------------
// BlockCodec trait
// ---------------------------------------------------------------------------

/// Compresses and decompresses individual container chunks.
///
/// # Implementing a custom codec
///
/// ```no_run
/// use lcwpack::container::codec::{BlockCodec, CodecError};
///
/// struct Reverse;
///
/// impl BlockCodec for Reverse {
///     fn name(&self) -> &'static str { "reverse" }
///     fn compress(&self, block: &[u8]) -> Result<Vec<u8>, CodecError> {
///         Ok(block.iter().rev().copied().collect())
///     }
///     fn decompress_into(&self, payload: &[u8], dst: &mut [u8]) -> Result<usize, CodecError> {
///         let n = payload.len().min(dst.len());
///         for (d, s) in dst.iter_mut().zip(payload.iter().rev()) { *d = *s; }
///         Ok(n)
///     }
/// }
/// ```
pub trait BlockCodec: Send + Sync {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Compress one chunk.
    fn compress(&self, block: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// Decompress `payload` into `dst`, returning the bytes produced.
    ///
    /// `dst` is sized to the chunk's declared length. Implementations must
    /// not write past it.
    fn decompress_into(&self, payload: &[u8], dst: &mut [u8]) -> Result<usize, CodecError>;
}

// ---------------------------------------------------------------------------
// LCW
// ---------------------------------------------------------------------------

/// The LCW / Format80 codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct LcwCodec;

impl BlockCodec for LcwCodec {
    fn name(&self) -> &'static str {
        "lcw"
    }

    fn compress(&self, block: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(lcw::encode(block))
    }

    fn decompress_into(&self, payload: &[u8], dst: &mut [u8]) -> Result<usize, CodecError> {
        Ok(lcw::decode_into(payload, dst))
    }
}

// ---------------------------------------------------------------------------
// LZO
// ---------------------------------------------------------------------------

/// LZO1X, the generic LZ77-family alternative.
#[cfg(feature = "lzo")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LzoCodec;

#[cfg(feature = "lzo")]
impl BlockCodec for LzoCodec {
    fn name(&self) -> &'static str {
        "lzo"
    }

    fn compress(&self, block: &[u8]) -> Result<Vec<u8>, CodecError> {
        lzokay::compress::compress(block).map_err(|e| CodecError::Compress {
            codec: "lzo",
            reason: format!("{e:?}"),
        })
    }

    fn decompress_into(&self, payload: &[u8], dst: &mut [u8]) -> Result<usize, CodecError> {
        lzokay::decompress::decompress(payload, dst).map_err(|e| CodecError::Decompress {
            codec: "lzo",
            reason: format!("{e:?}"),
        })
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Identity codec: the payload is the raw chunk.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreCodec;

impl BlockCodec for StoreCodec {
    fn name(&self) -> &'static str {
        "store"
    }

    fn compress(&self, block: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(block.to_vec())
    }

    fn decompress_into(&self, payload: &[u8], dst: &mut [u8]) -> Result<usize, CodecError> {
        let n = payload.len().min(dst.len());
        dst[..n].copy_from_slice(&payload[..n]);
        Ok(n)
    }
}

// ---------------------------------------------------------------------------
// Codec selection
// ---------------------------------------------------------------------------

/// Which codec the container uses for its chunks.
#[derive(Clone, Default)]
pub enum CodecKind {
    /// LCW / Format80.
    #[default]
    Lcw,
    /// LZO1X. Decoding or encoding fails with `CodecError::Unavailable`
    /// when the `lzo` feature is off.
    Lzo,
    /// No compression.
    Store,
    /// A caller-provided codec.
    Custom(Arc<dyn BlockCodec>),
}

impl fmt::Debug for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lcw => write!(f, "Lcw"),
            Self::Lzo => write!(f, "Lzo"),
            Self::Store => write!(f, "Store"),
            Self::Custom(c) => write!(f, "Custom({})", c.name()),
        }
    }
}

impl CodecKind {
    /// LCW, or the alternate LZ codec when `use_alternate` is set.
    pub fn select(use_alternate: bool) -> Self {
        if use_alternate { Self::Lzo } else { Self::Lcw }
    }

    /// Resolve to a codec implementation.
    pub fn backend(&self) -> Result<Arc<dyn BlockCodec>, CodecError> {
        match self {
            Self::Lcw => Ok(Arc::new(LcwCodec)),
            #[cfg(feature = "lzo")]
            Self::Lzo => Ok(Arc::new(LzoCodec)),
            #[cfg(not(feature = "lzo"))]
            Self::Lzo => Err(CodecError::Unavailable("LZO (feature `lzo`)")),
            Self::Store => Ok(Arc::new(StoreCodec)),
            Self::Custom(c) => Ok(Arc::clone(c)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Lcw => "lcw",
            Self::Lzo => "lzo",
            Self::Store => "store",
            Self::Custom(c) => c.name(),
        }
    }

    /// Parse a codec name as used on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "lcw" | "format80" => Some(Self::Lcw),
            "lzo" => Some(Self::Lzo),
            "store" | "none" => Some(Self::Store),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
