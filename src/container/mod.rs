// Chunked block container.
//
// Splits a payload into independently compressed chunks, each framed by a
// little-endian length header. Chunk payloads are produced by a pluggable
// `BlockCodec` (LCW by default).
//
// # Modules
//
// - `header`: Four-byte chunk framing
// - `codec`:  Codec trait, built-in codecs, `CodecKind` selection
// - `pack`:   Chunking and framing, optional rayon fan-out
// - `unpack`: Chunk iteration and validated decoding

pub mod codec;
pub mod header;
pub mod pack;
pub mod unpack;

pub use codec::{BlockCodec, CodecError, CodecKind, LcwCodec, StoreCodec};
#[cfg(feature = "lzo")]
pub use codec::LzoCodec;
pub use header::{CHUNK_HEADER_LEN, ChunkHeader, DEFAULT_BLOCK_SIZE, MAX_CHUNK_LEN};
#[cfg(feature = "parallel")]
pub use pack::pack_parallel;
pub use pack::{PackError, PackOptions, pack, pack_with};
pub use unpack::{Chunk, ChunkIter, UnpackError, chunks, unpack, unpack_into, unpack_with};
