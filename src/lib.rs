//! lcwpack: the LCW ("Format80") codec and the chunked block container used
//! for packed map sections.
//!
//! The crate provides:
//! - The LCW stream codec with bounds-checked decoding (`lcw`)
//! - A chunked container with pluggable chunk codecs (`container`)
//! - Base64 section-text transcoding (`text` feature)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```no_run
//! use lcwpack::container::{self, CodecKind, PackOptions};
//! use lcwpack::lcw;
//!
//! let tiles = vec![0x41u8; 20_000];
//!
//! let stream = lcw::encode(&tiles);
//! assert_eq!(lcw::decode(&stream, tiles.len()), tiles);
//!
//! let packed = container::pack_with(&tiles, &PackOptions::default()).unwrap();
//! let unpacked = container::unpack_with(&packed, tiles.len(), &CodecKind::Lcw).unwrap();
//! assert_eq!(unpacked, tiles);
//! ```

pub mod container;
pub mod io;
pub mod lcw;

#[cfg(feature = "text")]
pub mod text;

#[cfg(feature = "cli")]
pub mod cli;
