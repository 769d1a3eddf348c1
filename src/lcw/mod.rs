// LCW ("Format80") compression.
//
// The LZ-style codec used for map sections. Streams are self-terminating and
// carry no length; the caller supplies the output size when decoding.
//
// # Modules
//
// - `address`: Absolute/relative addressing and back-reference resolution
// - `command`: Command grammar: flag layout, encoding, parsing
// - `decoder`: Bounds-checked command execution
// - `encoder`: Greedy encoder matching existing assets byte for byte

pub mod address;
pub mod command;
pub mod decoder;
pub mod encoder;

pub use address::AddressMode;
pub use command::{Command, CommandIter, StreamError};
pub use decoder::{
    DecodeError, DecodeReport, StopReason, decode, decode_detailed, decode_exact, decode_into,
};
pub use encoder::{encode, encode_into, worst_case_len};
