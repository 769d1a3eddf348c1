// LCW decoder.
//
// Executes commands into a caller-sized output buffer. Both addressing modes
// share one loop; only long copies consult the mode. Every copy is clamped to
// the room left in the output, and a command that would read outside the
// output ends decoding instead of touching memory it does not own.
//
// Malformed input is not an error here: decoding stops and reports how much
// was written. `decode_exact` is the strict wrapper for callers that know
// the expected size.

use thiserror::Error;

use super::address::AddressMode;
use super::command::{Command, CommandIter};

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Why decoding stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The terminator command was read.
    Terminator,
    /// The output buffer is full.
    OutputFull,
    /// The input ended between commands without a terminator.
    InputExhausted,
    /// The input ended inside a command.
    Truncated,
    /// A copy referenced bytes outside the output buffer.
    BadReference,
}

impl StopReason {
    /// Whether the stream was well-formed up to the stop point.
    pub fn is_clean(self) -> bool {
        matches!(self, Self::Terminator | Self::OutputFull)
    }
}

/// Outcome of `decode_detailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeReport {
    /// Output bytes written.
    pub written: usize,
    /// Input bytes consumed, including the mode sentinel.
    pub consumed: usize,
    /// Addressing mode of the stream.
    pub mode: AddressMode,
    /// Why decoding stopped.
    pub stop: StopReason,
}

/// Strict-decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("decoded {written} of {expected} bytes ({stop:?})")]
    ShortOutput {
        expected: usize,
        written: usize,
        stop: StopReason,
    },
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode `stream` into `dst`, returning the number of bytes written.
///
/// Never writes past `dst.len()`.
pub fn decode_into(stream: &[u8], dst: &mut [u8]) -> usize {
    decode_detailed(stream, dst).written
}

/// Decode `stream` into a new buffer of at most `capacity` bytes.
///
/// The result holds exactly the bytes written, which may be fewer than
/// `capacity` when the stream ends early or is malformed.
pub fn decode(stream: &[u8], capacity: usize) -> Vec<u8> {
    let mut out = vec![0u8; capacity];
    let written = decode_into(stream, &mut out);
    out.truncate(written);
    out
}

/// Decode `stream`, requiring exactly `expected_len` output bytes.
pub fn decode_exact(stream: &[u8], expected_len: usize) -> Result<Vec<u8>, DecodeError> {
    let mut out = vec![0u8; expected_len];
    let report = decode_detailed(stream, &mut out);
    if report.written != expected_len {
        return Err(DecodeError::ShortOutput {
            expected: expected_len,
            written: report.written,
            stop: report.stop,
        });
    }
    Ok(out)
}

/// Decode `stream` into `dst` and report how and where decoding stopped.
pub fn decode_detailed(stream: &[u8], dst: &mut [u8]) -> DecodeReport {
    let (mode, header_len) = AddressMode::detect(stream);
    let mut commands = CommandIter::new(&stream[header_len..]);
    let mut written = 0usize;

    let stop = loop {
        if written == dst.len() {
            break StopReason::OutputFull;
        }
        let cmd = match commands.next() {
            Some(Ok(cmd)) => cmd,
            Some(Err(_)) => break StopReason::Truncated,
            None => break StopReason::InputExhausted,
        };
        let room = dst.len() - written;

        match cmd {
            Command::End => break StopReason::Terminator,
            Command::Literal(bytes) => {
                let n = bytes.len().min(room);
                dst[written..written + n].copy_from_slice(&bytes[..n]);
                written += n;
            }
            Command::Fill { len, value } => {
                let n = len.min(room);
                dst[written..written + n].fill(value);
                written += n;
            }
            Command::ShortCopy { len, distance } => {
                let Some(source) = written.checked_sub(distance) else {
                    break StopReason::BadReference;
                };
                let n = len.min(room);
                if !copy_match(dst, written, source, n) {
                    break StopReason::BadReference;
                }
                written += n;
            }
            Command::LongCopy { len, offset } => {
                let Some(source) = mode.resolve(written, offset) else {
                    break StopReason::BadReference;
                };
                let n = len.min(room);
                if !copy_match(dst, written, source, n) {
                    break StopReason::BadReference;
                }
                written += n;
            }
        }
    };

    DecodeReport {
        written,
        consumed: header_len + commands.position(),
        mode,
        stop,
    }
}

/// Copy `len` bytes from `source` to `cursor` within `dst`.
///
/// Overlapping copies run front to back so a short distance repeats a
/// pattern. Returns false, copying nothing, if the source range leaves `dst`.
fn copy_match(dst: &mut [u8], cursor: usize, source: usize, len: usize) -> bool {
    match source.checked_add(len) {
        Some(end) if end <= dst.len() => {}
        _ => return false,
    }
    if source + len <= cursor {
        dst.copy_within(source..source + len, cursor);
    } else {
        for i in 0..len {
            dst[cursor + i] = dst[source + i];
        }
    }
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
