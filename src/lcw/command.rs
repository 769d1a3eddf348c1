// LCW command grammar.
//
// Every command starts with a flag byte:
//
//   0xxxxxxx yyyyyyyy            short copy: len 3..=10, distance 0..=4095
//   10nnnnnn <n literal bytes>   literal run: 1..=63 bytes (0x80 = end)
//   11nnnnnn <u16 offset>        long copy: len 3..=64 (flag < 0xFE)
//   0xFE <u16 len> <byte>        fill run
//   0xFF <u16 len> <u16 offset>  wide long copy
//
// Multi-byte fields are little-endian. Long-copy offsets are interpreted
// through the stream's `AddressMode`.

use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Terminator command.
pub const CMD_END: u8 = 0x80;
/// Fill-run command.
pub const CMD_FILL: u8 = 0xFE;
/// Wide long-copy command.
pub const CMD_WIDE_COPY: u8 = 0xFF;

/// Flag bits of a literal run.
pub const LITERAL_FLAG: u8 = 0x80;
/// Flag bits of a long copy.
pub const LONG_COPY_FLAG: u8 = 0xC0;
/// Mask of the 6-bit count field in literal and long-copy flags.
pub const COUNT_MASK: u8 = 0x3F;

/// Most bytes one literal-run command can carry.
pub const MAX_LITERAL: usize = 0x3F;
/// Shortest copy any copy command expresses.
pub const MIN_COPY: usize = 3;
/// Longest copy the short form can express.
pub const MAX_SHORT_COPY: usize = 10;
/// Largest distance the short form can express.
pub const MAX_SHORT_DISTANCE: usize = 0xFFF;
/// Longest copy the non-wide long form can express.
pub const MAX_LONG_COPY: usize = 64;
/// Largest length or offset a 16-bit field can hold.
pub const MAX_FIELD: usize = 0xFFFF;

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// One decoded (or to-be-encoded) LCW command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Copy these bytes to the output verbatim.
    Literal(&'a [u8]),
    /// Copy `len` bytes from `distance` bytes behind the cursor.
    ShortCopy { len: usize, distance: usize },
    /// Copy `len` bytes from `offset`, resolved by the stream's address mode.
    LongCopy { len: usize, offset: usize },
    /// Write `len` copies of `value`.
    Fill { len: usize, value: u8 },
    /// Stop decoding.
    End,
}

impl Command<'_> {
    /// Number of output bytes this command produces (before clamping).
    pub fn output_len(&self) -> usize {
        match *self {
            Self::Literal(bytes) => bytes.len(),
            Self::ShortCopy { len, .. } | Self::LongCopy { len, .. } | Self::Fill { len, .. } => {
                len
            }
            Self::End => 0,
        }
    }

    /// Number of stream bytes `write_to` emits for this command.
    pub fn encoded_len(&self) -> usize {
        match *self {
            Self::Literal(bytes) => 1 + bytes.len(),
            Self::ShortCopy { .. } => 2,
            Self::LongCopy { len, .. } if len > MAX_LONG_COPY => 5,
            Self::LongCopy { .. } => 3,
            Self::Fill { .. } => 4,
            Self::End => 1,
        }
    }

    /// Append this command's encoding to `out`.
    ///
    /// Long copies longer than 64 bytes use the wide form. Field ranges are
    /// the caller's responsibility; the encoder never exceeds them.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        match *self {
            Self::Literal(bytes) => {
                debug_assert!(!bytes.is_empty() && bytes.len() <= MAX_LITERAL);
                out.push(LITERAL_FLAG | bytes.len() as u8);
                out.extend_from_slice(bytes);
            }
            Self::ShortCopy { len, distance } => {
                debug_assert!((MIN_COPY..=MAX_SHORT_COPY).contains(&len));
                debug_assert!(distance <= MAX_SHORT_DISTANCE);
                out.push((((len - MIN_COPY) as u8) << 4) | (distance >> 8) as u8);
                out.push(distance as u8);
            }
            Self::LongCopy { len, offset } => {
                debug_assert!(len >= MIN_COPY && len <= MAX_FIELD && offset <= MAX_FIELD);
                if len > MAX_LONG_COPY {
                    out.push(CMD_WIDE_COPY);
                    out.extend_from_slice(&(len as u16).to_le_bytes());
                } else {
                    out.push(LONG_COPY_FLAG | (len - MIN_COPY) as u8);
                }
                out.extend_from_slice(&(offset as u16).to_le_bytes());
            }
            Self::Fill { len, value } => {
                debug_assert!(len <= MAX_FIELD);
                out.push(CMD_FILL);
                out.extend_from_slice(&(len as u16).to_le_bytes());
                out.push(value);
            }
            Self::End => out.push(CMD_END),
        }
    }
}

impl fmt::Display for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Literal(bytes) => write!(f, "LITERAL len={}", bytes.len()),
            Self::ShortCopy { len, distance } => {
                write!(f, "COPY    len={len} distance={distance}")
            }
            Self::LongCopy { len, offset } if len > MAX_LONG_COPY => {
                write!(f, "COPY/W  len={len} offset={offset}")
            }
            Self::LongCopy { len, offset } => write!(f, "COPY/L  len={len} offset={offset}"),
            Self::Fill { len, value } => write!(f, "FILL    len={len} value={value:#04X}"),
            Self::End => write!(f, "END"),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// A command that could not be read in full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("truncated {kind} command at offset {offset}")]
    Truncated { kind: &'static str, offset: usize },
}

/// Iterator over the commands of a stream body (the part after the
/// optional mode sentinel).
///
/// Yields `Ok(Command::End)` for the terminator and then stops. A command
/// cut short by the end of input yields one `Err` and then stops. Input
/// that runs out exactly between commands simply ends the iteration.
pub struct CommandIter<'a> {
    data: &'a [u8],
    pos: usize,
    done: bool,
    terminated: bool,
}

impl<'a> CommandIter<'a> {
    pub fn new(body: &'a [u8]) -> Self {
        Self {
            data: body,
            pos: 0,
            done: false,
            terminated: false,
        }
    }

    /// Bytes of the body consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Whether the terminator command has been read.
    #[inline]
    pub fn terminated(&self) -> bool {
        self.terminated
    }

    fn byte(&mut self) -> Option<u8> {
        let b = *self.data.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn word(&mut self) -> Option<usize> {
        let bytes = self.data.get(self.pos..self.pos + 2)?;
        self.pos += 2;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]) as usize)
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let bytes = self.data.get(self.pos..self.pos + n)?;
        self.pos += n;
        Some(bytes)
    }

    fn parse(&mut self, flag: u8) -> Option<Command<'a>> {
        let cmd = match flag {
            CMD_END => Command::End,
            f if f & 0x80 == 0 => {
                let low = self.byte()? as usize;
                Command::ShortCopy {
                    len: (f >> 4) as usize + MIN_COPY,
                    distance: ((f as usize & 0x0F) << 8) | low,
                }
            }
            f if f & 0x40 == 0 => Command::Literal(self.take((f & COUNT_MASK) as usize)?),
            CMD_FILL => {
                let len = self.word()?;
                let value = self.byte()?;
                Command::Fill { len, value }
            }
            CMD_WIDE_COPY => {
                let len = self.word()?;
                let offset = self.word()?;
                Command::LongCopy { len, offset }
            }
            f => Command::LongCopy {
                len: (f & COUNT_MASK) as usize + MIN_COPY,
                offset: self.word()?,
            },
        };
        Some(cmd)
    }
}

impl<'a> Iterator for CommandIter<'a> {
    type Item = Result<Command<'a>, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let start = self.pos;
        let Some(flag) = self.byte() else {
            self.done = true;
            return None;
        };
        match self.parse(flag) {
            Some(cmd) => {
                if cmd == Command::End {
                    self.done = true;
                    self.terminated = true;
                }
                Some(Ok(cmd))
            }
            None => {
                self.done = true;
                self.pos = self.data.len();
                Some(Err(StreamError::Truncated {
                    kind: kind_of(flag),
                    offset: start,
                }))
            }
        }
    }
}

fn kind_of(flag: u8) -> &'static str {
    match flag {
        CMD_FILL => "fill",
        CMD_WIDE_COPY => "wide copy",
        f if f & 0x80 == 0 => "short copy",
        f if f & 0x40 == 0 => "literal",
        _ => "long copy",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
