// LCW encoder.
//
// A greedy single pass that must reproduce existing assets byte for byte:
//
//   1. The first byte always opens a literal run.
//   2. A run of at least 65 equal bytes becomes a fill command. The run is
//      only probed when the byte 64 positions ahead matches.
//   3. Otherwise the longest earlier match wins; among equally long matches
//      the one nearest the cursor wins.
//   4. Matches of 1-2 bytes are folded into the pending literal run.
//   5. Longer matches become short copies when they fit (len <= 10,
//      distance <= 4095), else long copies (wide form above 64 bytes).
//
// Candidate positions are kept in one list per byte value, so only
// positions starting with the right byte are compared. Walking a list from
// the newest entry and replacing the best only on a strictly longer match
// picks the same position as a forward scan that replaces on ties, and lets
// a candidate be skipped as soon as it differs at the current best length.

use super::address::{AddressMode, MODE_SENTINEL};
use super::command::{
    CMD_END, COUNT_MASK, Command, LITERAL_FLAG, MAX_FIELD, MAX_LITERAL, MAX_SHORT_COPY,
    MAX_SHORT_DISTANCE,
};

/// Distance of the byte probed before scanning for a fill run.
const FILL_PROBE: usize = 64;
/// Shortest run emitted as a fill command.
const MIN_FILL: usize = 65;
/// Matches this short are cheaper as literals.
const MAX_LITERAL_MATCH: usize = 2;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Upper bound on the size of `encode(source)` for a source of `len` bytes.
pub fn worst_case_len(len: usize) -> usize {
    // sentinel + one flag per 63 literals + terminator
    len + len.div_ceil(MAX_LITERAL) + 2
}

/// Compress `source` into a new LCW stream.
pub fn encode(source: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(worst_case_len(source.len()));
    encode_into(source, &mut out);
    out
}

/// Compress `source`, appending the stream to `out`.
///
/// An empty source produces only the terminator.
pub fn encode_into(source: &[u8], out: &mut Vec<u8>) {
    if source.is_empty() {
        out.push(CMD_END);
        return;
    }

    let mode = AddressMode::for_source_len(source.len());
    if mode.is_relative() {
        out.push(MODE_SENTINEL);
    }

    let mut emit = Emitter::new(out);
    let mut finder = MatchFinder::new(source, mode);

    emit.literal(source[0]);
    let mut pos = 1usize;

    while pos < source.len() {
        if let Some(len) = fill_run_at(source, pos) {
            emit.command(Command::Fill {
                len,
                value: source[pos],
            });
            pos += len;
            continue;
        }

        let (len, at) = finder.longest_match(pos);
        if len <= MAX_LITERAL_MATCH {
            emit.literal(source[pos]);
            pos += 1;
            continue;
        }

        let distance = pos - at;
        let cmd = if len > MAX_SHORT_COPY || distance > MAX_SHORT_DISTANCE {
            Command::LongCopy {
                len,
                offset: mode.offset_for(pos, at),
            }
        } else {
            Command::ShortCopy { len, distance }
        };
        emit.command(cmd);
        pos += len;
    }

    emit.command(Command::End);
}

// ---------------------------------------------------------------------------
// Fill detection
// ---------------------------------------------------------------------------

/// Length of the fill run starting at `pos`, if one should be emitted.
fn fill_run_at(source: &[u8], pos: usize) -> Option<usize> {
    let rest = &source[pos..];
    if rest.len() <= FILL_PROBE || rest[FILL_PROBE] != rest[0] {
        return None;
    }
    let limit = rest.len().min(MAX_FIELD);
    let run = 1 + rest[1..limit].iter().take_while(|&&b| b == rest[0]).count();
    (run >= MIN_FILL).then_some(run)
}

// ---------------------------------------------------------------------------
// Match search
// ---------------------------------------------------------------------------

struct MatchFinder<'a> {
    source: &'a [u8],
    mode: AddressMode,
    /// Positions below `indexed`, bucketed by the byte found there.
    buckets: Vec<Vec<u32>>,
    indexed: usize,
}

impl<'a> MatchFinder<'a> {
    fn new(source: &'a [u8], mode: AddressMode) -> Self {
        Self {
            source,
            mode,
            buckets: vec![Vec::new(); 256],
            indexed: 0,
        }
    }

    /// Longest match for `pos` among earlier positions in the window.
    ///
    /// Returns `(len, position)`; `len` is 0 when no earlier byte matches.
    fn longest_match(&mut self, pos: usize) -> (usize, usize) {
        while self.indexed < pos {
            let b = self.source[self.indexed];
            self.buckets[b as usize].push(self.indexed as u32);
            self.indexed += 1;
        }

        let src = self.source;
        let max_len = (src.len() - pos).min(MAX_FIELD);
        let floor = self.mode.window_start(pos);
        let mut best_len = 0usize;
        let mut best_at = 0usize;

        for &cand in self.buckets[src[pos] as usize].iter().rev() {
            let cand = cand as usize;
            if cand < floor {
                break;
            }
            // Only a candidate that also matches the byte at `best_len` can
            // be strictly longer.
            if best_len > 0 && src[cand + best_len] != src[pos + best_len] {
                continue;
            }
            let len = 1 + src[cand + 1..]
                .iter()
                .zip(&src[pos + 1..pos + max_len])
                .take_while(|(a, b)| a == b)
                .count();
            if len > best_len {
                best_len = len;
                best_at = cand;
                if len == max_len {
                    break;
                }
            }
        }

        (best_len, best_at)
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Writes commands, growing the open literal run in place.
struct Emitter<'o> {
    out: &'o mut Vec<u8>,
    /// Index of the open literal run's flag byte.
    literal_at: Option<usize>,
}

impl<'o> Emitter<'o> {
    fn new(out: &'o mut Vec<u8>) -> Self {
        Self {
            out,
            literal_at: None,
        }
    }

    fn literal(&mut self, byte: u8) {
        match self.literal_at {
            Some(at) if ((self.out[at] & COUNT_MASK) as usize) < MAX_LITERAL => {
                self.out[at] += 1;
            }
            _ => {
                self.literal_at = Some(self.out.len());
                self.out.push(LITERAL_FLAG | 1);
            }
        }
        self.out.push(byte);
    }

    /// Emit a non-literal command, closing any open literal run.
    fn command(&mut self, cmd: Command<'_>) {
        self.literal_at = None;
        cmd.write_to(self.out);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
