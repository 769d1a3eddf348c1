// LCW addressing modes.
//
// A stream either addresses long back-references from the start of the
// output buffer (absolute) or backwards from the write cursor (relative).
// The mode is fixed per stream: relative streams open with a 0x00 byte.
// Short back-references are always relative to the cursor.

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Leading byte that switches a stream to relative addressing.
pub const MODE_SENTINEL: u8 = 0x00;

/// Largest source the encoder compresses with absolute addressing.
pub const ABSOLUTE_LIMIT: usize = 0xFFFF;

/// How far back a relative-mode encoder searches for matches.
pub const RELATIVE_WINDOW: usize = 0xFFFF;

// ---------------------------------------------------------------------------
// AddressMode
// ---------------------------------------------------------------------------

/// How the offset of a long back-reference maps to a position in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressMode {
    /// Offsets count from the start of the output buffer.
    #[default]
    Absolute,
    /// Offsets count backwards from the current write position.
    Relative,
}

impl AddressMode {
    /// The mode an encoder picks for a source of `len` bytes.
    #[inline]
    pub fn for_source_len(len: usize) -> Self {
        if len > ABSOLUTE_LIMIT {
            Self::Relative
        } else {
            Self::Absolute
        }
    }

    /// Inspect the head of a compressed stream.
    ///
    /// Returns the stream's mode and the number of header bytes to skip
    /// before the first command (1 for the relative sentinel, else 0).
    #[inline]
    pub fn detect(stream: &[u8]) -> (Self, usize) {
        match stream.first() {
            Some(&MODE_SENTINEL) => (Self::Relative, 1),
            _ => (Self::Absolute, 0),
        }
    }

    #[inline]
    pub fn is_relative(self) -> bool {
        self == Self::Relative
    }

    /// Output index a long back-reference reads from.
    ///
    /// `cursor` is the current write position. Returns `None` when a
    /// relative offset would reach before the start of the buffer.
    #[inline]
    pub fn resolve(self, cursor: usize, offset: usize) -> Option<usize> {
        match self {
            Self::Absolute => Some(offset),
            Self::Relative => cursor.checked_sub(offset),
        }
    }

    /// The offset field an encoder writes to reference `source` from `cursor`.
    #[inline]
    pub fn offset_for(self, cursor: usize, source: usize) -> usize {
        match self {
            Self::Absolute => source,
            Self::Relative => cursor - source,
        }
    }

    /// First output index the encoder may reference from `cursor`.
    #[inline]
    pub fn window_start(self, cursor: usize) -> usize {
        match self {
            Self::Absolute => 0,
            Self::Relative => cursor.saturating_sub(RELATIVE_WINDOW),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Absolute => "absolute",
            Self::Relative => "relative",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_switches_above_64k() {
        assert_eq!(AddressMode::for_source_len(0), AddressMode::Absolute);
        assert_eq!(AddressMode::for_source_len(0xFFFF), AddressMode::Absolute);
        assert_eq!(AddressMode::for_source_len(0x10000), AddressMode::Relative);
    }

    #[test]
    fn detect_consumes_sentinel_only_when_present() {
        assert_eq!(AddressMode::detect(&[0x00, 0x81]), (AddressMode::Relative, 1));
        assert_eq!(AddressMode::detect(&[0x81, 0x41]), (AddressMode::Absolute, 0));
        assert_eq!(AddressMode::detect(&[]), (AddressMode::Absolute, 0));
    }

    #[test]
    fn resolve_absolute_ignores_cursor() {
        assert_eq!(AddressMode::Absolute.resolve(10, 3), Some(3));
        assert_eq!(AddressMode::Absolute.resolve(0, 500), Some(500));
    }

    #[test]
    fn resolve_relative_rejects_underflow() {
        assert_eq!(AddressMode::Relative.resolve(10, 3), Some(7));
        assert_eq!(AddressMode::Relative.resolve(10, 10), Some(0));
        assert_eq!(AddressMode::Relative.resolve(10, 11), None);
    }

    #[test]
    fn offset_for_inverts_resolve() {
        for mode in [AddressMode::Absolute, AddressMode::Relative] {
            let off = mode.offset_for(1000, 250);
            assert_eq!(mode.resolve(1000, off), Some(250));
        }
    }

    #[test]
    fn relative_window_trails_cursor() {
        assert_eq!(AddressMode::Relative.window_start(100), 0);
        assert_eq!(AddressMode::Relative.window_start(70_000), 70_000 - 0xFFFF);
        assert_eq!(AddressMode::Absolute.window_start(70_000), 0);
    }
}
