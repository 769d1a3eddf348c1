// Text transcoding for packed sections.
//
// Packed map sections are stored in INI-style text files as Base64, split
// into numbered lines of at most 70 characters:
//
//   1=BQAIAIFBgP...
//   2=...
//
// Decoding tolerates whitespace, missing padding and keys given out of
// order; lines are joined in numeric key order.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use thiserror::Error;

use crate::container::{self, CodecKind, PackError, PackOptions, UnpackError};

/// Maximum characters per Base64 line.
pub const LINE_WIDTH: usize = 70;

const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TextError {
    #[error("malformed Base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("line {line}: expected `<number>=<data>`")]
    MalformedLine { line: usize },
    #[error("key {0} appears more than once")]
    DuplicateKey(u32),
    #[error(transparent)]
    Pack(#[from] PackError),
    #[error(transparent)]
    Unpack(#[from] UnpackError),
}

// ---------------------------------------------------------------------------
// Base64 lines
// ---------------------------------------------------------------------------

/// Encode `bytes` as Base64 split into lines of at most [`LINE_WIDTH`].
pub fn encode_lines(bytes: &[u8]) -> Vec<String> {
    let encoded = BASE64.encode(bytes);
    // Base64 output is ASCII, so byte chunks are char boundaries.
    let lines: Vec<String> = encoded
        .as_bytes()
        .chunks(LINE_WIDTH)
        .map(|c| String::from_utf8_lossy(c).into_owned())
        .collect();
    log::trace!("encoded {} bytes into {} lines", bytes.len(), lines.len());
    lines
}

/// Decode Base64 split across `lines`, ignoring all whitespace.
pub fn decode_lines<I, S>(lines: I) -> Result<Vec<u8>, TextError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    let mut count = 0usize;
    for line in lines {
        joined.extend(line.as_ref().chars().filter(|c| !c.is_ascii_whitespace()));
        count += 1;
    }
    let bytes = BASE64.decode(joined.as_bytes())?;
    log::trace!("decoded {count} lines into {} bytes", bytes.len());
    Ok(bytes)
}

// ---------------------------------------------------------------------------
// Numbered section bodies
// ---------------------------------------------------------------------------

/// Render Base64 lines as a section body of `N=line` entries, numbered from 1.
pub fn to_section_body(lines: &[String]) -> String {
    let mut body = String::new();
    for (i, line) in lines.iter().enumerate() {
        body.push_str(&format!("{}={line}\n", i + 1));
    }
    body
}

/// Collect the values of a section body in numeric key order.
///
/// Blank lines and `;` comments are skipped.
pub fn from_section_body(body: &str) -> Result<Vec<String>, TextError> {
    let mut entries: Vec<(u32, &str)> = Vec::new();
    for (i, raw) in body.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or(TextError::MalformedLine { line: i + 1 })?;
        let key: u32 = key
            .trim()
            .parse()
            .map_err(|_| TextError::MalformedLine { line: i + 1 })?;
        entries.push((key, value.trim()));
    }

    entries.sort_by_key(|&(key, _)| key);
    if let Some(w) = entries.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(TextError::DuplicateKey(w[0].0));
    }
    Ok(entries.into_iter().map(|(_, v)| v.to_owned()).collect())
}

// ---------------------------------------------------------------------------
// Whole sections
// ---------------------------------------------------------------------------

/// Pack `source` and render it as a numbered Base64 section body.
pub fn encode_section(source: &[u8], opts: &PackOptions) -> Result<String, TextError> {
    let stream = container::pack_with(source, opts)?;
    Ok(to_section_body(&encode_lines(&stream)))
}

/// Parse a numbered Base64 section body and unpack it.
pub fn decode_section(
    body: &str,
    expected_len: usize,
    codec: &CodecKind,
) -> Result<Vec<u8>, TextError> {
    let lines = from_section_body(body)?;
    let stream = decode_lines(&lines)?;
    Ok(container::unpack_with(&stream, expected_len, codec)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
