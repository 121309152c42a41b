//! Two-bytes-per-character name encoding.
//!
//! Each character is stored as a filler byte followed by the character byte.
//! With a zero filler this is the big-endian UTF-16 form ImageJ writes for
//! Latin-1 text. Decoding keeps the second byte of each pair, so names written
//! with any filler byte read back the same.

use crate::error::FormatError;

/// Byte placed before each character on encode.
pub const FILLER: u8 = 0x00;

/// Encodes `name` as interleaved filler/character pairs.
///
/// Fails on characters outside U+0000..=U+00FF, which have no single-byte form.
pub fn encode_name(name: &str) -> Result<Vec<u8>, FormatError> {
    let mut out = Vec::with_capacity(name.len() * 2);
    for ch in name.chars() {
        let byte = u8::try_from(u32::from(ch)).map_err(|_| FormatError::UnencodableName(ch))?;
        out.push(FILLER);
        out.push(byte);
    }
    Ok(out)
}

/// Number of characters `name` occupies, as stored in `NAME_LENGTH`.
#[inline]
pub fn name_length(name: &str) -> usize {
    name.chars().count()
}

/// Decodes interleaved pairs by keeping every second byte.
///
/// A trailing odd byte is ignored.
pub fn decode_name(bytes: &[u8]) -> String {
    bytes
        .chunks_exact(2)
        .map(|pair| char::from(pair[1]))
        .collect()
}
