//! Helpers for text addressed in UTF-16 code units.
//!
//! Telegram measures entity offsets and lengths in UTF-16 code units, so the
//! formatter works on `Vec<u16>` buffers and only converts back to a `String`
//! once all markup is in place.

pub fn to_units(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

pub fn from_units(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

/// Length of `text` in UTF-16 code units.
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

pub fn push_str(buffer: &mut Vec<u16>, text: &str) {
    buffer.extend(text.encode_utf16());
}

/// Clamps `[offset, offset + length)` into `[0, len]`.
pub fn clamp_range(offset: usize, length: usize, len: usize) -> (usize, usize) {
    let start = offset.min(len);
    let end = offset.saturating_add(length).clamp(start, len);
    (start, end)
}

/// Builds `units[..start] + replacement + units[end..]` as a new buffer.
pub fn splice(units: &[u16], start: usize, end: usize, replacement: &[u16]) -> Vec<u16> {
    let mut result = Vec::with_capacity(units.len() - (end - start) + replacement.len());
    result.extend_from_slice(&units[..start]);
    result.extend_from_slice(replacement);
    result.extend_from_slice(&units[end..]);
    result
}

pub fn is_empty_or_whitespace(text: &str) -> bool {
    text.trim().is_empty()
}
