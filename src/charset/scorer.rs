//! Readability scoring for decoded text.
//!
//! The score is a heuristic for "does this look like correctly decoded
//! Chinese text": it rewards CJK Unified Ideographs and penalizes the
//! markers that lossy conversions leave behind. It is not an encoding
//! validator. Text without CJK content scores as neutral (zero or below),
//! so two candidate decodings of Latin or Cyrillic text cannot be told
//! apart by score alone.

/// Replacement character emitted by decoders for malformed input.
const REPLACEMENT: char = '\u{FFFD}';
/// UTF-8 encoding of [`REPLACEMENT`].
const REPLACEMENT_BYTES: &[u8] = "\u{FFFD}".as_bytes();

/// True for code points in the CJK Unified Ideographs block (U+4E00..=U+9FFF).
pub fn is_cjk(ch: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&ch)
}

/// True when `text` holds at least one CJK ideograph.
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(is_cjk)
}

/// Score decoded text: two points per CJK ideograph, minus one per
/// replacement character and per literal `?`.
pub fn score(text: &str) -> i64 {
    text.chars().fold(0i64, |acc, ch| match ch {
        c if is_cjk(c) => acc + 2,
        REPLACEMENT | '?' => acc - 1,
        _ => acc,
    })
}

/// Score a raw byte string.
///
/// Ideographs are only counted when the bytes are well-formed UTF-8; the
/// garbage markers are counted on the raw bytes either way.
pub fn score_bytes(bytes: &[u8]) -> i64 {
    match std::str::from_utf8(bytes) {
        Ok(text) => score(text),
        Err(_) => {
            let question_marks = bytes.iter().filter(|b| **b == b'?').count();
            let replacements = bytes
                .windows(REPLACEMENT_BYTES.len())
                .filter(|w| *w == REPLACEMENT_BYTES)
                .count();
            -((question_marks + replacements) as i64)
        }
    }
}
