//! Best-effort text normalization at the driver boundary.
//!
//! Every entry point takes the charset configuration explicitly; nothing in
//! here reads process-wide state.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::charset::converter::{convert, convert_str};
use crate::charset::detector::detect;
use crate::charset::label::{candidate_list, CharsetName, ERROR_CANDIDATES};
use crate::charset::scorer::{contains_cjk, score_bytes};
use crate::value::Row;

/// Charset configuration of one connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharsetSettings {
    /// Charset the database hands text back in (blank = same as output).
    pub data: CharsetName,
    /// Charset the caller wants to see.
    pub output: CharsetName,
    /// Charset driver error messages arrive in (blank = use `data`).
    pub error: CharsetName,
}

impl CharsetSettings {
    /// Build settings from three labels.
    pub fn new(
        data: impl Into<CharsetName>,
        output: impl Into<CharsetName>,
        error: impl Into<CharsetName>,
    ) -> Self {
        Self {
            data: data.into(),
            output: output.into(),
            error: error.into(),
        }
    }

    /// Charset assumed for error messages.
    pub fn error_source(&self) -> &CharsetName {
        if self.error.is_empty() {
            &self.data
        } else {
            &self.error
        }
    }

    /// Encode caller text (output charset) into the connection charset.
    pub fn outbound(&self, text: &str) -> Vec<u8> {
        convert_str(text, &self.output, &self.data)
    }
}

impl Default for CharsetSettings {
    fn default() -> Self {
        Self {
            data: CharsetName::default(),
            output: CharsetName::utf8(),
            error: CharsetName::default(),
        }
    }
}

/// Convert every text cell of every row from `from` to `to`, in place.
///
/// No-op when either charset is unset or both are equal.
pub fn normalize_rows(rows: &mut [Row], from: &CharsetName, to: &CharsetName) {
    if from.is_empty() || to.is_empty() || from == to {
        return;
    }
    for row in rows.iter_mut() {
        for value in row.values_mut() {
            value.for_each_text_mut(&mut |bytes| {
                let converted = match convert(bytes, from, to) {
                    Cow::Owned(converted) => Some(converted),
                    Cow::Borrowed(_) => None,
                };
                if let Some(converted) = converted {
                    *bytes = converted;
                }
            });
        }
    }
}

/// Re-encode caller text into the connection charset before it reaches the driver.
///
/// `ui` is the charset the caller speaks (the output charset) and
/// `connection` the data charset. `None` passes through unchanged.
pub fn prepare_outbound<'a>(
    value: Option<&'a [u8]>,
    ui: &CharsetName,
    connection: &CharsetName,
) -> Option<Cow<'a, [u8]>> {
    let value = value?;
    if connection.is_empty() || ui == connection {
        return Some(Cow::Borrowed(value));
    }
    Some(convert(value, ui, connection))
}

/// Normalize a driver error message into the output charset.
///
/// Messages that are valid UTF-8 and contain CJK text are trusted as-is.
/// This heuristic misses multi-byte corruption in non-CJK messages, which
/// then goes through the candidate scan like any other message.
pub fn normalize_error(message: &[u8], settings: &CharsetSettings) -> Vec<u8> {
    if let Ok(text) = std::str::from_utf8(message) {
        if contains_cjk(text) {
            return message.to_vec();
        }
    }

    let from = settings.error_source();
    let to = &settings.output;
    let candidates = candidate_list(from, ERROR_CANDIDATES);

    if !from.is_empty() && !to.is_empty() && from != to {
        let direct = convert(message, from, to);
        let scanned = convert_with_candidates(message, &candidates, to);
        return if score_bytes(&direct) >= score_bytes(&scanned) {
            direct.into_owned()
        } else {
            scanned.into_owned()
        };
    }
    convert_with_candidates(message, &candidates, to).into_owned()
}

/// Try every candidate source charset and keep the best-scoring result.
///
/// Starts from the unconverted input, and only a strictly better score
/// replaces the current best, so earlier candidates win ties and the result
/// never scores below the input.
pub fn convert_with_candidates<'a>(
    text: &'a [u8],
    candidates: &[CharsetName],
    to: &CharsetName,
) -> Cow<'a, [u8]> {
    let mut best = Cow::Borrowed(text);
    let mut best_score = score_bytes(text);

    for candidate in candidates {
        if candidate == to {
            continue;
        }
        let converted = convert(text, candidate, to);
        let candidate_score = score_bytes(&converted);
        if candidate_score > best_score {
            best_score = candidate_score;
            best = converted;
        }
    }
    best
}

/// Detect-first conversion.
///
/// A detected charset is trusted and used directly, even when the result
/// is unchanged or empty. Without a detection, the first candidate whose
/// conversion is non-empty and differs from the input wins.
pub fn best_effort_convert<'a>(
    text: &'a [u8],
    candidates: &[CharsetName],
    to: &CharsetName,
) -> Cow<'a, [u8]> {
    if let Some(detected) = detect(text, candidates) {
        return convert(text, &detected, to);
    }
    for candidate in candidates {
        let converted = convert(text, candidate, to);
        if !converted.is_empty() && converted.as_ref() != text {
            return converted;
        }
    }
    Cow::Borrowed(text)
}
