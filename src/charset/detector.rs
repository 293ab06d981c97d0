use tracing::trace;

use crate::charset::label::CharsetName;

/// Guess the charset of `bytes`, restricted to `candidates`.
///
/// Well-formed UTF-8 is reported as `UTF-8` immediately, so correctly
/// encoded text is never reassigned to a legacy charset. Otherwise the first
/// candidate (in list order) that decodes the whole input without a single
/// malformed sequence wins. Returns `None` when nothing validates; the
/// detector never guesses outside the list.
pub fn detect(bytes: &[u8], candidates: &[CharsetName]) -> Option<CharsetName> {
    if std::str::from_utf8(bytes).is_ok() {
        return Some(CharsetName::utf8());
    }

    candidates
        .iter()
        .find(|candidate| validates(bytes, candidate))
        .cloned()
}

/// Strict validation of `bytes` under `charset`. Unknown labels never validate.
pub fn validates(bytes: &[u8], charset: &CharsetName) -> bool {
    let Some(encoding) = charset.resolve() else {
        trace!(charset = %charset, "skipping unsupported charset during detection");
        return false;
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .is_some()
}
