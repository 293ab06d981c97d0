use std::borrow::Cow;

use encoding_rs::{EncoderResult, Encoding, UTF_8};
use tracing::trace;

use crate::charset::label::CharsetName;

/// Substitute byte for characters the target charset cannot represent.
const SUBSTITUTE: u8 = b'?';

/// Convert `bytes` from one charset to another.
///
/// Identity when either label is blank or both name the same charset.
/// Conversion never fails: unsupported labels return the input unchanged,
/// malformed source bytes decode to U+FFFD, and characters the target
/// cannot encode become `?`.
pub fn convert<'a>(bytes: &'a [u8], from: &CharsetName, to: &CharsetName) -> Cow<'a, [u8]> {
    if from.is_empty() || to.is_empty() || from == to {
        return Cow::Borrowed(bytes);
    }
    let (Some(source), Some(target)) = (from.resolve(), to.resolve()) else {
        trace!(%from, %to, "unsupported charset pair, passing text through");
        return Cow::Borrowed(bytes);
    };

    let (decoded, _) = source.decode_without_bom_handling(bytes);
    if target.output_encoding() == UTF_8 {
        return match decoded {
            Cow::Borrowed(text) => Cow::Borrowed(text.as_bytes()),
            Cow::Owned(text) => Cow::Owned(text.into_bytes()),
        };
    }
    Cow::Owned(encode_lossy(target, &decoded))
}

/// Convenience wrapper over [`convert`] for text that is already UTF-8.
pub fn convert_str(text: &str, from: &CharsetName, to: &CharsetName) -> Vec<u8> {
    convert(text.as_bytes(), from, to).into_owned()
}

/// Encode `text` into a non-UTF-8 `encoding`, replacing unmappable characters with `?`.
fn encode_lossy(encoding: &'static Encoding, text: &str) -> Vec<u8> {
    let mut encoder = encoding.new_encoder();
    let mut out = Vec::with_capacity(text.len());
    let mut buffer = [0u8; 1024];
    let mut remaining = text;
    loop {
        let (result, read, written) =
            encoder.encode_from_utf8_without_replacement(remaining, &mut buffer, true);
        out.extend_from_slice(&buffer[..written]);
        remaining = &remaining[read..];
        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => {}
            EncoderResult::Unmappable(_) => out.push(SUBSTITUTE),
        }
    }
    out
}
