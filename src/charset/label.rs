use std::fmt;

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

/// Code-page style labels that the WHATWG label registry does not know.
const CODE_PAGE_ALIASES: &[(&str, &str)] = &[
    ("cp936", "gbk"),
    ("ms936", "gbk"),
    ("windows-936", "gbk"),
    ("cp54936", "gb18030"),
    ("cp950", "big5"),
    ("cp932", "shift_jis"),
    ("ms932", "shift_jis"),
    ("cp949", "euc-kr"),
    ("cp65001", "utf-8"),
];

/// A charset label such as `UTF-8` or `GBK`.
///
/// Labels compare case-insensitively and are never normalized on
/// construction, so the label the user configured is the one echoed back.
/// An empty label means "not configured".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharsetName(String);

impl CharsetName {
    /// Wrap a label, trimming surrounding whitespace.
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(label.as_ref().trim().to_string())
    }

    /// The UTF-8 label.
    pub fn utf8() -> Self {
        Self("UTF-8".to_string())
    }

    /// The label as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when no charset is configured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve the label to an `encoding_rs` encoding, if supported.
    pub fn resolve(&self) -> Option<&'static Encoding> {
        if self.is_empty() {
            return None;
        }
        if let Some(encoding) = Encoding::for_label(self.0.as_bytes()) {
            return Some(encoding);
        }
        let lower = self.0.to_ascii_lowercase();
        CODE_PAGE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == lower)
            .and_then(|(_, target)| Encoding::for_label(target.as_bytes()))
    }
}

impl PartialEq for CharsetName {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for CharsetName {}

impl fmt::Display for CharsetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CharsetName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CharsetName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Fallback charsets tried when decoding error messages, in priority order.
pub const ERROR_CANDIDATES: &[&str] = &[
    "UTF-8",
    "GB18030",
    "GBK",
    "GB2312",
    "CP936",
    "ISO-8859-1",
];

/// Build a candidate list, prepending `preferred` unless it is blank or already listed.
pub fn candidate_list(preferred: &CharsetName, defaults: &[&str]) -> Vec<CharsetName> {
    let mut candidates: Vec<CharsetName> =
        defaults.iter().map(|label| CharsetName::new(label)).collect();
    if !preferred.is_empty() && !candidates.contains(preferred) {
        candidates.insert(0, preferred.clone());
    }
    candidates
}
