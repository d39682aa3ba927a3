//! Text normalization: casefold and strip diacritics from free-text labels.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalise text: lowercase, drop combining marks after NFD, trim.
///
/// "  Famílias Embarcadas " becomes "familias embarcadas". Inner whitespace
/// is left alone; the tokenizer collapses it.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    folded.trim().to_string()
}

/// Same as [`normalize`], treating a missing value as empty.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}
