//! Tokenizer: split normalized text into canonical tokens.
//!
//! Pipeline: normalize → split on runs of non-alphanumerics → singularize →
//! synonym lookup. Order and duplicates are preserved.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalize::normalize;
use crate::vocabulary::Vocabulary;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Reduces a raw token to its singular form before synonym lookup.
///
/// Implementations must be pure: the same token always yields the same
/// output.
pub trait Singularizer: Send + Sync + fmt::Debug {
    fn singularize<'a>(&self, token: &'a str) -> Cow<'a, str>;
}

/// Drops one trailing "s".
///
/// Deliberately naive: short words get mangled ("nps" → "np"), which the
/// synonym table can paper over. A lone "s" is left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrailingS;

impl Singularizer for TrailingS {
    fn singularize<'a>(&self, token: &'a str) -> Cow<'a, str> {
        match token.strip_suffix('s') {
            Some(stem) if !stem.is_empty() => Cow::Borrowed(stem),
            _ => Cow::Borrowed(token),
        }
    }
}

/// Turns free text into a sequence of canonical tokens.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    vocabulary: Arc<Vocabulary>,
    singularizer: Arc<dyn Singularizer>,
}

impl Tokenizer {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self::with_singularizer(vocabulary, Arc::new(TrailingS))
    }

    pub fn with_singularizer(
        vocabulary: Arc<Vocabulary>,
        singularizer: Arc<dyn Singularizer>,
    ) -> Self {
        Self {
            vocabulary,
            singularizer,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return Vec::new();
        }
        NON_ALNUM
            .replace_all(&normalized, " ")
            .split_whitespace()
            .map(|raw| {
                let singular = self.singularizer.singularize(raw);
                self.vocabulary.canonical(&singular).to_string()
            })
            .collect()
    }
}
