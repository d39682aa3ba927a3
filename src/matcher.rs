//! Label matching: decide whether a record's free text names a KPI label.
//!
//! A label matches when enough of its canonical tokens appear in the
//! candidate text: `min(label_tokens, 2)` overlapping occurrences. Labels that
//! carry a program-identifying token ("decolagem", "maras") additionally need
//! that token in the overlap, so "ONGs Decolagem" never counts towards
//! "Famílias Embarcadas Decolagem" on the program name alone.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::record::ActivityRecord;
use crate::tokenize::Tokenizer;

/// A KPI label prepared for matching: tokenized once, reused per record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLabel {
    raw: String,
    tokens: Vec<String>,
    requires_program_token: bool,
}

impl TargetLabel {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn requires_program_token(&self) -> bool {
        self.requires_program_token
    }

    /// Overlap needed for a match.
    pub fn threshold(&self) -> usize {
        self.tokens.len().min(2)
    }

    /// Fewer than two tokens relaxes the overlap rule to near-substring
    /// matching.
    pub fn is_weak(&self) -> bool {
        self.tokens.len() < 2
    }
}

pub(crate) fn warn_if_weak(label: &str, tokens: &[String]) {
    if tokens.len() < 2 {
        warn!(
            label,
            token_count = tokens.len(),
            "KPI label resolves to fewer than two canonical tokens; \
             matches against it may be unreliable"
        );
    }
}

/// Memoizes tokenization of field strings within one aggregation call.
#[derive(Debug, Default)]
pub struct TokenCache<'t> {
    entries: HashMap<&'t str, HashSet<String>>,
}

impl<'t> TokenCache<'t> {
    pub fn new() -> Self {
        Self::default()
    }

    fn token_set(&mut self, tokenizer: &Tokenizer, text: &'t str) -> &HashSet<String> {
        self.entries
            .entry(text)
            .or_insert_with(|| tokenizer.tokenize(text).into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Token-overlap matcher over a shared vocabulary.
#[derive(Debug, Clone)]
pub struct LabelMatcher {
    tokenizer: Tokenizer,
}

impl LabelMatcher {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer }
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Prepare a label without logging. See [`LabelMatcher::target`].
    pub fn prepare(&self, label: &str) -> TargetLabel {
        let tokens = self.tokenizer.tokenize(label);
        let vocabulary = self.tokenizer.vocabulary();
        let requires_program_token = tokens.iter().any(|t| vocabulary.is_program_token(t));
        TargetLabel {
            raw: label.to_string(),
            tokens,
            requires_program_token,
        }
    }

    /// Prepare a label for repeated matching, warning when it is too short
    /// to classify reliably.
    pub fn target(&self, label: &str) -> TargetLabel {
        let target = self.prepare(label);
        warn_if_weak(label, &target.tokens);
        target
    }

    /// Does `candidate` free text match `target_label`? Weak labels are
    /// logged on every call; hold a [`TargetLabel`] for hot loops.
    pub fn matches(&self, candidate: &str, target_label: &str) -> bool {
        let target = self.target(target_label);
        let candidate_tokens: HashSet<String> =
            self.tokenizer.tokenize(candidate).into_iter().collect();
        self.tokens_match(&candidate_tokens, &target)
    }

    /// True when any descriptive field of `record` matches `target_label`.
    pub fn activity_matches(&self, record: &ActivityRecord, target_label: &str) -> bool {
        let target = self.target(target_label);
        let mut cache = TokenCache::new();
        self.record_matches(record, std::slice::from_ref(&target), &mut cache)
    }

    /// OR across `targets`, walking the record's descriptive fields in
    /// priority order.
    pub fn record_matches<'t>(
        &self,
        record: &'t ActivityRecord,
        targets: &[TargetLabel],
        cache: &mut TokenCache<'t>,
    ) -> bool {
        record.descriptive_fields().any(|field| {
            let tokens = cache.token_set(&self.tokenizer, field);
            targets.iter().any(|target| self.tokens_match(tokens, target))
        })
    }

    fn tokens_match(&self, candidate: &HashSet<String>, target: &TargetLabel) -> bool {
        if candidate.is_empty() || target.tokens.is_empty() {
            return false;
        }

        let vocabulary = self.tokenizer.vocabulary();
        let mut overlap = 0usize;
        let mut anchored = false;
        for token in target.tokens.iter().filter(|t| candidate.contains(*t)) {
            overlap += 1;
            anchored |= vocabulary.is_program_token(token);
        }

        if target.requires_program_token && !anchored {
            return false;
        }
        overlap >= target.threshold()
    }
}
