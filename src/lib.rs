//! Activity label matching and KPI aggregation for the regional programs
//! dashboard.
//!
//! Activity records arrive with free-text labels typed by many regional
//! users, under several field names, with quantities as numbers or strings.
//! This crate classifies each record against canonical KPI labels and sums a
//! value per KPI:
//! 1. Normalization (casefold, strip diacritics)
//! 2. Tokenization (singularize, resolve synonyms)
//! 3. Label matching (token overlap anchored on program tokens)
//! 4. Quantity extraction (field fallbacks, lenient parsing)
//! 5. Aggregation (alias OR-matching, optional today-only filter)
//!
//! The free functions below run against the bundled vocabulary in
//! `config/engine.toml`. Build an [`Aggregator`] from a loaded
//! [`EngineConfig`] to use another one.

mod aggregate;
mod config;
mod dates;
mod error;
mod matcher;
mod normalize;
mod quantity;
mod record;
mod tokenize;
mod vocabulary;

#[cfg(feature = "python")]
mod python;

use once_cell::sync::Lazy;

pub use aggregate::{AggregateOptions, Aggregator, KpiTotal};
pub use config::{EngineConfig, KpiDefinition, BUNDLED_CONFIG};
pub use dates::parse_local_date;
pub use error::{ConfigError, RecordError};
pub use matcher::{LabelMatcher, TargetLabel, TokenCache};
pub use normalize::{normalize, normalize_opt};
pub use quantity::{extract_quantity, parse_quantity_text, DEFAULT_QUANTITY};
pub use record::{records_from_json, ActivityRecord, QuantityValue, RecordId};
pub use tokenize::{Singularizer, Tokenizer, TrailingS};
pub use vocabulary::Vocabulary;

static DEFAULT_AGGREGATOR: Lazy<Aggregator> =
    Lazy::new(|| Aggregator::from_config(EngineConfig::bundled()));

/// Aggregator over the bundled configuration.
pub fn default_aggregator() -> &'static Aggregator {
    &DEFAULT_AGGREGATOR
}

/// Canonical tokens of `text` under the bundled vocabulary.
pub fn tokenize(text: &str) -> Vec<String> {
    DEFAULT_AGGREGATOR.matcher().tokenizer().tokenize(text)
}

/// Does `candidate` free text match `target_label`?
pub fn matches(candidate: &str, target_label: &str) -> bool {
    DEFAULT_AGGREGATOR.matcher().matches(candidate, target_label)
}

/// Does any descriptive field of `record` match `target_label`?
pub fn activity_matches(record: &ActivityRecord, target_label: &str) -> bool {
    DEFAULT_AGGREGATOR
        .matcher()
        .activity_matches(record, target_label)
}

/// Sum of quantities over records matching any of `labels`.
pub fn sum_by_labels<S: AsRef<str>>(
    records: &[ActivityRecord],
    labels: &[S],
    options: AggregateOptions,
) -> f64 {
    DEFAULT_AGGREGATOR.sum_by_labels(records, labels, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_functions_use_bundled_vocabulary() {
        assert_eq!(tokenize("ONGs Decolagem"), vec!["ong", "decolagem"]);
        assert!(matches("familias decolagem", "Famílias Embarcadas Decolagem"));
        assert!(!matches("decolagem", "Famílias Embarcadas Decolagem"));

        let record = ActivityRecord::labeled("Diagnósticos Realizados").with_quantity("150");
        assert!(activity_matches(&record, "diagnosticos_realizados"));
        assert_eq!(
            sum_by_labels(&[record], &["Diagnósticos Realizados"], AggregateOptions::default()),
            150.0
        );
    }

    #[test]
    fn test_engine_types_are_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Aggregator>();
        assert_send_sync::<EngineConfig>();
        assert_send_sync::<ActivityRecord>();
    }
}
