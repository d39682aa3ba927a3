//! Aggregation: sum activity quantities per KPI.
//!
//! Labels passed together are aliases of one KPI: a record counts once if
//! it matches any of them.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::{EngineConfig, KpiDefinition};
use crate::dates::local_today;
use crate::matcher::{LabelMatcher, TargetLabel, TokenCache};
use crate::quantity::extract_quantity;
use crate::record::ActivityRecord;
use crate::tokenize::Tokenizer;

/// Options for one aggregation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Keep only records dated on the reference day.
    pub today_only: bool,
    /// Reference day for `today_only`; the local current date when unset.
    pub as_of: Option<NaiveDate>,
}

impl AggregateOptions {
    pub fn today_only() -> Self {
        Self {
            today_only: true,
            as_of: None,
        }
    }

    pub fn as_of(mut self, day: NaiveDate) -> Self {
        self.as_of = Some(day);
        self
    }

    /// The day records must fall on, resolved once per call.
    fn day_filter(&self) -> Option<NaiveDate> {
        self.today_only
            .then(|| self.as_of.unwrap_or_else(local_today))
    }
}

/// Result for one dashboard card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiTotal {
    pub key: String,
    pub total: f64,
    pub matched_records: usize,
}

/// Matches records against KPI labels and folds their quantities.
#[derive(Debug, Clone)]
pub struct Aggregator {
    matcher: LabelMatcher,
}

impl Aggregator {
    pub fn new(matcher: LabelMatcher) -> Self {
        Self { matcher }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(LabelMatcher::new(Tokenizer::new(config.vocabulary().clone())))
    }

    pub fn matcher(&self) -> &LabelMatcher {
        &self.matcher
    }

    fn targets<S: AsRef<str>>(&self, labels: &[S]) -> Vec<TargetLabel> {
        labels
            .iter()
            .map(|label| self.matcher.target(label.as_ref()))
            .collect()
    }

    fn keep<'r>(
        &self,
        record: &'r ActivityRecord,
        targets: &[TargetLabel],
        day: Option<NaiveDate>,
        cache: &mut TokenCache<'r>,
    ) -> bool {
        if !self.matcher.record_matches(record, targets, cache) {
            return false;
        }
        match day {
            None => true,
            Some(day) => match record.local_date() {
                Some(date) => date == day,
                None => {
                    trace!(
                        id = ?record.id,
                        date = ?record.date_text(),
                        "no usable date, excluded from today-only"
                    );
                    false
                }
            },
        }
    }

    /// Records matching any of `labels`, in input order.
    pub fn filter_matching<'r, S: AsRef<str>>(
        &self,
        records: &'r [ActivityRecord],
        labels: &[S],
        options: AggregateOptions,
    ) -> Vec<&'r ActivityRecord> {
        let targets = self.targets(labels);
        let day = options.day_filter();
        let mut cache = TokenCache::new();
        records
            .iter()
            .filter(|record| self.keep(*record, &targets, day, &mut cache))
            .collect()
    }

    /// Sum of quantities over records matching any of `labels`.
    pub fn sum_by_labels<S: AsRef<str>>(
        &self,
        records: &[ActivityRecord],
        labels: &[S],
        options: AggregateOptions,
    ) -> f64 {
        let matched = self.filter_matching(records, labels, options);
        let total: f64 = matched.iter().map(|record| extract_quantity(record)).sum();
        debug!(
            labels = labels.len(),
            records = records.len(),
            matched = matched.len(),
            total,
            "aggregated KPI"
        );
        total
    }

    /// Evaluate several KPIs in one pass, sharing tokenization across them.
    /// Output order follows `kpis`.
    pub fn aggregate_kpis(
        &self,
        records: &[ActivityRecord],
        kpis: &[KpiDefinition],
        options: AggregateOptions,
    ) -> Vec<KpiTotal> {
        let prepared: Vec<Vec<TargetLabel>> =
            kpis.iter().map(|kpi| self.targets(&kpi.labels)).collect();
        let mut totals: Vec<KpiTotal> = kpis
            .iter()
            .map(|kpi| KpiTotal {
                key: kpi.key.clone(),
                total: 0.0,
                matched_records: 0,
            })
            .collect();

        let day = options.day_filter();
        let mut cache = TokenCache::new();
        for record in records {
            let mut quantity = None;
            for (targets, total) in prepared.iter().zip(totals.iter_mut()) {
                if self.keep(record, targets, day, &mut cache) {
                    total.total += *quantity.get_or_insert_with(|| extract_quantity(record));
                    total.matched_records += 1;
                }
            }
        }

        debug!(
            kpis = kpis.len(),
            records = records.len(),
            distinct_fields = cache.len(),
            "aggregated dashboard"
        );
        totals
    }
}
