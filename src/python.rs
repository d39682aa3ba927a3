//! Python bindings for the dashboard service.
//!
//! Records cross the boundary as the JSON array the data-access layer
//! already holds, so no per-field conversion happens on the Python side.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::{
    default_aggregator, extract_quantity, normalize_opt, records_from_json, ActivityRecord,
    AggregateOptions, EngineConfig,
};

fn value_error(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn options(today_only: bool) -> AggregateOptions {
    AggregateOptions {
        today_only,
        as_of: None,
    }
}

/// Lowercase, strip accents and trim. `None` becomes "".
#[pyfunction]
#[pyo3(signature = (text))]
pub fn normalize_text(text: Option<&str>) -> String {
    normalize_opt(text)
}

/// Canonical tokens of `text`, e.g. "Famílias Embarcadas" -> ["familia", "embarcada"].
#[pyfunction]
#[pyo3(signature = (text))]
pub fn tokenize_text(text: Option<&str>) -> Vec<String> {
    crate::tokenize(text.unwrap_or_default())
}

/// Whether `candidate` free text matches the KPI label `target`.
#[pyfunction]
#[pyo3(signature = (candidate, target))]
pub fn label_matches(candidate: Option<&str>, target: Option<&str>) -> bool {
    crate::matches(candidate.unwrap_or_default(), target.unwrap_or_default())
}

/// Quantity a single JSON-encoded record contributes.
#[pyfunction]
pub fn extract_quantity_json(record_json: &str) -> PyResult<f64> {
    let record: ActivityRecord = serde_json::from_str(record_json).map_err(value_error)?;
    Ok(extract_quantity(&record))
}

/// Sum of quantities over records matching any of `labels`.
///
/// Parameters
/// ----------
/// records_json : str
///     JSON array of activity records.
/// labels : list[str]
///     Alias labels of one KPI.
/// today_only : bool
///     Keep only records dated today (local time).
#[pyfunction]
#[pyo3(signature = (records_json, labels, today_only=false))]
pub fn sum_by_labels(records_json: &str, labels: Vec<String>, today_only: bool) -> PyResult<f64> {
    let records = records_from_json(records_json).map_err(value_error)?;
    Ok(default_aggregator().sum_by_labels(&records, &labels, options(today_only)))
}

/// Totals for every KPI card in the bundled configuration.
///
/// Returns a list of (kpi_key, total) tuples in configuration order.
#[pyfunction]
#[pyo3(signature = (records_json, today_only=false))]
pub fn dashboard_totals(records_json: &str, today_only: bool) -> PyResult<Vec<(String, f64)>> {
    let records = records_from_json(records_json).map_err(value_error)?;
    let totals = default_aggregator().aggregate_kpis(
        &records,
        EngineConfig::bundled().kpis(),
        options(today_only),
    );
    Ok(totals.into_iter().map(|t| (t.key, t.total)).collect())
}

/// Activity KPI core: native label matching for the programs dashboard.
#[pymodule]
fn activity_kpi_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Text
    m.add_function(wrap_pyfunction!(normalize_text, m)?)?;
    m.add_function(wrap_pyfunction!(tokenize_text, m)?)?;
    m.add_function(wrap_pyfunction!(label_matches, m)?)?;

    // Aggregation
    m.add_function(wrap_pyfunction!(extract_quantity_json, m)?)?;
    m.add_function(wrap_pyfunction!(sum_by_labels, m)?)?;
    m.add_function(wrap_pyfunction!(dashboard_totals, m)?)?;

    m.add(
        "VOCABULARY_VERSION",
        EngineConfig::bundled().vocabulary().version(),
    )?;
    Ok(())
}
