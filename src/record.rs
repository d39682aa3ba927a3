//! Activity records as delivered by the dashboard's data-access layer.
//!
//! Regional forms have used different field names over time (`quantity` vs
//! `qtd`, `activity_date` vs `data_inicio`), so each concept is a list of
//! optional fields read in a fixed priority order.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::dates::parse_local_date;
use crate::error::RecordError;

/// Opaque record identifier; both integer and string ids occur.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

/// A quantity as entered: a number, or a string that may hold one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuantityValue {
    Number(f64),
    Text(String),
}

impl From<f64> for QuantityValue {
    fn from(value: f64) -> Self {
        QuantityValue::Number(value)
    }
}

impl From<&str> for QuantityValue {
    fn from(value: &str) -> Self {
        QuantityValue::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityRecord {
    #[serde(deserialize_with = "lenient_id")]
    pub id: Option<RecordId>,

    // Descriptive fields, scanned for label matches in this order.
    #[serde(deserialize_with = "lenient_text")]
    pub label: Option<String>,
    #[serde(alias = "titulo", deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(rename = "type", alias = "tipo", deserialize_with = "lenient_text")]
    pub type_code: Option<String>,
    #[serde(rename = "category", alias = "categoria", deserialize_with = "lenient_text")]
    pub category_code: Option<String>,

    // Quantity candidates, primary first.
    #[serde(deserialize_with = "lenient_quantity")]
    pub quantity: Option<QuantityValue>,
    #[serde(deserialize_with = "lenient_quantity")]
    pub qtd: Option<QuantityValue>,
    #[serde(deserialize_with = "lenient_quantity")]
    pub quantidade: Option<QuantityValue>,

    // Date candidates, most specific first.
    #[serde(deserialize_with = "lenient_text")]
    pub activity_date: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub data_inicio: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub created_at: Option<String>,

    /// Carried through untouched; status filtering happens upstream.
    #[serde(deserialize_with = "lenient_text")]
    pub status: Option<String>,
}

impl ActivityRecord {
    /// Record with only a primary label, the common case in tests and
    /// hand-built fixtures.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    pub fn with_quantity(mut self, quantity: impl Into<QuantityValue>) -> Self {
        self.quantity = Some(quantity.into());
        self
    }

    pub fn with_activity_date(mut self, date: impl Into<String>) -> Self {
        self.activity_date = Some(date.into());
        self
    }

    /// Non-empty descriptive fields: label, title, type code, category code.
    pub fn descriptive_fields(&self) -> impl Iterator<Item = &str> + '_ {
        [&self.label, &self.title, &self.type_code, &self.category_code]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .filter(|text| !text.trim().is_empty())
    }

    /// First defined quantity candidate: `quantity`, `qtd`, `quantidade`.
    pub fn quantity_value(&self) -> Option<&QuantityValue> {
        self.quantity
            .as_ref()
            .or(self.qtd.as_ref())
            .or(self.quantidade.as_ref())
    }

    /// First non-empty date candidate: `activity_date`, `data_inicio`,
    /// `created_at`.
    pub fn date_text(&self) -> Option<&str> {
        [&self.activity_date, &self.data_inicio, &self.created_at]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .map(str::trim)
            .find(|text| !text.is_empty())
    }

    /// Local calendar day of the best available date, if it parses.
    pub fn local_date(&self) -> Option<NaiveDate> {
        self.date_text().and_then(parse_local_date)
    }
}

/// Decode a JSON array of activity records.
pub fn records_from_json(payload: &str) -> Result<Vec<ActivityRecord>, RecordError> {
    Ok(serde_json::from_str(payload)?)
}

/// Accept strings, numbers and booleans as text; anything else is absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Integers that fit i64 stay integers, strings stay strings; any other
/// defined id (huge or fractional numbers, objects) is kept as its JSON text.
fn lenient_id<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(RecordId::Text(s)),
        Some(Value::Number(n)) => Some(match n.as_i64() {
            Some(i) => RecordId::Int(i),
            None => RecordId::Text(n.to_string()),
        }),
        Some(other) => Some(RecordId::Text(other.to_string())),
    })
}

/// Numbers stay numbers; any other defined value is kept as text so it
/// still resolves (and falls back to 1 if it does not parse).
fn lenient_quantity<'de, D>(deserializer: D) -> Result<Option<QuantityValue>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64().map(QuantityValue::Number),
        Some(Value::String(s)) => Some(QuantityValue::Text(s)),
        Some(other) => Some(QuantityValue::Text(other.to_string())),
    })
}
