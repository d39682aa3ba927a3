//! Quantity extraction: resolve the numeric contribution of an activity.
//!
//! Never fails: an activity with no usable quantity still counts once.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::record::{ActivityRecord, QuantityValue};

/// Contribution of an activity whose quantity is missing or unreadable.
pub const DEFAULT_QUANTITY: f64 = 1.0;

// Leading float, e.g. "150 famílias" -> 150, "2.5e3" -> 2500
static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?").unwrap()
});

/// Parse quantity text the lenient way: whole string first, then its
/// leading numeric prefix.
pub fn parse_quantity_text(raw: &str) -> Option<f64> {
    let text = raw.trim();
    let parsed = match text.parse::<f64>() {
        Ok(value) => value,
        Err(_) => LEADING_NUMBER.find(text)?.as_str().parse::<f64>().ok()?,
    };
    parsed.is_finite().then_some(parsed)
}

impl QuantityValue {
    /// Finite numeric value, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            QuantityValue::Number(n) => n.is_finite().then_some(*n),
            QuantityValue::Text(s) => parse_quantity_text(s),
        }
    }
}

/// Numeric contribution of `record`, defaulting to [`DEFAULT_QUANTITY`].
pub fn extract_quantity(record: &ActivityRecord) -> f64 {
    let Some(value) = record.quantity_value() else {
        return DEFAULT_QUANTITY;
    };
    match value.as_f64() {
        Some(quantity) => quantity,
        None => {
            trace!(id = ?record.id, value = ?value, "unreadable quantity, counting once");
            DEFAULT_QUANTITY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with(value: QuantityValue) -> ActivityRecord {
        ActivityRecord {
            quantity: Some(value),
            ..Default::default()
        }
    }

    #[test]
    fn test_numeric_string() {
        assert_eq!(extract_quantity(&with("150".into())), 150.0);
        assert_eq!(extract_quantity(&with(" 12.5 ".into())), 12.5);
    }

    #[test]
    fn test_unparseable_defaults_to_one() {
        assert_eq!(extract_quantity(&with("abc".into())), 1.0);
        assert_eq!(extract_quantity(&with("".into())), 1.0);
        assert_eq!(extract_quantity(&with("NaN".into())), 1.0);
        assert_eq!(extract_quantity(&with("inf".into())), 1.0);
        assert_eq!(extract_quantity(&with(QuantityValue::Number(f64::NAN))), 1.0);
    }

    #[test]
    fn test_missing_defaults_to_one() {
        assert_eq!(extract_quantity(&ActivityRecord::default()), 1.0);
    }

    #[test]
    fn test_numbers_used_as_is() {
        assert_eq!(extract_quantity(&with(QuantityValue::Number(0.0))), 0.0);
        assert_eq!(extract_quantity(&with(QuantityValue::Number(-3.0))), -3.0);
    }

    #[test]
    fn test_leading_number_prefix() {
        assert_eq!(parse_quantity_text("150 famílias"), Some(150.0));
        assert_eq!(parse_quantity_text("1,5"), Some(1.0));
        assert_eq!(parse_quantity_text("2.5e3 pessoas"), Some(2500.0));
        assert_eq!(parse_quantity_text("aprox. 40"), None);
    }

    #[test]
    fn test_fallback_fields() {
        let record = ActivityRecord {
            qtd: Some("7".into()),
            quantidade: Some(QuantityValue::Number(9.0)),
            ..Default::default()
        };
        assert_eq!(extract_quantity(&record), 7.0);

        let record = ActivityRecord {
            quantidade: Some(QuantityValue::Number(9.0)),
            ..Default::default()
        };
        assert_eq!(extract_quantity(&record), 9.0);
    }

    #[test]
    fn test_primary_wins_even_when_malformed() {
        let record = ActivityRecord {
            quantity: Some("n/a".into()),
            qtd: Some("7".into()),
            ..Default::default()
        };
        assert_eq!(extract_quantity(&record), 1.0);
    }
}
