//! Errors for the fallible edges of the engine: loading configuration and
//! decoding record payloads. Matching and aggregation never fail.

use std::io;

use thiserror::Error;

/// Error type for engine configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("failed to parse engine configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
    #[error("synonym '{token}' maps to '{target}', but '{target}' maps to '{next}'")]
    NotIdempotent {
        token: String,
        target: String,
        next: String,
    },
    #[error("duplicate KPI key '{0}'")]
    DuplicateKpi(String),
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error type for activity record payloads handed over by the dashboard layer.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("malformed activity records: {0}")]
    Json(#[from] serde_json::Error),
}
