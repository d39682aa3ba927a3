//! Engine configuration: vocabulary and dashboard KPI cards from TOML.
//!
//! The bundled `config/engine.toml` is compiled in and used by default.
//! Deployments can load a newer file without rebuilding when regional
//! labels drift.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::matcher::warn_if_weak;
use crate::tokenize::Tokenizer;
use crate::vocabulary::Vocabulary;

/// Raw text of the bundled configuration.
pub const BUNDLED_CONFIG: &str = include_str!("../config/engine.toml");

static BUNDLED: Lazy<EngineConfig> = Lazy::new(|| {
    EngineConfig::from_toml_str(BUNDLED_CONFIG).expect("bundled config/engine.toml is valid")
});

/// One dashboard card: a KPI key plus the alias labels that feed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KpiDefinition {
    pub key: String,
    #[serde(default)]
    pub title: Option<String>,
    pub labels: Vec<String>,
}

impl KpiDefinition {
    pub fn new<L: Into<String>>(
        key: impl Into<String>,
        labels: impl IntoIterator<Item = L>,
    ) -> Self {
        Self {
            key: key.into(),
            title: None,
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Display title, falling back to the first label.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or_else(|| self.labels.first().map(String::as_str))
            .unwrap_or(&self.key)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    version: String,
    #[serde(default)]
    program_tokens: Vec<String>,
    #[serde(default)]
    synonyms: BTreeMap<String, String>,
    #[serde(default)]
    kpis: Vec<KpiDefinition>,
}

/// Validated vocabulary plus KPI definitions.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    vocabulary: Arc<Vocabulary>,
    kpis: Vec<KpiDefinition>,
}

impl EngineConfig {
    /// The compiled-in configuration.
    pub fn bundled() -> &'static EngineConfig {
        &BUNDLED
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text)?;
        let vocabulary = Arc::new(Vocabulary::new(
            raw.version,
            raw.synonyms,
            raw.program_tokens,
        )?);
        Self::new(vocabulary, raw.kpis)
    }

    /// Assemble a configuration from parts, validating the KPI list.
    pub fn new(vocabulary: Arc<Vocabulary>, kpis: Vec<KpiDefinition>) -> Result<Self, ConfigError> {
        let tokenizer = Tokenizer::new(vocabulary.clone());
        let mut seen = HashSet::new();
        for kpi in &kpis {
            if kpi.key.trim().is_empty() {
                return Err(ConfigError::invalid("kpis.key", "KPI key must not be empty"));
            }
            if !seen.insert(kpi.key.as_str()) {
                return Err(ConfigError::DuplicateKpi(kpi.key.clone()));
            }
            if kpi.labels.is_empty() || kpi.labels.iter().any(|l| l.trim().is_empty()) {
                return Err(ConfigError::invalid(
                    format!("kpis.{}.labels", kpi.key),
                    "at least one non-empty label is required",
                ));
            }
            for label in &kpi.labels {
                warn_if_weak(label, &tokenizer.tokenize(label));
            }
        }

        debug!(
            version = vocabulary.version(),
            synonyms = vocabulary.len(),
            kpis = kpis.len(),
            "loaded engine configuration"
        );
        Ok(Self { vocabulary, kpis })
    }

    pub fn vocabulary(&self) -> &Arc<Vocabulary> {
        &self.vocabulary
    }

    pub fn kpis(&self) -> &[KpiDefinition] {
        &self.kpis
    }

    pub fn kpi(&self, key: &str) -> Option<&KpiDefinition> {
        self.kpis.iter().find(|kpi| kpi.key == key)
    }
}
