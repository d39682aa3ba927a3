//! Canonical token vocabulary: synonym table and program-identifying tokens.
//!
//! The tables come from configuration (see [`crate::config`]) and are
//! validated once on load. Lookups are idempotent: every canonical target
//! maps to itself.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::ConfigError;
use crate::normalize::normalize;

/// Validated synonym table plus the program-identifying token set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    version: String,
    synonyms: HashMap<String, String>,
    program_tokens: BTreeSet<String>,
}

/// A canonical token is a non-empty run of `[a-z0-9]`, the only shape the
/// tokenizer can emit.
pub(crate) fn is_canonical_shape(token: &str) -> bool {
    !token.is_empty()
        && token
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

impl Vocabulary {
    /// Build and validate a vocabulary.
    ///
    /// Synonym keys are normalized (so "retençao" is stored as "retencao");
    /// targets and program tokens must already be canonical. Targets missing
    /// from the key set are added as identity entries.
    pub fn new<K, V, P>(
        version: impl Into<String>,
        synonyms: impl IntoIterator<Item = (K, V)>,
        program_tokens: impl IntoIterator<Item = P>,
    ) -> Result<Self, ConfigError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
        P: AsRef<str>,
    {
        let mut table: BTreeMap<String, String> = BTreeMap::new();
        for (raw_key, raw_target) in synonyms {
            let key = normalize(raw_key.as_ref());
            if !is_canonical_shape(&key) {
                return Err(ConfigError::invalid(
                    "synonyms",
                    format!("key '{}' is not a single alphanumeric token", raw_key.as_ref()),
                ));
            }
            let target = raw_target.as_ref();
            if !is_canonical_shape(target) {
                return Err(ConfigError::invalid(
                    "synonyms",
                    format!("target '{}' of '{}' is not a canonical token", target, key),
                ));
            }
            if let Some(existing) = table.get(&key) {
                if existing != target {
                    return Err(ConfigError::invalid(
                        "synonyms",
                        format!("'{}' maps to both '{}' and '{}'", key, existing, target),
                    ));
                }
            }
            table.insert(key, target.to_string());
        }

        let mut identities = Vec::new();
        for (key, target) in &table {
            match table.get(target) {
                Some(next) if next != target => {
                    return Err(ConfigError::NotIdempotent {
                        token: key.clone(),
                        target: target.clone(),
                        next: next.clone(),
                    });
                }
                Some(_) => {}
                None => identities.push(target.clone()),
            }
        }
        for target in identities {
            table.insert(target.clone(), target);
        }

        let mut programs = BTreeSet::new();
        for raw in program_tokens {
            let token = raw.as_ref();
            if !is_canonical_shape(token) {
                return Err(ConfigError::invalid(
                    "program_tokens",
                    format!("'{}' is not a canonical token", token),
                ));
            }
            if let Some(target) = table.get(token) {
                if target != token {
                    return Err(ConfigError::invalid(
                        "program_tokens",
                        format!("'{}' is an alias of '{}', list the canonical form", token, target),
                    ));
                }
            }
            programs.insert(token.to_string());
        }

        Ok(Self {
            version: version.into(),
            synonyms: table.into_iter().collect(),
            program_tokens: programs,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Resolve a (singularized) token to its canonical form. Unknown tokens
    /// pass through.
    pub fn canonical<'a>(&'a self, token: &'a str) -> &'a str {
        self.synonyms.get(token).map(String::as_str).unwrap_or(token)
    }

    pub fn is_program_token(&self, token: &str) -> bool {
        self.program_tokens.contains(token)
    }

    pub fn program_tokens(&self) -> impl Iterator<Item = &str> {
        self.program_tokens.iter().map(String::as_str)
    }

    /// Number of synonym entries, identity entries included.
    pub fn len(&self) -> usize {
        self.synonyms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synonyms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(pairs: &[(&str, &str)], programs: &[&str]) -> Result<Vocabulary, ConfigError> {
        Vocabulary::new("test", pairs.iter().copied(), programs.iter().copied())
    }

    #[test]
    fn test_lookup_is_idempotent() {
        let v = vocab(&[("ongs", "ong"), ("mara", "maras")], &["maras"]).unwrap();
        assert_eq!(v.canonical("ongs"), "ong");
        assert_eq!(v.canonical("ong"), "ong");
        assert_eq!(v.canonical(v.canonical("mara")), "maras");
        assert_eq!(v.canonical("escola"), "escola");
    }

    #[test]
    fn test_keys_are_normalized() {
        let v = vocab(&[("Retençao", "retencao")], &[]).unwrap();
        assert_eq!(v.canonical("retencao"), "retencao");
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn test_rejects_chained_synonyms() {
        let err = vocab(&[("ongs", "ong"), ("ong", "organizacao")], &[]).unwrap_err();
        assert!(matches!(err, ConfigError::NotIdempotent { .. }));
    }

    #[test]
    fn test_rejects_conflicting_keys() {
        let err = vocab(&[("retençao", "retencao"), ("retencao", "retido")], &[]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_rejects_non_canonical_targets() {
        assert!(vocab(&[("familias", "Família")], &[]).is_err());
        assert!(vocab(&[("dois tokens", "x")], &[]).is_err());
    }

    #[test]
    fn test_program_tokens_must_be_canonical() {
        assert!(vocab(&[("mara", "maras")], &["mara"]).is_err());
        let v = vocab(&[("mara", "maras")], &["maras", "decolagem"]).unwrap();
        assert!(v.is_program_token("maras"));
        assert!(v.is_program_token("decolagem"));
        assert!(!v.is_program_token("familia"));
    }
}
