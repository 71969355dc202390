//! Static mapping from language pair to model identifier

use std::collections::BTreeMap;

use crate::core::config::{PairSpec, ServiceConfig};
use crate::core::errors::{Result, ServiceError};
use crate::core::models::LanguagePair;

/// Where to fetch the model for one pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    /// Hub repository, e.g. `Helsinki-NLP/opus-mt-en-fr`
    pub model_id: String,
    /// Hub revision of the weights
    pub revision: Option<String>,
    /// Repository publishing converted tokenizers
    pub tokenizer_repo: Option<String>,
    /// Encoder-side tokenizer file name
    pub source_tokenizer: String,
    /// Decoder-side tokenizer file name
    pub target_tokenizer: String,
}

impl ModelSpec {
    /// Last path segment of the model id, used as the local directory name
    pub fn local_name(&self) -> &str {
        self.model_id.rsplit('/').next().unwrap_or(&self.model_id)
    }
}

/// Immutable language-pair registry, built once and shared read-only
#[derive(Debug, Clone, Default)]
pub struct LanguagePairRegistry {
    entries: BTreeMap<LanguagePair, ModelSpec>,
}

impl LanguagePairRegistry {
    /// Build from pair rows; duplicates are rejected
    pub fn from_specs(specs: &[PairSpec]) -> Result<Self> {
        let mut entries = BTreeMap::new();
        for spec in specs {
            let model = ModelSpec {
                model_id: spec.model_id.clone(),
                revision: spec.revision.clone(),
                tokenizer_repo: spec.tokenizer_repo.clone(),
                source_tokenizer: spec.source_tokenizer.clone(),
                target_tokenizer: spec.target_tokenizer.clone(),
            };
            if entries.insert(spec.pair(), model).is_some() {
                return Err(ServiceError::ConfigError {
                    message: format!("duplicate language pair: {}", spec.pair()),
                });
            }
        }
        Ok(Self { entries })
    }

    /// Build from the configured pairs
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Self::from_specs(&config.pairs)
    }

    /// Model for (source, target), if registered
    pub fn lookup(&self, source: &str, target: &str) -> Option<&ModelSpec> {
        self.get(&LanguagePair::new(source, target))
    }

    /// Model for a pair, if registered
    pub fn get(&self, pair: &LanguagePair) -> Option<&ModelSpec> {
        self.entries.get(pair)
    }

    /// Whether the pair is registered
    pub fn contains(&self, pair: &LanguagePair) -> bool {
        self.entries.contains_key(pair)
    }

    /// Entries in (source, target) order
    pub fn iter(&self) -> impl Iterator<Item = (&LanguagePair, &ModelSpec)> {
        self.entries.iter()
    }

    /// Number of registered pairs
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no pair is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::default_pairs;

    #[test]
    fn test_default_registry_lookup() {
        let registry = LanguagePairRegistry::from_specs(&default_pairs()).unwrap();
        assert_eq!(registry.len(), 12);

        let spec = registry.lookup("en", "fr").unwrap();
        assert_eq!(spec.model_id, "Helsinki-NLP/opus-mt-en-fr");
        assert_eq!(spec.local_name(), "opus-mt-en-fr");

        assert!(registry.lookup("ru", "en").is_some());
        assert!(registry.lookup("fr", "zz").is_none());
        assert!(registry.lookup("fr", "de").is_none());
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let mut specs = default_pairs();
        specs.push(specs[0].clone());
        assert!(LanguagePairRegistry::from_specs(&specs).is_err());
    }

    #[test]
    fn test_registry_iterates_in_order() {
        let registry = LanguagePairRegistry::from_specs(&default_pairs()).unwrap();
        let pairs: Vec<String> = registry.iter().map(|(pair, _)| pair.to_string()).collect();
        assert_eq!(pairs.first().map(String::as_str), Some("ar-en"));
        assert_eq!(pairs.last().map(String::as_str), Some("ru-en"));
    }
}
