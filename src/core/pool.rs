//! Eagerly loaded translation engines, one per registered pair

use indicatif::ProgressBar;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::core::engine::{EngineLoader, Seq2SeqEngine};
use crate::core::errors::{Result, ServiceError};
use crate::core::models::LanguagePair;
use crate::core::registry::LanguagePairRegistry;

/// A loaded engine and the registry row it came from
pub struct ModelEntry {
    /// Pool key
    pub pair: LanguagePair,
    /// Checkpoint behind the engine
    pub model_id: String,
    /// Loaded engine
    pub engine: Arc<dyn Seq2SeqEngine>,
}

impl std::fmt::Debug for ModelEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelEntry")
            .field("pair", &self.pair)
            .field("model_id", &self.model_id)
            .finish_non_exhaustive()
    }
}

/// Fixed pool; entries live until shutdown
#[derive(Debug, Default)]
pub struct ModelPool {
    entries: HashMap<LanguagePair, Arc<ModelEntry>>,
}

impl ModelPool {
    /// Load every registry entry; the first failure aborts startup
    pub fn load(registry: &LanguagePairRegistry, loader: &dyn EngineLoader) -> Result<Self> {
        Self::load_with_progress(registry, loader, &ProgressBar::hidden())
    }

    /// [`load`](Self::load) reporting each model on `progress`
    pub fn load_with_progress(
        registry: &LanguagePairRegistry,
        loader: &dyn EngineLoader,
        progress: &ProgressBar,
    ) -> Result<Self> {
        let pairs: Vec<LanguagePair> = registry.iter().map(|(pair, _)| pair.clone()).collect();
        Self::load_pairs(registry, loader, &pairs, progress)
    }

    /// Load only `pairs`, each of which must be registered
    pub fn load_pairs(
        registry: &LanguagePairRegistry,
        loader: &dyn EngineLoader,
        pairs: &[LanguagePair],
        progress: &ProgressBar,
    ) -> Result<Self> {
        let start_time = Instant::now();
        progress.set_length(pairs.len() as u64);

        let mut entries = HashMap::with_capacity(pairs.len());
        for pair in pairs {
            let spec = registry.get(pair).ok_or_else(|| ServiceError::ConfigError {
                message: format!("language pair {} is not registered", pair),
            })?;

            progress.set_message(format!("{} ({})", pair, spec.model_id));
            let engine = loader
                .load(pair, spec)
                .map_err(|source| ServiceError::StartupLoadError {
                    pair: pair.clone(),
                    model_id: spec.model_id.clone(),
                    source,
                })?;

            entries.insert(
                pair.clone(),
                Arc::new(ModelEntry {
                    pair: pair.clone(),
                    model_id: spec.model_id.clone(),
                    engine,
                }),
            );
            progress.inc(1);
        }

        progress.finish_with_message("models loaded");
        info!(
            "Loaded {} translation models in {:?}",
            entries.len(),
            start_time.elapsed()
        );

        Ok(Self { entries })
    }

    /// Shared handle to the entry for a pair
    pub fn get(&self, pair: &LanguagePair) -> Option<Arc<ModelEntry>> {
        self.entries.get(pair).cloned()
    }

    /// Whether an engine is loaded for the pair
    pub fn contains(&self, pair: &LanguagePair) -> bool {
        self.entries.contains_key(pair)
    }

    /// Number of loaded engines
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is loaded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::default_pairs;
    use crate::core::engine::test_support::EchoLoader;
    use std::sync::atomic::Ordering;

    fn registry() -> LanguagePairRegistry {
        LanguagePairRegistry::from_specs(&default_pairs()).unwrap()
    }

    #[test]
    fn test_pool_loads_every_registered_pair() {
        let registry = registry();
        let loader = EchoLoader::default();
        let pool = ModelPool::load(&registry, &loader).unwrap();

        assert_eq!(pool.len(), registry.len());
        assert_eq!(loader.loaded.load(Ordering::SeqCst), 12);
        for (pair, spec) in registry.iter() {
            let entry = pool.get(pair).unwrap();
            assert_eq!(&entry.pair, pair);
            assert_eq!(entry.model_id, spec.model_id);
        }
        assert!(pool.get(&LanguagePair::new("fr", "zz")).is_none());
    }

    #[test]
    fn test_pool_fails_fast_on_load_error() {
        let registry = registry();
        let mut loader = EchoLoader::default();
        loader.failing.insert(LanguagePair::new("en", "de"));

        let err = ModelPool::load(&registry, &loader).unwrap_err();
        match err {
            ServiceError::StartupLoadError { pair, model_id, .. } => {
                assert_eq!(pair, LanguagePair::new("en", "de"));
                assert_eq!(model_id, "Helsinki-NLP/opus-mt-en-de");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_pool_subset_rejects_unregistered_pair() {
        let registry = registry();
        let loader = EchoLoader::default();

        let subset = vec![LanguagePair::new("en", "fr")];
        let pool = ModelPool::load_pairs(&registry, &loader, &subset, &ProgressBar::hidden()).unwrap();
        assert_eq!(pool.len(), 1);
        assert!(pool.contains(&LanguagePair::new("en", "fr")));
        assert!(!pool.contains(&LanguagePair::new("fr", "en")));

        let unknown = vec![LanguagePair::new("fr", "zz")];
        let result = ModelPool::load_pairs(&registry, &loader, &unknown, &ProgressBar::hidden());
        assert!(matches!(result, Err(ServiceError::ConfigError { .. })));
    }
}
