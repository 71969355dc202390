//! Translation dispatcher: pair lookup, bounded generation, timeout

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::core::errors::InferenceError;
use crate::core::models::{DispatchResult, LanguagePair, TranslationRequest, UnavailableReason};
use crate::core::pool::ModelPool;
use crate::core::registry::LanguagePairRegistry;

/// Routes translation requests to the pool entry for their pair
#[derive(Debug, Clone)]
pub struct TranslationDispatcher {
    registry: Arc<LanguagePairRegistry>,
    pool: Arc<ModelPool>,
    max_output_tokens: usize,
    timeout: Duration,
}

impl TranslationDispatcher {
    /// Dispatcher over a loaded pool with a per-request token cap and timeout
    pub fn new(
        registry: Arc<LanguagePairRegistry>,
        pool: Arc<ModelPool>,
        max_output_tokens: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            pool,
            max_output_tokens,
            timeout,
        }
    }

    /// Registry the pool was built from
    pub fn registry(&self) -> &LanguagePairRegistry {
        &self.registry
    }

    /// Loaded engines
    pub fn pool(&self) -> &ModelPool {
        &self.pool
    }

    /// Translate one request.
    ///
    /// Unknown pairs resolve to `DispatchResult::Unavailable`; only engine
    /// failures and timeouts are returned as errors.
    ///
    /// The engine gets the same deadline as the timeout. A generation the
    /// caller stopped waiting for aborts at its next step, and a request
    /// queued behind it on the same model gives up once its own deadline
    /// passes.
    pub async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<DispatchResult, InferenceError> {
        let pair = request.pair();

        let Some(entry) = self.pool.get(&pair) else {
            let reason = self.unavailable_reason(pair);
            debug!("{}", reason);
            return Ok(DispatchResult::Unavailable(reason));
        };

        if request.text.trim().is_empty() {
            return Ok(DispatchResult::Ok(String::new()));
        }

        let text = request.text.clone();
        let max_len = self.max_output_tokens;
        let deadline = Instant::now() + self.timeout;
        let worker = tokio::task::spawn_blocking(move || {
            entry.engine.translate(&text, max_len, Some(deadline))
        });

        match tokio::time::timeout(self.timeout, worker).await {
            Ok(Ok(Ok(translation))) => Ok(DispatchResult::Ok(translation)),
            Ok(Ok(Err(source))) => {
                warn!("Translation failed for {}: {}", pair, source);
                Err(InferenceError::Engine { pair, source })
            }
            Ok(Err(join_err)) => Err(InferenceError::Worker {
                message: join_err.to_string(),
            }),
            Err(_) => {
                warn!("Translation for {} exceeded {:?}", pair, self.timeout);
                Err(InferenceError::Timeout {
                    pair,
                    after_ms: self.timeout.as_millis() as u64,
                })
            }
        }
    }

    fn unavailable_reason(&self, pair: LanguagePair) -> UnavailableReason {
        if self.registry.contains(&pair) {
            UnavailableReason::NotLoaded(pair)
        } else {
            UnavailableReason::NotRegistered(pair)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::default_pairs;
    use crate::core::engine::test_support::{EchoEngine, EchoLoader};
    use crate::core::errors::EngineError;
    use indicatif::ProgressBar;

    fn dispatcher(max_output_tokens: usize) -> TranslationDispatcher {
        let registry = LanguagePairRegistry::from_specs(&default_pairs()).unwrap();
        let pool = ModelPool::load(&registry, &EchoLoader::default()).unwrap();
        TranslationDispatcher::new(
            Arc::new(registry),
            Arc::new(pool),
            max_output_tokens,
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_registered_pairs_translate() {
        let dispatcher = dispatcher(100);
        let pairs: Vec<LanguagePair> =
            dispatcher.registry().iter().map(|(p, _)| p.clone()).collect();

        for pair in pairs {
            let request = TranslationRequest::new("Hello", &pair.source, &pair.target);
            let result = dispatcher.translate(&request).await.unwrap();
            assert_eq!(result, DispatchResult::Ok(format!("[{}] Hello", pair.target)));
        }
    }

    #[test]
    fn test_unregistered_pair_is_unavailable() {
        let dispatcher = dispatcher(100);
        let request = TranslationRequest::new("Bonjour", "fr", "zz");

        let result = tokio_test::block_on(dispatcher.translate(&request)).unwrap();
        assert_eq!(
            result.into_message(),
            "Translation model for fr-zz not available."
        );
    }

    #[tokio::test]
    async fn test_registered_but_not_loaded_pair() {
        let registry = LanguagePairRegistry::from_specs(&default_pairs()).unwrap();
        let subset = vec![LanguagePair::new("en", "fr")];
        let pool =
            ModelPool::load_pairs(&registry, &EchoLoader::default(), &subset, &ProgressBar::hidden())
                .unwrap();
        let dispatcher = TranslationDispatcher::new(
            Arc::new(registry),
            Arc::new(pool),
            100,
            Duration::from_secs(5),
        );

        let result = dispatcher
            .translate(&TranslationRequest::new("Hallo", "de", "en"))
            .await
            .unwrap();
        assert_eq!(
            result,
            DispatchResult::Unavailable(UnavailableReason::NotLoaded(LanguagePair::new("de", "en")))
        );
    }

    #[tokio::test]
    async fn test_output_is_capped_and_deterministic() {
        let dispatcher = dispatcher(4);
        let request = TranslationRequest::new("Hello world", "en", "fr");

        let first = dispatcher.translate(&request).await.unwrap();
        let second = dispatcher.translate(&request).await.unwrap();
        assert_eq!(first, DispatchResult::Ok("[fr] Hell".to_string()));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_blank_text_skips_engine() {
        let engine = Arc::new(EchoEngine::new("fr"));
        let dispatcher = single_entry_dispatcher(engine.clone(), Duration::from_secs(5));

        let result = dispatcher
            .translate(&TranslationRequest::new("   ", "en", "fr"))
            .await
            .unwrap();
        assert_eq!(result, DispatchResult::Ok(String::new()));
        assert_eq!(engine.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_engine_failure_is_inference_error() {
        let dispatcher = dispatcher(100);
        let err = dispatcher
            .translate(&TranslationRequest::new("bad\u{0}input", "en", "fr"))
            .await
            .unwrap_err();

        match err {
            InferenceError::Engine { pair, source } => {
                assert_eq!(pair.to_string(), "en-fr");
                assert!(matches!(source, EngineError::Tokenize(_)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_slow_generation_times_out() {
        let mut engine = EchoEngine::new("fr");
        engine.delay = Some(Duration::from_millis(500));
        let dispatcher = single_entry_dispatcher(Arc::new(engine), Duration::from_millis(20));

        let err = dispatcher
            .translate(&TranslationRequest::new("Hello", "en", "fr"))
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::Timeout { after_ms: 20, .. }));
    }

    fn single_entry_dispatcher(
        engine: Arc<EchoEngine>,
        timeout: Duration,
    ) -> TranslationDispatcher {
        struct Fixed(Arc<EchoEngine>);

        impl crate::core::engine::EngineLoader for Fixed {
            fn load(
                &self,
                _pair: &LanguagePair,
                _spec: &crate::core::registry::ModelSpec,
            ) -> Result<Arc<dyn crate::core::engine::Seq2SeqEngine>, crate::core::errors::LoadError>
            {
                let engine: Arc<dyn crate::core::engine::Seq2SeqEngine> = self.0.clone();
                Ok(engine)
            }
        }

        let registry = LanguagePairRegistry::from_specs(&default_pairs()).unwrap();
        let subset = vec![LanguagePair::new("en", "fr")];
        let pool =
            ModelPool::load_pairs(&registry, &Fixed(engine), &subset, &ProgressBar::hidden())
                .unwrap();
        TranslationDispatcher::new(Arc::new(registry), Arc::new(pool), 100, timeout)
    }
}
