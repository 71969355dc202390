//! Configuration management

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::core::errors::{Result, ServiceError};
use crate::core::models::LanguagePair;

/// Environment variable prefix, e.g. `LANGBRIDGE_PORT`
pub const ENV_PREFIX: &str = "LANGBRIDGE";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MAX_OUTPUT_TOKENS: usize = 100;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30000;

/// Built-in language pairs (source, target, model)
const DEFAULT_PAIRS: &[(&str, &str, &str)] = &[
    ("en", "fr", "Helsinki-NLP/opus-mt-en-fr"),
    ("fr", "en", "Helsinki-NLP/opus-mt-fr-en"),
    ("en", "ar", "Helsinki-NLP/opus-mt-en-ar"),
    ("ar", "en", "Helsinki-NLP/opus-mt-ar-en"),
    ("en", "de", "Helsinki-NLP/opus-mt-en-de"),
    ("de", "en", "Helsinki-NLP/opus-mt-de-en"),
    ("en", "es", "Helsinki-NLP/opus-mt-en-es"),
    ("es", "en", "Helsinki-NLP/opus-mt-es-en"),
    ("en", "it", "Helsinki-NLP/opus-mt-en-it"),
    ("it", "en", "Helsinki-NLP/opus-mt-it-en"),
    ("en", "ru", "Helsinki-NLP/opus-mt-en-ru"),
    ("ru", "en", "Helsinki-NLP/opus-mt-ru-en"),
];

/// Converted Marian tokenizers published alongside candle's Marian support
const CANDLE_MARIAN_REPO: &str = "lmz/candle-marian";

/// Default pairs that load from the hub without `model_dir`:
/// (source, target, safetensors revision, source tokenizer, target tokenizer)
const HUB_READY_PAIRS: &[(&str, &str, &str, &str, &str)] = &[(
    "fr",
    "en",
    "refs/pr/4",
    "tokenizer-marian-base-fr.json",
    "tokenizer-marian-base-en.json",
)];

/// One registry row as written in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairSpec {
    /// Source language code
    pub source: String,
    /// Target language code
    pub target: String,
    /// Hub repository or local directory name of the checkpoint
    pub model_id: String,
    /// Hub revision (branch, tag or commit); defaults to `main`
    #[serde(default)]
    pub revision: Option<String>,
    /// Hub repository publishing converted tokenizers; without one the pair needs `model_dir`
    #[serde(default)]
    pub tokenizer_repo: Option<String>,
    /// Encoder-side tokenizer file name
    #[serde(default = "default_source_tokenizer")]
    pub source_tokenizer: String,
    /// Decoder-side tokenizer file name
    #[serde(default = "default_target_tokenizer")]
    pub target_tokenizer: String,
}

fn default_source_tokenizer() -> String {
    "tokenizer-source.json".to_string()
}

fn default_target_tokenizer() -> String {
    "tokenizer-target.json".to_string()
}

impl PairSpec {
    /// Registry key for this row
    pub fn pair(&self) -> LanguagePair {
        LanguagePair::new(self.source.as_str(), self.target.as_str())
    }
}

/// Inference device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Host CPU
    #[default]
    Cpu,
    /// First CUDA device; needs the `cuda` feature
    Cuda,
}

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Bind address
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Cap on generated tokens per translation
    pub max_output_tokens: usize,
    /// Per-request budget for the generation call
    pub request_timeout_ms: u64,
    /// Read models from `<model_dir>/<model-name>/` instead of the hub
    #[serde(default)]
    pub model_dir: Option<PathBuf>,
    /// Inference device
    #[serde(default)]
    pub device: DeviceKind,
    /// Registry rows; empty means the built-in table
    #[serde(default)]
    pub pairs: Vec<PairSpec>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            model_dir: None,
            device: DeviceKind::Cpu,
            pairs: default_pairs(),
        }
    }
}

impl ServiceConfig {
    /// Load configuration: defaults, then an optional file, then `LANGBRIDGE_*` variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", DEFAULT_PORT as i64)?
            .set_default("max_output_tokens", DEFAULT_MAX_OUTPUT_TOKENS as i64)?
            .set_default("request_timeout_ms", DEFAULT_REQUEST_TIMEOUT_MS as i64)?;

        if let Some(path) = path {
            info!("Loading configuration from {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let mut config: Self = settings.try_deserialize()?;
        config.apply_default_pairs();
        config.validate()?;
        Ok(config)
    }

    /// Fill in the built-in pair table when none is configured
    pub fn apply_default_pairs(&mut self) {
        if self.pairs.is_empty() {
            self.pairs = default_pairs();
            info!("Loaded {} default language pairs", self.pairs.len());
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_output_tokens == 0 {
            return Err(config_error("max_output_tokens must be greater than 0"));
        }

        if self.request_timeout_ms == 0 {
            return Err(config_error("request_timeout_ms must be greater than 0"));
        }

        if self.pairs.is_empty() {
            warn!("No language pairs configured");
        }

        let code = Regex::new(r"^[a-z]{2,3}$").map_err(|e| config_error(e.to_string()))?;
        let mut seen = HashSet::new();
        for spec in &self.pairs {
            for lang in [&spec.source, &spec.target] {
                if !code.is_match(lang) {
                    return Err(config_error(format!("invalid language code: {:?}", lang)));
                }
            }

            if spec.model_id.trim().is_empty() {
                return Err(config_error(format!("model_id is required for {}", spec.pair())));
            }

            if !seen.insert(spec.pair()) {
                return Err(config_error(format!("duplicate language pair: {}", spec.pair())));
            }
        }

        Ok(())
    }

    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.request_timeout_ms)
    }
}

/// The built-in Helsinki-NLP opus-mt table
pub fn default_pairs() -> Vec<PairSpec> {
    DEFAULT_PAIRS
        .iter()
        .map(|&(source, target, model_id)| {
            let mut spec = PairSpec {
                source: source.to_string(),
                target: target.to_string(),
                model_id: model_id.to_string(),
                revision: None,
                tokenizer_repo: None,
                source_tokenizer: default_source_tokenizer(),
                target_tokenizer: default_target_tokenizer(),
            };
            if let Some(&(_, _, revision, source_tokenizer, target_tokenizer)) = HUB_READY_PAIRS
                .iter()
                .find(|(s, t, ..)| *s == source && *t == target)
            {
                spec.revision = Some(revision.to_string());
                spec.tokenizer_repo = Some(CANDLE_MARIAN_REPO.to_string());
                spec.source_tokenizer = source_tokenizer.to_string();
                spec.target_tokenizer = target_tokenizer.to_string();
            }
            spec
        })
        .collect()
}

fn config_error(message: impl Into<String>) -> ServiceError {
    ServiceError::ConfigError {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::io::Write;

    // `load` reads process-wide environment variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn pair_spec(source: &str, target: &str) -> PairSpec {
        PairSpec {
            source: source.to_string(),
            target: target.to_string(),
            model_id: format!("Helsinki-NLP/opus-mt-{}-{}", source, target),
            revision: None,
            tokenizer_repo: None,
            source_tokenizer: default_source_tokenizer(),
            target_tokenizer: default_target_tokenizer(),
        }
    }

    #[test]
    fn test_config_validation() {
        let mut config = ServiceConfig::default();
        config.apply_default_pairs();
        assert_eq!(config.pairs.len(), 12);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_tokens() {
        let config = ServiceConfig {
            max_output_tokens: 0,
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_code() {
        let config = ServiceConfig {
            pairs: vec![pair_spec("EN", "fr")],
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("invalid language code"));
    }

    #[test]
    fn test_config_validation_duplicate_pair() {
        let config = ServiceConfig {
            pairs: vec![pair_spec("en", "fr"), pair_spec("en", "fr")],
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate language pair: en-fr"));
    }

    #[test]
    fn test_load_from_yaml_file() {
        let _env = ENV_LOCK.lock();
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "port: 9100\nmax_output_tokens: 256\npairs:\n  - source: en\n    target: uk\n    model_id: Helsinki-NLP/opus-mt-en-uk\n    revision: refs/pr/1"
        )
        .unwrap();

        let config = ServiceConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.max_output_tokens, 256);
        assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert_eq!(config.pairs.len(), 1);
        assert_eq!(config.pairs[0].pair(), LanguagePair::new("en", "uk"));
        assert_eq!(config.pairs[0].revision.as_deref(), Some("refs/pr/1"));
        assert_eq!(config.pairs[0].source_tokenizer, "tokenizer-source.json");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let _env = ENV_LOCK.lock();
        let dir = tempfile::tempdir().unwrap();
        let result = ServiceConfig::load(Some(&dir.path().join("absent.json")));
        assert!(matches!(result, Err(ServiceError::ConfigError { .. })));
    }

    #[test]
    fn test_environment_overrides_file() {
        let _env = ENV_LOCK.lock();
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "port: 9100\nmax_output_tokens: 256").unwrap();

        std::env::set_var("LANGBRIDGE_PORT", "9200");
        std::env::set_var("LANGBRIDGE_MAX_OUTPUT_TOKENS", "42");
        let result = ServiceConfig::load(Some(file.path()));
        std::env::remove_var("LANGBRIDGE_PORT");
        std::env::remove_var("LANGBRIDGE_MAX_OUTPUT_TOKENS");

        let config = result.unwrap();
        assert_eq!(config.port, 9200);
        assert_eq!(config.max_output_tokens, 42);
        assert_eq!(config.pairs.len(), 12);
    }

    #[test]
    fn test_default_pairs_hub_metadata() {
        let pairs = default_pairs();
        let fr_en = pairs.iter().find(|p| p.pair() == LanguagePair::new("fr", "en")).unwrap();
        assert_eq!(fr_en.revision.as_deref(), Some("refs/pr/4"));
        assert_eq!(fr_en.tokenizer_repo.as_deref(), Some("lmz/candle-marian"));
        assert_eq!(fr_en.source_tokenizer, "tokenizer-marian-base-fr.json");
        assert_eq!(fr_en.target_tokenizer, "tokenizer-marian-base-en.json");

        let hub_ready = pairs.iter().filter(|p| p.tokenizer_repo.is_some()).count();
        assert_eq!(hub_ready, 1);
    }
}
