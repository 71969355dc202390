//! Sequence-to-sequence engines and their loaders
//!
//! The pool only sees the [`Seq2SeqEngine`] and [`EngineLoader`] traits. The
//! production implementation runs MarianMT checkpoints (the Helsinki-NLP
//! opus-mt family) on candle with greedy decoding.
//!
//! candle needs Marian tokenizers converted to the `tokenizers` JSON format.
//! The Helsinki-NLP repositories only ship sentencepiece models, so a pair
//! can be fetched from the hub only when its spec names a `tokenizer_repo`
//! that hosts converted files. Everything else loads from `model_dir`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use candle_core::{DType, Device, Tensor, D};
use candle_nn::VarBuilder;
use candle_transformers::models::marian;
use hf_hub::api::sync::{Api, ApiRepo};
use hf_hub::{Repo, RepoType};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use serde_json::{json, Value};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::core::config::{DeviceKind, ServiceConfig};
use crate::core::errors::{EngineError, LoadError};
use crate::core::models::LanguagePair;
use crate::core::registry::ModelSpec;

const CONFIG_FILE: &str = "config.json";
const WEIGHTS_FILE: &str = "model.safetensors";

/// Marian control tokens the tokenizer does not always flag as special
static CONTROL_TOKENS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</s>|<s>|<pad>|<unk>").expect("control token pattern is valid"));

/// A loaded tokenizer + generator for one language pair
pub trait Seq2SeqEngine: Send + Sync {
    /// Text to input token ids
    fn encode(&self, text: &str) -> Result<Vec<u32>, EngineError>;

    /// Generate at most `max_len` output ids for the input ids.
    ///
    /// Past `deadline` the engine gives up with
    /// [`EngineError::DeadlineExceeded`] instead of finishing work nobody
    /// is waiting for.
    fn generate(
        &self,
        tokens: &[u32],
        max_len: usize,
        deadline: Option<Instant>,
    ) -> Result<Vec<u32>, EngineError>;

    /// Output ids to text, without control tokens
    fn decode(&self, tokens: &[u32]) -> Result<String, EngineError>;

    /// Encode, generate and decode in one call
    fn translate(
        &self,
        text: &str,
        max_len: usize,
        deadline: Option<Instant>,
    ) -> Result<String, EngineError> {
        let input = self.encode(text)?;
        let output = self.generate(&input, max_len, deadline)?;
        self.decode(&output)
    }
}

/// Materializes an engine for a registry entry
pub trait EngineLoader: Send + Sync {
    /// Build the engine for `pair` from its registry row
    fn load(&self, pair: &LanguagePair, spec: &ModelSpec)
        -> Result<Arc<dyn Seq2SeqEngine>, LoadError>;
}

/// Remove control tokens and the sentencepiece word marker, collapse whitespace
pub fn clean_decoded(text: &str) -> String {
    let stripped = CONTROL_TOKENS.replace_all(text, " ");
    stripped
        .replace('\u{2581}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a Hugging Face Marian `config.json`.
///
/// Older opus-mt exports omit a few keys candle requires; they are filled
/// with the values every Marian checkpoint uses.
pub fn parse_marian_config(raw: &str) -> Result<marian::Config, LoadError> {
    let mut value: Value = serde_json::from_str(raw)?;
    if let Some(fields) = value.as_object_mut() {
        for key in [
            "use_cache",
            "is_encoder_decoder",
            "scale_embedding",
            "share_encoder_decoder_embeddings",
        ] {
            fields.entry(key).or_insert(json!(true));
        }
        if let Some(eos) = fields.get("eos_token_id").cloned() {
            fields.entry("forced_eos_token_id").or_insert(eos);
        }
    }
    Ok(serde_json::from_value(value)?)
}

/// Greedy decoder over one Marian model.
///
/// The decoder keeps a KV cache, so generation is serialized per model.
pub struct MarianGenerator {
    model: Mutex<marian::MTModel>,
    config: marian::Config,
    device: Device,
}

impl MarianGenerator {
    /// Wrap an already built model
    pub fn new(model: marian::MTModel, config: marian::Config, device: Device) -> Self {
        Self {
            model: Mutex::new(model),
            config,
            device,
        }
    }

    /// End-of-sequence token id
    pub fn eos_token_id(&self) -> u32 {
        self.config.eos_token_id
    }

    /// Argmax decoding until EOS, `max_len` tokens, or `deadline`
    pub fn generate(
        &self,
        tokens: &[u32],
        max_len: usize,
        deadline: Option<Instant>,
    ) -> Result<Vec<u32>, EngineError> {
        let mut model = match deadline {
            Some(deadline) => self
                .model
                .try_lock_until(deadline)
                .ok_or(EngineError::DeadlineExceeded)?,
            None => self.model.lock(),
        };
        model.reset_kv_cache();

        let input = Tensor::new(tokens, &self.device)?.unsqueeze(0)?;
        let encoder_xs = model.encoder().forward(&input, 0)?;

        let mut token_ids = vec![self.config.decoder_start_token_id];
        for index in 0..max_len {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(EngineError::DeadlineExceeded);
            }

            // After the first step the cache holds everything but the newest token.
            let context_size = if index >= 1 { 1 } else { token_ids.len() };
            let start_pos = token_ids.len().saturating_sub(context_size);
            let input_ids = Tensor::new(&token_ids[start_pos..], &self.device)?.unsqueeze(0)?;
            let logits = model.decode(&input_ids, &encoder_xs, start_pos)?;
            let logits = logits.squeeze(0)?;
            let logits = logits.get(logits.dim(0)? - 1)?;
            let token = logits.argmax(D::Minus1)?.to_scalar::<u32>()?;

            if token == self.config.eos_token_id || token == self.config.forced_eos_token_id {
                break;
            }
            token_ids.push(token);
        }

        debug!("Generated {} tokens", token_ids.len() - 1);
        Ok(token_ids.split_off(1))
    }
}

/// MarianMT model on candle
pub struct MarianEngine {
    generator: MarianGenerator,
    source_tokenizer: Tokenizer,
    target_tokenizer: Tokenizer,
}

/// Resolved on-disk locations of one Marian checkpoint
#[derive(Debug, Clone)]
pub struct MarianFiles {
    /// Model `config.json`
    pub config: PathBuf,
    /// `model.safetensors`
    pub weights: PathBuf,
    /// Encoder-side tokenizer JSON
    pub source_tokenizer: PathBuf,
    /// Decoder-side tokenizer JSON
    pub target_tokenizer: PathBuf,
}

impl MarianEngine {
    /// Assemble an engine from a generator and its two tokenizers
    pub fn new(
        generator: MarianGenerator,
        source_tokenizer: Tokenizer,
        target_tokenizer: Tokenizer,
    ) -> Self {
        Self {
            generator,
            source_tokenizer,
            target_tokenizer,
        }
    }

    /// Build from checkpoint files on disk
    pub fn load(files: &MarianFiles, device: &Device) -> Result<Self, LoadError> {
        let config = parse_marian_config(&std::fs::read_to_string(&files.config)?)?;

        let source_tokenizer = Tokenizer::from_file(&files.source_tokenizer)
            .map_err(|e| LoadError::Tokenizer(e.to_string()))?;
        let target_tokenizer = Tokenizer::from_file(&files.target_tokenizer)
            .map_err(|e| LoadError::Tokenizer(e.to_string()))?;

        let tensors = candle_core::safetensors::load(&files.weights, device)?;
        let vb = VarBuilder::from_tensors(tensors, DType::F32, device);
        let model = marian::MTModel::new(&config, vb)?;

        Ok(Self::new(
            MarianGenerator::new(model, config, device.clone()),
            source_tokenizer,
            target_tokenizer,
        ))
    }
}

impl Seq2SeqEngine for MarianEngine {
    fn encode(&self, text: &str) -> Result<Vec<u32>, EngineError> {
        let encoding = self
            .source_tokenizer
            .encode(text, true)
            .map_err(|e| EngineError::Tokenize(e.to_string()))?;
        let eos = self.generator.eos_token_id();
        let mut ids = encoding.get_ids().to_vec();
        if ids.last() != Some(&eos) {
            ids.push(eos);
        }
        Ok(ids)
    }

    fn generate(
        &self,
        tokens: &[u32],
        max_len: usize,
        deadline: Option<Instant>,
    ) -> Result<Vec<u32>, EngineError> {
        self.generator.generate(tokens, max_len, deadline)
    }

    fn decode(&self, tokens: &[u32]) -> Result<String, EngineError> {
        let text = self
            .target_tokenizer
            .decode(tokens, true)
            .map_err(|e| EngineError::Decode(e.to_string()))?;
        Ok(clean_decoded(&text))
    }
}

/// Hub coordinates for one checkpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubSources {
    /// Repository holding `config.json` and `model.safetensors`
    pub model_id: String,
    /// Revision of the model repository, `main` when unset
    pub revision: Option<String>,
    /// Repository holding the converted tokenizers
    pub tokenizer_repo: String,
    /// Encoder-side tokenizer file name
    pub source_tokenizer: String,
    /// Decoder-side tokenizer file name
    pub target_tokenizer: String,
}

impl HubSources {
    /// Hub plan for a registry row; fails when no converted tokenizer is published
    pub fn for_spec(spec: &ModelSpec) -> Result<Self, LoadError> {
        let tokenizer_repo = spec
            .tokenizer_repo
            .clone()
            .ok_or_else(|| LoadError::NoHubTokenizer {
                model_id: spec.model_id.clone(),
            })?;

        Ok(Self {
            model_id: spec.model_id.clone(),
            revision: spec.revision.clone(),
            tokenizer_repo,
            source_tokenizer: spec.source_tokenizer.clone(),
            target_tokenizer: spec.target_tokenizer.clone(),
        })
    }

    /// Model repository at the configured revision
    pub fn model_repo(&self) -> Repo {
        match &self.revision {
            Some(rev) => Repo::with_revision(self.model_id.clone(), RepoType::Model, rev.clone()),
            None => Repo::model(self.model_id.clone()),
        }
    }

    /// Tokenizer repository on its default branch
    pub fn tokenizer_repo(&self) -> Repo {
        Repo::model(self.tokenizer_repo.clone())
    }
}

/// Loads Marian checkpoints from the hub or a local model directory
pub struct MarianLoader {
    device: Device,
    model_dir: Option<PathBuf>,
}

impl MarianLoader {
    /// Loader for `device`, reading from `model_dir` when set
    pub fn new(device: Device, model_dir: Option<PathBuf>) -> Self {
        Self { device, model_dir }
    }

    /// Loader matching the configured device and model directory
    pub fn from_config(config: &ServiceConfig) -> Result<Self, LoadError> {
        let device = match config.device {
            DeviceKind::Cpu => Device::Cpu,
            DeviceKind::Cuda => Device::new_cuda(0)?,
        };
        Ok(Self::new(device, config.model_dir.clone()))
    }

    fn resolve(&self, spec: &ModelSpec) -> Result<MarianFiles, LoadError> {
        match &self.model_dir {
            Some(dir) => {
                let root = dir.join(spec.local_name());
                Ok(MarianFiles {
                    config: local_file(&root, CONFIG_FILE)?,
                    weights: local_file(&root, WEIGHTS_FILE)?,
                    source_tokenizer: local_file(&root, &spec.source_tokenizer)?,
                    target_tokenizer: local_file(&root, &spec.target_tokenizer)?,
                })
            }
            None => {
                let sources = HubSources::for_spec(spec)?;
                let api = Api::new().map_err(|e| LoadError::Hub {
                    file: spec.model_id.clone(),
                    message: e.to_string(),
                })?;
                let model_repo = api.repo(sources.model_repo());
                let tokenizer_repo = api.repo(sources.tokenizer_repo());

                Ok(MarianFiles {
                    config: fetch(&model_repo, CONFIG_FILE)?,
                    weights: fetch(&model_repo, WEIGHTS_FILE)?,
                    source_tokenizer: fetch(&tokenizer_repo, &sources.source_tokenizer)?,
                    target_tokenizer: fetch(&tokenizer_repo, &sources.target_tokenizer)?,
                })
            }
        }
    }
}

impl EngineLoader for MarianLoader {
    fn load(
        &self,
        pair: &LanguagePair,
        spec: &ModelSpec,
    ) -> Result<Arc<dyn Seq2SeqEngine>, LoadError> {
        info!(pair = %pair, model = %spec.model_id, "Loading translation model");
        let files = self.resolve(spec)?;
        let engine = MarianEngine::load(&files, &self.device)?;
        Ok(Arc::new(engine))
    }
}

fn fetch(repo: &ApiRepo, file: &str) -> Result<PathBuf, LoadError> {
    repo.get(file).map_err(|e| LoadError::Hub {
        file: file.to_string(),
        message: e.to_string(),
    })
}

fn local_file(root: &Path, name: &str) -> Result<PathBuf, LoadError> {
    let path = root.join(name);
    if path.is_file() {
        Ok(path)
    } else {
        Err(LoadError::MissingFile(path.display().to_string()))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Deterministic stand-ins for real checkpoints.

    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Echoes the input behind a `[target]` tag; one token per char
    pub struct EchoEngine {
        pub tag: String,
        pub delay: Option<Duration>,
        pub calls: AtomicUsize,
    }

    impl EchoEngine {
        pub fn new(tag: &str) -> Self {
            Self {
                tag: tag.to_string(),
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Seq2SeqEngine for EchoEngine {
        fn encode(&self, text: &str) -> Result<Vec<u32>, EngineError> {
            if text.contains('\u{0}') {
                return Err(EngineError::Tokenize("NUL in input".to_string()));
            }
            Ok(text.chars().map(u32::from).collect())
        }

        fn generate(
            &self,
            tokens: &[u32],
            max_len: usize,
            deadline: Option<Instant>,
        ) -> Result<Vec<u32>, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                return Err(EngineError::DeadlineExceeded);
            }
            Ok(tokens.iter().copied().take(max_len).collect())
        }

        fn decode(&self, tokens: &[u32]) -> Result<String, EngineError> {
            let text: String = tokens.iter().filter_map(|&t| char::from_u32(t)).collect();
            Ok(format!("[{}] {}", self.tag, text))
        }
    }

    /// Loads an [`EchoEngine`] per pair, failing for the listed pairs
    #[derive(Default)]
    pub struct EchoLoader {
        pub failing: HashSet<LanguagePair>,
        pub loaded: AtomicUsize,
    }

    impl EngineLoader for EchoLoader {
        fn load(
            &self,
            pair: &LanguagePair,
            spec: &ModelSpec,
        ) -> Result<Arc<dyn Seq2SeqEngine>, LoadError> {
            if self.failing.contains(pair) {
                return Err(LoadError::MissingFile(format!("{}/model.safetensors", spec.local_name())));
            }
            self.loaded.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(EchoEngine::new(&pair.target)))
        }
    }
}
