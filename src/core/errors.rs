//! Custom error types for dispatch operations

use thiserror::Error;

use crate::core::models::LanguagePair;

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// What was wrong
        message: String,
    },

    /// A registered model could not be materialized at startup
    #[error("Failed to load model {model_id} for {pair}: {source}")]
    StartupLoadError {
        /// Registry key being loaded
        pair: LanguagePair,
        /// Model that failed
        model_id: String,
        /// Underlying load failure
        #[source]
        source: LoadError,
    },

    /// Inference failed while serving a request
    #[error(transparent)]
    Inference(#[from] InferenceError),

    /// Wrapper for anyhow errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        ServiceError::InternalError(err.to_string())
    }
}

impl From<config::ConfigError> for ServiceError {
    fn from(err: config::ConfigError) -> Self {
        ServiceError::ConfigError {
            message: err.to_string(),
        }
    }
}

/// Errors raised while fetching or building a translation engine
#[derive(Error, Debug)]
pub enum LoadError {
    /// Hugging Face hub download failed
    #[error("Hub download failed for {file}: {message}")]
    Hub {
        /// File or repository being fetched
        file: String,
        /// Hub client error text
        message: String,
    },

    /// No converted tokenizer is published for this checkpoint
    #[error(
        "No hub-hosted tokenizer for {model_id}; set model_dir (--model-dir or LANGBRIDGE_MODEL_DIR) \
         to a directory holding the converted checkpoint"
    )]
    NoHubTokenizer {
        /// Model that needs a local copy
        model_id: String,
    },

    /// Model file missing from the local model directory
    #[error("Missing model file: {0}")]
    MissingFile(String),

    /// Tokenizer could not be parsed
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Model config could not be parsed
    #[error("Model config error: {0}")]
    Config(#[from] serde_json::Error),

    /// Weights or device failure
    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a loaded engine while processing one input
#[derive(Error, Debug)]
pub enum EngineError {
    /// Input could not be tokenized
    #[error("Tokenization failed: {0}")]
    Tokenize(String),

    /// Generation step failed
    #[error("Generation failed: {0}")]
    Generate(#[from] candle_core::Error),

    /// Output ids could not be decoded
    #[error("Decoding failed: {0}")]
    Decode(String),

    /// The caller stopped waiting before generation finished
    #[error("Generation deadline passed")]
    DeadlineExceeded,
}

/// Per-request inference failures, distinct from soft "not available" results
#[derive(Error, Debug)]
pub enum InferenceError {
    /// The engine rejected the input or failed mid-generation
    #[error("Inference failed for {pair}: {source}")]
    Engine {
        /// Pair being translated
        pair: LanguagePair,
        /// Engine failure
        #[source]
        source: EngineError,
    },

    /// Generation exceeded the request timeout
    #[error("Inference for {pair} timed out after {after_ms} ms")]
    Timeout {
        /// Pair being translated
        pair: LanguagePair,
        /// Budget that ran out
        after_ms: u64,
    },

    /// The blocking worker running the engine died
    #[error("Inference worker failed: {message}")]
    Worker {
        /// Join error text
        message: String,
    },
}

/// Result type for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;
