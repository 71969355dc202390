//! langbridge - translation and transliteration dispatcher
//!
//! This library routes text either to a per-language-pair MarianMT model or
//! to table-driven script transliteration, and exposes both over an HTTP API.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod core;
pub mod server;
pub mod transliteration;

// Re-export key types for convenience
pub use core::{
    config::ServiceConfig,
    engine::{EngineLoader, MarianLoader, Seq2SeqEngine},
    errors::{InferenceError, ServiceError},
    models::{DispatchResult, LanguagePair, Mode, TranslationRequest, TransliterationRequest},
    pool::ModelPool,
    registry::LanguagePairRegistry,
    translator::TranslationDispatcher,
};

pub use transliteration::{Direction, ScriptMapper, TransliterationDispatcher};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
