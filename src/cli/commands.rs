//! CLI command definitions and handlers

use clap::{Args, Subcommand};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::core::config::ServiceConfig;
use crate::core::engine::MarianLoader;
use crate::core::models::{LanguagePair, TranslationRequest, TransliterationRequest};
use crate::core::pool::ModelPool;
use crate::core::registry::LanguagePairRegistry;
use crate::core::translator::TranslationDispatcher;
use crate::transliteration::{Direction, ScriptMapper, TableTransliterator, TransliterationDispatcher};

/// Commands for langbridge
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP API server
    Serve {
        /// Values taking precedence over file and environment
        #[command(flatten)]
        overrides: ServeOverrides,
    },

    /// Translate text with a single registered model
    Translate {
        /// Source language code
        #[arg(short, long)]
        from: String,

        /// Target language code
        #[arg(short, long)]
        to: String,

        /// Cap on generated tokens
        #[arg(long)]
        max_output_tokens: Option<usize>,

        /// Text to translate
        text: String,
    },

    /// Transliterate text between a native script and Latin
    Transliterate {
        /// Language code of the script (ru, el, hy, ...)
        #[arg(short, long)]
        lang: String,

        /// Convert Latin into the native script instead
        #[arg(long)]
        to_script: bool,

        /// Text to convert
        text: String,
    },

    /// List translation pairs and transliteration languages
    Languages,
}

/// Server flags layered over the loaded configuration
#[derive(Args, Debug, Clone, Default)]
pub struct ServeOverrides {
    /// Bind address (default: 0.0.0.0)
    #[arg(long)]
    pub host: Option<String>,

    /// Listen port (default: 8000)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Cap on generated tokens per translation (default: 100)
    #[arg(long)]
    pub max_output_tokens: Option<usize>,

    /// Per-request generation timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Load models from this directory instead of the Hugging Face hub
    #[arg(long)]
    pub model_dir: Option<PathBuf>,
}

impl ServeOverrides {
    /// Replace every configured value that was given on the command line
    pub fn apply(self, config: &mut ServiceConfig) {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(max_output_tokens) = self.max_output_tokens {
            config.max_output_tokens = max_output_tokens;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.request_timeout_ms = timeout_ms;
        }
        if self.model_dir.is_some() {
            config.model_dir = self.model_dir;
        }
    }
}

/// Handle server command
pub async fn handle_serve(
    config_path: Option<&Path>,
    overrides: ServeOverrides,
) -> anyhow::Result<()> {
    use crate::server::api::run_server;

    let mut config = ServiceConfig::load(config_path)?;
    overrides.apply(&mut config);
    config.validate()?;

    info!("Starting HTTP server on {}:{}", config.host, config.port);
    println!("🚀 Server starting on http://{}:{}", config.host, config.port);
    println!(
        "📄 OpenAPI document: http://{}:{}/api-docs/openapi.json",
        config.host, config.port
    );

    run_server(config).await?;

    Ok(())
}

/// Handle one-shot translation command
pub async fn handle_translate(
    config_path: Option<&Path>,
    from: String,
    to: String,
    max_output_tokens: Option<usize>,
    text: String,
) -> anyhow::Result<()> {
    let start_time = Instant::now();

    let mut config = ServiceConfig::load(config_path)?;
    if let Some(max_output_tokens) = max_output_tokens {
        config.max_output_tokens = max_output_tokens;
        config.validate()?;
    }

    let registry = LanguagePairRegistry::from_config(&config)?;
    let pair = LanguagePair::new(from.as_str(), to.as_str());

    // Only the requested model is materialized; an unregistered pair loads nothing.
    let pool = if registry.contains(&pair) {
        let loader = MarianLoader::from_config(&config)?;
        let pb = ProgressBar::new_spinner();
        tokio::task::block_in_place(|| {
            ModelPool::load_pairs(&registry, &loader, std::slice::from_ref(&pair), &pb)
        })?
    } else {
        ModelPool::default()
    };

    let dispatcher = TranslationDispatcher::new(
        Arc::new(registry),
        Arc::new(pool),
        config.max_output_tokens,
        config.request_timeout(),
    );

    let result = dispatcher
        .translate(&TranslationRequest::new(text, from, to))
        .await?;
    println!("{}", result.into_message());

    info!("Completed in {:?}", start_time.elapsed());

    Ok(())
}

/// Handle transliteration command
pub fn handle_transliterate(lang: String, to_script: bool, text: String) -> anyhow::Result<()> {
    let direction = if to_script {
        Direction::ToScript
    } else {
        Direction::Reversed
    };
    info!("Transliterating {} ({})", lang, direction);

    let dispatcher = TransliterationDispatcher::default();
    let result = dispatcher.convert(&TransliterationRequest::new(text, lang), direction);
    println!("{}", result.into_message());

    Ok(())
}

/// Handle languages command
pub fn handle_languages(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = ServiceConfig::load(config_path)?;
    let registry = LanguagePairRegistry::from_config(&config)?;

    println!("Translation pairs ({}):", registry.len());
    for (pair, spec) in registry.iter() {
        println!("   {:<8} {}", pair.to_string(), spec.model_id);
    }

    let transliterator = TableTransliterator::new();
    let languages = transliterator.supported_languages();
    println!("\nTransliteration languages ({}):", languages.len());
    for code in languages {
        println!(
            "   {:<8} {}",
            code,
            transliterator.language_name(code).unwrap_or_default()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        command: Commands,
    }

    #[test]
    fn test_serve_flags_override_config() {
        let cli = TestCli::try_parse_from([
            "langbridge",
            "serve",
            "--port",
            "9300",
            "--max-output-tokens",
            "64",
            "--model-dir",
            "/srv/models",
        ])
        .unwrap();
        let Commands::Serve { overrides } = cli.command else {
            panic!("expected serve command");
        };

        let mut config = ServiceConfig {
            port: 9200,
            max_output_tokens: 42,
            ..ServiceConfig::default()
        };
        overrides.apply(&mut config);

        assert_eq!(config.port, 9300);
        assert_eq!(config.max_output_tokens, 64);
        assert_eq!(config.model_dir, Some(PathBuf::from("/srv/models")));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.request_timeout_ms, 30000);
    }

    #[test]
    fn test_absent_flags_keep_config() {
        let mut config = ServiceConfig {
            port: 9200,
            model_dir: Some(PathBuf::from("/data")),
            ..ServiceConfig::default()
        };
        ServeOverrides::default().apply(&mut config);

        assert_eq!(config.port, 9200);
        assert_eq!(config.model_dir, Some(PathBuf::from("/data")));
    }
}
