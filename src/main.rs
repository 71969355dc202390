//! Main entry point for the langbridge CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use langbridge::cli::commands::{self, Commands};

/// langbridge - translation and transliteration dispatcher
#[derive(Parser, Debug)]
#[command(name = "langbridge", version, about, long_about = None)]
struct Args {
    /// Configuration file (JSON, YAML or TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}={},tower_http=info", env!("CARGO_CRATE_NAME"), log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = args.config.as_deref();

    // Execute command
    match args.command {
        Some(Commands::Serve { overrides }) => {
            commands::handle_serve(config, overrides).await?;
        }
        Some(Commands::Translate {
            from,
            to,
            max_output_tokens,
            text,
        }) => {
            commands::handle_translate(config, from, to, max_output_tokens, text).await?;
        }
        Some(Commands::Transliterate {
            lang,
            to_script,
            text,
        }) => {
            commands::handle_transliterate(lang, to_script, text)?;
        }
        Some(Commands::Languages) => {
            commands::handle_languages(config)?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
