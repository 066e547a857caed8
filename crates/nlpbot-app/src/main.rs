//! NLPBot application binary - composition root.
//!
//! 1. Parse CLI flags and load configuration from TOML
//! 2. Install tracing (stderr, so stdout carries only the conversation)
//! 3. Build the feature router and a fresh session
//! 4. Run the line-editing loop on the terminal

mod cli;
mod repl;
mod transcript;

use std::io;
use std::path::PathBuf;

use clap::Parser;

use nlpbot_chat::{FeatureRouter, Session};
use nlpbot_core::NlpbotConfig;

use crate::cli::CliArgs;
use crate::repl::Repl;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. Loaded before tracing so the configured level applies.
    let config_file = args.resolve_config_path();
    let config_found = config_file.exists();
    let mut config = if config_found {
        NlpbotConfig::load(&config_file)?
    } else {
        NlpbotConfig::default()
    };
    args.apply_overrides(&mut config)?;

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    tracing::info!("Starting NLPBot v{}", env!("CARGO_PKG_VERSION"));
    if config_found {
        tracing::info!(path = %config_file.display(), "Configuration loaded");
    } else {
        tracing::info!(path = %config_file.display(), "No configuration file, using defaults");
    }

    // Router and session.
    let router = FeatureRouter::from_config(&config)?;
    if !router.extractor().is_available() {
        tracing::warn!(
            model = %config.entities.model,
            "Entity recognition unavailable; replies in that mode will explain how to enable it"
        );
    }
    let session = Session::new(config.general.default_mode);

    let name = Some(config.general.user_name.clone()).filter(|n| !n.is_empty());
    let mut repl = Repl::new(
        router,
        session,
        name,
        PathBuf::from(&config.general.transcript_dir),
    );

    repl.run_interactive()?;

    tracing::info!(turns = repl.session().len(), "NLPBot shut down");
    Ok(())
}
