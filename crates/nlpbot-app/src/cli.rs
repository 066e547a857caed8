//! CLI argument definitions for the `nlpbot` binary.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

use nlpbot_core::{Mode, NlpbotConfig, NlpbotError};

/// NLPBot - a terminal chatbot with sentiment, summary, and entity modes.
#[derive(Parser, Debug, Default)]
#[command(name = "nlpbot", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Display name used in greetings.
    #[arg(short = 'n', long = "name")]
    pub name: Option<String>,

    /// Starting mode (chat, sentiment_analysis, text_summarization, entity_recognition).
    #[arg(short = 'm', long = "mode")]
    pub mode: Option<String>,

    /// Seed for reproducible response selection.
    #[arg(short = 's', long = "seed")]
    pub seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Directory for saved transcripts.
    #[arg(short = 't', long = "transcript-dir")]
    pub transcript_dir: Option<PathBuf>,

    /// Reply immediately instead of simulating typing.
    #[arg(long = "no-delay")]
    pub no_delay: bool,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > NLPBOT_CONFIG env var > ~/.nlpbot/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("NLPBOT_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the display name.
    ///
    /// Priority: --name flag > NLPBOT_NAME env var > config file value.
    /// Returns `None` when every source is blank.
    pub fn resolve_name(&self, config_name: &str) -> Option<String> {
        let candidates = [
            self.name.clone(),
            std::env::var("NLPBOT_NAME").ok(),
            Some(config_name.to_string()),
        ];
        candidates
            .into_iter()
            .flatten()
            .map(|n| n.trim().to_string())
            .find(|n| !n.is_empty())
    }

    /// Resolve the starting mode.
    ///
    /// Priority: --mode flag > config file value. An unknown label is an error.
    pub fn resolve_mode(&self, config_mode: Mode) -> Result<Mode, NlpbotError> {
        match self.mode {
            Some(ref label) => label.parse(),
            None => Ok(config_mode),
        }
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }

    /// Write every flag that was given into `config`.
    pub fn apply_overrides(&self, config: &mut NlpbotConfig) -> Result<(), NlpbotError> {
        config.general.default_mode = self.resolve_mode(config.general.default_mode)?;
        config.general.log_level = self.resolve_log_level(&config.general.log_level);
        config.general.user_name = self
            .resolve_name(&config.general.user_name)
            .unwrap_or_default();
        if let Some(ref dir) = self.transcript_dir {
            config.general.transcript_dir = dir.to_string_lossy().to_string();
        }
        if let Some(seed) = self.seed {
            config.chat.seed = Some(seed);
        }
        if self.no_delay {
            config.chat.thinking_delay_ms = 0;
        }
        Ok(())
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".nlpbot").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".nlpbot").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_flags() {
        let args = CliArgs::parse_from([
            "nlpbot",
            "--config",
            "/tmp/bot.toml",
            "--name",
            "Ada",
            "--mode",
            "Sentiment Analysis",
            "--seed",
            "42",
            "--log-level",
            "debug",
            "--no-delay",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/bot.toml")));
        assert_eq!(args.name.as_deref(), Some("Ada"));
        assert_eq!(args.seed, Some(42));
        assert!(args.no_delay);
        assert_eq!(args.resolve_config_path(), PathBuf::from("/tmp/bot.toml"));
    }

    #[test]
    fn test_cli_flags_override_config() {
        let args = CliArgs::parse_from([
            "nlpbot",
            "-m",
            "entity_recognition",
            "-s",
            "7",
            "-l",
            "warn",
            "-t",
            "/tmp/transcripts",
            "--no-delay",
        ]);
        let mut config = NlpbotConfig::default();
        args.apply_overrides(&mut config).unwrap();

        assert_eq!(config.general.default_mode, Mode::EntityRecognition);
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.general.transcript_dir, "/tmp/transcripts");
        assert_eq!(config.chat.seed, Some(7));
        assert_eq!(config.chat.thinking_delay_ms, 0);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let args = CliArgs::parse_from(["nlpbot"]);
        let mut config = NlpbotConfig::default();
        config.general.default_mode = Mode::TextSummarization;
        config.chat.seed = Some(1);
        args.apply_overrides(&mut config).unwrap();

        assert_eq!(config.general.default_mode, Mode::TextSummarization);
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.chat.seed, Some(1));
        assert_eq!(config.chat.thinking_delay_ms, 800);
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let args = CliArgs::parse_from(["nlpbot", "--mode", "translation"]);
        let mut config = NlpbotConfig::default();
        assert!(matches!(
            args.apply_overrides(&mut config),
            Err(NlpbotError::UnknownMode(_))
        ));
    }

    #[test]
    fn test_name_flag_wins_and_blank_is_ignored() {
        let args = CliArgs {
            name: Some("  Grace ".to_string()),
            ..Default::default()
        };
        assert_eq!(args.resolve_name("Ada"), Some("Grace".to_string()));

        let args = CliArgs {
            name: Some("   ".to_string()),
            ..Default::default()
        };
        // Blank flag falls through to the next source
        let resolved = args.resolve_name("Ada");
        assert!(resolved.is_some());
    }
}
