use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{NlpbotError, Result};
use crate::types::Mode;

/// Top-level configuration for NLPBot.
///
/// Loaded from `~/.nlpbot/config.toml` by default. Each section corresponds
/// to one handler or to the front-end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NlpbotConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub sentiment: SentimentConfig,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub entities: EntityConfig,
}

impl NlpbotConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: NlpbotConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| NlpbotError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Display name used by personalized replies. Empty means anonymous.
    pub user_name: String,
    /// Directory where saved transcripts are written.
    pub transcript_dir: String,
    /// Mode the session starts in.
    pub default_mode: Mode,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            user_name: String::new(),
            transcript_dir: ".".to_string(),
            default_mode: Mode::Chat,
        }
    }
}

/// Conversational responder settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Simulated "typing" latency before each reply, in milliseconds.
    pub thinking_delay_ms: u64,
    /// Fixed seed for response selection. Unset means OS entropy.
    pub seed: Option<u64>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            thinking_delay_ms: 800,
            seed: None,
        }
    }
}

/// Sentiment scorer settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    /// Extra lexicon entries (word -> polarity in [-1, 1]). Overrides built-ins.
    pub lexicon: BTreeMap<String, f64>,
}

/// Extractive summarizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Number of sentences in a summary.
    pub sentence_count: usize,
    /// Minimum cosine similarity for two sentences to be linked.
    pub similarity_threshold: f64,
    /// Power-iteration convergence tolerance.
    pub epsilon: f64,
    /// Power-iteration cap; exceeding it is a ranking failure.
    pub max_iterations: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            sentence_count: 2,
            similarity_threshold: 0.1,
            epsilon: 1e-4,
            max_iterations: 1000,
        }
    }
}

/// Entity tagging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityConfig {
    /// Tagging model to load. Unknown names leave entity recognition degraded.
    pub model: String,
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            model: "builtin-patterns".to_string(),
        }
    }
}
