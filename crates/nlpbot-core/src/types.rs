use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NlpbotError;

// =============================================================================
// Enums
// =============================================================================

/// The analysis feature that governs how an utterance is processed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Pattern-matching conversation.
    #[default]
    Chat,
    /// Polarity classification of the utterance.
    SentimentAnalysis,
    /// Extractive summary of the utterance.
    TextSummarization,
    /// Named-entity extraction from the utterance.
    EntityRecognition,
}

impl Mode {
    /// Every mode, in menu order.
    pub const ALL: [Mode; 4] = [
        Mode::Chat,
        Mode::SentimentAnalysis,
        Mode::TextSummarization,
        Mode::EntityRecognition,
    ];

    /// Machine label, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Chat => "chat",
            Mode::SentimentAnalysis => "sentiment_analysis",
            Mode::TextSummarization => "text_summarization",
            Mode::EntityRecognition => "entity_recognition",
        }
    }

    /// Human-readable label shown in menus.
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Chat => "Chat",
            Mode::SentimentAnalysis => "Sentiment Analysis",
            Mode::TextSummarization => "Text Summarization",
            Mode::EntityRecognition => "Entity Recognition",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = NlpbotError;

    /// Accepts the machine label or the display label, case-insensitively
    /// ("Sentiment Analysis" and "sentiment_analysis" are the same mode).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        Mode::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| NlpbotError::UnknownMode(s.to_string()))
    }
}

/// Author of a conversation turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_default_is_chat() {
        assert_eq!(Mode::default(), Mode::Chat);
    }

    #[test]
    fn test_mode_parse_machine_labels() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_mode_parse_display_labels() {
        for mode in Mode::ALL {
            assert_eq!(mode.display_name().parse::<Mode>().unwrap(), mode);
        }
        assert_eq!(
            "  TEXT-summarization ".parse::<Mode>().unwrap(),
            Mode::TextSummarization
        );
    }

    #[test]
    fn test_mode_parse_unknown() {
        let err = "translation".parse::<Mode>().unwrap_err();
        assert!(matches!(err, NlpbotError::UnknownMode(ref s) if s == "translation"));
        assert!("".parse::<Mode>().is_err());
    }

    #[test]
    fn test_mode_serde_matches_as_str() {
        for mode in Mode::ALL {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.as_str()));
        }
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }
}
