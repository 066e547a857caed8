use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use nlpbot_core::Mode;
use nlpbot_insight::{EntityLabel, SentimentLabel};

/// Per-call context available to dynamic responses.
#[derive(Debug, Clone)]
pub struct ResponseContext {
    /// Display name of the user, if any.
    pub name: Option<String>,
    /// Wall-clock time the utterance was received.
    pub now: DateTime<Local>,
}

impl ResponseContext {
    pub fn new(name: Option<String>, now: DateTime<Local>) -> Self {
        Self { name, now }
    }

    /// Context stamped with the current local time.
    pub fn at_now(name: Option<String>) -> Self {
        Self::new(name, Local::now())
    }

    /// The display name, ignoring blank values.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// Structured metadata attached to an assistant turn.
///
/// Serializes flat: `{"feature": "sentiment_analysis", "text": ..., ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Details {
    pub feature: Mode,
    #[serde(flatten)]
    pub payload: DetailPayload,
}

/// Mode-specific fields of [`Details`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailPayload {
    Sentiment {
        text: String,
        result: String,
        label: SentimentLabel,
        score: f64,
    },
    Summary {
        original_text: String,
        summary: String,
        algorithm: String,
    },
    Entities {
        text: String,
        entities: Vec<(String, EntityLabel)>,
        model: String,
    },
    Failure {
        error: String,
    },
}

/// A handler's answer: display text plus optional details.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub details: Option<Details>,
}

impl Reply {
    /// A reply with no details.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            details: None,
        }
    }

    pub fn with_details(text: impl Into<String>, feature: Mode, payload: DetailPayload) -> Self {
        Self {
            text: text.into(),
            details: Some(Details { feature, payload }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_display_name_ignores_blank() {
        let now = Local.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        assert_eq!(ResponseContext::new(None, now).display_name(), None);
        assert_eq!(
            ResponseContext::new(Some("   ".to_string()), now).display_name(),
            None
        );
        assert_eq!(
            ResponseContext::new(Some(" Ada ".to_string()), now).display_name(),
            Some("Ada")
        );
    }

    #[test]
    fn test_sentiment_details_serialize_flat() {
        let details = Details {
            feature: Mode::SentimentAnalysis,
            payload: DetailPayload::Sentiment {
                text: "I love pizza".to_string(),
                result: "Positive (Score: 0.50)".to_string(),
                label: SentimentLabel::Positive,
                score: 0.5,
            },
        };
        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(value["feature"], "sentiment_analysis");
        assert_eq!(value["text"], "I love pizza");
        assert_eq!(value["result"], "Positive (Score: 0.50)");
        assert_eq!(value["label"], "positive");
        assert_eq!(value["score"], 0.5);
    }

    #[test]
    fn test_entity_details_serialize_pairs() {
        let details = Details {
            feature: Mode::EntityRecognition,
            payload: DetailPayload::Entities {
                text: "Alice went to Paris".to_string(),
                entities: vec![
                    ("Alice".to_string(), EntityLabel::Person),
                    ("Paris".to_string(), EntityLabel::Gpe),
                ],
                model: "builtin-patterns".to_string(),
            },
        };
        let value = serde_json::to_value(&details).unwrap();
        assert_eq!(value["feature"], "entity_recognition");
        assert_eq!(
            value["entities"],
            serde_json::json!([["Alice", "PERSON"], ["Paris", "GPE"]])
        );
        assert_eq!(value["model"], "builtin-patterns");
    }

    #[test]
    fn test_failure_details_roundtrip() {
        let details = Details {
            feature: Mode::TextSummarization,
            payload: DetailPayload::Failure {
                error: "insufficient data: empty text".to_string(),
            },
        };
        let json = serde_json::to_string(&details).unwrap();
        assert_eq!(
            json,
            r#"{"feature":"text_summarization","error":"insufficient data: empty text"}"#
        );
        let parsed: Details = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, details);
    }

    #[test]
    fn test_reply_constructors() {
        let reply = Reply::plain("hi");
        assert_eq!(reply.text, "hi");
        assert!(reply.details.is_none());

        let reply = Reply::with_details(
            "Text Summary: a",
            Mode::TextSummarization,
            DetailPayload::Summary {
                original_text: "a".to_string(),
                summary: "a".to_string(),
                algorithm: "LexRank".to_string(),
            },
        );
        assert_eq!(reply.details.unwrap().feature, Mode::TextSummarization);
    }
}
