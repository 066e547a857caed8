//! NLPBot Insight crate - the three analysis handlers.
//!
//! Each handler wraps a replaceable model behind a trait and maps its raw
//! output to a user-facing result:
//! - Sentiment classification over a polarity scorer
//! - Extractive summarization over a sentence ranker (LexRank by default)
//! - Named entity extraction over an entity tagger, with a degraded mode
//!   when no tagging model is loaded

pub mod entity;
pub mod error;
pub mod sentiment;
pub mod summarizer;
pub mod types;

pub use entity::{EntityExtractor, EntityTagger, PatternTagger};
pub use error::InsightError;
pub use sentiment::{LexiconScorer, PolarityScorer, SentimentClassifier};
pub use summarizer::{LexRank, SentenceRanker, Summarizer};
pub use types::{EntityLabel, Extraction, Sentiment, SentimentLabel, TaggedEntity};
