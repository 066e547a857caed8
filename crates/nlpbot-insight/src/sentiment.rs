//! Sentiment classification over a pluggable polarity scorer.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::InsightError;
use crate::types::{Sentiment, SentimentLabel};

/// Produces a signed polarity score for a piece of text.
///
/// Implementations should return values in [-1, 1]; the classifier clamps
/// anything outside that range.
pub trait PolarityScorer: Send + Sync {
    fn polarity(&self, text: &str) -> f64;
}

/// Maps polarity scores to `Positive` / `Negative` / `Neutral`.
pub struct SentimentClassifier {
    scorer: Box<dyn PolarityScorer>,
}

impl SentimentClassifier {
    pub fn new(scorer: Box<dyn PolarityScorer>) -> Self {
        Self { scorer }
    }

    /// Score `text` and bucket the result.
    pub fn classify(&self, text: &str) -> Sentiment {
        let raw = self.scorer.polarity(text);
        let score = if raw.is_nan() { 0.0 } else { raw.clamp(-1.0, 1.0) };
        let label = SentimentLabel::from_score(score);
        tracing::debug!(score, label = %label, "Sentiment classified");
        Sentiment { label, score }
    }
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        Self::new(Box::new(LexiconScorer::new()))
    }
}

// =============================================================================
// LexiconScorer
// =============================================================================

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z]+(?:'[a-z]+)?").expect("Invalid word regex"));

/// Built-in polarity lexicon (word, polarity).
static LEXICON: &[(&str, f64)] = &[
    // positive
    ("amazing", 0.6),
    ("awesome", 1.0),
    ("beautiful", 0.85),
    ("best", 1.0),
    ("better", 0.5),
    ("brilliant", 0.9),
    ("cool", 0.35),
    ("delicious", 1.0),
    ("delightful", 1.0),
    ("enjoy", 0.4),
    ("excellent", 1.0),
    ("fantastic", 0.4),
    ("fun", 0.3),
    ("glad", 0.5),
    ("good", 0.7),
    ("great", 0.8),
    ("happy", 0.8),
    ("helpful", 0.5),
    ("impressive", 1.0),
    ("love", 0.5),
    ("loved", 0.7),
    ("lovely", 0.5),
    ("nice", 0.6),
    ("perfect", 1.0),
    ("pleasant", 0.73),
    ("pretty", 0.25),
    ("sweet", 0.35),
    ("thank", 0.2),
    ("thanks", 0.2),
    ("useful", 0.3),
    ("wonderful", 1.0),
    // negative
    ("angry", -0.5),
    ("annoying", -0.8),
    ("awful", -1.0),
    ("bad", -0.7),
    ("boring", -1.0),
    ("broken", -0.4),
    ("disappointed", -0.75),
    ("disappointing", -0.6),
    ("disgusting", -1.0),
    ("dislike", -0.5),
    ("fail", -0.5),
    ("failed", -0.5),
    ("hate", -0.8),
    ("horrible", -1.0),
    ("poor", -0.4),
    ("sad", -0.5),
    ("slow", -0.3),
    ("stupid", -0.8),
    ("terrible", -1.0),
    ("ugly", -0.7),
    ("unhappy", -0.6),
    ("useless", -0.5),
    ("worse", -0.4),
    ("worst", -1.0),
    ("wrong", -0.5),
];

static INTENSIFIERS: &[&str] = &["very", "really", "extremely", "so", "super", "incredibly"];

static NEGATORS: &[&str] = &["not", "no", "never", "hardly"];

const INTENSIFIER_FACTOR: f64 = 1.3;
const NEGATION_FACTOR: f64 = -0.5;

/// Lexicon-based scorer: the mean polarity of the lexicon words in the text.
///
/// A preceding intensifier scales a word by 1.3; a negator within the two
/// preceding tokens scales it by -0.5. Text with no lexicon hits scores 0.0.
pub struct LexiconScorer {
    lexicon: HashMap<String, f64>,
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self {
            lexicon: LEXICON.iter().map(|(w, p)| (w.to_string(), *p)).collect(),
        }
    }

    /// Build a scorer with extra entries layered over the built-in lexicon.
    ///
    /// Fails if any polarity is not a finite value in [-1, 1].
    pub fn with_entries<I, K>(entries: I) -> Result<Self, InsightError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut scorer = Self::new();
        for (word, polarity) in entries {
            let word = word.as_ref().trim().to_lowercase();
            if !polarity.is_finite() || !(-1.0..=1.0).contains(&polarity) {
                return Err(InsightError::Config(format!(
                    "polarity for '{}' must be within [-1, 1], got {}",
                    word, polarity
                )));
            }
            scorer.lexicon.insert(word, polarity);
        }
        Ok(scorer)
    }
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityScorer for LexiconScorer {
    fn polarity(&self, text: &str) -> f64 {
        let lower = text.to_lowercase();
        let tokens: Vec<&str> = WORD_RE.find_iter(&lower).map(|m| m.as_str()).collect();

        let mut hits = Vec::new();
        for (i, token) in tokens.iter().enumerate() {
            let Some(&base) = self.lexicon.get(*token) else {
                continue;
            };
            let mut polarity = base;
            let mut lookback = i;

            if lookback > 0 && INTENSIFIERS.contains(&tokens[lookback - 1]) {
                polarity *= INTENSIFIER_FACTOR;
                lookback -= 1;
            }
            let negated = tokens[lookback.saturating_sub(2)..lookback]
                .iter()
                .any(|t| is_negator(t));
            if negated {
                polarity *= NEGATION_FACTOR;
            }
            hits.push(polarity.clamp(-1.0, 1.0));
        }

        if hits.is_empty() {
            return 0.0;
        }
        let mean = hits.iter().sum::<f64>() / hits.len() as f64;
        mean.clamp(-1.0, 1.0)
    }
}

fn is_negator(token: &str) -> bool {
    NEGATORS.contains(&token) || token.ends_with("n't")
}
