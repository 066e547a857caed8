//! Extractive summarization: pick the most central sentences of a text.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use nlpbot_core::config::SummarizerConfig;

use crate::error::InsightError;

/// Name reported alongside summaries produced by the default ranker.
pub const LEXRANK_ALGORITHM: &str = "LexRank";

/// Scores sentences by importance. Higher is more central.
pub trait SentenceRanker: Send + Sync {
    /// Short algorithm name, e.g. "LexRank".
    fn name(&self) -> &str;

    /// Return one score per input sentence, in input order.
    fn rank(&self, sentences: &[&str]) -> Result<Vec<f64>, InsightError>;
}

/// Service producing extractive summaries from free text.
pub struct Summarizer {
    ranker: Box<dyn SentenceRanker>,
    sentence_count: usize,
}

impl Summarizer {
    /// Create a summarizer.
    ///
    /// - `ranker`: sentence centrality model
    /// - `sentence_count`: default number of sentences per summary
    pub fn new(ranker: Box<dyn SentenceRanker>, sentence_count: usize) -> Self {
        Self {
            ranker,
            sentence_count,
        }
    }

    /// Build a LexRank summarizer from configuration.
    pub fn from_config(config: &SummarizerConfig) -> Self {
        Self::new(
            Box::new(LexRank::new(
                config.similarity_threshold,
                config.epsilon,
                config.max_iterations,
            )),
            config.sentence_count,
        )
    }

    /// Algorithm name of the underlying ranker.
    pub fn algorithm(&self) -> &str {
        self.ranker.name()
    }

    /// Summarize with the configured sentence count.
    pub fn summarize(&self, text: &str) -> Result<String, InsightError> {
        self.summarize_n(text, self.sentence_count)
    }

    /// Return the `count` highest-ranked sentences, joined by a space and kept
    /// in their original order. Texts with at most `count` sentences are
    /// returned whole.
    pub fn summarize_n(&self, text: &str, count: usize) -> Result<String, InsightError> {
        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Err(InsightError::InsufficientData(
                "text contains no sentences".to_string(),
            ));
        }
        if sentences.len() <= count {
            return Ok(sentences.join(" "));
        }

        let scores = self.ranker.rank(&sentences)?;
        if scores.len() != sentences.len() {
            return Err(InsightError::Ranking(format!(
                "ranker returned {} scores for {} sentences",
                scores.len(),
                sentences.len()
            )));
        }

        let mut order: Vec<usize> = (0..sentences.len()).collect();
        // Stable sort: equal scores keep document order.
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut chosen: Vec<usize> = order.into_iter().take(count).collect();
        chosen.sort_unstable();

        tracing::debug!(
            sentences = sentences.len(),
            selected = chosen.len(),
            algorithm = self.ranker.name(),
            "Summary ranked"
        );

        Ok(chosen
            .into_iter()
            .map(|i| sentences[i])
            .collect::<Vec<_>>()
            .join(" "))
    }
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::from_config(&SummarizerConfig::default())
    }
}

// =============================================================================
// Sentence splitting
// =============================================================================

/// Tokens that end with a period but do not end a sentence.
static ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "inc", "ltd",
    "co", "corp", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov",
    "dec", "fig", "approx", "u.s",
];

/// Split on `.` `!` `?` followed by whitespace, skipping known abbreviations.
/// Returned sentences are trimmed and never empty.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let next_is_space = chars.peek().is_some_and(|(_, n)| n.is_whitespace());
        if !next_is_space {
            continue;
        }
        if c == '.' && ends_with_abbreviation(&text[start..i]) {
            continue;
        }
        push_trimmed(&mut result, &text[start..=i]);
        start = i + c.len_utf8();
    }
    if start < text.len() {
        push_trimmed(&mut result, &text[start..]);
    }
    result
}

fn ends_with_abbreviation(fragment: &str) -> bool {
    fragment
        .split_whitespace()
        .last()
        .map(|w| w.trim_start_matches(|c: char| !c.is_alphanumeric()))
        .is_some_and(|w| ABBREVIATIONS.contains(&w.to_lowercase().as_str()))
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, sentence: &'a str) {
    let trimmed = sentence.trim();
    if !trimmed.is_empty() {
        out.push(trimmed);
    }
}

// =============================================================================
// LexRank
// =============================================================================

static TERM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+(?:'[\p{L}]+)?").expect("Invalid term regex"));

/// Graph-based centrality ranking (Erkan & Radev).
///
/// Sentences are nodes; an edge joins two sentences whose TF-IDF cosine
/// similarity exceeds `threshold`. Scores are the stationary distribution of
/// a random walk over the row-normalized graph, found by power iteration.
pub struct LexRank {
    threshold: f64,
    epsilon: f64,
    max_iterations: usize,
}

impl LexRank {
    pub fn new(threshold: f64, epsilon: f64, max_iterations: usize) -> Self {
        Self {
            threshold,
            epsilon,
            max_iterations,
        }
    }

    fn tf_idf_vectors(sentences: &[&str]) -> Vec<HashMap<String, f64>> {
        let tokenized: Vec<Vec<String>> = sentences
            .iter()
            .map(|s| {
                TERM_RE
                    .find_iter(&s.to_lowercase())
                    .map(|m| m.as_str().to_string())
                    .collect()
            })
            .collect();

        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for terms in &tokenized {
            let unique: HashSet<&str> = terms.iter().map(String::as_str).collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let n = sentences.len() as f64;
        tokenized
            .iter()
            .map(|terms| {
                let mut tf: HashMap<String, f64> = HashMap::new();
                for term in terms {
                    *tf.entry(term.clone()).or_insert(0.0) += 1.0;
                }
                let max_tf = tf.values().copied().fold(0.0, f64::max);
                tf.into_iter()
                    .map(|(term, count)| {
                        let df = document_frequency.get(term.as_str()).copied().unwrap_or(1);
                        // Smoothed so terms shared by every sentence still count.
                        let idf = (1.0 + n / df as f64).ln();
                        (term, (count / max_tf) * idf)
                    })
                    .collect()
            })
            .collect()
    }
}

impl Default for LexRank {
    fn default() -> Self {
        let config = SummarizerConfig::default();
        Self::new(
            config.similarity_threshold,
            config.epsilon,
            config.max_iterations,
        )
    }
}

impl SentenceRanker for LexRank {
    fn name(&self) -> &str {
        LEXRANK_ALGORITHM
    }

    fn rank(&self, sentences: &[&str]) -> Result<Vec<f64>, InsightError> {
        let n = sentences.len();
        if n == 0 {
            return Err(InsightError::InsufficientData(
                "no sentences to rank".to_string(),
            ));
        }

        let vectors = Self::tf_idf_vectors(sentences);
        let norms: Vec<f64> = vectors
            .iter()
            .map(|v| v.values().map(|w| w * w).sum::<f64>().sqrt())
            .collect();

        // Thresholded adjacency, then row-normalized into a transition matrix.
        let mut matrix = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                let similarity = cosine(&vectors[i], &vectors[j], norms[i], norms[j]);
                if similarity > self.threshold {
                    matrix[i][j] = 1.0;
                }
            }
            let degree: f64 = matrix[i].iter().sum();
            if degree > 0.0 {
                for cell in matrix[i].iter_mut() {
                    *cell /= degree;
                }
            } else {
                // Sentences with no usable terms jump uniformly.
                for cell in matrix[i].iter_mut() {
                    *cell = 1.0 / n as f64;
                }
            }
        }

        let mut scores = vec![1.0 / n as f64; n];
        for iteration in 0..self.max_iterations {
            let mut next = vec![0.0; n];
            for (i, row) in matrix.iter().enumerate() {
                for (j, weight) in row.iter().enumerate() {
                    next[j] += weight * scores[i];
                }
            }
            let delta = next
                .iter()
                .zip(&scores)
                .map(|(a, b)| (a - b) * (a - b))
                .sum::<f64>()
                .sqrt();
            scores = next;
            if delta < self.epsilon {
                tracing::debug!(iterations = iteration + 1, "LexRank converged");
                return Ok(scores);
            }
        }

        Err(InsightError::Ranking(format!(
            "power iteration did not converge within {} iterations",
            self.max_iterations
        )))
    }
}

fn cosine(a: &HashMap<String, f64>, b: &HashMap<String, f64>, norm_a: f64, norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot: f64 = a
        .iter()
        .filter_map(|(term, wa)| b.get(term).map(|wb| wa * wb))
        .sum();
    dot / (norm_a * norm_b)
}
