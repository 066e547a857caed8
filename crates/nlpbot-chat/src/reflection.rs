//! Pronoun reflection for templated replies.
//!
//! Mirrors first- and second-person phrases ("i am" -> "you are") so that a
//! captured fragment of the user's utterance reads naturally when echoed back.

use std::collections::HashMap;

use regex::{Captures, Regex};

use crate::error::ChatError;

/// Default reflections, keyed by lowercase phrase.
static STANDARD_REFLECTIONS: &[(&str, &str)] = &[
    ("i am", "you are"),
    ("i was", "you were"),
    ("i", "you"),
    ("i'm", "you are"),
    ("i'd", "you would"),
    ("i've", "you have"),
    ("i'll", "you will"),
    ("my", "your"),
    ("you are", "I am"),
    ("you were", "I was"),
    ("you've", "I have"),
    ("you'll", "I will"),
    ("your", "my"),
    ("yours", "mine"),
    ("you", "me"),
    ("me", "you"),
];

/// Phrase-to-phrase substitution table.
///
/// Matching is case-insensitive and whole-word. Longer phrases are tried
/// before shorter ones at each position, and the text is scanned once, so a
/// substituted phrase is never reflected again.
#[derive(Debug, Clone)]
pub struct ReflectionTable {
    entries: HashMap<String, String>,
    matcher: Option<Regex>,
}

impl ReflectionTable {
    /// Build a table from `(phrase, replacement)` pairs.
    pub fn new<I, K, V>(entries: I) -> Result<Self, ChatError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let entries: HashMap<String, String> = entries
            .into_iter()
            .map(|(k, v)| (k.as_ref().trim().to_lowercase(), v.into()))
            .filter(|(k, _)| !k.is_empty())
            .collect();

        if entries.is_empty() {
            return Ok(Self {
                entries,
                matcher: None,
            });
        }

        let mut phrases: Vec<&str> = entries.keys().map(String::as_str).collect();
        // Longest first; ties broken alphabetically so the pattern is stable.
        phrases.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alternation = phrases
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r"(?i)\b(?:{})\b", alternation);
        let matcher = Regex::new(&pattern).map_err(|e| ChatError::InvalidPattern {
            pattern,
            reason: e.to_string(),
        })?;

        Ok(Self {
            entries,
            matcher: Some(matcher),
        })
    }

    /// The conventional English pronoun table.
    pub fn standard() -> Result<Self, ChatError> {
        Self::new(STANDARD_REFLECTIONS.iter().copied())
    }

    /// A table that leaves every input unchanged.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            matcher: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reflect every known phrase in `text`. Unknown words pass through.
    pub fn reflect(&self, text: &str) -> String {
        let Some(matcher) = &self.matcher else {
            return text.to_string();
        };
        matcher
            .replace_all(text, |caps: &Captures| {
                let found = &caps[0];
                let key = normalize_phrase(found);
                self.entries
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| found.to_string())
            })
            .into_owned()
    }
}

/// Lowercase and collapse inner whitespace runs so "I   am" finds "i am".
fn normalize_phrase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
