//! Named entity extraction over a pluggable tagging model.

use regex::Regex;

use crate::error::InsightError;
use crate::types::{EntityLabel, Extraction, TaggedEntity};

/// Name of the tagging model bundled with NLPBot.
pub const BUILTIN_MODEL: &str = "builtin-patterns";

/// A tagging model: finds labelled spans in text.
pub trait EntityTagger: Send + Sync {
    fn model_name(&self) -> &str;

    /// Tagged spans in text order.
    fn tag(&self, text: &str) -> Vec<TaggedEntity>;
}

/// Entity extraction handler. Holds a tagger when a model is loaded and
/// degrades to a setup message when it is not.
pub struct EntityExtractor {
    tagger: Option<Box<dyn EntityTagger>>,
    requested_model: String,
}

impl EntityExtractor {
    /// Wrap a loaded tagging model.
    pub fn new(tagger: Box<dyn EntityTagger>) -> Self {
        let requested_model = tagger.model_name().to_string();
        Self {
            tagger: Some(tagger),
            requested_model,
        }
    }

    /// An extractor whose model could not be loaded.
    pub fn unavailable(model: &str) -> Self {
        Self {
            tagger: None,
            requested_model: model.to_string(),
        }
    }

    /// Resolve a model name to a tagger.
    pub fn try_load(model: &str) -> Result<Self, InsightError> {
        match model.trim() {
            BUILTIN_MODEL => Ok(Self::new(Box::new(PatternTagger::new()))),
            other => Err(InsightError::ModelUnavailable(other.to_string())),
        }
    }

    /// Like [`try_load`](Self::try_load), but a missing model yields the
    /// degraded extractor instead of an error.
    pub fn load(model: &str) -> Self {
        Self::try_load(model).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Entity recognition running in degraded mode");
            Self::unavailable(model.trim())
        })
    }

    pub fn is_available(&self) -> bool {
        self.tagger.is_some()
    }

    /// Name of the loaded model, if any.
    pub fn model_name(&self) -> Option<&str> {
        self.tagger.as_ref().map(|t| t.model_name())
    }

    /// Extract entities, or report that no model is loaded.
    pub fn extract(&self, text: &str) -> Extraction {
        match &self.tagger {
            Some(tagger) => {
                let entities = tagger.tag(text);
                tracing::debug!(
                    model = tagger.model_name(),
                    count = entities.len(),
                    "Entities tagged"
                );
                Extraction::Entities(entities)
            }
            None => Extraction::Unavailable(unavailable_message(&self.requested_model)),
        }
    }
}

impl Default for EntityExtractor {
    fn default() -> Self {
        Self::new(Box::new(PatternTagger::new()))
    }
}

/// Setup guidance shown when the tagging model is missing.
pub fn unavailable_message(model: &str) -> String {
    format!(
        "Entity model '{}' is not loaded. To enable entity recognition, set \
         `model = \"{}\"` under [entities] in your config.toml and restart.",
        model, BUILTIN_MODEL
    )
}

// =============================================================================
// PatternTagger
// =============================================================================

static MONTHS: &str =
    "January|February|March|April|May|June|July|August|September|October|November|December";

static WEEKDAYS: &str = "Monday|Tuesday|Wednesday|Thursday|Friday|Saturday|Sunday";

static KNOWN_ORGS: &[&str] = &[
    "Amazon", "Apple", "BBC", "FBI", "Facebook", "Google", "IBM", "Intel", "Meta", "Microsoft",
    "NASA", "Netflix", "OpenAI", "Tesla", "Twitter", "United Nations", "UNESCO", "WHO",
];

static KNOWN_PLACES: &[&str] = &[
    "Australia", "Beijing", "Berlin", "Boston", "Brazil", "California", "Canada", "Chicago",
    "China", "Egypt", "England", "Europe", "France", "Germany", "India", "Italy", "Japan",
    "Kenya", "London", "Los Angeles", "Madrid", "Mexico", "Moscow", "Mumbai", "New York",
    "New York City", "Nigeria", "Paris", "Rome", "Russia", "San Francisco", "Seattle", "Spain",
    "Sydney", "Texas", "Tokyo", "Toronto", "UK", "USA", "United Kingdom", "United States",
    "Washington",
];

/// Regex and gazetteer tagger producing OntoNotes-style labels.
///
/// Overlapping candidates are resolved by earliest start, then longest span,
/// then rule order (so a gazetteer place beats a generic capitalized name).
pub struct PatternTagger {
    rules: Vec<(EntityLabel, Regex)>,
}

impl PatternTagger {
    /// Create a tagger with pre-compiled patterns, in priority order.
    pub fn new() -> Self {
        let rules = vec![
            (
                EntityLabel::Money,
                Regex::new(
                    r"(?i)(?:\$\d[\d,]*(?:\.\d+)?(?:\s?(?:million|billion|k)\b)?|\b\d[\d,]*(?:\.\d+)?\s*(?:USD|EUR|GBP|dollars?|euros?|pounds?)\b)",
                )
                .unwrap(),
            ),
            (
                EntityLabel::Percent,
                Regex::new(r"(?i)\b\d+(?:\.\d+)?(?:%|\s?percent\b)").unwrap(),
            ),
            (
                EntityLabel::Time,
                Regex::new(
                    r"(?i)\b(?:\d{1,2}:\d{2}(?:\s?[ap]m\b)?|\d{1,2}\s?[ap]m\b|noon\b|midnight\b)",
                )
                .unwrap(),
            ),
            (
                EntityLabel::Date,
                Regex::new(&format!(
                    r"\b(?:\d{{4}}-\d{{2}}-\d{{2}}|(?:{m})\s+\d{{1,2}}(?:st|nd|rd|th)?(?:,\s*\d{{4}})?|\d{{1,2}}\s+(?:{m})(?:\s+\d{{4}})?|(?:{m})\s+\d{{4}})\b",
                    m = MONTHS
                ))
                .unwrap(),
            ),
            (
                EntityLabel::Date,
                Regex::new(&format!(
                    r"(?i)\b(?:yesterday|today|tomorrow|(?:last|next|this)\s+(?:{w}|week|month|year))\b",
                    w = WEEKDAYS.to_lowercase()
                ))
                .unwrap(),
            ),
            (
                EntityLabel::Date,
                Regex::new(&format!(r"\b(?:{})\b", WEEKDAYS)).unwrap(),
            ),
            (
                EntityLabel::Date,
                Regex::new(r"\b(?:1[89]|20)\d{2}\b").unwrap(),
            ),
            (
                EntityLabel::Org,
                Regex::new(
                    r"\b(?:[A-Z][\w&]*\s+)+(?:Inc|Corp|Corporation|Ltd|LLC|Company|University|Institute|Foundation|Bank|Group)\b\.?",
                )
                .unwrap(),
            ),
            (EntityLabel::Org, gazetteer(KNOWN_ORGS)),
            (EntityLabel::Gpe, gazetteer(KNOWN_PLACES)),
            (
                EntityLabel::Person,
                Regex::new(r"\b(?:Mr|Mrs|Ms|Dr|Prof)\.?\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?").unwrap(),
            ),
            (
                EntityLabel::Person,
                Regex::new(
                    r"\b([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)\b(?:'s\s+|\s+(?:said|mentioned|suggested|reported|asked|noted|confirmed|proposed|wrote|told))",
                )
                .unwrap(),
            ),
            (
                EntityLabel::Person,
                Regex::new(r"\b[A-Z][a-z]+\s+[A-Z][a-z]+\b").unwrap(),
            ),
            (
                EntityLabel::Cardinal,
                Regex::new(r"\b\d+(?:,\d{3})*(?:\.\d+)?\b").unwrap(),
            ),
        ];
        Self { rules }
    }
}

impl Default for PatternTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityTagger for PatternTagger {
    fn model_name(&self) -> &str {
        BUILTIN_MODEL
    }

    fn tag(&self, text: &str) -> Vec<TaggedEntity> {
        // (start, end, priority, label)
        let mut candidates: Vec<(usize, usize, usize, EntityLabel)> = Vec::new();
        for (priority, (label, regex)) in self.rules.iter().enumerate() {
            for caps in regex.captures_iter(text) {
                let Some(m) = caps.get(1).or_else(|| caps.get(0)) else {
                    continue;
                };
                if *label == EntityLabel::Person && starts_with_common_word(m.as_str()) {
                    continue;
                }
                candidates.push((m.start(), m.end(), priority, *label));
            }
        }

        candidates.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| (b.1 - b.0).cmp(&(a.1 - a.0)))
                .then_with(|| a.2.cmp(&b.2))
        });

        let mut entities = Vec::new();
        let mut covered_until = 0;
        for (start, end, _, label) in candidates {
            if start < covered_until {
                continue;
            }
            entities.push(TaggedEntity {
                text: text[start..end].to_string(),
                label,
                start,
            });
            covered_until = end;
        }
        entities
    }
}

fn gazetteer(names: &[&str]) -> Regex {
    let mut names: Vec<&str> = names.to_vec();
    names.sort_by_key(|n| std::cmp::Reverse(n.len()));
    let alts: Vec<String> = names.iter().map(|n| regex::escape(n)).collect();
    Regex::new(&format!(r"\b(?:{})\b", alts.join("|"))).unwrap()
}

fn starts_with_common_word(span: &str) -> bool {
    span.split_whitespace().next().is_some_and(is_common_word)
}

/// Returns true for words that are commonly false-positive person names.
fn is_common_word(s: &str) -> bool {
    matches!(
        s,
        "The"
            | "This"
            | "That"
            | "These"
            | "Those"
            | "There"
            | "Here"
            | "When"
            | "Where"
            | "What"
            | "Which"
            | "They"
            | "We"
            | "It"
            | "My"
            | "Our"
            | "Yesterday"
            | "Today"
            | "Tomorrow"
            | "Monday"
            | "Tuesday"
            | "Wednesday"
            | "Thursday"
            | "Friday"
            | "Saturday"
            | "Sunday"
            | "January"
            | "February"
            | "March"
            | "April"
            | "May"
            | "June"
            | "July"
            | "August"
            | "September"
            | "October"
            | "November"
            | "December"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(text: &str) -> Vec<(String, EntityLabel)> {
        PatternTagger::new()
            .tag(text)
            .into_iter()
            .map(|e| (e.text, e.label))
            .collect()
    }

    fn has(entities: &[(String, EntityLabel)], text: &str, label: EntityLabel) -> bool {
        entities.iter().any(|(t, l)| t == text && *l == label)
    }

    #[test]
    fn test_person_and_place() {
        let entities = tag("Barack Obama visited Paris last week.");
        assert!(has(&entities, "Barack Obama", EntityLabel::Person), "{:?}", entities);
        assert!(has(&entities, "Paris", EntityLabel::Gpe), "{:?}", entities);
        assert!(has(&entities, "last week", EntityLabel::Date), "{:?}", entities);
    }

    #[test]
    fn test_gazetteer_beats_generic_name() {
        let entities = tag("She moved to New York in 2019.");
        assert!(has(&entities, "New York", EntityLabel::Gpe), "{:?}", entities);
        assert!(has(&entities, "2019", EntityLabel::Date), "{:?}", entities);
        assert!(!entities.iter().any(|(_, l)| *l == EntityLabel::Person));
    }

    #[test]
    fn test_org_suffix_and_known_org() {
        let entities = tag("Acme Widgets Inc. hired engineers from Google.");
        assert!(
            has(&entities, "Acme Widgets Inc.", EntityLabel::Org),
            "{:?}",
            entities
        );
        assert!(has(&entities, "Google", EntityLabel::Org), "{:?}", entities);
    }

    #[test]
    fn test_money_percent_cardinal() {
        let entities = tag("Revenue grew 15% to $4.5 million across 12 stores.");
        assert!(has(&entities, "15%", EntityLabel::Percent), "{:?}", entities);
        assert!(has(&entities, "$4.5 million", EntityLabel::Money), "{:?}", entities);
        assert!(has(&entities, "12", EntityLabel::Cardinal), "{:?}", entities);
    }

    #[test]
    fn test_dates_and_times() {
        let entities = tag("The launch is on March 3rd, 2025 at 10:30 am, not 2024-01-15.");
        assert!(
            has(&entities, "March 3rd, 2025", EntityLabel::Date),
            "{:?}",
            entities
        );
        assert!(has(&entities, "10:30 am", EntityLabel::Time), "{:?}", entities);
        assert!(has(&entities, "2024-01-15", EntityLabel::Date), "{:?}", entities);
    }

    #[test]
    fn test_person_with_reporting_verb() {
        let entities = tag("yesterday Alice said the build was green");
        assert!(has(&entities, "Alice", EntityLabel::Person), "{:?}", entities);
        assert!(has(&entities, "yesterday", EntityLabel::Date), "{:?}", entities);
    }

    #[test]
    fn test_common_words_are_not_people() {
        let entities = tag("The Report was long. This Morning we met.");
        assert!(!entities.iter().any(|(_, l)| *l == EntityLabel::Person), "{:?}", entities);
    }

    #[test]
    fn test_spans_do_not_overlap_and_are_ordered() {
        let tagged = PatternTagger::new().tag("Dr. Jane Smith paid $20 in London on Monday.");
        for pair in tagged.windows(2) {
            assert!(pair[0].start + pair[0].text.len() <= pair[1].start);
        }
        assert_eq!(tagged[0].label, EntityLabel::Person);
        assert_eq!(tagged[0].text, "Dr. Jane Smith");
    }

    #[test]
    fn test_no_entities() {
        assert!(tag("nothing to see here").is_empty());
        assert!(tag("").is_empty());
    }

    #[test]
    fn test_extractor_available() {
        let extractor = EntityExtractor::load(BUILTIN_MODEL);
        assert!(extractor.is_available());
        assert_eq!(extractor.model_name(), Some(BUILTIN_MODEL));
        match extractor.extract("Alice lives in Tokyo.") {
            Extraction::Entities(entities) => assert!(!entities.is_empty()),
            Extraction::Unavailable(msg) => panic!("unexpected degraded mode: {}", msg),
        }
    }

    #[test]
    fn test_try_load_unknown_model_is_error() {
        let result = EntityExtractor::try_load("en_core_web_sm");
        assert!(matches!(
            result,
            Err(InsightError::ModelUnavailable(ref m)) if m == "en_core_web_sm"
        ));
    }

    #[test]
    fn test_extractor_unavailable_is_deterministic() {
        let extractor = EntityExtractor::load("en_core_web_sm");
        assert!(!extractor.is_available());
        assert_eq!(extractor.model_name(), None);

        let first = extractor.extract("Alice lives in Tokyo.");
        let second = extractor.extract("something else entirely");
        assert_eq!(first, second);
        match first {
            Extraction::Unavailable(msg) => {
                assert_eq!(msg, unavailable_message("en_core_web_sm"));
                assert!(msg.contains(BUILTIN_MODEL));
            }
            Extraction::Entities(_) => panic!("expected degraded mode"),
        }
    }
}
