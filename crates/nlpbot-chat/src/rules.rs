//! Ordered pattern rules and the response generators they select from.
//!
//! A [`RuleSet`] always ends in a catch-all rule, added by
//! [`RuleSetBuilder::catch_all`], so every utterance matches some rule.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::ChatError;
use crate::reflection::ReflectionTable;
use crate::types::ResponseContext;

/// Pattern of the catch-all rule. `(?s)` lets it span newlines.
pub const CATCH_ALL_PATTERN: &str = r"(?s)(.*)";

static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\d+)\}").expect("Invalid placeholder regex"));

/// Signature of a dynamic response.
pub type DynamicFn = fn(&ResponseContext) -> Result<String, ChatError>;

// =============================================================================
// ResponseGenerator
// =============================================================================

/// One candidate response of a rule.
#[derive(Debug, Clone)]
pub enum ResponseGenerator {
    /// Returned as-is.
    Static(String),
    /// `{0}`, `{1}`, ... are replaced with the reflected capture groups.
    Templated(String),
    /// Computed from the call context.
    Dynamic(DynamicFn),
}

impl ResponseGenerator {
    pub fn fixed(text: impl Into<String>) -> Self {
        Self::Static(text.into())
    }

    pub fn template(text: impl Into<String>) -> Self {
        Self::Templated(text.into())
    }

    /// Produce the response text for a match.
    pub fn render(
        &self,
        captures: &Captures<'_>,
        reflections: &ReflectionTable,
        context: &ResponseContext,
    ) -> Result<String, ChatError> {
        match self {
            Self::Static(text) => Ok(text.clone()),
            Self::Templated(template) => Ok(fill_template(template, captures, reflections)),
            Self::Dynamic(generate) => generate(context),
        }
    }

    /// Static and templated text must contain something besides placeholders.
    fn validate(&self, rule: &str) -> Result<(), ChatError> {
        let blank = match self {
            Self::Static(text) => text.trim().is_empty(),
            Self::Templated(template) => {
                PLACEHOLDER_RE.replace_all(template, "").trim().is_empty()
            }
            Self::Dynamic(_) => false,
        };
        if blank {
            return Err(ChatError::EmptyResponse(rule.to_string()));
        }
        Ok(())
    }
}

/// Replace `{n}` with capture group `n + 1`, reflected. Placeholders for
/// missing or non-participating groups become empty.
fn fill_template(
    template: &str,
    captures: &Captures<'_>,
    reflections: &ReflectionTable,
) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|n| captures.get(n + 1))
                .map(|m| reflections.reflect(m.as_str().trim()))
                .unwrap_or_default()
        })
        .into_owned()
}

// =============================================================================
// PatternRule
// =============================================================================

/// A compiled pattern with its candidate responses.
#[derive(Debug, Clone)]
pub struct PatternRule {
    source: String,
    pattern: Regex,
    responses: Vec<ResponseGenerator>,
}

impl PatternRule {
    /// Compile `pattern` case-insensitively. Fails on an invalid pattern,
    /// an empty response list, or a blank response.
    pub fn new(pattern: &str, responses: Vec<ResponseGenerator>) -> Result<Self, ChatError> {
        if responses.is_empty() {
            return Err(ChatError::EmptyRule(pattern.to_string()));
        }
        for response in &responses {
            response.validate(pattern)?;
        }
        let compiled = Regex::new(&format!("(?i){}", pattern)).map_err(|e| {
            ChatError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            source: pattern.to_string(),
            pattern: compiled,
            responses,
        })
    }

    /// The pattern as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn responses(&self) -> &[ResponseGenerator] {
        &self.responses
    }

    /// Search `utterance` anywhere for this rule's pattern.
    pub fn captures<'t>(&self, utterance: &'t str) -> Option<Captures<'t>> {
        self.pattern.captures(utterance)
    }
}

// =============================================================================
// RuleSet
// =============================================================================

/// Ordered rules, the last of which is the catch-all.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<PatternRule>,
}

impl RuleSet {
    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder { rules: Vec::new() }
    }

    /// The conversational rules NLPBot ships with.
    pub fn standard() -> Result<Self, ChatError> {
        use ResponseGenerator::{Dynamic, Static};
        let s = |text: &str| Static(text.to_string());

        Self::builder()
            .rule(
                r"\b(?:hi|hello|hey)\b",
                vec![
                    Dynamic(greet),
                    s("Hi! What can I do for you?"),
                    s("Hey! Need any help?"),
                ],
            )?
            .rule(
                r"\bwhat is your name\b|\bwho are you\b",
                vec![s("I'm NLPBot, your intelligent AI assistant!")],
            )?
            .rule(
                r"\bhow are you\b|\bhow's it going\b",
                vec![
                    s("I'm doing great, thanks! How about you?"),
                    s("All systems operational! Ready to chat!"),
                ],
            )?
            .rule(
                r"(.*)\byour name\b",
                vec![s("I'm NLPBot, but you can call me whatever you like! 😄")],
            )?
            .rule(
                r"\b(?:bye|goodbye|see ya)\b",
                vec![
                    s("Goodbye! Come back soon!"),
                    s("See you later! 👋"),
                    s("Have a great day!"),
                ],
            )?
            .rule(
                r"\b(?:thanks|thank you)\b",
                vec![s("You're welcome! 😊"), s("Happy to help!"), s("Anytime!")],
            )?
            .rule(r"\bsorry\b", vec![s("No worries! 😊"), s("It's all good!")])?
            .rule(
                r"\bwhat can you do\b",
                vec![s(
                    "I can:\n- Chat with you\n- Analyze sentiment\n- Summarize text\n\
                     - Recognize entities\n- Translate phrases\nAsk me anything!",
                )],
            )?
            .rule(
                r"\btell me a joke\b",
                vec![
                    s("Why don't scientists trust atoms? Because they make up everything! 😄"),
                    s("What do you call a fake noodle? An impasta! 🤣"),
                ],
            )?
            .rule(r"\bwhat time is it\b", vec![Dynamic(current_time)])?
            .rule(r"\bwhat day is today\b", vec![Dynamic(current_date)])?
            .rule(
                r"\bhelp\b",
                vec![s(
                    "I can help with:\n- General questions\n- Sentiment analysis\n\
                     - Text summarization\n- Entity recognition\nWhat would you like to try?",
                )],
            )?
            .rule(
                r"\banalyze sentiment for (.*)",
                vec![ResponseGenerator::template("Analyzing sentiment for: {0}")],
            )?
            .rule(
                r"\bsummarize (.*)",
                vec![ResponseGenerator::template("Summarizing text: {0}")],
            )?
            .rule(
                r"(.*)\b(weather|temperature)\b(.*)",
                vec![s(
                    "I wish I could check the weather, but I'm just a chatbot. \
                     Maybe try a weather app? ☀️⛈️",
                )],
            )?
            .rule(
                r"(.*)\b(age|old)\b(.*)",
                vec![s("I'm ageless! But my code was written quite recently. 😊")],
            )?
            .rule(
                r"(.*)\b(love you|like you)\b",
                vec![s("Aww, that's sweet! I think you're pretty cool too! 😊")],
            )?
            .catch_all(vec![
                s("I'm not sure I understand. Could you rephrase that?"),
                s("Interesting! Tell me more."),
                s("I'm still learning. Could you ask me something else?"),
            ])
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Always false: a built rule set holds at least the catch-all.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Index of the catch-all rule.
    pub fn catch_all_index(&self) -> usize {
        self.rules.len().saturating_sub(1)
    }

    /// First rule that matches, in declared order, with its captures.
    pub fn find<'t>(&self, utterance: &'t str) -> Option<(usize, &PatternRule, Captures<'t>)> {
        self.rules
            .iter()
            .enumerate()
            .find_map(|(i, rule)| rule.captures(utterance).map(|caps| (i, rule, caps)))
    }
}

/// Accumulates rules in order; [`catch_all`](Self::catch_all) finishes the set.
#[derive(Debug)]
pub struct RuleSetBuilder {
    rules: Vec<PatternRule>,
}

impl RuleSetBuilder {
    pub fn rule(
        mut self,
        pattern: &str,
        responses: Vec<ResponseGenerator>,
    ) -> Result<Self, ChatError> {
        self.rules.push(PatternRule::new(pattern, responses)?);
        Ok(self)
    }

    /// Append the catch-all rule and build the set.
    pub fn catch_all(mut self, responses: Vec<ResponseGenerator>) -> Result<RuleSet, ChatError> {
        self.rules.push(PatternRule::new(CATCH_ALL_PATTERN, responses)?);
        Ok(RuleSet { rules: self.rules })
    }
}

// =============================================================================
// Dynamic responses
// =============================================================================

fn greet(context: &ResponseContext) -> Result<String, ChatError> {
    let name = context.display_name().unwrap_or("there");
    Ok(format!("Hello {}! 😊 How can I assist you today?", name))
}

fn current_time(context: &ResponseContext) -> Result<String, ChatError> {
    let time = format_now(context, "%H:%M:%S")?;
    Ok(format!("The current time is {}", time))
}

fn current_date(context: &ResponseContext) -> Result<String, ChatError> {
    let date = format_now(context, "%A, %B %d, %Y")?;
    Ok(format!("Today is {}", date))
}

/// Format the context time without panicking on a bad format string.
fn format_now(context: &ResponseContext, format: &str) -> Result<String, ChatError> {
    let mut out = String::new();
    write!(out, "{}", context.now.format(format))
        .map_err(|_| ChatError::Dynamic(format!("cannot format time with '{}'", format)))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn context(name: Option<&str>) -> ResponseContext {
        let now = Local.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap();
        ResponseContext::new(name.map(String::from), now)
    }

    fn matched_index(rules: &RuleSet, utterance: &str) -> usize {
        rules.find(utterance).map(|(i, _, _)| i).unwrap()
    }

    #[test]
    fn test_standard_rule_count_and_catch_all_last() {
        let rules = RuleSet::standard().unwrap();
        assert_eq!(rules.len(), 18);
        assert_eq!(rules.catch_all_index(), 17);
        assert_eq!(rules.rules()[17].source(), CATCH_ALL_PATTERN);
        assert_eq!(rules.rules()[17].responses().len(), 3);
    }

    #[test]
    fn test_declared_order_wins() {
        let rules = RuleSet::standard().unwrap();
        assert_eq!(matched_index(&rules, "hello"), 0);
        assert_eq!(matched_index(&rules, "HELLO there"), 0);
        assert_eq!(matched_index(&rules, "what is your name?"), 1);
        assert_eq!(matched_index(&rules, "what's your name"), 3);
        assert_eq!(matched_index(&rules, "what time is it?"), 9);
        assert_eq!(matched_index(&rules, "what day is today?"), 10);
        assert_eq!(matched_index(&rules, "summarize my notes"), 13);
        assert_eq!(matched_index(&rules, "how is the weather today"), 14);
    }

    #[test]
    fn test_questions_match_without_question_mark() {
        let rules = RuleSet::standard().unwrap();
        assert_eq!(matched_index(&rules, "what time is it"), 9);
        assert_eq!(matched_index(&rules, "what day is today"), 10);
        assert_eq!(matched_index(&rules, "how are you"), 2);
        assert_eq!(matched_index(&rules, "What can you do"), 7);
        assert_eq!(matched_index(&rules, "who are you"), 1);
    }

    fn fixed_texts(rules: &RuleSet, utterance: &str) -> Vec<String> {
        let index = matched_index(rules, utterance);
        rules.rules()[index]
            .responses()
            .iter()
            .map(|r| match r {
                ResponseGenerator::Static(text) => text.clone(),
                other => panic!("expected a static response, got {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_standard_canned_replies() {
        let rules = RuleSet::standard().unwrap();
        assert_eq!(
            fixed_texts(&rules, "what's your name"),
            ["I'm NLPBot, but you can call me whatever you like! 😄"]
        );
        assert_eq!(
            fixed_texts(&rules, "see ya"),
            ["Goodbye! Come back soon!", "See you later! 👋", "Have a great day!"]
        );
        assert_eq!(
            fixed_texts(&rules, "tell me a joke"),
            [
                "Why don't scientists trust atoms? Because they make up everything! 😄",
                "What do you call a fake noodle? An impasta! 🤣",
            ]
        );
        assert_eq!(
            fixed_texts(&rules, "what can you do"),
            ["I can:\n- Chat with you\n- Analyze sentiment\n- Summarize text\n\
              - Recognize entities\n- Translate phrases\nAsk me anything!"]
        );
        assert_eq!(
            fixed_texts(&rules, "how old are you"),
            ["I'm ageless! But my code was written quite recently. 😊"]
        );
        assert_eq!(
            fixed_texts(&rules, "i think i love you"),
            ["Aww, that's sweet! I think you're pretty cool too! 😊"]
        );
    }

    #[test]
    fn test_word_boundaries() {
        let rules = RuleSet::standard().unwrap();
        // "hi" inside "this" / "which" must not trigger the greeting
        assert_eq!(matched_index(&rules, "this is which"), 17);
        assert_eq!(matched_index(&rules, "xyzzy unmatched text"), 17);
    }

    #[test]
    fn test_catch_all_matches_everything() {
        let rules = RuleSet::standard().unwrap();
        assert_eq!(matched_index(&rules, ""), 17);
        assert_eq!(matched_index(&rules, "line one\nline two"), 17);
        assert_eq!(matched_index(&rules, "🦀🦀🦀"), 17);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = RuleSet::builder().rule("(unclosed", vec![ResponseGenerator::fixed("x")]);
        assert!(matches!(result, Err(ChatError::InvalidPattern { .. })));
    }

    #[test]
    fn test_empty_rule_rejected() {
        let result = RuleSet::builder().rule("hello", vec![]);
        assert!(matches!(result, Err(ChatError::EmptyRule(_))));
        let result = RuleSet::builder().catch_all(vec![]);
        assert!(matches!(result, Err(ChatError::EmptyRule(_))));
    }

    #[test]
    fn test_blank_responses_rejected() {
        let result = RuleSet::builder().rule("hello", vec![ResponseGenerator::fixed("  ")]);
        assert!(matches!(result, Err(ChatError::EmptyResponse(_))));
        let result = RuleSet::builder().rule("say (.*)", vec![ResponseGenerator::template("{0}")]);
        assert!(matches!(result, Err(ChatError::EmptyResponse(_))));
    }

    #[test]
    fn test_template_reflects_captures() {
        let rule = PatternRule::new(
            r"\bsummarize (.*)",
            vec![ResponseGenerator::template("Summarizing text: {0}")],
        )
        .unwrap();
        let reflections = ReflectionTable::standard().unwrap();
        let caps = rule.captures("please summarize my notes").unwrap();
        let text = rule.responses()[0]
            .render(&caps, &reflections, &context(None))
            .unwrap();
        assert_eq!(text, "Summarizing text: your notes");
    }

    #[test]
    fn test_template_missing_group_is_empty() {
        let rule = PatternRule::new(
            r"(a)|(b)",
            vec![ResponseGenerator::template("[{0}][{1}][{5}]")],
        )
        .unwrap();
        let reflections = ReflectionTable::empty();
        let caps = rule.captures("b").unwrap();
        let text = rule.responses()[0]
            .render(&caps, &reflections, &context(None))
            .unwrap();
        assert_eq!(text, "[][b][]");
    }

    #[test]
    fn test_greeting_uses_display_name() {
        assert_eq!(
            greet(&context(Some("Ada"))).unwrap(),
            "Hello Ada! 😊 How can I assist you today?"
        );
        assert_eq!(
            greet(&context(None)).unwrap(),
            "Hello there! 😊 How can I assist you today?"
        );
    }

    #[test]
    fn test_time_and_date_responses() {
        assert_eq!(
            current_time(&context(None)).unwrap(),
            "The current time is 09:05:07"
        );
        assert_eq!(
            current_date(&context(None)).unwrap(),
            "Today is Friday, March 01, 2024"
        );
    }

    #[test]
    fn test_bad_time_format_is_error_not_panic() {
        let result = format_now(&context(None), "%Q");
        assert!(matches!(result, Err(ChatError::Dynamic(_))));
    }
}
