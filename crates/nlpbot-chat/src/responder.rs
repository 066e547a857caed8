//! Pattern-matching responder.
//!
//! Picks the first matching rule, then one of its responses uniformly at
//! random using a caller-supplied RNG.

use rand::Rng;

use crate::error::ChatError;
use crate::reflection::ReflectionTable;
use crate::rules::RuleSet;
use crate::types::ResponseContext;

/// Used when a dynamic response fails or, in release builds, if no rule
/// matched.
pub const GENERIC_FALLBACK: &str = "I'm not sure I understand. Could you rephrase that?";

/// The outcome of responding to one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Index of the winning rule.
    pub rule_index: usize,
    /// Index of the chosen response within that rule.
    pub response_index: usize,
    pub text: String,
}

/// Immutable rule engine. Randomness comes from the caller.
#[derive(Debug, Clone)]
pub struct Responder {
    rules: RuleSet,
    reflections: ReflectionTable,
}

impl Responder {
    pub fn new(rules: RuleSet, reflections: ReflectionTable) -> Self {
        Self { rules, reflections }
    }

    /// Standard rules with the standard reflection table.
    pub fn standard() -> Result<Self, ChatError> {
        Ok(Self::new(RuleSet::standard()?, ReflectionTable::standard()?))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Respond to `utterance`. Never fails and never returns empty text.
    pub fn respond<R: Rng>(
        &self,
        utterance: &str,
        context: &ResponseContext,
        rng: &mut R,
    ) -> String {
        self.select(utterance, context, rng).text
    }

    /// Like [`respond`](Self::respond), also reporting which rule and
    /// response were chosen.
    pub fn select<R: Rng>(
        &self,
        utterance: &str,
        context: &ResponseContext,
        rng: &mut R,
    ) -> Selection {
        let Some((rule_index, rule, captures)) = self.rules.find(utterance) else {
            debug_assert!(false, "rule set has no catch-all");
            tracing::error!(
                error = %ChatError::NoRuleMatched(utterance.to_string()),
                "Rule set invariant violated"
            );
            return Selection {
                rule_index: self.rules.catch_all_index(),
                response_index: 0,
                text: GENERIC_FALLBACK.to_string(),
            };
        };

        let responses = rule.responses();
        let response_index = rng.random_range(0..responses.len());
        tracing::debug!(
            rule = rule_index,
            pattern = rule.source(),
            response = response_index,
            "Rule matched"
        );

        let rendered = responses[response_index].render(&captures, &self.reflections, context);
        let text = match rendered {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                tracing::warn!(rule = rule_index, "Dynamic response was empty, using fallback");
                GENERIC_FALLBACK.to_string()
            }
            Err(e) => {
                tracing::warn!(
                    rule = rule_index,
                    error = %e,
                    "Dynamic response failed, using fallback"
                );
                GENERIC_FALLBACK.to_string()
            }
        };

        Selection {
            rule_index,
            response_index,
            text,
        }
    }
}
