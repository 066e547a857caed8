//! Feature router: dispatches each utterance by the session mode.
//!
//! Every utterance produces exactly two turns, the user's and the
//! assistant's. Handler errors become apology replies; nothing escapes.

use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use nlpbot_core::{Mode, NlpbotConfig};
use nlpbot_insight::{
    EntityExtractor, Extraction, LexiconScorer, SentimentClassifier, Summarizer,
};

use crate::error::ChatError;
use crate::responder::Responder;
use crate::session::{Session, Turn};
use crate::types::{DetailPayload, Reply, ResponseContext};

/// Shown when summarization fails.
pub const SUMMARY_APOLOGY: &str =
    "Oops, I couldn't summarize that. Please try a shorter or clearer text.";

/// Shown when any other handler fails.
pub const GENERIC_APOLOGY: &str =
    "Sorry, something went wrong while processing that. Please try again.";

/// Shown when entity extraction finds nothing.
pub const NO_ENTITIES: &str = "No named entities found in the text.";

/// Owns the responder and the three analysis handlers.
pub struct FeatureRouter {
    responder: Responder,
    classifier: SentimentClassifier,
    summarizer: Summarizer,
    extractor: EntityExtractor,
    rng: StdRng,
    thinking_delay: Duration,
}

impl FeatureRouter {
    /// Create a router with an entropy-seeded RNG and no thinking delay.
    pub fn new(
        responder: Responder,
        classifier: SentimentClassifier,
        summarizer: Summarizer,
        extractor: EntityExtractor,
    ) -> Self {
        Self {
            responder,
            classifier,
            summarizer,
            extractor,
            rng: StdRng::from_os_rng(),
            thinking_delay: Duration::ZERO,
        }
    }

    /// Build every handler from configuration.
    ///
    /// Fails on invalid lexicon entries. A missing entity model is not an
    /// error; entity recognition runs degraded.
    pub fn from_config(config: &NlpbotConfig) -> Result<Self, ChatError> {
        let scorer = LexiconScorer::with_entries(
            config
                .sentiment
                .lexicon
                .iter()
                .map(|(word, polarity)| (word.as_str(), *polarity)),
        )?;

        let router = Self::new(
            Responder::standard()?,
            SentimentClassifier::new(Box::new(scorer)),
            Summarizer::from_config(&config.summarizer),
            EntityExtractor::load(&config.entities.model),
        )
        .with_thinking_delay(Duration::from_millis(config.chat.thinking_delay_ms));

        Ok(match config.chat.seed {
            Some(seed) => router.with_seed(seed),
            None => router,
        })
    }

    /// Make response selection deterministic.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Pause before each reply. `Duration::ZERO` disables the pause.
    pub fn with_thinking_delay(mut self, delay: Duration) -> Self {
        self.thinking_delay = delay;
        self
    }

    pub fn thinking_delay(&self) -> Duration {
        self.thinking_delay
    }

    pub fn extractor(&self) -> &EntityExtractor {
        &self.extractor
    }

    /// Record `utterance`, answer it in the session's mode, and return the
    /// assistant turn.
    pub fn handle<'s>(
        &mut self,
        session: &'s mut Session,
        utterance: &str,
        context: &ResponseContext,
    ) -> &'s Turn {
        session.push(Turn::user(utterance));

        if !self.thinking_delay.is_zero() {
            thread::sleep(self.thinking_delay);
        }

        let mode = session.mode();
        let reply = self.dispatch(mode, utterance, context);
        session.push(Turn::assistant(reply))
    }

    /// Run exactly one handler for `mode`, converting failures into replies.
    pub fn dispatch(&mut self, mode: Mode, utterance: &str, context: &ResponseContext) -> Reply {
        tracing::debug!(mode = %mode, chars = utterance.chars().count(), "Dispatching utterance");

        let result = match mode {
            Mode::Chat => Ok(self.chat(utterance, context)),
            Mode::SentimentAnalysis => Ok(self.sentiment(utterance)),
            Mode::TextSummarization => self.summarize(utterance),
            Mode::EntityRecognition => Ok(self.entities(utterance)),
        };

        result.unwrap_or_else(|e| recover(mode, e))
    }

    fn chat(&mut self, utterance: &str, context: &ResponseContext) -> Reply {
        Reply::plain(self.responder.respond(utterance, context, &mut self.rng))
    }

    fn sentiment(&self, text: &str) -> Reply {
        let sentiment = self.classifier.classify(text);
        let result = sentiment.to_string();
        Reply::with_details(
            format!("Sentiment Analysis Result: {}", result),
            Mode::SentimentAnalysis,
            DetailPayload::Sentiment {
                text: text.to_string(),
                result,
                label: sentiment.label,
                score: sentiment.score,
            },
        )
    }

    fn summarize(&self, text: &str) -> Result<Reply, ChatError> {
        let summary = self.summarizer.summarize(text)?;
        Ok(Reply::with_details(
            format!("Text Summary: {}", summary),
            Mode::TextSummarization,
            DetailPayload::Summary {
                original_text: text.to_string(),
                summary,
                algorithm: self.summarizer.algorithm().to_string(),
            },
        ))
    }

    fn entities(&self, text: &str) -> Reply {
        let entities = match self.extractor.extract(text) {
            Extraction::Entities(entities) => entities,
            Extraction::Unavailable(message) => return Reply::plain(message),
        };

        let body = if entities.is_empty() {
            NO_ENTITIES.to_string()
        } else {
            let lines: Vec<String> = entities
                .iter()
                .map(|e| format!("- {} ({})", e.text, e.label))
                .collect();
            format!("Named Entities Found:\n{}", lines.join("\n"))
        };

        Reply::with_details(
            body,
            Mode::EntityRecognition,
            DetailPayload::Entities {
                text: text.to_string(),
                entities: entities.into_iter().map(|e| (e.text, e.label)).collect(),
                model: self.extractor.model_name().unwrap_or_default().to_string(),
            },
        )
    }
}

/// Turn a handler error into an apology with the error in the details.
fn recover(mode: Mode, error: ChatError) -> Reply {
    tracing::warn!(mode = %mode, error = %error, "Handler failed");
    let text = match mode {
        Mode::TextSummarization => SUMMARY_APOLOGY,
        _ => GENERIC_APOLOGY,
    };
    Reply::with_details(
        text,
        mode,
        DetailPayload::Failure {
            error: error.to_string(),
        },
    )
}
