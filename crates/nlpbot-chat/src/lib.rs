//! Conversational core for NLPBot.
//!
//! Provides the ordered pattern-matching responder, pronoun reflection,
//! the append-only conversation session, and the feature router that
//! dispatches each utterance to the handler selected by the session mode.

pub mod error;
pub mod reflection;
pub mod responder;
pub mod router;
pub mod rules;
pub mod session;
pub mod types;

pub use error::ChatError;
pub use reflection::ReflectionTable;
pub use responder::{Responder, Selection};
pub use router::FeatureRouter;
pub use rules::{PatternRule, ResponseGenerator, RuleSet, RuleSetBuilder};
pub use session::{Session, Turn};
pub use types::{DetailPayload, Details, Reply, ResponseContext};
