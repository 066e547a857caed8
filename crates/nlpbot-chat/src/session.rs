//! Conversation session: the active mode plus an append-only turn log.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use nlpbot_core::{Mode, Role};

use crate::types::{Details, Reply};

/// One utterance or reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Local>,
    pub details: Option<Details>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Local::now(),
            details: None,
        }
    }

    pub fn assistant(reply: Reply) -> Self {
        Self {
            role: Role::Assistant,
            content: reply.text,
            timestamp: Local::now(),
            details: reply.details,
        }
    }
}

/// State of one conversation.
///
/// The mode changes only through [`select_mode`](Self::select_mode). Turns
/// are exposed read-only and only the router appends them.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    mode: Mode,
    turns: Vec<Turn>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Mode::default())
    }
}

impl Session {
    /// Start a session in `mode` with no turns.
    pub fn new(mode: Mode) -> Self {
        let id = Uuid::new_v4();
        tracing::info!(session = %id, mode = %mode, "Session started");
        Self {
            id,
            mode,
            turns: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch the active mode. Existing turns are kept.
    pub fn select_mode(&mut self, mode: Mode) {
        if mode != self.mode {
            tracing::info!(session = %self.id, from = %self.mode, to = %mode, "Mode changed");
            self.mode = mode;
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Drop every turn. The mode is unchanged.
    pub fn clear(&mut self) {
        tracing::info!(session = %self.id, turns = self.turns.len(), "Session cleared");
        self.turns.clear();
    }

    pub(crate) fn push(&mut self, turn: Turn) -> &Turn {
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }
}
