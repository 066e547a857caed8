//! Transcript export: the session's turns as a JSON array on disk.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use nlpbot_chat::Session;
use nlpbot_core::Result;

/// Message shown instead of writing an empty transcript.
pub const NOTHING_TO_SAVE: &str = "No conversation to save yet.";

/// File name for a transcript saved at `at`.
pub fn transcript_file_name(at: DateTime<Local>) -> String {
    format!("chat_history_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Write the session's turns to `<dir>/chat_history_<timestamp>.json`.
///
/// Returns `Ok(None)` without touching the filesystem when the session has
/// no turns.
pub fn save_transcript(
    session: &Session,
    dir: &Path,
    at: DateTime<Local>,
) -> Result<Option<PathBuf>> {
    if session.is_empty() {
        return Ok(None);
    }

    std::fs::create_dir_all(dir)?;
    let path = dir.join(transcript_file_name(at));
    let json = serde_json::to_string_pretty(session.turns())?;
    std::fs::write(&path, json)?;

    tracing::info!(path = %path.display(), turns = session.len(), "Transcript saved");
    Ok(Some(path))
}
