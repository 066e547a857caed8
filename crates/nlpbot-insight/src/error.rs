use thiserror::Error;

/// Errors that can occur in the analysis handlers.
#[derive(Error, Debug)]
pub enum InsightError {
    #[error("insufficient data: {0}")]
    InsufficientData(String),
    #[error("ranking failed: {0}")]
    Ranking(String),
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("config error: {0}")]
    Config(String),
}
