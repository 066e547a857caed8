//! Error types for the conversational core.

use nlpbot_insight::InsightError;

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("rule '{0}' has no responses")]
    EmptyRule(String),
    #[error("rule '{0}' has a blank response")]
    EmptyResponse(String),
    #[error("no rule matched: {0}")]
    NoRuleMatched(String),
    #[error("dynamic response failed: {0}")]
    Dynamic(String),
    #[error(transparent)]
    Insight(#[from] InsightError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        let err = ChatError::InvalidPattern {
            pattern: "(".to_string(),
            reason: "unclosed group".to_string(),
        };
        assert_eq!(err.to_string(), "invalid pattern '(': unclosed group");

        let err = ChatError::EmptyRule("hello".to_string());
        assert_eq!(err.to_string(), "rule 'hello' has no responses");

        let err = ChatError::EmptyResponse("hello".to_string());
        assert_eq!(err.to_string(), "rule 'hello' has a blank response");

        let err = ChatError::NoRuleMatched("xyzzy".to_string());
        assert_eq!(err.to_string(), "no rule matched: xyzzy");

        let err = ChatError::Dynamic("bad format".to_string());
        assert_eq!(err.to_string(), "dynamic response failed: bad format");
    }

    #[test]
    fn test_chat_error_from_insight_is_transparent() {
        let err: ChatError = InsightError::InsufficientData("no sentences".to_string()).into();
        assert!(matches!(err, ChatError::Insight(_)));
        assert_eq!(err.to_string(), "insufficient data: no sentences");
    }
}
