use thiserror::Error;

/// Top-level error type for NLPBot.
///
/// Subsystem crates define their own error types; this one covers the
/// cross-cutting concerns (configuration, I/O, serialization, mode labels).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NlpbotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unknown mode: {0}")]
    UnknownMode(String),
}

impl From<toml::de::Error> for NlpbotError {
    fn from(err: toml::de::Error) -> Self {
        NlpbotError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for NlpbotError {
    fn from(err: toml::ser::Error) -> Self {
        NlpbotError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for NlpbotError {
    fn from(err: serde_json::Error) -> Self {
        NlpbotError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for NLPBot operations.
pub type Result<T> = std::result::Result<T, NlpbotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(NlpbotError, &str)> = vec![
            (
                NlpbotError::Config("bad key".to_string()),
                "Configuration error: bad key",
            ),
            (
                NlpbotError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
            (
                NlpbotError::UnknownMode("translation".to_string()),
                "Unknown mode: translation",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: NlpbotError = io_err.into();
        assert!(matches!(err, NlpbotError::Io(_)));
        assert!(err.to_string().starts_with("I/O error:"));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let err: std::result::Result<toml::Value, _> = toml::from_str("invalid = [[[");
        let err: NlpbotError = err.unwrap_err().into();
        assert!(matches!(err, NlpbotError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let err: std::result::Result<serde_json::Value, _> = serde_json::from_str("{ nope }");
        let err: NlpbotError = err.unwrap_err().into();
        assert!(matches!(err, NlpbotError::Serialization(_)));
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let value = io_result?;
            Ok(value.to_string())
        }

        assert_eq!(inner().unwrap(), "42");
    }
}
