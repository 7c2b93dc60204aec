//! Error types for LLM operations

use thiserror::Error;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LLMError {
    /// No credential configured for the provider; raised before any request is built
    #[error("{provider} API key not set")]
    MissingApiKey {
        /// Provider display name
        provider: String,
    },

    /// Provider answered with a non-success status
    #[error("{provider} API error: {status}")]
    ApiError {
        /// Provider display name
        provider: String,
        /// HTTP status code
        status: u16,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP error
    #[cfg(feature = "reqwest")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl LLMError {
    /// Whether this error was raised before any network traffic
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, Self::MissingApiKey { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LLMError::MissingApiKey {
            provider: "Gemini".to_string(),
        };
        assert_eq!(err.to_string(), "Gemini API key not set");
        assert!(err.is_missing_credential());

        let err = LLMError::ApiError {
            provider: "Gemini".to_string(),
            status: 503,
        };
        assert_eq!(err.to_string(), "Gemini API error: 503");
        assert!(!err.is_missing_credential());
    }
}
