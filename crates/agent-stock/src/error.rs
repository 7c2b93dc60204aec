//! Error types for stock analysis operations

use thiserror::Error;

/// Coarse classification of a provider failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A required credential is absent; no request was made
    MissingCredential,
    /// Non-success status or network failure
    Transport,
    /// Success status but the payload lacked expected fields
    MalformedResponse,
}

/// Stock analysis specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// Quote provider could not deliver a usable quote
    #[error("Failed to fetch stock price: {reason}")]
    QuoteUnavailable {
        kind: FailureKind,
        reason: String,
    },

    /// News provider request failed
    #[error("Failed to fetch news: {reason}")]
    NewsUnavailable {
        kind: FailureKind,
        reason: String,
    },

    /// News search succeeded but returned nothing
    #[error("No news articles found")]
    NoArticles,

    /// Credential for a provider is not configured
    #[error("Missing {provider} API key. Please add it to your credentials file.")]
    MissingCredential {
        provider: String,
    },

    /// Invalid stock symbol provided
    #[error("{0}")]
    InvalidSymbol(String),

    /// Language-model failure
    #[error(transparent)]
    Llm(#[from] agent_llm::LLMError),

    /// Rendering a template failed
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Credential storage I/O failure
    #[error("Credential store error: {0}")]
    Io(#[from] std::io::Error),

    /// Network or HTTP client construction error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StockError {
    /// Build a quote failure
    pub fn quote(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self::QuoteUnavailable {
            kind,
            reason: reason.into(),
        }
    }

    /// Build a news failure
    pub fn news(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self::NewsUnavailable {
            kind,
            reason: reason.into(),
        }
    }

    /// Classify the error, if it came from a provider
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::QuoteUnavailable { kind, .. } | Self::NewsUnavailable { kind, .. } => Some(*kind),
            Self::NoArticles => Some(FailureKind::MalformedResponse),
            Self::MissingCredential { .. } => Some(FailureKind::MissingCredential),
            Self::Llm(err) if err.is_missing_credential() => Some(FailureKind::MissingCredential),
            Self::Llm(agent_llm::LLMError::UnexpectedResponse(_)) => {
                Some(FailureKind::MalformedResponse)
            }
            Self::Llm(_) | Self::NetworkError(_) => Some(FailureKind::Transport),
            _ => None,
        }
    }
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;
