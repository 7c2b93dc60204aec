//! Agentic stock analysis pipeline
//!
//! This crate runs a fixed five-step analysis for one ticker symbol:
//!
//! 1. Fetch a quote (Yahoo Finance chart endpoint)
//! 2. Ask the language model to analyze the price data
//! 3. Fetch recent news (Exa search)
//! 4. Ask the model for a deeper analysis including the news
//! 5. Ask the model for a trading recommendation
//!
//! A quote failure ends the run, a news failure is reported and skipped, and
//! a model failure ends the run with `Analysis failed: ...`.
//!
//! # Example
//!
//! ```rust,ignore
//! use agent_stock::{
//!     AnalysisSession, ConsoleSink, Credentials, FileCredentialStore, OutputFormat,
//!     StockAnalysisEngine, StockConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let credentials = Credentials::load(&FileCredentialStore::new("credentials.json"))?;
//!     let config = StockConfig::default().with_env_overrides();
//!     let engine = StockAnalysisEngine::from_config(&config, &credentials, OutputFormat::Text)?;
//!
//!     let mut session = AnalysisSession::new("AAPL", credentials);
//!     let outcome = engine.run(&mut session, &mut ConsoleSink::stdout()).await;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod credentials;
pub mod engine;
pub mod error;
pub mod interface;
pub mod prompts;
pub mod test_support;

// Re-export main types for convenience
pub use api::{
    ExaClient, NewsArticle, NewsSource, Quote, QuoteSource, YahooFinanceClient, normalize_symbol,
};
pub use config::{StockConfig, StockConfigBuilder};
pub use credentials::{
    CredentialStore, Credentials, FileCredentialStore, MemoryCredentialStore, PLACEHOLDER_KEY,
    Provider, StoredCredentials,
};
pub use engine::{
    AnalysisSession, AnalysisState, ConversationState, RunOutcome, StepResult,
    StockAnalysisEngine, run_mock_sequence, run_self_test,
};
pub use error::{FailureKind, Result, StockError};
pub use interface::{ConsoleSink, Formatter, MemorySink, OutputFormat, PresentationSink};
