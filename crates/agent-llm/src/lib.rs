//! Language-model client layer for the stock analyzer
//!
//! This crate provides the provider-agnostic pieces needed to hold a
//! multi-turn conversation with a generative model:
//!
//! - Role-tagged message types
//! - Generation settings and prompt strategies
//! - The `LLMProvider` trait
//! - Concrete provider implementations (behind feature flags)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{GenerationConfig, PromptStrategy, flatten_messages};
pub use error::{LLMError, Result};
pub use messages::{Message, Role};
pub use provider::LLMProvider;

// Provider implementations (feature-gated)
#[cfg(feature = "gemini")]
pub mod providers;
