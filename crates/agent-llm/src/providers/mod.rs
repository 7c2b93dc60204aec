//! Concrete LLM provider implementations
//!
//! This module contains implementations of the LLMProvider trait for
//! various LLM services.

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "gemini")]
pub use gemini::{GeminiConfig, GeminiProvider, NO_RESPONSE_PLACEHOLDER};
