//! LLM provider trait definition

use crate::{Message, Result};
use async_trait::async_trait;

/// Trait for LLM providers
///
/// A provider turns an ordered, role-tagged conversation into a single
/// plain-text reply. Failures are returned to the caller untouched; it is up
/// to the caller to decide whether a failed generation ends its work.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate a reply for the conversation
    ///
    /// # Arguments
    ///
    /// * `messages` - The conversation so far, oldest first
    ///
    /// # Returns
    ///
    /// The model's reply text
    async fn generate(&self, messages: &[Message]) -> Result<String>;

    /// Get the provider name (e.g., "Gemini")
    fn name(&self) -> &str;
}
