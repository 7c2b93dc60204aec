//! Prompt templates for the analysis steps
//!
//! - `system`: the analyst instruction prepended to every model call
//! - `user`: the user messages built at steps 2, 3 and 5

mod system;
mod user;

pub use system::*;
pub use user::*;

use crate::api::{NewsArticle, Quote};
use crate::error::Result;
use agent_llm::Message;
use minijinja::{Environment, context};

/// Registry of the user message templates
pub struct PromptLibrary {
    env: Environment<'static>,
}

impl std::fmt::Debug for PromptLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptLibrary")
            .field("templates", &USER_TEMPLATES.map(|(name, _)| name))
            .finish()
    }
}

impl PromptLibrary {
    /// Load every template
    ///
    /// Fails only if a built-in template does not parse.
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        for (name, source) in USER_TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String> {
        Ok(self.env.get_template(name)?.render(ctx)?)
    }

    /// `Analyze this stock data: <quote as pretty JSON>`
    pub fn price_analysis_request(&self, quote: &Quote) -> Result<Message> {
        let quote_json = serde_json::to_string_pretty(quote)?;
        let text = self.render(ANALYZE_PRICE.0, context! { quote_json })?;
        Ok(Message::user(text))
    }

    /// Headline and source of each article, one per line
    pub fn news_summary(&self, articles: &[NewsArticle]) -> Result<Message> {
        let text = self.render(NEWS_SUMMARY.0, context! { articles })?;
        Ok(Message::user(text))
    }

    pub fn recommendation_request(&self, symbol: &str) -> Result<Message> {
        let text = self.render(RECOMMENDATION.0, context! { symbol })?;
        Ok(Message::user(text))
    }
}
