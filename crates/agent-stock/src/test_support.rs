//! In-process stand-ins for the three external services.
//!
//! Each fake records the calls it receives so tests can assert on call
//! counts and on the exact conversation a model call saw.

use std::collections::VecDeque;
use std::sync::Mutex;

use agent_llm::{LLMError, LLMProvider, Message};
use async_trait::async_trait;

use crate::api::{NewsArticle, NewsSource, Quote, QuoteSource};
use crate::error::{FailureKind, Result, StockError};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// A quote for ACME at 100.00, up from 90.00
pub fn acme_quote() -> Quote {
    Quote::new("ACME", 100.0, 90.0, Some(1_000_000), Some(2.5e9), Some(1_700_000_000))
}

/// One article headlined "ACME soars" on example.com
pub fn acme_article() -> NewsArticle {
    NewsArticle {
        title: "ACME soars".to_string(),
        url: "https://example.com/a".to_string(),
        source: "example.com".to_string(),
        published_at: "2024-05-01T10:00:00Z".to_string(),
        description: "No summary available".to_string(),
    }
}

/// Quote source returning a fixed quote or a fixed failure
pub struct StaticQuoteSource {
    quote: std::result::Result<Quote, String>,
    calls: Mutex<Vec<String>>,
}

impl StaticQuoteSource {
    pub fn ok(quote: Quote) -> Self {
        Self {
            quote: Ok(quote),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call with `Failed to fetch stock price: <reason>`
    pub fn failing(reason: &str) -> Self {
        Self {
            quote: Err(reason.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl QuoteSource for StaticQuoteSource {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        lock(&self.calls).push(symbol.to_string());
        self.quote
            .clone()
            .map_err(|reason| StockError::quote(FailureKind::Transport, reason))
    }
}

/// News source with the same credential and empty-result rules as the real client
pub struct StaticNewsSource {
    articles: std::result::Result<Vec<NewsArticle>, String>,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl StaticNewsSource {
    pub fn ok(articles: Vec<NewsArticle>) -> Self {
        Self {
            articles: Ok(articles),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            articles: Err(reason.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls as `(symbol, api_key)` pairs
    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl NewsSource for StaticNewsSource {
    async fn fetch_news(&self, symbol: &str, api_key: Option<&str>) -> Result<Vec<NewsArticle>> {
        lock(&self.calls).push((symbol.to_string(), api_key.map(str::to_string)));

        if api_key.is_none() {
            return Err(StockError::MissingCredential {
                provider: "Exa".to_string(),
            });
        }
        match &self.articles {
            Ok(articles) if articles.is_empty() => Err(StockError::NoArticles),
            Ok(articles) => Ok(articles.clone()),
            Err(reason) => Err(StockError::news(FailureKind::Transport, reason.clone())),
        }
    }
}

/// Language model that answers from a script, or with a fixed reply once the
/// script runs out
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<std::result::Result<String, u16>>>,
    fallback: String,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    /// Always answers `reply`
    pub fn echo(reply: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: reply.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful reply
    pub fn then_reply(self, reply: &str) -> Self {
        lock(&self.replies).push_back(Ok(reply.to_string()));
        self
    }

    /// Queue an API error with the given status
    pub fn then_fail(self, status: u16) -> Self {
        lock(&self.replies).push_back(Err(status));
        self
    }

    /// Every conversation the model was asked about, oldest first
    pub fn calls(&self) -> Vec<Vec<Message>> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn generate(&self, messages: &[Message]) -> agent_llm::Result<String> {
        lock(&self.calls).push(messages.to_vec());

        match lock(&self.replies).pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(status)) => Err(LLMError::ApiError {
                provider: self.name().to_string(),
                status,
            }),
            None => Ok(self.fallback.clone()),
        }
    }

    fn name(&self) -> &str {
        "Gemini"
    }
}
