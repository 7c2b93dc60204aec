//! API clients for market data and news providers

pub mod exa;
pub mod yahoo;

use crate::error::{Result, StockError};
use async_trait::async_trait;

pub use exa::{ExaClient, NewsArticle};
pub use yahoo::{Quote, YahooFinanceClient};

/// Source of point-in-time quotes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the latest quote for an already-normalized symbol
    ///
    /// Every failure is returned as a `StockError`; a partially filled
    /// quote is never produced.
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote>;
}

/// Source of recent news for a symbol
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Fetch recent articles
    ///
    /// Without an `api_key` this fails with `StockError::MissingCredential`
    /// and performs no request. An empty result set is reported as
    /// `StockError::NoArticles`, never as an empty list.
    async fn fetch_news(&self, symbol: &str, api_key: Option<&str>) -> Result<Vec<NewsArticle>>;
}

/// Trim and uppercase user input into a ticker symbol
pub fn normalize_symbol(input: &str) -> Result<String> {
    let symbol = input.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(StockError::InvalidSymbol(
            "Please enter a stock symbol".to_string(),
        ));
    }
    Ok(symbol)
}
