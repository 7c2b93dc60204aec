//! Exa neural search client for recent stock news

use crate::api::NewsSource;
use crate::config::StockConfig;
use crate::error::{FailureKind, Result, StockError};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument, warn};

const UNKNOWN_SOURCE: &str = "unknown source";
const NO_SUMMARY: &str = "No summary available";

/// A news article as shown to the user and fed to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub title: String,
    pub url: String,
    /// Host name of `url`
    pub source: String,
    /// RFC 3339; retrieval time when the provider gave no date
    pub published_at: String,
    pub description: String,
}

/// Raw search hit
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(default)]
    pub title: Option<String>,
    pub url: String,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

/// Exa search API client
pub struct ExaClient {
    client: Client,
    api_base: String,
    max_results: u32,
    description_chars: usize,
}

impl ExaClient {
    /// Create a new client from the stock configuration
    pub fn new(config: &StockConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            api_base: config.news_api_base.trim_end_matches('/').to_string(),
            max_results: config.max_news_results,
            description_chars: config.description_chars,
        })
    }

    fn search_body(&self, symbol: &str) -> serde_json::Value {
        json!({
            "query": format!("{symbol} stock news"),
            "type": "neural",
            "numResults": self.max_results,
            "useAutoprompt": true,
            "contents": { "text": true },
            "category": "news"
        })
    }
}

#[async_trait]
impl NewsSource for ExaClient {
    #[instrument(skip(self, api_key))]
    async fn fetch_news(&self, symbol: &str, api_key: Option<&str>) -> Result<Vec<NewsArticle>> {
        let api_key = api_key.ok_or_else(|| StockError::MissingCredential {
            provider: "Exa".to_string(),
        })?;

        let url = format!("{}/search", self.api_base);
        debug!(%url, "Fetching recent stock news");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .json(&self.search_body(symbol))
            .send()
            .await
            .map_err(|e| StockError::news(FailureKind::Transport, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!(status, "News provider returned an error status");
            return Err(StockError::news(
                FailureKind::Transport,
                format!("Exa API error: {status}"),
            ));
        }

        let data: SearchResponse = response.json().await.map_err(|e| {
            StockError::news(FailureKind::MalformedResponse, format!("Invalid response: {e}"))
        })?;

        if data.results.is_empty() {
            return Err(StockError::NoArticles);
        }

        debug!(count = data.results.len(), "Received news results");
        Ok(data
            .results
            .into_iter()
            .map(|r| to_article(r, self.description_chars))
            .collect())
    }
}

/// Map a raw search hit into an article
pub fn to_article(result: SearchResult, description_chars: usize) -> NewsArticle {
    let source = url::Url::parse(&result.url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

    let description = match result.text.as_deref().filter(|t| !t.is_empty()) {
        Some(text) => {
            let mut cut: String = text.chars().take(description_chars).collect();
            cut.push_str("...");
            cut
        }
        None => NO_SUMMARY.to_string(),
    };

    NewsArticle {
        title: result.title.unwrap_or_default(),
        source,
        published_at: result
            .published_date
            .unwrap_or_else(|| Utc::now().to_rfc3339()),
        description,
        url: result.url,
    }
}
