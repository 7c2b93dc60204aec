//! Yahoo Finance chart API client

use crate::api::QuoteSource;
use crate::config::StockConfig;
use crate::error::{FailureKind, Result, StockError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Stock quote data
///
/// `change` and `change_percent` are derived from the price and the
/// previous close reported in the same response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    /// `None` when the previous close is zero
    pub change_percent: Option<f64>,
    pub volume: Option<u64>,
    pub market_cap: Option<f64>,
    pub timestamp: String,
}

impl Quote {
    /// Build a quote from the current price and the previous close
    pub fn new(
        symbol: impl Into<String>,
        price: f64,
        previous_close: f64,
        volume: Option<u64>,
        market_cap: Option<f64>,
        market_time: Option<i64>,
    ) -> Self {
        let change = price - previous_close;
        let change_percent = (previous_close != 0.0).then(|| change / previous_close * 100.0);
        let timestamp = market_time
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(Utc::now)
            .format(TIMESTAMP_FORMAT)
            .to_string();

        Self {
            symbol: symbol.into(),
            price,
            change,
            change_percent,
            volume,
            market_cap,
            timestamp,
        }
    }
}

/// Yahoo Finance API client
pub struct YahooFinanceClient {
    client: Client,
    api_base: String,
    api_key: Option<String>,
}

impl YahooFinanceClient {
    /// Create a new client from the stock configuration
    ///
    /// `api_key` is only needed for keyed gateways; the public endpoint
    /// works without one.
    pub fn new(config: &StockConfig, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            client,
            api_base: config.quote_api_base.clone(),
            api_key,
        })
    }

    fn chart_url(&self, symbol: &str) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| StockError::ConfigError(format!("Invalid quote API base: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| StockError::ConfigError("Quote API base cannot hold a path".to_string()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        Ok(url)
    }
}

#[async_trait]
impl QuoteSource for YahooFinanceClient {
    #[instrument(skip(self))]
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        let url = self.chart_url(symbol)?;
        debug!(%url, "Fetching stock price");

        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StockError::quote(FailureKind::Transport, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(%status, "Quote provider returned an error status");
            return Err(StockError::quote(
                FailureKind::Transport,
                format!("HTTP {}", status.as_u16()),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| StockError::quote(FailureKind::Transport, e.to_string()))?;

        parse_chart(symbol, &body)
    }
}

// Chart endpoint payload. Only `meta` is read.

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Option<Chart>,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: Option<String>,
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
    #[serde(default, deserialize_with = "lenient_count")]
    regular_market_volume: Option<u64>,
    #[serde(default, deserialize_with = "lenient_number")]
    market_cap: Option<f64>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    regular_market_time: Option<i64>,
}

// Optional fields: a value of the wrong shape reads as absent instead of
// failing the whole quote.

fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_f64)
        .filter(|n| n.is_finite()))
}

fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?
        .filter(|n| *n >= 0.0 && *n <= u64::MAX as f64)
        .map(|n| n.round() as u64))
}

fn lenient_seconds<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?
        .filter(|n| n.abs() <= i64::MAX as f64)
        .map(|n| n.trunc() as i64))
}

/// Turn a chart response body into a quote
///
/// Fails unless the first result carries both a price and a previous close.
pub fn parse_chart(requested_symbol: &str, body: &str) -> Result<Quote> {
    let response: ChartResponse = serde_json::from_str(body).map_err(|e| {
        StockError::quote(FailureKind::MalformedResponse, format!("Invalid response: {e}"))
    })?;

    let no_data = || StockError::quote(FailureKind::MalformedResponse, "No stock data found");

    let meta = response
        .chart
        .and_then(|c| c.result)
        .and_then(|r| r.into_iter().next())
        .and_then(|r| r.meta)
        .ok_or_else(no_data)?;

    let price = meta.regular_market_price.ok_or_else(no_data)?;
    let previous_close = meta
        .previous_close
        .or(meta.chart_previous_close)
        .ok_or_else(no_data)?;

    Ok(Quote::new(
        meta.symbol.unwrap_or_else(|| requested_symbol.to_string()),
        price,
        previous_close,
        meta.regular_market_volume,
        meta.market_cap,
        meta.regular_market_time,
    ))
}
