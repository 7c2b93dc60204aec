//! Configuration for stock analysis operations

use crate::error::{Result, StockError};
use agent_llm::providers::GeminiConfig;
use agent_llm::{GenerationConfig, PromptStrategy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_QUOTE_API_BASE: &str = "https://query1.finance.yahoo.com";
const DEFAULT_NEWS_API_BASE: &str = "https://api.exa.ai";

/// Configuration for stock analysis operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// Base URL of the chart/quote endpoint
    pub quote_api_base: String,

    /// Base URL of the news search endpoint
    pub news_api_base: String,

    /// Base URL of the generative model endpoint
    pub model_api_base: String,

    /// Model name
    pub model: String,

    /// Request timeout duration, applied to every provider
    pub request_timeout: Duration,

    /// Maximum number of news articles requested
    pub max_news_results: u32,

    /// Article descriptions are cut to this many characters
    pub description_chars: usize,

    /// Sampling settings for every model call
    pub generation: GenerationConfig,

    /// How the conversation is sent to the model
    pub prompt_strategy: PromptStrategy,

    /// Pause between steps of the mock sequence
    pub mock_step_delay: Duration,
}

impl Default for StockConfig {
    fn default() -> Self {
        let gemini = GeminiConfig::default();
        Self {
            quote_api_base: DEFAULT_QUOTE_API_BASE.to_string(),
            news_api_base: DEFAULT_NEWS_API_BASE.to_string(),
            model_api_base: gemini.api_base,
            model: gemini.model,
            request_timeout: Duration::from_secs(30),
            max_news_results: 5,
            description_chars: 200,
            generation: GenerationConfig::default(),
            prompt_strategy: PromptStrategy::Flattened,
            mock_step_delay: Duration::from_secs(1),
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Apply endpoint and model overrides from the environment
    ///
    /// Reads `STOCK_QUOTE_API_BASE`, `EXA_API_BASE`, `GEMINI_API_BASE`,
    /// `GEMINI_MODEL` and `STOCK_MOCK_DELAY_MS`. Unparseable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(base) = std::env::var("STOCK_QUOTE_API_BASE") {
            self.quote_api_base = base;
        }
        if let Ok(base) = std::env::var("EXA_API_BASE") {
            self.news_api_base = base;
        }
        if let Ok(base) = std::env::var("GEMINI_API_BASE") {
            self.model_api_base = base;
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            self.model = model;
        }
        if let Some(millis) = std::env::var("STOCK_MOCK_DELAY_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            self.mock_step_delay = Duration::from_millis(millis);
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(StockError::ConfigError("model name must not be empty".to_string()));
        }

        if self.max_news_results == 0 {
            return Err(StockError::ConfigError(
                "max_news_results must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(StockError::ConfigError(format!(
                "temperature {} is outside 0.0..=2.0",
                self.generation.temperature
            )));
        }

        for (name, base) in [
            ("quote_api_base", &self.quote_api_base),
            ("news_api_base", &self.news_api_base),
            ("model_api_base", &self.model_api_base),
        ] {
            url::Url::parse(base)
                .map_err(|e| StockError::ConfigError(format!("{name} is not a valid URL: {e}")))?;
        }

        Ok(())
    }

    /// Provider settings for the language model, using the given credential
    pub fn gemini_config(&self, api_key: Option<String>) -> GeminiConfig {
        GeminiConfig::new(api_key)
            .with_api_base(self.model_api_base.clone())
            .with_model(self.model.clone())
            .with_timeout(self.request_timeout.as_secs().max(1))
            .with_generation(self.generation)
            .with_strategy(self.prompt_strategy)
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    quote_api_base: Option<String>,
    news_api_base: Option<String>,
    model_api_base: Option<String>,
    model: Option<String>,
    request_timeout: Option<Duration>,
    max_news_results: Option<u32>,
    generation: Option<GenerationConfig>,
    prompt_strategy: Option<PromptStrategy>,
    mock_step_delay: Option<Duration>,
}

impl StockConfigBuilder {
    /// Set the quote endpoint base URL
    pub fn quote_api_base(mut self, base: impl Into<String>) -> Self {
        self.quote_api_base = Some(base.into());
        self
    }

    /// Set the news endpoint base URL
    pub fn news_api_base(mut self, base: impl Into<String>) -> Self {
        self.news_api_base = Some(base.into());
        self
    }

    /// Set the model endpoint base URL
    pub fn model_api_base(mut self, base: impl Into<String>) -> Self {
        self.model_api_base = Some(base.into());
        self
    }

    /// Set the model name
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the news result cap
    pub fn max_news_results(mut self, max: u32) -> Self {
        self.max_news_results = Some(max);
        self
    }

    /// Set sampling settings
    pub fn generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Set the prompt strategy
    pub fn prompt_strategy(mut self, strategy: PromptStrategy) -> Self {
        self.prompt_strategy = Some(strategy);
        self
    }

    /// Set the delay between mock sequence steps
    pub fn mock_step_delay(mut self, delay: Duration) -> Self {
        self.mock_step_delay = Some(delay);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let config = StockConfig {
            quote_api_base: self.quote_api_base.unwrap_or(defaults.quote_api_base),
            news_api_base: self.news_api_base.unwrap_or(defaults.news_api_base),
            model_api_base: self.model_api_base.unwrap_or(defaults.model_api_base),
            model: self.model.unwrap_or(defaults.model),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            max_news_results: self.max_news_results.unwrap_or(defaults.max_news_results),
            description_chars: defaults.description_chars,
            generation: self.generation.unwrap_or(defaults.generation),
            prompt_strategy: self.prompt_strategy.unwrap_or(defaults.prompt_strategy),
            mock_step_delay: self.mock_step_delay.unwrap_or(defaults.mock_step_delay),
        };

        config.validate()?;
        Ok(config)
    }
}
