//! Google Gemini provider implementation
//!
//! This module implements the LLMProvider trait on top of the Gemini
//! `generateContent` endpoint.
//! See: https://ai.google.dev/api/generate-content
//!
//! # Examples
//!
//! ```no_run
//! use agent_llm::{LLMProvider, Message};
//! use agent_llm::providers::{GeminiConfig, GeminiProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GeminiConfig::new(Some("AIza...".to_string()))
//!         .with_model("gemini-2.0-flash");
//!     let provider = GeminiProvider::with_config(config)?;
//!
//!     let reply = provider
//!         .generate(&[Message::user("Summarize today's market in one line")])
//!         .await?;
//!     println!("{reply}");
//!     Ok(())
//! }
//! ```

use crate::{
    GenerationConfig, LLMError, LLMProvider, Message, PromptStrategy, Result, Role,
    flatten_messages,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const PROVIDER_NAME: &str = "Gemini";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Leading user turn when a conversation opens with the model and there is
/// no system text to put there instead
const TURNS_OPENER: &str = "Continue from your previous analysis.";

/// Reply used when the model answers successfully but without any text
pub const NO_RESPONSE_PLACEHOLDER: &str = "⚠️ No response from Gemini";

/// Configuration for the Gemini provider
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key; `None` makes every call fail fast
    pub api_key: Option<String>,

    /// Base URL (default: "https://generativelanguage.googleapis.com/v1beta")
    pub api_base: String,

    /// Model name used in the endpoint path
    pub model: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,

    /// Sampling settings sent with every request
    pub generation: GenerationConfig,

    /// Whether to flatten the conversation or send discrete turns
    pub strategy: PromptStrategy,
}

impl GeminiConfig {
    /// Create a config with the given key and default settings
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            ..Self::default()
        }
    }

    /// Create config from environment variables
    ///
    /// Reads `GEMINI_API_KEY`, and optionally `GEMINI_API_BASE` and
    /// `GEMINI_MODEL`. A missing key is not an error here; it surfaces on
    /// the first call instead.
    pub fn from_env() -> Self {
        let mut config = Self::new(std::env::var("GEMINI_API_KEY").ok());
        if let Ok(base) = std::env::var("GEMINI_API_BASE") {
            config.api_base = base;
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config.model = model;
        }
        config
    }

    /// Set custom API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Set sampling settings
    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    /// Set the prompt strategy
    pub fn with_strategy(mut self, strategy: PromptStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            generation: GenerationConfig::default(),
            strategy: PromptStrategy::default(),
        }
    }
}

/// Gemini provider
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Create a new provider with custom configuration
    pub fn with_config(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    /// Create a provider with an API key and default settings
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(GeminiConfig::new(Some(api_key.into())))
    }

    /// Create a provider from environment variables
    pub fn from_env() -> Result<Self> {
        Self::with_config(GeminiConfig::from_env())
    }

    /// Get the current configuration
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    #[instrument(skip(self, messages), fields(model = %self.config.model, messages = messages.len()))]
    async fn generate(&self, messages: &[Message]) -> Result<String> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(LLMError::MissingApiKey {
                provider: PROVIDER_NAME.to_string(),
            });
        };

        let request = build_request(messages, self.config.strategy, self.config.generation);

        debug!("Sending request to Gemini API");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body, "Gemini API returned an error status");
            return Err(LLMError::ApiError {
                provider: PROVIDER_NAME.to_string(),
                status: status.as_u16(),
            });
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        Ok(extract_text(gemini_response).unwrap_or_else(|| {
            debug!("Gemini returned no usable text");
            NO_RESPONSE_PLACEHOLDER.to_string()
        }))
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }
}

// ============================================================================
// Gemini-specific request/response types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

impl GeminiContent {
    fn text(role: Option<&str>, text: String) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![GeminiPart { text: Some(text) }],
        }
    }
}

fn build_request(
    messages: &[Message],
    strategy: PromptStrategy,
    generation: GenerationConfig,
) -> GeminiRequest {
    let flattened = || GeminiRequest {
        contents: vec![GeminiContent::text(None, flatten_messages(messages))],
        system_instruction: None,
        generation_config: generation,
    };

    match strategy {
        PromptStrategy::Flattened => flattened(),
        PromptStrategy::Turns => {
            let system = messages
                .iter()
                .filter(|m| m.role == Role::System)
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");

            let mut turns: Vec<(&'static str, String)> = Vec::new();
            for message in messages.iter().filter(|m| m.role != Role::System) {
                let role = match message.role {
                    Role::Assistant => "model",
                    _ => "user",
                };
                // Gemini wants strictly alternating turns
                match turns.last_mut() {
                    Some((last, text)) if *last == role => {
                        text.push_str("\n\n");
                        text.push_str(&message.content);
                    }
                    _ => turns.push((role, message.content.clone())),
                }
            }

            // Gemini rejects a request without any turns
            if turns.is_empty() {
                return flattened();
            }

            // ...and one whose first turn is the model's
            let mut system_instruction = (!system.is_empty()).then_some(system);
            if turns[0].0 == "model" {
                let opener = system_instruction
                    .take()
                    .unwrap_or_else(|| TURNS_OPENER.to_string());
                turns.insert(0, ("user", opener));
            }

            GeminiRequest {
                contents: turns
                    .into_iter()
                    .map(|(role, text)| GeminiContent::text(Some(role), text))
                    .collect(),
                system_instruction: system_instruction.map(|text| GeminiContent::text(None, text)),
                generation_config: generation,
            }
        }
    }
}

fn extract_text(response: GeminiResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()?
        .text
        .filter(|t| !t.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, body::Bytes, http::StatusCode};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    /// Start a stub endpoint that records request bodies and answers with a canned reply
    async fn stub_server(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Value>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        let app = Router::new().fallback(move |body: Bytes| {
            let recorded = Arc::clone(&recorded);
            let reply = reply.clone();
            async move {
                let parsed = serde_json::from_slice(&body).unwrap_or(Value::Null);
                recorded.lock().unwrap().push(parsed);
                (status, Json(reply))
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), requests)
    }

    fn provider(api_key: Option<&str>, api_base: &str) -> GeminiProvider {
        let config = GeminiConfig::new(api_key.map(str::to_string)).with_api_base(api_base);
        GeminiProvider::with_config(config).unwrap()
    }

    #[test]
    fn test_config_defaults() {
        let config = GeminiConfig::default();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.strategy, PromptStrategy::Flattened);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = GeminiConfig::new(Some("   ".to_string()));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_flattened_request_shape() {
        let request = build_request(
            &[Message::system("sys"), Message::user("hi")],
            PromptStrategy::Flattened,
            GenerationConfig::default(),
        );
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["parts"][0]["text"], "SYSTEM: sys\n\nUSER: hi");
        assert!(json["contents"][0].get("role").is_none());
        assert!(json.get("systemInstruction").is_none());
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1000);
    }

    fn roles(json: &Value) -> Vec<String> {
        json["contents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["role"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_turns_request_shape() {
        let request = build_request(
            &[Message::system("sys"), Message::user("hi"), Message::assistant("hello")],
            PromptStrategy::Turns,
            GenerationConfig::default(),
        );
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "sys");
        assert_eq!(roles(&json), ["user", "model"]);
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn test_turns_open_with_user_and_alternate() {
        // Conversation as the fourth step sees it: the model's price view first
        let deep = build_request(
            &[
                Message::system("sys"),
                Message::assistant("price view"),
                Message::user("News data"),
            ],
            PromptStrategy::Turns,
            GenerationConfig::default(),
        );
        let json = serde_json::to_value(&deep).unwrap();
        assert_eq!(roles(&json), ["user", "model", "user"]);
        assert_eq!(json["contents"][0]["parts"][0]["text"], "sys");
        assert!(json.get("systemInstruction").is_none());

        // ...and the fifth: two user turns in a row are merged
        let recommend = build_request(
            &[
                Message::system("sys"),
                Message::assistant("price view"),
                Message::user("News data"),
                Message::user("Recommend"),
            ],
            PromptStrategy::Turns,
            GenerationConfig::default(),
        );
        let json = serde_json::to_value(&recommend).unwrap();
        assert_eq!(roles(&json), ["user", "model", "user"]);
        assert_eq!(json["contents"][2]["parts"][0]["text"], "News data\n\nRecommend");
    }

    #[test]
    fn test_turns_without_system_get_an_opener() {
        let request = build_request(
            &[Message::assistant("price view"), Message::user("News data")],
            PromptStrategy::Turns,
            GenerationConfig::default(),
        );
        assert_eq!(request.contents.len(), 3);
        assert_eq!(request.contents[0].role.as_deref(), Some("user"));
        assert_eq!(request.contents[0].parts[0].text.as_deref(), Some(TURNS_OPENER));
    }

    #[test]
    fn test_turns_with_only_system_falls_back_to_flattened() {
        let request = build_request(
            &[Message::system("sys")],
            PromptStrategy::Turns,
            GenerationConfig::default(),
        );
        assert_eq!(request.contents.len(), 1);
        assert!(request.system_instruction.is_none());
    }

    #[test]
    fn test_extract_text_variants() {
        let full: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "Buy"}]}}]
        }))
        .unwrap();
        assert_eq!(extract_text(full).as_deref(), Some("Buy"));

        let empty: GeminiResponse = serde_json::from_value(json!({"candidates": []})).unwrap();
        assert!(extract_text(empty).is_none());

        let blank: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": ""}]}}]
        }))
        .unwrap();
        assert!(extract_text(blank).is_none());
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        let (base, requests) = stub_server(StatusCode::OK, json!({})).await;
        let provider = provider(None, &base);

        let err = tokio_test::assert_err!(provider.generate(&[Message::user("hi")]).await);
        assert_eq!(err.to_string(), "Gemini API key not set");
        assert!(requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let (base, requests) =
            stub_server(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "boom"})).await;
        let provider = provider(Some("key"), &base);

        let err = tokio_test::assert_err!(provider.generate(&[Message::user("hi")]).await);
        assert!(matches!(err, LLMError::ApiError { status: 500, .. }));
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_successful_generation() {
        let (base, requests) = stub_server(
            StatusCode::OK,
            json!({"candidates": [{"content": {"parts": [{"text": "OK"}]}}]}),
        )
        .await;
        let provider = provider(Some("key"), &base);

        let reply = tokio_test::assert_ok!(
            provider
                .generate(&[Message::system("sys"), Message::user("hi")])
                .await
        );
        assert_eq!(reply, "OK");

        let sent = requests.lock().unwrap();
        assert_eq!(sent[0]["contents"][0]["parts"][0]["text"], "SYSTEM: sys\n\nUSER: hi");
        assert_eq!(sent[0]["generationConfig"]["temperature"], json!(0.7));
    }

    #[tokio::test]
    async fn test_empty_candidates_yield_placeholder() {
        let (base, _) = stub_server(StatusCode::OK, json!({"candidates": []})).await;
        let provider = provider(Some("key"), &base);

        let reply = provider.generate(&[Message::user("hi")]).await.unwrap();
        assert_eq!(reply, NO_RESPONSE_PLACEHOLDER);
    }
}
