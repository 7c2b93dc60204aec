//! Provider credentials and their persistent store
//!
//! Credentials are read once at startup. An absent key is a normal state,
//! not an error: each pipeline step decides what a missing key means for it.

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use tracing::{debug, info};

/// Value written for keys the user has not filled in yet
pub const PLACEHOLDER_KEY: &str = "your-api-key";

/// The three external providers that may need a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Market data (chart endpoint)
    Quote,
    /// News search
    News,
    /// Generative language model
    Model,
}

impl Provider {
    /// All providers, in pipeline order
    pub const ALL: [Provider; 3] = [Provider::Quote, Provider::News, Provider::Model];

    /// Human-readable service name
    pub fn service_name(&self) -> &'static str {
        match self {
            Self::Quote => "Yahoo Finance",
            Self::News => "Exa",
            Self::Model => "Gemini",
        }
    }

    /// Environment variable that overrides the stored key
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::Quote => "STOCK_QUOTE_API_KEY",
            Self::News => "EXA_API_KEY",
            Self::Model => "GEMINI_API_KEY",
        }
    }

    /// Whether the analysis cannot meaningfully run without this key
    pub fn required(&self) -> bool {
        !matches!(self, Self::Quote)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Quote => "quote",
            Self::News => "news",
            Self::Model => "model",
        })
    }
}

impl FromStr for Provider {
    type Err = StockError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quote" | "yahoo" => Ok(Self::Quote),
            "news" | "exa" => Ok(Self::News),
            "model" | "gemini" | "llm" => Ok(Self::Model),
            other => Err(StockError::ConfigError(format!("unknown provider: {other}"))),
        }
    }
}

/// On-disk representation of the credential file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_api_key: Option<String>,
}

impl StoredCredentials {
    fn slot(&mut self, provider: Provider) -> &mut Option<String> {
        match provider {
            Provider::Quote => &mut self.quote_api_key,
            Provider::News => &mut self.news_api_key,
            Provider::Model => &mut self.model_api_key,
        }
    }
}

/// Key-value persistence for provider credentials
pub trait CredentialStore: Send + Sync {
    /// Read whatever is stored; an empty store yields defaults
    fn load(&self) -> Result<StoredCredentials>;

    /// Replace the stored credentials
    fn save(&self, credentials: &StoredCredentials) -> Result<()>;
}

/// JSON file credential store
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store backed by the given file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File location
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<StoredCredentials> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No credential file yet");
            return Ok(StoredCredentials::default());
        }

        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(credentials)?)?;
        Ok(())
    }
}

/// In-process credential store
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<StoredCredentials>,
}

impl MemoryCredentialStore {
    /// Create a store holding the given credentials
    pub fn new(credentials: StoredCredentials) -> Self {
        Self {
            inner: Mutex::new(credentials),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<StoredCredentials> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| StockError::ConfigError("credential store poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, credentials: &StoredCredentials) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| StockError::ConfigError("credential store poisoned".to_string()))?;
        *guard = credentials.clone();
        Ok(())
    }
}

/// Fill every unset key with the placeholder value
///
/// Keys that already hold something are left alone. Returns what was saved.
pub fn initialize_defaults(store: &dyn CredentialStore) -> Result<StoredCredentials> {
    let mut stored = store.load()?;
    for provider in Provider::ALL {
        let slot = stored.slot(provider);
        if slot.as_deref().is_none_or(|k| k.trim().is_empty()) {
            *slot = Some(PLACEHOLDER_KEY.to_string());
        }
    }
    store.save(&stored)?;
    Ok(stored)
}

/// Store one provider key
pub fn set_key(store: &dyn CredentialStore, provider: Provider, key: &str) -> Result<()> {
    let mut stored = store.load()?;
    *stored.slot(provider) = Some(key.trim().to_string());
    store.save(&stored)?;
    info!(%provider, "Stored API key");
    Ok(())
}

/// Usable provider credentials
///
/// Empty strings and the placeholder value are normalized to `None`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub quote_key: Option<String>,
    pub news_key: Option<String>,
    pub model_key: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |k: &Option<String>| if k.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("quote_key", &mask(&self.quote_key))
            .field("news_key", &mask(&self.news_key))
            .field("model_key", &mask(&self.model_key))
            .finish()
    }
}

fn usable(key: Option<String>) -> Option<String> {
    key.map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty() && k != PLACEHOLDER_KEY)
}

impl From<StoredCredentials> for Credentials {
    fn from(stored: StoredCredentials) -> Self {
        Self {
            quote_key: usable(stored.quote_api_key),
            news_key: usable(stored.news_api_key),
            model_key: usable(stored.model_api_key),
        }
    }
}

impl Credentials {
    /// Read credentials from the store, then apply environment overrides
    pub fn load(store: &dyn CredentialStore) -> Result<Self> {
        let credentials = Self::from(store.load()?).with_env_overrides();
        credentials.log_presence();
        Ok(credentials)
    }

    /// Environment variables take precedence over stored keys
    pub fn with_env_overrides(mut self) -> Self {
        for provider in Provider::ALL {
            if let Some(key) = usable(std::env::var(provider.env_var()).ok()) {
                *self.slot(provider) = Some(key);
            }
        }
        self
    }

    /// Key for a provider, if usable
    pub fn get(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Quote => self.quote_key.as_deref(),
            Provider::News => self.news_key.as_deref(),
            Provider::Model => self.model_key.as_deref(),
        }
    }

    fn slot(&mut self, provider: Provider) -> &mut Option<String> {
        match provider {
            Provider::Quote => &mut self.quote_key,
            Provider::News => &mut self.news_key,
            Provider::Model => &mut self.model_key,
        }
    }

    /// Presence of each key, in pipeline order
    pub fn presence(&self) -> Vec<(Provider, bool)> {
        Provider::ALL
            .iter()
            .map(|p| (*p, self.get(*p).is_some()))
            .collect()
    }

    /// Every required key is present
    pub fn is_ready(&self) -> bool {
        Provider::ALL
            .iter()
            .filter(|p| p.required())
            .all(|p| self.get(*p).is_some())
    }

    fn log_presence(&self) {
        let mark = |p: Provider| if self.get(p).is_some() { "✅ Present" } else { "❌ Missing" };
        info!(
            news = mark(Provider::News),
            model = mark(Provider::Model),
            quote = mark(Provider::Quote),
            "Loaded API keys"
        );
    }
}
