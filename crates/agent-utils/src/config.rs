//! Configuration management utilities

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding the credential file location
pub const CREDENTIALS_PATH_ENV: &str = "STOCK_ANALYZER_CREDENTIALS";

const APP_DIR: &str = "stock-analyzer";
const CREDENTIALS_FILE: &str = "credentials.json";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Environment (dev, prod, etc.)
    pub environment: String,
    /// Where provider credentials are persisted
    pub credentials_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: APP_DIR.to_string(),
            environment: "development".to_string(),
            credentials_path: default_credentials_path(),
        }
    }
}

impl Config {
    /// Build the configuration from the process environment
    ///
    /// Reads `STOCK_ANALYZER_ENV` and `STOCK_ANALYZER_CREDENTIALS`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(env) = std::env::var("STOCK_ANALYZER_ENV") {
            config.environment = env;
        }
        if let Ok(path) = std::env::var(CREDENTIALS_PATH_ENV) {
            config.credentials_path = PathBuf::from(path);
        }
        config
    }

    /// Override the credential file location
    pub fn with_credentials_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_path = path.into();
        self
    }
}

/// Resolve `$XDG_CONFIG_HOME/stock-analyzer/credentials.json`
///
/// Falls back to `~/.config` and finally to the working directory.
pub fn default_credentials_path() -> PathBuf {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")));

    match base {
        Some(dir) => dir.join(APP_DIR).join(CREDENTIALS_FILE),
        None => PathBuf::from(CREDENTIALS_FILE),
    }
}
