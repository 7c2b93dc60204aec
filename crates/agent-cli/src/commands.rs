//! Subcommand implementations

use agent_stock::{
    AnalysisSession, ConsoleSink, Credentials, FileCredentialStore, OutputFormat, Provider,
    RunOutcome, StockAnalysisEngine, StockConfig, credentials, normalize_symbol,
    run_mock_sequence, run_self_test,
};
use agent_utils::Config;
use anyhow::{Context, bail};
use comfy_table::{Table, presets::UTF8_FULL};
use std::time::Duration;
use tracing::{info, warn};

pub const READY: &str = "✅ Ready to analyze stocks!";
pub const NOT_READY: &str = "❌ API keys not configured";

fn store(config: &Config) -> FileCredentialStore {
    FileCredentialStore::new(&config.credentials_path)
}

fn load_credentials(config: &Config) -> anyhow::Result<Credentials> {
    Credentials::load(&store(config)).with_context(|| {
        format!(
            "Failed to read credentials from {}",
            config.credentials_path.display()
        )
    })
}

pub async fn analyze(
    config: &Config,
    symbol: &str,
    format: OutputFormat,
    force: bool,
) -> anyhow::Result<()> {
    let symbol = normalize_symbol(symbol)?;
    let credentials = load_credentials(config)?;
    ensure_ready(&credentials, force)?;

    let stock_config = StockConfig::default().with_env_overrides();
    stock_config.validate()?;
    let engine = StockAnalysisEngine::from_config(&stock_config, &credentials, format)?;

    let mut session = AnalysisSession::new(symbol, credentials);
    info!(run_id = %session.run_id, "Starting analysis");
    let outcome = engine.run(&mut session, &mut ConsoleSink::stdout()).await;

    match outcome {
        RunOutcome::Completed => Ok(()),
        RunOutcome::QuoteFailed(reason) | RunOutcome::Failed(reason) => {
            bail!("analysis did not complete: {reason}")
        }
    }
}

/// Refuse to start a run with missing required keys unless forced
pub fn ensure_ready(credentials: &Credentials, force: bool) -> anyhow::Result<()> {
    if credentials.is_ready() {
        return Ok(());
    }
    if !force {
        bail!("{NOT_READY}. Run `stock-analyzer status` for details or pass --force to run anyway.");
    }
    warn!("Running with missing API keys");
    Ok(())
}

pub fn self_test() {
    run_self_test(&mut ConsoleSink::stdout());
}

/// Explicit `--delay-ms` wins over the configured mock delay
pub fn mock_delay(requested_ms: Option<u64>, config: &StockConfig) -> Duration {
    requested_ms.map_or(config.mock_step_delay, Duration::from_millis)
}

pub async fn mock(delay: Duration) {
    run_mock_sequence(&mut ConsoleSink::stdout(), delay).await;
}

/// Presence table plus the readiness line
pub fn status_report(credentials: &Credentials) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Provider", "Service", "Env override", "Required", "Key"]);

    for (provider, present) in credentials.presence() {
        table.add_row(vec![
            provider.to_string(),
            provider.service_name().to_string(),
            provider.env_var().to_string(),
            if provider.required() { "yes" } else { "no" }.to_string(),
            if present { "✅ Present" } else { "❌ Missing" }.to_string(),
        ]);
    }

    let verdict = if credentials.is_ready() { READY } else { NOT_READY };
    format!("{table}\n{verdict}")
}

pub fn status(config: &Config) -> anyhow::Result<()> {
    let credentials = load_credentials(config)?;
    println!("Credentials: {}", config.credentials_path.display());
    println!("{}", status_report(&credentials));
    Ok(())
}

pub fn init_credentials(config: &Config) -> anyhow::Result<()> {
    let store = store(config);
    credentials::initialize_defaults(&store)?;
    println!("Initialized {}", store.path().display());
    println!("Replace the placeholder values with `stock-analyzer credentials set <provider> <key>`.");
    Ok(())
}

pub fn set_credential(config: &Config, provider: Provider, key: &str) -> anyhow::Result<()> {
    if key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    credentials::set_key(&store(config), provider, key)?;
    println!("Stored {} key ({})", provider, provider.service_name());
    Ok(())
}
