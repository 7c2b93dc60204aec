//! Command-line interface for the stock analyzer
//!
//! ```bash
//! stock-analyzer credentials init
//! stock-analyzer credentials set model <GEMINI_KEY>
//! stock-analyzer credentials set news <EXA_KEY>
//! stock-analyzer status
//! stock-analyzer analyze AAPL
//! ```

mod commands;

use agent_stock::{OutputFormat, Provider, StockConfig};
use agent_utils::Config;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stock-analyzer")]
#[command(about = "Five-step AI stock analysis: price, news and a trading recommendation", long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Credential file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    credentials: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full analysis for a ticker symbol
    Analyze {
        /// Ticker symbol, e.g. AAPL
        symbol: String,

        /// Output flavor for step content
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,

        /// Run even if required API keys are missing
        #[arg(long)]
        force: bool,
    },
    /// Check that step output reaches the terminal
    SelfTest,
    /// Play a canned three-step sequence
    Mock {
        /// Pause between steps, in milliseconds [default: configured mock delay]
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// Show which API keys are configured
    Status,
    /// Manage stored API keys
    Credentials {
        #[command(subcommand)]
        action: CredentialAction,
    },
}

#[derive(Subcommand, Debug)]
enum CredentialAction {
    /// Write placeholder values for every unset key
    Init,
    /// Store a key: quote, news (exa) or model (gemini)
    Set { provider: Provider, key: String },
    /// Print the credential file location
    Path,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Text,
    Html,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Html => OutputFormat::Html,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        agent_utils::init_tracing_with("debug");
    } else {
        agent_utils::init_tracing();
    }

    let mut config = Config::from_env();
    if let Some(path) = cli.credentials {
        config = config.with_credentials_path(path);
    }

    match cli.command {
        Commands::Analyze {
            symbol,
            format,
            force,
        } => commands::analyze(&config, &symbol, format.into(), force).await,
        Commands::SelfTest => {
            commands::self_test();
            Ok(())
        }
        Commands::Mock { delay_ms } => {
            let stock_config = StockConfig::default().with_env_overrides();
            commands::mock(commands::mock_delay(delay_ms, &stock_config)).await;
            Ok(())
        }
        Commands::Status => commands::status(&config),
        Commands::Credentials { action } => match action {
            CredentialAction::Init => commands::init_credentials(&config),
            CredentialAction::Set { provider, key } => {
                commands::set_credential(&config, provider, &key)
            }
            CredentialAction::Path => {
                println!("{}", config.credentials_path.display());
                Ok(())
            }
        },
    }
}
