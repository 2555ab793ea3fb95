//! orphan-connector - command-line host for the orphan account connector
//!
//! Runs a single connector lifecycle callback against Identity Security Cloud
//! and prints the result as JSON lines on stdout.

use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;
use xavyo_connector_orphan::{AccountSchema, OrphanConnector, OrphanConnectorConfig};

mod commands;
mod error;
mod logging;

use commands::Commands;
use error::{CliError, CliResult};

/// Orphan account connector for Identity Security Cloud
#[derive(Parser, Debug)]
#[command(name = "orphan-connector")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// JSON source configuration file; ISC_* environment variables are used when absent
    #[arg(long, short, global = true, env = "ORPHAN_CONNECTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Account schema as JSON, e.g. '{"identityAttribute":"id","displayAttribute":"name"}'
    #[arg(long, global = true)]
    schema: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    logging::init_logging(cli.json_logs);

    if let Err(e) = run(cli).await {
        e.print();
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = load_config(cli.config.as_deref())?;
    info!(
        base_url = %config.base_url,
        sources = ?config.sources,
        only_enabled = config.only_enabled,
        identity_key_strategy = %config.identity_key_strategy,
        "Loaded connector configuration"
    );

    let schema = cli.schema.as_deref().map(parse_schema).transpose()?;
    let connector = OrphanConnector::new(config)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::execute(&connector, cli.command, schema.as_ref(), &mut out).await
}

fn load_config(path: Option<&Path>) -> CliResult<OrphanConnectorConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            Ok(OrphanConnectorConfig::from_json(&json)?)
        }
        None => Ok(OrphanConnectorConfig::from_env()?),
    }
}

fn parse_schema(json: &str) -> CliResult<AccountSchema> {
    serde_json::from_str(json).map_err(|e| CliError::Validation(format!("invalid --schema: {e}")))
}
