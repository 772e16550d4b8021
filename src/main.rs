use std::path::PathBuf;

use anyhow::{Context, Result};
use aptfolio::app::App;
use aptfolio::config::{default_config_path, Config};
use aptfolio::format::render_portfolio;
use aptfolio::models::validate_account_address;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "aptfolio")]
#[command(about = "Aptos wallet and DeFi portfolio aggregator")]
#[command(version)]
#[command(long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT_HASH"), ")"))]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the portfolio for an address
    Portfolio {
        address: String,

        /// Print JSON instead of a text report
        #[arg(long)]
        json: bool,
    },

    /// Wait for a submitted transaction to be confirmed
    WaitTx { hash: String },

    /// Show current configuration
    Config,
}

fn init_tracing(verbose: bool, json: bool) {
    let default = if verbose { "aptfolio=debug,info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let layer = fmt::layer().with_writer(std::io::stderr).with_target(verbose);

    if json {
        tracing_subscriber::registry().with(filter).with(layer.json()).init();
    } else {
        tracing_subscriber::registry().with(filter).with(layer).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = Config::load_with_env(&config_path)
        .with_context(|| format!("Failed to load aptfolio config: {}", config_path.display()))?;

    match cli.command {
        Command::Portfolio { address, json } => {
            let address = validate_account_address(&address)?;
            let app = App::from_config(config)?;
            let portfolio = app.aggregator().build_portfolio(&address).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&portfolio)?);
            } else {
                print!("{}", render_portfolio(&portfolio));
            }
        }
        Command::WaitTx { hash } => {
            let app = App::from_config(config)?;
            let confirmation = app.watcher().wait_for_confirmation(&hash).await?;
            println!("{}", serde_json::to_string_pretty(&confirmation)?);
        }
        Command::Config => {
            println!("Config file: {}", config_path.display());
            println!("{}", serde_json::to_string_pretty(&config.redacted())?);
        }
    }

    Ok(())
}
