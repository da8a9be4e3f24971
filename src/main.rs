//! Hoopstats - basketball statistics aggregation service
//!
//! Serves team/season and player totals aggregated from local JSON
//! snapshots, year-by-year team numbers from the live stats API, and a
//! rule-based text analysis of client-supplied records.
//!
//! Exit codes:
//!   0 - Clean shutdown
//!   1 - Startup error (bad arguments, config, bind failure, etc.)

mod analysis;
mod cli;
mod config;
mod data;
mod error;
mod models;
mod nba;
mod report;
mod server;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, CONFIG_FILE};
use nba::NbaStatsClient;
use server::AppState;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Hoopstats v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Server failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .hoopstats.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to change the port, data directory, seasons, and CORS origins.");
    Ok(())
}

/// Initialize logging from `RUST_LOG` or the verbosity flags.
fn init_logging(args: &Args) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(args.log_filter(rust_log.as_deref()))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Build the service from configuration and serve until shutdown.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    info!("Data directory: {}", config.data.dir.display());
    if !config.data.dir.is_dir() {
        warn!(
            "Data directory {} does not exist; snapshot endpoints will fail",
            config.data.dir.display()
        );
    }
    debug!("Allowed seasons: {:?}", config.data.seasons);
    debug!("Allowed origins: {:?}", config.server.allowed_origins);

    let client = NbaStatsClient::new(&config.stats_api).context("Failed to create stats API client")?;
    let state = AppState::new(config, Arc::new(client));

    server::serve(state).await
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
