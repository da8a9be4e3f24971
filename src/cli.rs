//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation. Options left unset fall back to the
//! configuration file and then to built-in defaults.

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Hoopstats - basketball statistics aggregation service
///
/// Serves team, season and player totals from local JSON snapshots and
/// the live stats API, plus a rule-based text analysis endpoint.
///
/// Examples:
///   hoopstats
///   hoopstats --port 8000 --data-dir ./data
///   hoopstats --allowed-origins http://localhost:8080,https://dash.example.com
///   hoopstats --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .hoopstats.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to bind the HTTP server to
    #[arg(long, value_name = "HOST", env = "HOOPSTATS_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, value_name = "PORT", env = "HOOPSTATS_PORT")]
    pub port: Option<u16>,

    /// Directory containing nba_team.json and nba_data.json
    #[arg(short, long, value_name = "DIR", env = "HOOPSTATS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Origins allowed by CORS (comma-separated, "*" for any)
    ///
    /// Example: --allowed-origins http://localhost:8080,http://localhost:8081
    #[arg(long, value_name = "ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Option<Vec<String>>,

    /// Base URL of the stats API
    #[arg(long, value_name = "URL", env = "NBA_STATS_URL")]
    pub stats_api_url: Option<String>,

    /// Stats API request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .hoopstats.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.port == Some(0) {
            return Err("Port must be between 1 and 65535".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if let Some(ref url) = self.stats_api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Stats API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(ref dir) = self.data_dir {
            if !dir.is_dir() {
                return Err(format!("Data directory does not exist: {}", dir.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Log filter from `RUST_LOG` directives when set and valid, otherwise
    /// from the `-v`/`-q` level.
    pub fn log_filter(&self, rust_log: Option<&str>) -> EnvFilter {
        rust_log
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(self.log_level().as_str().to_lowercase()))
    }
}
