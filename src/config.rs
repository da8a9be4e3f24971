//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.hoopstats.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".hoopstats.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Snapshot file settings.
    #[serde(default)]
    pub data: DataConfig,

    /// Live stats API settings.
    #[serde(default)]
    pub stats_api: StatsApiConfig,

    /// Response shaping.
    #[serde(default)]
    pub output: OutputConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS. `"*"` allows any origin.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:8080", "http://localhost:8081"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Snapshot file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the snapshot files.
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,

    /// Team -> season -> players tree.
    #[serde(default = "default_teams_file")]
    pub teams_file: String,

    /// Flat player-season rows.
    #[serde(default = "default_players_file")]
    pub players_file: String,

    /// Season labels kept by the snapshot endpoints.
    #[serde(default = "default_seasons")]
    pub seasons: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            teams_file: default_teams_file(),
            players_file: default_players_file(),
            seasons: default_seasons(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_teams_file() -> String {
    "nba_team.json".to_string()
}

fn default_players_file() -> String {
    "nba_data.json".to_string()
}

fn default_seasons() -> Vec<String> {
    vec![
        "2018-2019",
        "2019-2020",
        "2020-2021",
        "2021-2022",
        "2022-2023",
        "2023-2024",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Live stats API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsApiConfig {
    /// Base URL of the stats service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// First season (inclusive, `YYYY-YY`) returned by `/api/team-stats`.
    #[serde(default = "default_first_season")]
    pub first_season: String,

    /// Last season (inclusive, `YYYY-YY`).
    #[serde(default = "default_last_season")]
    pub last_season: String,
}

impl Default for StatsApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            first_season: default_first_season(),
            last_season: default_last_season(),
        }
    }
}

fn default_base_url() -> String {
    "https://stats.nba.com/stats".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_first_season() -> String {
    "2018-19".to_string()
}

fn default_last_season() -> String {
    "2023-24".to_string()
}

/// Response shaping settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Include `avg_points` (points per game) in `/api/team-stats` rows.
    #[serde(default = "default_true")]
    pub include_avg_points: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            include_avg_points: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were actually provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref host) = args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(ref origins) = args.allowed_origins {
            self.server.allowed_origins = origins.clone();
        }

        if let Some(ref dir) = args.data_dir {
            self.data.dir = dir.clone();
        }

        if let Some(ref url) = args.stats_api_url {
            self.stats_api.base_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.stats_api.timeout_seconds = timeout;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.data.teams_file, "nba_team.json");
        assert_eq!(config.data.seasons.len(), 6);
        assert!(config
            .server
            .allowed_origins
            .contains(&"http://localhost:8080".to_string()));
        assert!(config.output.include_avg_points);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[server]
port = 8000
allowed_origins = ["https://stats.example.com"]

[data]
dir = "/srv/nba"
seasons = ["2022-2023"]

[output]
include_avg_points = false
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.allowed_origins, vec!["https://stats.example.com"]);
        assert_eq!(config.data.dir, PathBuf::from("/srv/nba"));
        assert_eq!(config.data.players_file, "nba_data.json");
        assert_eq!(config.data.seasons, vec!["2022-2023"]);
        assert_eq!(config.stats_api.first_season, "2018-19");
        assert!(!config.output.include_avg_points);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[stats_api]"));
        assert!(toml_str.contains("[output]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.server.port, 5000);
    }

    #[test]
    fn test_cli_overrides_only_when_given() {
        let mut config = Config::default();
        config.server.port = 9000;
        config.data.dir = PathBuf::from("/from/file");

        let args = Args::parse_from(["hoopstats", "--host", "0.0.0.0", "--timeout", "5"]);
        config.merge_with_args(&args);

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.data.dir, PathBuf::from("/from/file"));
        assert_eq!(config.stats_api.timeout_seconds, 5);
    }
}
