use crate::config::Config;
use crate::data::DataStore;
use crate::nba::StatsSource;
use std::sync::Arc;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// Effective configuration (file merged with CLI)
    pub config: Arc<Config>,

    /// Snapshot files, read on every request
    pub data: DataStore,

    /// Team directory and year-by-year lookups
    pub source: Arc<dyn StatsSource>,
}

impl AppState {
    pub fn new(config: Config, source: Arc<dyn StatsSource>) -> Self {
        Self {
            data: DataStore::from(&config.data),
            config: Arc::new(config),
            source,
        }
    }
}
