//! Live statistics source.
//!
//! The HTTP layer talks to stats.nba.com through the [`StatsSource`] trait
//! so the per-team lookups can be swapped out in tests.

pub mod client;
pub mod teams;
pub mod year_stats;

pub use client::NbaStatsClient;
pub use year_stats::{decode_result_set, reshape_year_rows, SeasonWindow};

use crate::error::Result;
use crate::models::{Record, TeamDescriptor};
use async_trait::async_trait;

/// Team directory and per-team year-by-year totals.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Every franchise in the league.
    async fn teams(&self) -> Result<Vec<TeamDescriptor>>;

    /// Raw year-by-year rows for one team, keyed by the API's column names
    /// (`TEAM_NAME`, `YEAR`, `GP`, `PTS`, ...).
    async fn team_year_by_year(&self, team_id: &str) -> Result<Vec<Record>>;
}
