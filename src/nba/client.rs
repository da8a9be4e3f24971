//! HTTP client for the stats.nba.com JSON API.

use crate::config::StatsApiConfig;
use crate::error::Result;
use crate::models::{Record, TeamDescriptor};
use crate::nba::{decode_result_set, teams, StatsSource};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER, USER_AGENT};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

const YEAR_BY_YEAR_ENDPOINT: &str = "teamyearbyyearstats";

/// stats.nba.com rejects requests that do not look like they come from
/// the nba.com site.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/120.0 Safari/537.36",
        ),
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
    headers.insert(ORIGIN, HeaderValue::from_static("https://www.nba.com"));
    headers
}

/// Client for the year-by-year team statistics endpoint.
pub struct NbaStatsClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl NbaStatsClient {
    pub fn new(config: &StatsApiConfig) -> Result<Self> {
        info!("Stats API at {}", config.base_url);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(browser_headers())
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }
}

#[async_trait]
impl StatsSource for NbaStatsClient {
    async fn teams(&self) -> Result<Vec<TeamDescriptor>> {
        Ok(teams::all())
    }

    async fn team_year_by_year(&self, team_id: &str) -> Result<Vec<Record>> {
        let url = self.endpoint_url(YEAR_BY_YEAR_ENDPOINT);
        debug!("Fetching year-by-year stats for team {}", team_id);

        let body: Value = self
            .http_client
            .get(&url)
            .query(&[
                ("LeagueID", "00"),
                ("PerMode", "Totals"),
                ("SeasonType", "Regular Season"),
                ("TeamID", team_id),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        decode_result_set(&body)
    }
}
