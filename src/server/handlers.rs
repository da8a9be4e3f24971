use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::{analyze, member_totals, retain_seasons, team_points_totals, team_season_totals};
use crate::error::Result;
use crate::models::{
    AnalysisMode, MemberSummary, Record, ResponseStatus, TeamDescriptor, TeamPointsSummary,
    TeamSeasonSummary, TeamYearStats,
};
use crate::nba::{reshape_year_rows, SeasonWindow, StatsSource};
use crate::server::response::{success, ApiError, ApiResult, Envelope};
use crate::server::state::AppState;

/// GET /api/nba-teams
pub async fn get_nba_teams(State(state): State<AppState>) -> ApiResult<Vec<TeamSeasonSummary>> {
    let tree = state
        .data
        .team_tree()
        .await?
        .retain_seasons(&state.config.data.seasons);
    debug!(
        "Aggregating {} team tree rows over {} seasons",
        tree.rows.len(),
        tree.nodes.len()
    );

    Ok(success(team_season_totals(&tree.rows, &tree.nodes)?))
}

/// GET /api/nba-stats
pub async fn get_nba_stats(State(state): State<AppState>) -> ApiResult<Vec<TeamPointsSummary>> {
    let records = state.data.player_rows().await?;
    let records = retain_seasons(records, &state.config.data.seasons);
    debug!("Aggregating {} player rows by team and season", records.len());

    Ok(success(team_points_totals(&records)?))
}

/// GET /api/member-stats
pub async fn get_member_stats(State(state): State<AppState>) -> ApiResult<Vec<MemberSummary>> {
    let records = state.data.player_rows().await?;
    let records = retain_seasons(records, &state.config.data.seasons);
    debug!("Aggregating {} player rows by team and player", records.len());

    Ok(success(member_totals(&records)?))
}

/// GET /api/teams
pub async fn get_teams(State(state): State<AppState>) -> ApiResult<Vec<TeamDescriptor>> {
    Ok(success(state.source.teams().await?))
}

#[derive(Debug, Deserialize)]
pub struct TeamStatsQuery {
    #[serde(default)]
    pub team_ids: Option<String>,
}

/// Split a comma-separated id list, dropping blank entries.
fn parse_team_ids(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(String::from)
        .collect()
}

async fn fetch_team_years(
    source: &dyn StatsSource,
    team_id: &str,
    window: &SeasonWindow,
    include_avg_points: bool,
) -> Result<Vec<TeamYearStats>> {
    let rows = source.team_year_by_year(team_id).await?;
    reshape_year_rows(&rows, window, include_avg_points)
}

/// GET /api/team-stats?team_ids=1610612743,1610612738
///
/// A failed lookup only drops that team's rows; the request still succeeds.
/// Blank ids are ignored, so `team_ids=,` is answered like a missing
/// parameter: 400 "No teams selected" rather than an empty success.
pub async fn get_team_stats(
    State(state): State<AppState>,
    Query(query): Query<TeamStatsQuery>,
) -> ApiResult<Vec<TeamYearStats>> {
    let team_ids = parse_team_ids(query.team_ids.as_deref());
    if team_ids.is_empty() {
        return Err(ApiError::bad_request("No teams selected"));
    }

    let api = &state.config.stats_api;
    let window = SeasonWindow::new(&api.first_season, &api.last_season);
    let include_avg_points = state.config.output.include_avg_points;
    let source = state.source.as_ref();

    let results = join_all(
        team_ids
            .iter()
            .map(|id| fetch_team_years(source, id, &window, include_avg_points)),
    )
    .await;

    let mut selected = Vec::new();
    for (team_id, result) in team_ids.iter().zip(results) {
        match result {
            Ok(rows) => selected.extend(rows),
            Err(e) => warn!("Error fetching stats for team ID {}: {}", team_id, e),
        }
    }

    Ok(success(selected))
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// `"defense"` selects defense analysis, anything else offense.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub data: Vec<Record>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisBody {
    pub analysis: String,
}

/// Run the requested analysis; if it fails, retry as offense analysis and
/// downgrade the status to `Warning`. Offense failures are returned as is.
pub fn analyze_with_fallback(
    records: &[Record],
    mode: AnalysisMode,
) -> Result<(ResponseStatus, String)> {
    match analyze(records, mode) {
        Ok(text) => Ok((ResponseStatus::Success, text)),
        Err(e) if mode != AnalysisMode::Offense => {
            warn!("{} analysis failed ({}), falling back to offense", mode, e);
            analyze(records, AnalysisMode::Offense).map(|text| (ResponseStatus::Warning, text))
        }
        Err(e) => Err(e),
    }
}

/// POST /api/analyze-stats
pub async fn analyze_stats(
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<AnalysisBody> {
    let Json(request) = payload.map_err(|rejection| ApiError::internal(rejection.body_text()))?;
    let mode = AnalysisMode::from_type_flag(request.kind.as_deref());
    debug!("Analyzing {} records in {} mode", request.data.len(), mode);

    let (status, analysis) = analyze_with_fallback(&request.data, mode)?;
    Ok(Envelope::with_status(status, AnalysisBody { analysis }))
}
