//! Decoding and reshaping of year-by-year team statistics.

use crate::analysis::FieldRef;
use crate::error::{Result, StatsError};
use crate::models::{Record, Stat, TeamYearStats};
use serde_json::Value;

const TEAM_NAME: &str = "TEAM_NAME";
const YEAR: &str = "YEAR";
const GAMES_PLAYED: &str = "GP";
const POINTS: &str = "PTS";
const THREES_MADE: &str = "FG3M";
const BLOCKS: &str = "BLK";
const STEALS: &str = "STL";
const DEFENSIVE_REBOUNDS: &str = "DREB";

/// Inclusive range of `YYYY-YY` season labels.
///
/// Labels compare as strings, which orders them chronologically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonWindow {
    first: String,
    last: String,
}

impl SeasonWindow {
    pub fn new(first: &str, last: &str) -> Self {
        Self {
            first: first.to_string(),
            last: last.to_string(),
        }
    }

    pub fn contains(&self, season: &str) -> bool {
        self.first.as_str() <= season && season <= self.last.as_str()
    }
}

/// Turn the first result set of a stats API response into rows keyed by
/// column header.
pub fn decode_result_set(body: &Value) -> Result<Vec<Record>> {
    let result_set = body
        .get("resultSets")
        .and_then(Value::as_array)
        .and_then(|sets| sets.first())
        .ok_or_else(|| StatsError::UpstreamFormat("missing resultSets".to_string()))?;

    let headers: Vec<&str> = result_set
        .get("headers")
        .and_then(Value::as_array)
        .ok_or_else(|| StatsError::UpstreamFormat("missing headers".to_string()))?
        .iter()
        .map(|h| {
            h.as_str()
                .ok_or_else(|| StatsError::UpstreamFormat(format!("non-string header {h}")))
        })
        .collect::<Result<_>>()?;

    let rows = result_set
        .get("rowSet")
        .and_then(Value::as_array)
        .ok_or_else(|| StatsError::UpstreamFormat("missing rowSet".to_string()))?;

    rows.iter()
        .enumerate()
        .map(|(index, row)| -> Result<Record> {
            let cells = row
                .as_array()
                .filter(|cells| cells.len() == headers.len())
                .ok_or_else(|| {
                    StatsError::UpstreamFormat(format!(
                        "row {index} does not match {} headers",
                        headers.len()
                    ))
                })?;

            Ok(headers
                .iter()
                .zip(cells)
                .map(|(header, cell)| (header.to_string(), cell.clone()))
                .collect())
        })
        .collect()
}

fn text(row: &Record, field: &str, index: usize) -> Result<String> {
    match row.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        None | Some(Value::Null) => Err(StatsError::missing(index, field)),
        Some(other) => Ok(other.to_string()),
    }
}

/// Keep rows whose `YEAR` falls inside `window` and reshape them into the
/// response rows. `avg_points` is points per game, set only when
/// `include_avg_points` is on and the row has a positive `GP`.
pub fn reshape_year_rows(
    rows: &[Record],
    window: &SeasonWindow,
    include_avg_points: bool,
) -> Result<Vec<TeamYearStats>> {
    let mut out = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        let season = text(row, YEAR, index)?;
        if !window.contains(&season) {
            continue;
        }

        let total_points = FieldRef::required(POINTS).resolve(row, index)?;
        let games_played = FieldRef::or_zero(GAMES_PLAYED).resolve(row, index)?;
        let avg_points = (include_avg_points && games_played.value() > 0.0)
            .then(|| Stat(total_points.value() / games_played.value()));

        out.push(TeamYearStats {
            team: text(row, TEAM_NAME, index)?,
            season,
            total_points,
            avg_points,
            three_points: Stat(FieldRef::or_zero(THREES_MADE).resolve(row, index)?.value() * 3.0),
            blocks: FieldRef::required(BLOCKS).resolve(row, index)?,
            steals: FieldRef::required(STEALS).resolve(row, index)?,
            defensive_rebounds: FieldRef::required(DEFENSIVE_REBOUNDS).resolve(row, index)?,
        });
    }

    Ok(out)
}
