//! Rule-based team analysis.
//!
//! Turns a list of team/season records into per-team descriptive
//! statistics, then into the text blocks rendered by
//! [`crate::report`].

use crate::error::{Result, StatsError};
use crate::models::{fields, AnalysisMode, Record, Stat};
use crate::report;
use serde_json::Value;

/// A season label paired with its points total.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonPoints {
    pub season: String,
    pub points: Stat,
}

/// Scoring profile of one team across the supplied seasons.
#[derive(Debug, Clone, PartialEq)]
pub struct OffenseSummary {
    pub team: String,
    pub mean_points: f64,
    pub best: SeasonPoints,
    pub worst: SeasonPoints,
}

/// Raw defensive numbers for one season.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonDefense {
    pub season: String,
    pub blocks: Stat,
    pub steals: Stat,
    pub defensive_rebounds: Stat,
}

impl SeasonDefense {
    /// Blocks + steals + defensive rebounds; only used to rank seasons.
    pub fn composite(&self) -> f64 {
        self.blocks.value() + self.steals.value() + self.defensive_rebounds.value()
    }
}

/// Defensive profile of one team across the supplied seasons.
#[derive(Debug, Clone, PartialEq)]
pub struct DefenseSummary {
    pub team: String,
    pub mean_blocks: f64,
    pub mean_steals: f64,
    pub mean_defensive_rebounds: f64,
    pub best: SeasonDefense,
}

/// Render the analysis text for `records` in the given mode.
///
/// One block per team, in order of each team's first appearance, joined
/// by a newline. Fails if any record lacks a field the mode needs.
pub fn analyze(records: &[Record], mode: AnalysisMode) -> Result<String> {
    let blocks: Vec<String> = match mode {
        AnalysisMode::Offense => offense_summaries(records)?
            .iter()
            .map(report::render_offense_block)
            .collect(),
        AnalysisMode::Defense => defense_summaries(records)?
            .iter()
            .map(report::render_defense_block)
            .collect(),
    };

    Ok(blocks.join("\n"))
}

/// Per-team mean, best and worst `total_points`.
pub fn offense_summaries(records: &[Record]) -> Result<Vec<OffenseSummary>> {
    let mode = AnalysisMode::Offense;
    let rows = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            Ok((
                label(record, fields::TEAM, index, mode)?,
                SeasonPoints {
                    season: label(record, fields::SEASON, index, mode)?,
                    points: number(record, fields::TOTAL_POINTS, index, mode)?,
                },
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(group_by_team(rows)
        .into_iter()
        .map(|(team, seasons)| {
            let mut best = &seasons[0];
            let mut worst = &seasons[0];
            for season in &seasons[1..] {
                if season.points > best.points {
                    best = season;
                }
                if season.points < worst.points {
                    worst = season;
                }
            }

            OffenseSummary {
                mean_points: mean(seasons.iter().map(|s| s.points)),
                best: best.clone(),
                worst: worst.clone(),
                team,
            }
        })
        .collect())
}

/// Per-team means of blocks, steals and defensive rebounds, plus the season
/// with the highest composite.
pub fn defense_summaries(records: &[Record]) -> Result<Vec<DefenseSummary>> {
    let mode = AnalysisMode::Defense;
    let rows = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            Ok((
                label(record, fields::TEAM, index, mode)?,
                SeasonDefense {
                    season: label(record, fields::SEASON, index, mode)?,
                    blocks: number(record, fields::BLOCKS, index, mode)?,
                    steals: number(record, fields::STEALS, index, mode)?,
                    defensive_rebounds: number(record, fields::DEFENSIVE_REBOUNDS, index, mode)?,
                },
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(group_by_team(rows)
        .into_iter()
        .map(|(team, seasons)| {
            let mut best = &seasons[0];
            for season in &seasons[1..] {
                if season.composite() > best.composite() {
                    best = season;
                }
            }

            DefenseSummary {
                mean_blocks: mean(seasons.iter().map(|s| s.blocks)),
                mean_steals: mean(seasons.iter().map(|s| s.steals)),
                mean_defensive_rebounds: mean(seasons.iter().map(|s| s.defensive_rebounds)),
                best: best.clone(),
                team,
            }
        })
        .collect())
}

/// Group rows by team, keeping teams in order of first appearance.
/// Every returned group is non-empty.
fn group_by_team<T>(rows: Vec<(String, T)>) -> Vec<(String, Vec<T>)> {
    let mut groups: Vec<(String, Vec<T>)> = Vec::new();

    for (team, row) in rows {
        match groups.iter_mut().find(|(name, _)| *name == team) {
            Some((_, members)) => members.push(row),
            None => groups.push((team, vec![row])),
        }
    }

    groups
}

fn mean(values: impl ExactSizeIterator<Item = Stat>) -> f64 {
    let count = values.len();
    let total: Stat = values.sum();
    total.value() / count as f64
}

/// A text field, or a number rendered as text (clients sometimes send
/// seasons as bare years).
fn label(record: &Record, field: &'static str, index: usize, mode: AnalysisMode) -> Result<String> {
    match record.get(field) {
        None | Some(Value::Null) => Err(StatsError::IncompleteRecord { index, field, mode }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
    }
}

fn number(record: &Record, field: &'static str, index: usize, mode: AnalysisMode) -> Result<Stat> {
    match record.get(field) {
        None | Some(Value::Null) => Err(StatsError::IncompleteRecord { index, field, mode }),
        Some(value) => Stat::from_json(value).ok_or_else(|| StatsError::not_numeric(index, field)),
    }
}
