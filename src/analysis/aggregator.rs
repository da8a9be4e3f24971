//! Record grouping and summation.
//!
//! This module partitions flat statistics rows by a key made of one or
//! more string fields and sums declared numeric expressions per group.

use crate::error::{Result, StatsError};
use crate::models::{fields, MemberSummary, Record, Stat, TeamPointsSummary, TeamSeasonSummary};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// A numeric source field, either required or falling back to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRef {
    name: String,
    fallback: Option<Stat>,
}

impl FieldRef {
    /// A field that must be present on every record.
    pub fn required(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fallback: None,
        }
    }

    /// A field that counts as zero when absent.
    pub fn or_zero(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fallback: Some(Stat::ZERO),
        }
    }

    pub(crate) fn resolve(&self, record: &Record, index: usize) -> Result<Stat> {
        match record.get(&self.name) {
            None | Some(Value::Null) => self
                .fallback
                .ok_or_else(|| StatsError::missing(index, &self.name)),
            Some(value) => {
                Stat::from_json(value).ok_or_else(|| StatsError::not_numeric(index, &self.name))
            }
        }
    }
}

/// Per-record value that gets summed into an output field.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Field(FieldRef),
    /// Sum of several fields of the same record.
    Sum(Vec<FieldRef>),
    /// A field multiplied by a constant.
    Scaled(FieldRef, f64),
}

impl Expr {
    fn eval(&self, record: &Record, index: usize) -> Result<Stat> {
        match self {
            Expr::Field(field) => field.resolve(record, index),
            Expr::Sum(parts) => parts.iter().map(|p| p.resolve(record, index)).sum(),
            Expr::Scaled(field, factor) => Ok(Stat(field.resolve(record, index)?.value() * factor)),
        }
    }
}

/// Ordered list of output fields and the expression summed into each.
#[derive(Debug, Clone, Default)]
pub struct ReduceSpec {
    outputs: Vec<(String, Expr)>,
}

impl ReduceSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sum_field(self, output: &str, field: FieldRef) -> Self {
        self.with(output, Expr::Field(field))
    }

    pub fn sum_of(self, output: &str, parts: Vec<FieldRef>) -> Self {
        self.with(output, Expr::Sum(parts))
    }

    pub fn sum_scaled(self, output: &str, field: FieldRef, factor: f64) -> Self {
        self.with(output, Expr::Scaled(field, factor))
    }

    fn with(mut self, output: &str, expr: Expr) -> Self {
        self.outputs.push((output.to_string(), expr));
        self
    }
}

/// One group: its key values and one total per reduce output.
#[derive(Debug, Clone, PartialEq)]
struct Group {
    key: Vec<String>,
    totals: Vec<Stat>,
}

fn group_totals(
    records: &[Record],
    group_fields: &[&str],
    keys: &[Vec<String>],
    spec: &ReduceSpec,
) -> Result<Vec<Group>> {
    let mut slots: HashMap<Vec<String>, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for key in keys {
        if !slots.contains_key(key) {
            slots.insert(key.clone(), groups.len());
            groups.push(Group {
                key: key.clone(),
                totals: vec![Stat::ZERO; spec.outputs.len()],
            });
        }
    }

    for (index, record) in records.iter().enumerate() {
        let key = group_fields
            .iter()
            .map(|field| match record.get(*field) {
                None | Some(Value::Null) => Err(StatsError::missing(index, field)),
                Some(Value::String(s)) => Ok(s.clone()),
                Some(_) => Err(StatsError::MalformedRecord {
                    index,
                    field: field.to_string(),
                    reason: "non-string key field",
                }),
            })
            .collect::<Result<Vec<String>>>()?;

        let contributions = spec
            .outputs
            .iter()
            .map(|(_, expr)| expr.eval(record, index))
            .collect::<Result<Vec<Stat>>>()?;

        let slot = match slots.get(&key) {
            Some(&slot) => slot,
            None => {
                slots.insert(key.clone(), groups.len());
                groups.push(Group {
                    key,
                    totals: vec![Stat::ZERO; spec.outputs.len()],
                });
                groups.len() - 1
            }
        };

        for (total, value) in groups[slot].totals.iter_mut().zip(contributions) {
            *total += value;
        }
    }

    Ok(groups)
}

/// Group `records` by `group_fields` and sum each `spec` output per group.
///
/// Groups are emitted in order of first appearance. Each output record holds
/// the key fields followed by the reduced fields. Any record missing a key
/// or required source field fails the whole call.
pub fn aggregate(records: &[Record], group_fields: &[&str], spec: &ReduceSpec) -> Result<Vec<Record>> {
    aggregate_with_keys(records, group_fields, &[], spec)
}

/// Like [`aggregate`], but every key in `keys` gets a group even when no
/// record falls into it; such groups total zero. Seeded groups come first,
/// in `keys` order. Each key holds one value per entry of `group_fields`.
pub fn aggregate_with_keys(
    records: &[Record],
    group_fields: &[&str],
    keys: &[Vec<String>],
    spec: &ReduceSpec,
) -> Result<Vec<Record>> {
    let groups = group_totals(records, group_fields, keys, spec)?;

    Ok(groups
        .into_iter()
        .map(|group| {
            let mut out = Record::new();
            for (field, value) in group_fields.iter().zip(group.key) {
                out.insert(field.to_string(), Value::String(value));
            }
            for ((name, _), total) in spec.outputs.iter().zip(group.totals) {
                out.insert(name.clone(), total.into());
            }
            out
        })
        .collect())
}

/// Predicate keeping records whose `season` is one of `allowed`.
pub fn season_in(allowed: &[String]) -> impl Fn(&Record) -> bool + '_ {
    move |record| {
        record
            .get(fields::SEASON)
            .and_then(Value::as_str)
            .is_some_and(|season| allowed.iter().any(|a| a == season))
    }
}

/// Drop every record outside the season allow-list.
pub fn retain_seasons(records: Vec<Record>, allowed: &[String]) -> Vec<Record> {
    let keep = season_in(allowed);
    records.into_iter().filter(|r| keep(r)).collect()
}

/// Read aggregated records back as typed summaries.
fn summarize<T: DeserializeOwned>(aggregated: Vec<Record>) -> Result<Vec<T>> {
    aggregated
        .into_iter()
        .map(|record| serde_json::from_value(Value::Object(record)).map_err(StatsError::Summary))
        .collect()
}

/// Offense (points) and defense (defensive rebounds + steals + blocks)
/// totals per team and season, in order of first appearance.
///
/// `nodes` lists `(team, season)` pairs that must be reported even without
/// records, such as the empty seasons of a team tree; they come first, in
/// the given order, with zero totals unless records fall into them.
pub fn team_season_totals(
    records: &[Record],
    nodes: &[(String, String)],
) -> Result<Vec<TeamSeasonSummary>> {
    let keys: Vec<Vec<String>> = nodes
        .iter()
        .map(|(team, season)| vec![team.clone(), season.clone()])
        .collect();

    let spec = ReduceSpec::new()
        .sum_field(fields::TOTAL_OFFENSE, FieldRef::required(fields::POINTS))
        .sum_of(
            fields::TOTAL_DEFENSE,
            vec![
                FieldRef::required(fields::DEFENSIVE_REBOUNDS),
                FieldRef::required(fields::STEALS),
                FieldRef::required(fields::BLOCKS),
            ],
        );

    summarize(aggregate_with_keys(records, &[fields::TEAM, fields::SEASON], &keys, &spec)?)
}

/// Points and three-point points per team and season, sorted by team then
/// season. Three-point makes default to zero when a row omits them.
pub fn team_points_totals(records: &[Record]) -> Result<Vec<TeamPointsSummary>> {
    let spec = ReduceSpec::new()
        .sum_field(fields::TOTAL_POINTS, FieldRef::required(fields::POINTS))
        .sum_scaled(
            fields::THREE_POINTS,
            FieldRef::or_zero(fields::THREE_POINTERS_MADE),
            3.0,
        );

    let mut totals: Vec<TeamPointsSummary> =
        summarize(aggregate(records, &[fields::TEAM, fields::SEASON], &spec)?)?;
    totals.sort_by(|a, b| (&a.team, &a.season).cmp(&(&b.team, &b.season)));
    Ok(totals)
}

/// Points, assists and rebounds per team and player, sorted by team then
/// player name.
pub fn member_totals(records: &[Record]) -> Result<Vec<MemberSummary>> {
    let spec = ReduceSpec::new()
        .sum_field(fields::POINTS, FieldRef::required(fields::POINTS))
        .sum_field(fields::ASSISTS, FieldRef::required(fields::ASSISTS))
        .sum_field(fields::REBOUNDS, FieldRef::required(fields::REBOUNDS));

    let mut totals: Vec<MemberSummary> =
        summarize(aggregate(records, &[fields::TEAM, fields::FULL_NAME], &spec)?)?;
    totals.sort_by(|a, b| (&a.team, &a.full_name).cmp(&(&b.team, &b.full_name)));
    Ok(totals)
}
