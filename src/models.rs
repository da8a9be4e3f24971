//! Data models for the statistics service.
//!
//! This module contains the records flowing between the data sources,
//! the aggregation core and the HTTP layer.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// A flat statistics row as read from a snapshot file, the stats API or a
/// client request body.
pub type Record = Map<String, Value>;

/// Field names used by the snapshot files and the analysis payloads.
pub mod fields {
    pub const TEAM: &str = "team";
    pub const SEASON: &str = "season";
    pub const FULL_NAME: &str = "full_name";
    pub const POINTS: &str = "points";
    pub const ASSISTS: &str = "assists";
    pub const REBOUNDS: &str = "rebounds";
    pub const DEFENSIVE_REBOUNDS: &str = "defensive_rebounds";
    pub const STEALS: &str = "steals";
    pub const BLOCKS: &str = "blocks";
    pub const THREE_POINTERS_MADE: &str = "three_point_field_goals_made";
    pub const TOTAL_OFFENSE: &str = "total_offense";
    pub const TOTAL_DEFENSE: &str = "total_defense";
    pub const TOTAL_POINTS: &str = "total_points";
    pub const THREE_POINTS: &str = "three_points";
}

/// A numeric statistic.
///
/// Integral values serialize and display without a fractional part, so
/// sums of whole-number inputs come back out as JSON integers.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Stat(pub f64);

impl Stat {
    pub const ZERO: Stat = Stat(0.0);

    pub fn value(self) -> f64 {
        self.0
    }

    /// Read a JSON number; anything else yields `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        value.as_f64().map(Stat)
    }

    fn as_integer(self) -> Option<i64> {
        // 2^53: beyond this f64 no longer represents every integer.
        if self.0.fract() == 0.0 && self.0.abs() < 9_007_199_254_740_992.0 {
            Some(self.0 as i64)
        } else {
            None
        }
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_integer() {
            Some(n) => write!(f, "{}", n),
            None => write!(f, "{}", self.0),
        }
    }
}

impl Serialize for Stat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.as_integer() {
            Some(n) => serializer.serialize_i64(n),
            None => serializer.serialize_f64(self.0),
        }
    }
}

impl<'de> Deserialize<'de> for Stat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Stat)
    }
}

impl From<Stat> for Value {
    fn from(stat: Stat) -> Self {
        match stat.as_integer() {
            Some(n) => Value::from(n),
            None => Value::from(stat.0),
        }
    }
}

impl Add for Stat {
    type Output = Stat;

    fn add(self, rhs: Stat) -> Stat {
        Stat(self.0 + rhs.0)
    }
}

impl AddAssign for Stat {
    fn add_assign(&mut self, rhs: Stat) {
        self.0 += rhs.0;
    }
}

impl Sum for Stat {
    fn sum<I: Iterator<Item = Stat>>(iter: I) -> Stat {
        iter.fold(Stat::ZERO, Add::add)
    }
}

/// Offense/defense totals for one team in one season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSeasonSummary {
    pub team: String,
    pub season: String,
    pub total_offense: Stat,
    pub total_defense: Stat,
}

/// Points and three-point totals for one team in one season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPointsSummary {
    pub team: String,
    pub season: String,
    pub total_points: Stat,
    pub three_points: Stat,
}

/// Per-player totals across the allowed seasons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub team: String,
    pub full_name: String,
    pub points: Stat,
    pub assists: Stat,
    pub rebounds: Stat,
}

/// One franchise in the static team directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDescriptor {
    pub id: u64,
    pub full_name: String,
    pub abbreviation: String,
    pub nickname: String,
    pub city: String,
    pub state: String,
    pub year_founded: u16,
}

/// A team's regular-season totals for one year, as served by
/// `/api/team-stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamYearStats {
    pub team: String,
    pub season: String,
    pub total_points: Stat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_points: Option<Stat>,
    pub three_points: Stat,
    pub blocks: Stat,
    pub steals: Stat,
    pub defensive_rebounds: Stat,
}

/// Which shape of record the analyzer expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Records carry `total_points`.
    Offense,
    /// Records carry `blocks`, `steals` and `defensive_rebounds`.
    Defense,
}

impl AnalysisMode {
    /// Map the request's `type` flag to a mode. Only `"defense"` selects
    /// defense analysis; anything else, including no flag, is offense.
    pub fn from_type_flag(flag: Option<&str>) -> Self {
        match flag {
            Some("defense") => AnalysisMode::Defense,
            _ => AnalysisMode::Offense,
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisMode::Offense => write!(f, "offense"),
            AnalysisMode::Defense => write!(f, "defense"),
        }
    }
}

/// Outcome tag carried in every response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Warning,
    Error,
}
