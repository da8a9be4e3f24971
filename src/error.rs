//! Error types for aggregation, analysis and data loading.

use crate::models::AnalysisMode;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the statistics core and its data sources.
#[derive(Error, Debug)]
pub enum StatsError {
    /// A record lacks a field needed for grouping or reduction.
    #[error("malformed record at index {index}: {reason} `{field}`")]
    MalformedRecord {
        index: usize,
        field: String,
        reason: &'static str,
    },

    /// A record lacks a field required by the selected analysis mode.
    #[error("incomplete record at index {index}: missing `{field}` for {mode} analysis")]
    IncompleteRecord {
        index: usize,
        field: &'static str,
        mode: AnalysisMode,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot parsed as JSON but not in the expected layout.
    #[error("unexpected snapshot layout in {}: {reason}", path.display())]
    SnapshotShape { path: PathBuf, reason: String },

    /// An aggregated record did not match its summary type.
    #[error("failed to build summary: {0}")]
    Summary(#[source] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected stats API response: {0}")]
    UpstreamFormat(String),
}

impl StatsError {
    pub(crate) fn missing(index: usize, field: &str) -> Self {
        StatsError::MalformedRecord {
            index,
            field: field.to_string(),
            reason: "missing field",
        }
    }

    pub(crate) fn not_numeric(index: usize, field: &str) -> Self {
        StatsError::MalformedRecord {
            index,
            field: field.to_string(),
            reason: "non-numeric field",
        }
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;
