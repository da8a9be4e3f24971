//! Statistics aggregation and analysis.
//!
//! `aggregator` groups raw rows into team/season summaries; `analyzer`
//! derives per-team averages and extremes from summaries.

pub mod aggregator;
pub mod analyzer;

pub use aggregator::*;
pub use analyzer::*;
