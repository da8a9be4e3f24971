//! Text rendering for team analyses.

pub mod generator;

pub use generator::*;
