//! Association measures for MWE candidate ranking
//!
//! A [`ScoreCalculator`] replays serialized candidate statistics and
//! evaluates a configurable subset of the association measure catalog:
//! probability and contingency measures over the 2x2 table, entropy and
//! divergence over the immediate contexts, and distributional measures over
//! the broad context and the per-type context vectors.

pub mod calculator;

// Re-export main types for convenience
pub use calculator::{ContextSide, ScoreCalculator, ScoreContext};
