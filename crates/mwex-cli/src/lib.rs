//! mwex CLI library
//!
//! Exposes the clap command tree and the testable entry point used by the
//! `mwex` binary. The pipeline runs in three offline stages plus a list
//! filter:
//!
//! - `extract-candidates`: enumerate n-gram candidates from a corpus
//! - `filter-candidates`: filter a candidate list by frequency or regex
//! - `extract-statistics`: collect contingency counts and contexts
//! - `compute-scores`: evaluate association measures

pub mod commands;

use clap::{Parser, Subcommand};

use mwex_core::PipelineResult;

/// Multi-word expression candidate extraction and scoring
#[derive(Debug, Parser)]
#[command(name = "mwex", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract MWE candidates from an annotated corpus
    ExtractCandidates(commands::extract::ExtractArgs),
    /// Filter a previously extracted candidate list
    FilterCandidates(commands::filter::FilterArgs),
    /// Collect contingency and context statistics for a candidate list
    ExtractStatistics(commands::statistics::StatisticsArgs),
    /// Compute association scores from a statistics file
    ComputeScores(commands::scores::ScoresArgs),
}

/// Parse the command line and dispatch to the selected stage
pub fn run_cli() -> PipelineResult<()> {
    let cli = Cli::parse();
    run_command(&cli.command)
}

/// Dispatch one parsed command (testable without argv)
pub fn run_command(command: &Command) -> PipelineResult<()> {
    match command {
        Command::ExtractCandidates(args) => commands::extract::run(args),
        Command::FilterCandidates(args) => commands::filter::run(args),
        Command::ExtractStatistics(args) => commands::statistics::run(args),
        Command::ComputeScores(args) => commands::scores::run(args),
    }
}
