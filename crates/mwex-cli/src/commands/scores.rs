//! `compute-scores`: evaluate association measures over a statistics file

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use tracing::{info, warn};

use mwex_core::shared::SEP_FACTORS;
use mwex_core::{PipelineError, PipelineResult};
use mwex_io::{open_output, StatsFileReader, StatsRecord};
use mwex_scores::{ContextSide, ScoreCalculator};

/// Compute association scores from a statistics file
#[derive(Debug, Args)]
pub struct ScoresArgs {
    /// Score ids to compute, in output order
    #[arg(required = true)]
    pub scores: Vec<u32>,

    /// Input statistics file
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output score file (gzip when the path ends in .gz)
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Additive smoothing parameter
    #[arg(short = 's', long = "smoothing", default_value_t = 0.5)]
    pub smoothing: f32,
}

/// Refuse score ids that need a context the statistics file does not carry
fn validate_score_ids(scores: &[u32], immediate: bool, broad: bool) -> PipelineResult<()> {
    let max = scores.iter().max().copied().unwrap_or(0);
    if max > 55 && !immediate {
        return Err(PipelineError::config(format!(
            "score {max} cannot be computed without immediate context"
        )));
    }
    if max > 60 && !broad {
        return Err(PipelineError::config(format!(
            "score {max} cannot be computed without broad context"
        )));
    }
    Ok(())
}

/// Reduce a serialized type to its comparable `form|tag` prefix, dropping
/// the local tree suffix of dependency extractions
fn strip_to_form_tag(type_string: &str) -> String {
    let mut parts = type_string.splitn(3, SEP_FACTORS);
    match (parts.next(), parts.next()) {
        (Some(form), Some(tag)) => format!("{form}{SEP_FACTORS}{tag}"),
        (Some(form), None) => form.to_string(),
        _ => String::new(),
    }
}

pub fn run(args: &ScoresArgs) -> PipelineResult<()> {
    info!(
        "computing scores {:?} from {} with smoothing {}",
        args.scores,
        args.input.display(),
        args.smoothing
    );

    let mut reader = StatsFileReader::open(&args.input)?;
    let mut writer = open_output(&args.output)?;
    let wio = |e: std::io::Error| PipelineError::io("write scores", e);

    // The unigram block precedes the candidates; buffer it until the first
    // candidate line reveals which contexts the file carries.
    let mut unigram_block: Vec<(String, i64, Vec<(String, i64)>)> = Vec::new();
    let mut calculator: Option<ScoreCalculator> = None;

    while let Some(record) = reader.next_record()? {
        match record {
            StatsRecord::Unigram {
                type_string,
                freq,
                broad,
            } => {
                if let Some(calc) = calculator.as_mut() {
                    warn!("unigram '{type_string}' appears after the candidate block");
                    calc.add_type(&type_string, freq, &broad);
                } else {
                    unigram_block.push((type_string, freq, broad));
                }
            }
            StatsRecord::Candidate {
                type_strings,
                contingency,
                left,
                right,
                broad,
            } => {
                if calculator.is_none() {
                    let has_immediate = left.is_some();
                    let has_broad = broad.is_some();
                    validate_score_ids(&args.scores, has_immediate, has_broad)?;
                    let mut calc = ScoreCalculator::new(
                        has_immediate,
                        has_broad,
                        args.scores.clone(),
                        args.smoothing,
                    );
                    for (name, freq, context) in &unigram_block {
                        calc.add_type(name, *freq, context);
                    }
                    calculator = Some(calc);
                }
                let Some(calc) = calculator.as_mut() else {
                    continue;
                };

                if broad.is_some() {
                    let stripped: Vec<String> =
                        type_strings.iter().map(|t| strip_to_form_tag(t)).collect();
                    calc.new_candidate(&stripped);
                } else {
                    calc.new_candidate(&[]);
                }
                calc.add_contingency_table(&contingency);
                if let Some(entries) = &left {
                    calc.add_to_immediate_context(ContextSide::Left, entries);
                }
                if let Some(entries) = &right {
                    calc.add_to_immediate_context(ContextSide::Right, entries);
                }
                if let Some(entries) = &broad {
                    calc.add_to_broad_context(entries);
                }

                let scores = calc.compute();
                let rendered: Vec<String> = scores.iter().map(|s| format!("{s:.6}")).collect();
                writeln!(writer, "{}\t{}", type_strings.join(" "), rendered.join(" "))
                    .map_err(wio)?;
            }
        }
    }

    writer.flush().map_err(wio)
}
