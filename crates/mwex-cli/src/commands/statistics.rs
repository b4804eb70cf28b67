//! `extract-statistics`: collect contingency counts and contexts for a
//! previously extracted candidate list

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use mwex_core::PipelineResult;
use mwex_extract::{ExtractorConfig, StatisticExtractor};
use mwex_io::{CandidateFileReader, LineReader};

use super::{resolve_distance_range, resolve_mode};

/// Collect contingency and context statistics over a corpus
#[derive(Debug, Args)]
pub struct StatisticsArgs {
    /// Number of word types per candidate (2, 3 or 4)
    #[arg(short = 'n', long = "n")]
    pub n: usize,

    /// Input corpus file (gzip-transparent)
    #[arg(short = 'c', long = "corpus")]
    pub corpus: PathBuf,

    /// Input candidate list
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output statistics file (gzip when the path ends in .gz)
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Dependency extraction (requires syntactic annotations)
    #[arg(short = 'd', long = "dependency")]
    pub dependency: bool,

    /// Surface extraction
    #[arg(short = 's', long = "surface")]
    pub surface: bool,

    /// Extract adjacent candidates only
    #[arg(short = 'a', long = "adjacent")]
    pub adjacent: bool,

    /// Accepted distance range between the furthest tokens, as min-max
    #[arg(short = 'r', long = "distance-range")]
    pub distance_range: Option<String>,

    /// Full-match regex restricting the tags admitted into contexts
    #[arg(short = 't', long = "tag-filter")]
    pub tag_filter: Option<String>,

    /// Collect the immediate (left and right) contexts
    #[arg(long = "immediate")]
    pub immediate: bool,

    /// Collect the broad (sentence-wide) contexts and the unigram table
    #[arg(long = "broad")]
    pub broad: bool,
}

pub fn run(args: &StatisticsArgs) -> PipelineResult<()> {
    let mode = resolve_mode(args.dependency, args.surface)?;
    let (surf_min, surf_max) =
        resolve_distance_range(args.n, args.adjacent, args.distance_range.as_deref())?;

    let mut corpus = LineReader::open(&args.corpus, false)?;
    let config = ExtractorConfig {
        n: args.n,
        n_factors: corpus.n_factors(),
        surf_min,
        surf_max,
        mode,
    };
    let mut extractor = StatisticExtractor::new(
        config,
        args.immediate,
        args.broad,
        args.tag_filter.as_deref(),
    )?;

    let mut candidates = CandidateFileReader::open(&args.input)?;
    let mut loaded = 0usize;
    while let Some(record) = candidates.next_record()? {
        // Counters restart at zero; the corpus pass recounts occurrences.
        extractor.add_candidate(&record.types, &record.parent_ids)?;
        loaded += 1;
    }
    info!("loaded {loaded} candidates from {}", args.input.display());

    info!("reading corpus {}", args.corpus.display());
    while !corpus.end_of_file() {
        for token in corpus.tokens() {
            extractor.add_token(token)?;
        }
        extractor.finish_sentence();
        corpus.go_to_next_line()?;
    }

    extractor.finish();
    info!("{} candidate occurrences observed", extractor.total());
    extractor.write_to_file(&args.output)
}
