//! `extract-candidates`: enumerate and count MWE candidates from a corpus

use std::path::PathBuf;

use clap::Args;
use tracing::{info, warn};

use mwex_core::shared::{parse_range, LEMMA, TAG};
use mwex_core::PipelineResult;
use mwex_extract::{CandidateExtractor, ExtractorConfig, FilterFactor};
use mwex_io::LineReader;

use super::{resolve_distance_range, resolve_mode};

/// Extract MWE candidates from an annotated corpus
#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Number of word types per candidate (2, 3 or 4)
    #[arg(short = 'n', long = "n")]
    pub n: usize,

    /// Input corpus file (gzip-transparent)
    #[arg(short = 'c', long = "corpus")]
    pub corpus: PathBuf,

    /// Output candidate file (gzip when the path ends in .gz)
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

    /// Keep candidates whose frequency lies in min-max
    #[arg(short = 'f', long = "frequency-filter")]
    pub frequency_filter: Option<String>,

    /// Per-slot full-match regex filter on lemmas, as regex1:...:regexn
    #[arg(short = 'l', long = "lemma-filter")]
    pub lemma_filter: Option<String>,

    /// Per-slot full-match regex filter on tags, as regex1:...:regexn
    #[arg(short = 't', long = "tag-filter")]
    pub tag_filter: Option<String>,
}

pub fn run(args: &ExtractArgs) -> PipelineResult<()> {
    let mode = resolve_mode(args.dependency, args.surface)?;
    let (surf_min, surf_max) =
        resolve_distance_range(args.n, args.adjacent, args.distance_range.as_deref())?;

    let mut reader = LineReader::open(&args.corpus, false)?;
    let n_factors = reader.n_factors();

    let config = ExtractorConfig {
        n: args.n,
        n_factors,
        surf_min,
        surf_max,
        mode,
    };
    let mut extractor = CandidateExtractor::new(config)?;

    info!("looking for {}-grams in {}", args.n, args.corpus.display());
    while !reader.end_of_file() {
        for token in reader.tokens() {
            extractor.add_token(token)?;
        }
        extractor.finish_sentence();
        reader.go_to_next_line()?;
    }
    info!("{} distinct candidates extracted", extractor.store().len());

    if let Some(filter) = &args.lemma_filter {
        if n_factors > LEMMA {
            info!("applying the lemma filter: {filter}");
            extractor.regexp_filter(FilterFactor::FormOrLemma, filter, false)?;
        } else {
            warn!("corpus has no lemma factor, skipping the lemma filter");
        }
    }
    if let Some(filter) = &args.tag_filter {
        if n_factors > TAG {
            info!("applying the tag filter: {filter}");
            extractor.regexp_filter(FilterFactor::Tag, filter, false)?;
        } else {
            warn!("corpus has no tag factor, skipping the tag filter");
        }
    }
    if let Some(range) = &args.frequency_filter {
        let (min, max) = parse_range(range)?;
        if min >= 1 && max >= min {
            info!("applying the frequency filter within {min}-{max}");
            extractor.frequency_filter(min, max, false);
        }
    }

    extractor.write_to_file(&args.output)
}
