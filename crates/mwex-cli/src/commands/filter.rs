//! `filter-candidates`: reload a candidate list and filter it

use std::path::PathBuf;

use clap::Args;
use tracing::{info, warn};

use mwex_core::shared::parse_range;
use mwex_core::{CandidateKey, PipelineResult, TypeId, TypeRegistry};
use mwex_extract::{CandidateStore, FilterFactor};
use mwex_io::CandidateFileReader;

/// Filter a previously extracted candidate list
#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Number of word types per candidate (2, 3 or 4)
    #[arg(short = 'n', long = "n")]
    pub n: usize,

    /// Input candidate list
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,

    /// Output filtered candidate list
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,

    /// Keep candidates whose frequency lies in min-max
    #[arg(short = 'f', long = "frequency-filter")]
    pub frequency_filter: Option<String>,

    /// Per-slot full-match regex filter on lemmas, as regex1:...:regexn
    #[arg(short = 'l', long = "lemma-filter")]
    pub lemma_filter: Option<String>,

    /// Per-slot full-match regex filter on tags, as regex1:...:regexn
    #[arg(short = 't', long = "tag-filter")]
    pub tag_filter: Option<String>,

    /// Reject matching candidates instead of keeping them
    #[arg(short = 'r', long = "reject")]
    pub invert: bool,
}

pub fn run(args: &FilterArgs) -> PipelineResult<()> {
    let mut registry = TypeRegistry::new();
    let mut store = CandidateStore::new(args.n)?;

    let mut reader = CandidateFileReader::open(&args.input)?;
    let n_factors = reader.n_factors();
    while let Some(record) = reader.next_record()? {
        let types: Vec<TypeId> = record
            .types
            .iter()
            .map(|(form, tag)| registry.intern(form, tag))
            .collect();
        store.add(
            CandidateKey::concrete(types, record.parent_ids),
            record.counter,
        );
    }
    info!("filtering {} candidates from {}", store.len(), args.input.display());
    if args.invert {
        info!("rejecting matching candidates");
    }

    if let Some(filter) = &args.lemma_filter {
        store.regexp_filter(FilterFactor::FormOrLemma, filter, args.invert, &registry)?;
    }
    if let Some(filter) = &args.tag_filter {
        if n_factors > 1 {
            store.regexp_filter(FilterFactor::Tag, filter, args.invert, &registry)?;
        } else {
            warn!("candidate list has no tags, skipping the tag filter");
        }
    }
    if let Some(range) = &args.frequency_filter {
        let (min, max) = parse_range(range)?;
        if min >= 0 && max >= min {
            store.frequency_filter(min, max, args.invert);
        }
    }

    store.write_to_file(&args.output, &registry)
}
