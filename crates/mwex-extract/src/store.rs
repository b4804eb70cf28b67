//! Deduplicating candidate store with frequency and regex filters
//!
//! Backs the plain extraction front-end: candidates are keyed by their
//! identity, counted, filtered, and written out in lexicographic order.

use std::io::Write;
use std::path::Path;

use ahash::AHashMap;
use regex::Regex;

use mwex_core::{CandidateKey, PipelineError, PipelineResult, TypeRegistry};
use mwex_io::open_output;

/// Which factor a regex filter inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterFactor {
    FormOrLemma,
    Tag,
}

/// Compile one per-slot piece as a full-match expression
pub(crate) fn compile_anchored(piece: &str) -> PipelineResult<Regex> {
    Regex::new(&format!("^(?:{piece})$"))
        .map_err(|e| PipelineError::regex(piece, e.to_string()))
}

/// Split a `:`-separated filter argument into exactly `n` anchored regexes
pub(crate) fn compile_slot_regexes(pattern: &str, n: usize) -> PipelineResult<Vec<Regex>> {
    let pieces: Vec<&str> = pattern.split(mwex_core::shared::SEP_REGEXPS).collect();
    if pieces.len() != n {
        return Err(PipelineError::config(format!(
            "regex filter '{pattern}' has {} pieces, expected {n}",
            pieces.len()
        )));
    }
    pieces.iter().map(|p| compile_anchored(p)).collect()
}

/// Frequency-counting set of candidates
#[derive(Debug, Clone)]
pub struct CandidateStore {
    n: usize,
    candidates: AHashMap<CandidateKey, u64>,
}

impl CandidateStore {
    /// Create a store for candidates of `n` slots (2..=4)
    pub fn new(n: usize) -> PipelineResult<Self> {
        if !(2..=4).contains(&n) {
            return Err(PipelineError::config(format!(
                "n must be between 2 and 4, got {n}"
            )));
        }
        Ok(Self {
            n,
            candidates: AHashMap::new(),
        })
    }

    /// Candidate size
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of distinct candidates
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// True when no candidate was stored yet
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Insert a candidate, or count one more occurrence of an existing one
    pub fn add(&mut self, key: CandidateKey, freq: u64) {
        debug_assert_eq!(key.len(), self.n);
        self.candidates
            .entry(key)
            .and_modify(|counter| *counter += 1)
            .or_insert(freq);
    }

    /// Occurrence count of a candidate, if present
    pub fn counter(&self, key: &CandidateKey) -> Option<u64> {
        self.candidates.get(key).copied()
    }

    /// Keep candidates whose selected factor matches all per-slot regexes
    /// (or drop them when `invert` is set)
    pub fn regexp_filter(
        &mut self,
        factor: FilterFactor,
        pattern: &str,
        invert: bool,
        registry: &TypeRegistry,
    ) -> PipelineResult<()> {
        let regexes = compile_slot_regexes(pattern, self.n)?;
        self.candidates.retain(|key, _| {
            let matched = key.slots.iter().zip(&regexes).all(|(slot, re)| {
                slot.map_or(false, |id| {
                    let wt = registry.get(id);
                    let text = match factor {
                        FilterFactor::FormOrLemma => &wt.form_or_lemma,
                        FilterFactor::Tag => &wt.tag,
                    };
                    re.is_match(text)
                })
            });
            matched != invert
        });
        Ok(())
    }

    /// Keep candidates whose counter lies in `[min, max]` (or drop them when
    /// `invert` is set)
    pub fn frequency_filter(&mut self, min: i64, max: i64, invert: bool) {
        self.candidates.retain(|_, counter| {
            let within = (*counter as i64) >= min && (*counter as i64) <= max;
            within != invert
        });
    }

    /// Candidates in lexicographic order
    pub fn ordered(&self, registry: &TypeRegistry) -> Vec<(&CandidateKey, u64)> {
        let mut all: Vec<(&CandidateKey, u64)> =
            self.candidates.iter().map(|(k, &c)| (k, c)).collect();
        all.sort_by(|a, b| a.0.cmp_in(b.0, registry));
        all
    }

    /// Write `types \t counter` lines in lexicographic order
    pub fn write_to(&self, writer: &mut dyn Write, registry: &TypeRegistry) -> PipelineResult<()> {
        for (key, counter) in self.ordered(registry) {
            writeln!(writer, "{}\t{}", key.render(registry), counter)
                .map_err(|e| PipelineError::io("write candidate list", e))?;
        }
        Ok(())
    }

    /// Write the candidate list to a path, gzip-compressed when it ends in
    /// `.gz`
    pub fn write_to_file(&self, path: &Path, registry: &TypeRegistry) -> PipelineResult<()> {
        let mut writer = open_output(path)?;
        self.write_to(&mut writer, registry)?;
        writer
            .flush()
            .map_err(|e| PipelineError::io(format!("flush {}", path.display()), e))
    }
}
