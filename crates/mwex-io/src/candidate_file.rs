//! Reader for candidate list files
//!
//! Each line is `type1 type2 … typen \t counter`. A type renders as `form`
//! or `form|tag`, and carries a `|localIndex|localParentIndex` suffix when
//! the list was extracted with dependency structure.

use std::path::Path;

use tracing::warn;

use mwex_core::shared::SEP_FACTORS;
use mwex_core::{PipelineError, PipelineResult};

use crate::line_reader::LineReader;

/// One parsed candidate line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    /// `(form_or_lemma, tag)` pairs, one per slot
    pub types: Vec<(String, String)>,
    /// Local parent indices (empty for surface extractions)
    pub parent_ids: Vec<u32>,
    /// Occurrence counter
    pub counter: u64,
}

/// Streaming reader over a candidate list file
pub struct CandidateFileReader {
    reader: LineReader,
}

impl CandidateFileReader {
    /// Open a candidate list (gzip-transparent)
    pub fn open(path: &Path) -> PipelineResult<Self> {
        let reader = LineReader::open(path, true)?;
        Ok(Self { reader })
    }

    /// Factor count of the types in this file (1, 2 or 4)
    pub fn n_factors(&self) -> usize {
        self.reader.n_factors()
    }

    /// Parse the next candidate line, skipping blank lines
    pub fn next_record(&mut self) -> PipelineResult<Option<CandidateRecord>> {
        loop {
            if self.reader.end_of_file() {
                return Ok(None);
            }
            if self.reader.current_line().is_empty() {
                self.reader.go_to_next_line()?;
                continue;
            }
            let record = self.parse_current()?;
            self.reader.go_to_next_line()?;
            return Ok(Some(record));
        }
    }

    fn parse_current(&self) -> PipelineResult<CandidateRecord> {
        let sections = self.reader.sections();
        if sections.len() < 2 {
            return Err(PipelineError::parse(
                format!("candidate file {}", self.reader.path()),
                format!("line '{}' has no counter section", self.reader.current_line()),
            ));
        }

        let mut types = Vec::new();
        let mut parent_ids = Vec::new();
        for token in sections[0].split(' ') {
            let factors: Vec<&str> = token.split(SEP_FACTORS).collect();
            let form = factors[0].to_string();
            let tag = factors.get(1).map(|t| t.to_string()).unwrap_or_default();
            if factors.len() >= 4 {
                match factors[3].parse::<u32>() {
                    Ok(pid) => parent_ids.push(pid),
                    Err(e) => {
                        warn!("bad parent id in '{token}': {e}");
                        parent_ids.push(0);
                    }
                }
            }
            types.push((form, tag));
        }

        let counter = sections[1].trim().parse::<u64>().map_err(|e| {
            PipelineError::parse(
                format!("candidate file {}", self.reader.path()),
                format!("bad counter '{}': {e}", sections[1]),
            )
        })?;

        Ok(CandidateRecord {
            types,
            parent_ids,
            counter,
        })
    }
}
