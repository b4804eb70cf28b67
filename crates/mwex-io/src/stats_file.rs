//! Reader for statistics files
//!
//! A statistics file optionally opens with a block of unigram lines
//! (`type \t freq \t broadContext`), followed by one line per candidate:
//! `types \t contingency [\t leftContext] [\t rightContext] [\t broadContext]`.
//! Context entries are `type:count`, space-separated. The section count of a
//! candidate line determines which contexts it carries.

use std::path::Path;

use mwex_core::shared::{split_pair, SEP_REGEXPS};
use mwex_core::{PipelineError, PipelineResult};

use crate::line_reader::LineReader;

/// One parsed statistics line
#[derive(Debug, Clone, PartialEq)]
pub enum StatsRecord {
    /// Unigram block entry
    Unigram {
        type_string: String,
        freq: i64,
        broad: Vec<(String, i64)>,
    },
    /// Candidate entry with its contingency row and optional contexts
    Candidate {
        type_strings: Vec<String>,
        contingency: Vec<i64>,
        left: Option<Vec<(String, i64)>>,
        right: Option<Vec<(String, i64)>>,
        broad: Option<Vec<(String, i64)>>,
    },
}

/// Streaming reader over a statistics file
pub struct StatsFileReader {
    reader: LineReader,
}

/// Parse a space-separated `type:count` context section
fn parse_context(section: &str) -> PipelineResult<Vec<(String, i64)>> {
    let mut out = Vec::new();
    for entry in section.split(' ') {
        if entry.is_empty() {
            continue;
        }
        let (name, count) = split_pair(entry, SEP_REGEXPS);
        let count = count.parse::<i64>().map_err(|e| {
            PipelineError::parse(format!("context entry '{entry}'"), e.to_string())
        })?;
        out.push((name.to_string(), count));
    }
    Ok(out)
}

impl StatsFileReader {
    /// Open a statistics file (gzip-transparent)
    pub fn open(path: &Path) -> PipelineResult<Self> {
        let reader = LineReader::open(path, true)?;
        Ok(Self { reader })
    }

    /// Parse the next record, skipping blank lines
    pub fn next_record(&mut self) -> PipelineResult<Option<StatsRecord>> {
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

    fn parse_current(&self) -> PipelineResult<StatsRecord> {
        let sections = self.reader.sections();
        let type_strings: Vec<String> = sections[0].split(' ').map(str::to_string).collect();

        if type_strings.len() == 1 {
            if sections.len() != 3 {
                return Err(self.malformed("unigram line must have 3 sections"));
            }
            let freq = sections[1]
                .trim()
                .parse::<i64>()
                .map_err(|e| self.malformed(&format!("bad unigram frequency: {e}")))?;
            return Ok(StatsRecord::Unigram {
                type_string: type_strings.into_iter().next().unwrap_or_default(),
                freq,
                broad: parse_context(sections[2])?,
            });
        }

        if sections.len() < 2 {
            return Err(self.malformed("candidate line has no contingency section"));
        }
        let mut contingency = Vec::new();
        for cell in sections[1].split(' ') {
            if cell.is_empty() {
                continue;
            }
            contingency.push(
                cell.parse::<i64>()
                    .map_err(|e| self.malformed(&format!("bad contingency cell '{cell}': {e}")))?,
            );
        }

        // Section count decides which contexts follow the contingency row:
        // 5 = left, right and broad; 4 = left and right; 3 = broad only.
        let (left, right, broad) = match sections.len() {
            5 => (
                Some(parse_context(sections[2])?),
                Some(parse_context(sections[3])?),
                Some(parse_context(sections[4])?),
            ),
            4 => (
                Some(parse_context(sections[2])?),
                Some(parse_context(sections[3])?),
                None,
            ),
            3 => (None, None, Some(parse_context(sections[2])?)),
            2 => (None, None, None),
            n => return Err(self.malformed(&format!("unexpected section count {n}"))),
        };

        Ok(StatsRecord::Candidate {
            type_strings,
            contingency,
            left,
            right,
            broad,
        })
    }

    fn malformed(&self, reason: &str) -> PipelineError {
        PipelineError::parse(
            format!("statistics file {}", self.reader.path()),
            format!("{reason} in line '{}'", self.reader.current_line()),
        )
    }
}
