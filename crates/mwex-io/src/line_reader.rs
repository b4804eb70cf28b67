//! Cursor-style reader for line-oriented pipeline files
//!
//! One line is one sentence (or one record). Tokens are space-separated,
//! factors `|`-separated inside a token, and sections tab-separated. The
//! factor count of the first token of the first non-consumed line is fixed
//! for the whole file; callers enforce that later tokens agree.

use std::io::BufRead;
use std::path::Path;

use mwex_core::shared::{SEP_FACTORS, SEP_SECTIONS, SEP_WORDS};
use mwex_core::{PipelineError, PipelineResult};

use crate::stream::open_input;

/// Line cursor over a (possibly gzip-compressed) text file
pub struct LineReader {
    path: String,
    reader: Box<dyn BufRead>,
    current: String,
    eof: bool,
    n_factors: usize,
    n_sections: usize,
}

impl LineReader {
    /// Open a file and position the cursor on its first line
    ///
    /// When `with_sections` is false the section count reports 0, matching
    /// files that carry no tab separator.
    pub fn open(path: &Path, with_sections: bool) -> PipelineResult<Self> {
        let reader = open_input(path)?;
        let mut lr = Self {
            path: path.display().to_string(),
            reader,
            current: String::new(),
            eof: false,
            n_factors: 0,
            n_sections: 0,
        };
        lr.go_to_next_line()?;
        if !lr.eof {
            let first_token = lr.current.split(SEP_WORDS).next().unwrap_or("");
            lr.n_factors = first_token.matches(SEP_FACTORS).count() + 1;
            if with_sections {
                lr.n_sections = lr.current.matches(SEP_SECTIONS).count() + 1;
            }
        }
        Ok(lr)
    }

    /// Advance the cursor to the next line
    pub fn go_to_next_line(&mut self) -> PipelineResult<()> {
        self.current.clear();
        let read = self
            .reader
            .read_line(&mut self.current)
            .map_err(|e| PipelineError::io(format!("read {}", self.path), e))?;
        if read == 0 {
            self.eof = true;
        } else {
            while self.current.ends_with('\n') || self.current.ends_with('\r') {
                self.current.pop();
            }
        }
        Ok(())
    }

    /// True when no more lines can be read
    pub fn end_of_file(&self) -> bool {
        self.eof
    }

    /// The line the cursor is on
    pub fn current_line(&self) -> &str {
        &self.current
    }

    /// Space-separated tokens of the current line
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.current.split(SEP_WORDS)
    }

    /// Tab-separated sections of the current line
    pub fn sections(&self) -> Vec<&str> {
        self.current.split(SEP_SECTIONS).collect()
    }

    /// Factor count of the first token of the first line
    pub fn n_factors(&self) -> usize {
        self.n_factors
    }

    /// Section count of the first line (0 when sections were not requested)
    pub fn n_sections(&self) -> usize {
        self.n_sections
    }

    /// Path the reader was opened on, for diagnostics
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.txt");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(content.as_bytes())
            .unwrap();
        (dir, path)
    }

    #[test]
    fn test_factor_count_from_first_token() {
        let (_dir, path) = write_file("the|DT|1|0 cat|NN|2|1\nsat|VB|1|0\n");
        let lr = LineReader::open(&path, false).unwrap();
        assert_eq!(lr.n_factors(), 4);
        assert_eq!(lr.n_sections(), 0);
    }

    #[test]
    fn test_section_count_when_requested() {
        let (_dir, path) = write_file("a b\t3\nc d\t5\n");
        let lr = LineReader::open(&path, true).unwrap();
        assert_eq!(lr.n_sections(), 2);
        assert_eq!(lr.sections(), vec!["a b", "3"]);
    }

    #[test]
    fn test_cursor_walks_lines_to_eof() {
        let (_dir, path) = write_file("one\ntwo\n");
        let mut lr = LineReader::open(&path, false).unwrap();
        assert_eq!(lr.current_line(), "one");
        lr.go_to_next_line().unwrap();
        assert_eq!(lr.current_line(), "two");
        lr.go_to_next_line().unwrap();
        assert!(lr.end_of_file());
    }

    #[test]
    fn test_tokens_split_on_spaces() {
        let (_dir, path) = write_file("a|x b|y c|z\n");
        let lr = LineReader::open(&path, false).unwrap();
        let toks: Vec<&str> = lr.tokens().collect();
        assert_eq!(toks, vec!["a|x", "b|y", "c|z"]);
    }

    #[test]
    fn test_empty_file_is_immediate_eof() {
        let (_dir, path) = write_file("");
        let lr = LineReader::open(&path, false).unwrap();
        assert!(lr.end_of_file());
    }
}
