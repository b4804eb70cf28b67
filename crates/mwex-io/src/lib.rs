//! Boundary I/O for the extraction pipeline
//!
//! This crate keeps the core free of file-format concerns:
//!
//! - **Streams**: gzip-transparent buffered readers and writers
//! - **Line cursor**: factor/section-aware reader over line-oriented files
//! - **Candidate files**: `types \t counter` records
//! - **Statistics files**: unigram block plus contingency/context records

pub mod candidate_file;
pub mod line_reader;
pub mod stats_file;
pub mod stream;

// Re-export main types for convenience
pub use candidate_file::{CandidateFileReader, CandidateRecord};
pub use line_reader::LineReader;
pub use stats_file::{StatsFileReader, StatsRecord};
pub use stream::{open_input, open_output};
