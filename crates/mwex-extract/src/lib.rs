//! Candidate enumeration and statistics extraction
//!
//! This crate implements the corpus-facing half of the pipeline:
//!
//! - **Sentence assembly**: token buffering with the sentinel root
//! - **Enumeration**: surface-chain and dependency-subtree candidate scans
//!   sharing one emit path
//! - **Candidate store**: deduplication, frequency and regex filters, and
//!   the candidate list writer
//! - **Statistics**: contingency marginals through the subcandidate lattice,
//!   immediate/broad contexts and the unigram table

pub mod engine;
pub mod extractor;
pub mod sentence;
pub mod statistics;
pub mod store;

// Re-export main types for convenience
pub use engine::{AdjacencyMode, CompositionCache, Emitted, Enumerator, ExtractorConfig};
pub use extractor::CandidateExtractor;
pub use sentence::{SentenceBuffer, MAX_TOKENS_PER_SENTENCE};
pub use statistics::StatisticExtractor;
pub use store::{CandidateStore, FilterFactor};
