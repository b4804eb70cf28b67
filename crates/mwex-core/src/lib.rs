//! Core data model for MWE candidate extraction
//!
//! This crate provides the types shared by every pipeline stage:
//!
//! - **Word types**: interned `(form_or_lemma, tag)` identities
//! - **Tokens**: positional factor arrays resolved to word types
//! - **Trees**: the generic arena tree used by both adjacency models
//! - **Candidates**: tuple identities with optional dependency structure
//! - **Errors**: the unified pipeline error type

pub mod candidate;
pub mod error;
pub mod shared;
pub mod token;
pub mod tree;
pub mod word_type;

// Re-export main types for convenience
pub use candidate::CandidateKey;
pub use error::{PipelineError, PipelineResult};
pub use token::Token;
pub use tree::{NodeId, Tree};
pub use word_type::{TypeId, TypeRegistry, WordType};
