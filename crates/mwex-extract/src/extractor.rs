//! Plain candidate extraction
//!
//! Feeds sentences through the enumeration engine and counts every emitted
//! occurrence in a [`CandidateStore`].

use std::path::Path;

use mwex_core::{CandidateKey, PipelineResult, TypeRegistry};

use crate::engine::{Enumerator, ExtractorConfig};
use crate::sentence::SentenceBuffer;
use crate::store::{CandidateStore, FilterFactor};

/// Frequency-only candidate extractor
#[derive(Debug)]
pub struct CandidateExtractor {
    registry: TypeRegistry,
    buffer: SentenceBuffer,
    enumerator: Enumerator,
    store: CandidateStore,
}

impl CandidateExtractor {
    /// Build an extractor after validating the configuration
    pub fn new(config: ExtractorConfig) -> PipelineResult<Self> {
        config.validate()?;
        let store = CandidateStore::new(config.n)?;
        Ok(Self {
            registry: TypeRegistry::new(),
            buffer: SentenceBuffer::new(),
            enumerator: Enumerator::new(config),
            store,
        })
    }

    /// Append one token of the current sentence
    pub fn add_token(&mut self, raw: &str) -> PipelineResult<()> {
        let config = self.enumerator.config();
        let dependency = config.mode == crate::engine::AdjacencyMode::Dependency;
        let n_factors = config.n_factors;
        self.buffer
            .add_token(raw, n_factors, dependency, &mut self.registry)
    }

    /// Enumerate the accumulated sentence and clear the buffer
    pub fn finish_sentence(&mut self) {
        let emitted = self.enumerator.enumerate(self.buffer.tokens());
        for e in emitted {
            self.store
                .add(CandidateKey::concrete(e.types, e.parent_ids), 1);
        }
        self.buffer.clear();
    }

    /// Interning registry backing this extraction
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Stored candidates
    pub fn store(&self) -> &CandidateStore {
        &self.store
    }

    /// Apply a per-slot regex filter on a factor
    pub fn regexp_filter(
        &mut self,
        factor: FilterFactor,
        pattern: &str,
        invert: bool,
    ) -> PipelineResult<()> {
        self.store
            .regexp_filter(factor, pattern, invert, &self.registry)
    }

    /// Apply a frequency range filter
    pub fn frequency_filter(&mut self, min: i64, max: i64, invert: bool) {
        self.store.frequency_filter(min, max, invert);
    }

    /// Write the candidate list in lexicographic order
    pub fn write_to_file(&self, path: &Path) -> PipelineResult<()> {
        self.store.write_to_file(path, &self.registry)
    }
}
