//! Per-sentence token assembly
//!
//! Tokens accumulate in a buffer headed by a sentinel root until the caller
//! triggers enumeration, after which the buffer is cleared and reused.

use tracing::warn;

use mwex_core::{PipelineResult, Token, TypeRegistry};

/// Upper bound on tokens per sentence, keeping enumeration cost tractable
pub const MAX_TOKENS_PER_SENTENCE: usize = 1024;

/// Accumulates the tokens of the sentence being read
#[derive(Debug)]
pub struct SentenceBuffer {
    tokens: Vec<Token>,
}

impl SentenceBuffer {
    /// Create a buffer holding only the sentinel root
    pub fn new() -> Self {
        Self {
            tokens: vec![Token::sentinel()],
        }
    }

    /// Parse and append one token
    ///
    /// Blank tokens are skipped. Tokens beyond [`MAX_TOKENS_PER_SENTENCE`]
    /// are dropped with a warning, as are tokens that fail to parse; a
    /// malformed token never aborts the corpus pass.
    pub fn add_token(
        &mut self,
        raw: &str,
        n_factors: usize,
        dependency: bool,
        registry: &mut TypeRegistry,
    ) -> PipelineResult<()> {
        if raw.is_empty() {
            return Ok(());
        }
        if self.real_len() >= MAX_TOKENS_PER_SENTENCE {
            warn!("sentence exceeds {MAX_TOKENS_PER_SENTENCE} tokens, dropping '{raw}'");
            return Ok(());
        }
        let position = self.tokens.len();
        match Token::parse(raw, n_factors, position, dependency, registry) {
            Ok(token) => self.tokens.push(token),
            Err(e) => warn!("skipping token: {e}"),
        }
        Ok(())
    }

    /// All tokens including the sentinel at index 0
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of real tokens (sentinel excluded)
    pub fn real_len(&self) -> usize {
        self.tokens.len() - 1
    }

    /// Reset to an empty sentence
    pub fn clear(&mut self) {
        self.tokens.truncate(1);
    }
}

impl Default for SentenceBuffer {
    fn default() -> Self {
        Self::new()
    }
}
