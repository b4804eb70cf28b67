//! Sentence tokens
//!
//! A token is an array of annotation factors. The first factor is usually
//! the surface form; the others come from lemmatization, tagging and
//! dependency parsing. Extra factors beyond the known positions are kept but
//! ignored.

use tracing::warn;

use crate::error::{PipelineError, PipelineResult};
use crate::shared::{ID, LEMMA, PARENT_ID, SEP_FACTORS, TAG};
use crate::word_type::{TypeId, TypeRegistry};

/// One annotated token of a sentence
#[derive(Debug, Clone)]
pub struct Token {
    /// Raw factor strings in positional order
    pub factors: Vec<String>,
    /// 1-based position in the sentence (0 is the sentinel root)
    pub id: usize,
    /// Id of the governing token (dependency mode only; 0 is the root)
    pub parent_id: usize,
    /// Resolved word type (`None` only for the sentinel)
    pub type_id: Option<TypeId>,
}

impl Token {
    /// The sentinel token standing in for the root of a sentence
    pub fn sentinel() -> Self {
        Self {
            factors: Vec::new(),
            id: 0,
            parent_id: 0,
            type_id: None,
        }
    }

    /// Parse a `|`-separated factor string into a token
    ///
    /// The word type is interned from `(LEMMA, TAG)` when three or more
    /// factors are present, from `(LEMMA, "")` with two, and from the bare
    /// form with one. In dependency mode the id and parent id factors are
    /// required; in surface mode the id is the 1-based insertion position.
    pub fn parse(
        raw: &str,
        n_factors: usize,
        position: usize,
        dependency: bool,
        registry: &mut TypeRegistry,
    ) -> PipelineResult<Self> {
        let factors: Vec<String> = raw.split(SEP_FACTORS).map(str::to_string).collect();
        if factors.len() != n_factors {
            warn!("token '{raw}' has {} factors, expected {n_factors}", factors.len());
        }

        let type_id = match factors.len() {
            0 => return Err(PipelineError::parse(format!("token '{raw}'"), "no factors")),
            1 => registry.intern(&factors[0], ""),
            2 => registry.intern(&factors[LEMMA], ""),
            _ => registry.intern(&factors[LEMMA], &factors[TAG]),
        };

        let (id, parent_id) = if dependency {
            if factors.len() <= PARENT_ID {
                return Err(PipelineError::parse(
                    format!("token '{raw}'"),
                    "dependency extraction needs id and parent id factors",
                ));
            }
            let id = factors[ID].parse::<usize>().map_err(|e| {
                PipelineError::parse(format!("token '{raw}'"), format!("bad id: {e}"))
            })?;
            let parent_id = factors[PARENT_ID].parse::<usize>().map_err(|e| {
                PipelineError::parse(format!("token '{raw}'"), format!("bad parent id: {e}"))
            })?;
            (id, parent_id)
        } else {
            (position, 0)
        };

        Ok(Self {
            factors,
            id,
            parent_id,
            type_id: Some(type_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_surface_token_uses_position() {
        let mut reg = TypeRegistry::new();
        let tok = Token::parse("cats|cat|NN", 3, 2, false, &mut reg).unwrap();
        assert_eq!(tok.id, 2);
        assert_eq!(tok.parent_id, 0);
        let wt = reg.get(tok.type_id.unwrap());
        assert_eq!(wt.form_or_lemma, "cat");
        assert_eq!(wt.tag, "NN");
    }

    #[test]
    fn test_parse_dependency_token_reads_id_factors() {
        let mut reg = TypeRegistry::new();
        let tok = Token::parse("black|black|JJ|3|4|Atr", 6, 1, true, &mut reg).unwrap();
        assert_eq!(tok.id, 3);
        assert_eq!(tok.parent_id, 4);
    }

    #[test]
    fn test_parse_two_factor_token_interns_lemma_only() {
        let mut reg = TypeRegistry::new();
        let tok = Token::parse("cats|cat", 2, 1, false, &mut reg).unwrap();
        let wt = reg.get(tok.type_id.unwrap());
        assert_eq!(wt.form_or_lemma, "cat");
        assert!(wt.tag.is_empty());
    }

    #[test]
    fn test_parse_single_factor_token_interns_form() {
        let mut reg = TypeRegistry::new();
        let tok = Token::parse("cats", 1, 1, false, &mut reg).unwrap();
        assert_eq!(reg.get(tok.type_id.unwrap()).form_or_lemma, "cats");
    }

    #[test]
    fn test_dependency_token_without_annotations_fails() {
        let mut reg = TypeRegistry::new();
        assert!(Token::parse("cats|cat|NN", 3, 1, true, &mut reg).is_err());
    }
}
