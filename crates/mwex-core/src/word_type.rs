//! Word types and the interning registry
//!
//! A word type is a general characterization of a token: a surface form, a
//! lemma, or a lemma paired with a morphological tag. Every token resolving
//! to the same `(form_or_lemma, tag)` pair shares one interned entry, so a
//! [`TypeId`] can be compared and hashed cheaply everywhere downstream.

use std::cmp::Ordering;
use std::fmt;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::shared::SEP_FACTORS;

/// Stable handle to an interned [`WordType`] inside a [`TypeRegistry`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeId(u32);

impl TypeId {
    /// Index into the registry arena
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A canonical `(form_or_lemma, tag)` identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WordType {
    /// Surface form or lemma (mandatory)
    pub form_or_lemma: String,
    /// Morphological tag (possibly empty)
    pub tag: String,
}

impl WordType {
    /// Create a word type from its two factors
    pub fn new<F: Into<String>, T: Into<String>>(form_or_lemma: F, tag: T) -> Self {
        Self {
            form_or_lemma: form_or_lemma.into(),
            tag: tag.into(),
        }
    }

    /// Lexicographic pair order over `(form_or_lemma, tag)`
    pub fn lex_cmp(&self, other: &Self) -> Ordering {
        (&self.form_or_lemma, &self.tag).cmp(&(&other.form_or_lemma, &other.tag))
    }
}

impl fmt::Display for WordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tag.is_empty() {
            write!(f, "{}", self.form_or_lemma)
        } else {
            write!(f, "{}{}{}", self.form_or_lemma, SEP_FACTORS, self.tag)
        }
    }
}

/// Interning arena for word types
///
/// Guarantees at most one entry exists per distinct `(form_or_lemma, tag)`
/// pair. The arena owns every word type it allocates; handles stay valid for
/// the lifetime of the registry.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: Vec<WordType>,
    index: AHashMap<WordType, TypeId>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the canonical handle for the pair, allocating on first sight
    pub fn intern(&mut self, form_or_lemma: &str, tag: &str) -> TypeId {
        let key = WordType::new(form_or_lemma, tag);
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(key.clone());
        self.index.insert(key, id);
        id
    }

    /// Resolve a handle to its word type
    pub fn get(&self, id: TypeId) -> &WordType {
        &self.types[id.index()]
    }

    /// Find the handle of an already interned pair
    pub fn lookup(&self, form_or_lemma: &str, tag: &str) -> Option<TypeId> {
        self.index
            .get(&WordType::new(form_or_lemma, tag))
            .copied()
    }

    /// Number of interned types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// True when nothing has been interned yet
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Lexicographic order of two interned types
    pub fn cmp_types(&self, a: TypeId, b: TypeId) -> Ordering {
        self.get(a).lex_cmp(self.get(b))
    }

    /// Render an interned type as `form` or `form|tag`
    pub fn display(&self, id: TypeId) -> String {
        self.get(id).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_intern_returns_same_handle() {
        let mut reg = TypeRegistry::new();
        let a = reg.intern("cat", "NN");
        let b = reg.intern("cat", "NN");
        assert_eq!(a, b);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_tag_disambiguates() {
        let mut reg = TypeRegistry::new();
        let a = reg.intern("run", "VB");
        let b = reg.intern("run", "NN");
        assert_ne!(a, b);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_display_with_and_without_tag() {
        let mut reg = TypeRegistry::new();
        let with = reg.intern("cat", "NN");
        let without = reg.intern("cat", "");
        assert_eq!(reg.display(with), "cat|NN");
        assert_eq!(reg.display(without), "cat");
    }

    #[test]
    fn test_lexicographic_pair_order() {
        let mut reg = TypeRegistry::new();
        let a = reg.intern("cat", "NN");
        let b = reg.intern("cat", "VB");
        let c = reg.intern("dog", "AA");
        assert_eq!(reg.cmp_types(a, b), Ordering::Less);
        assert_eq!(reg.cmp_types(b, c), Ordering::Less);
        assert_eq!(reg.cmp_types(a, a), Ordering::Equal);
    }

    #[test]
    fn test_word_type_serde_round_trip() {
        let wt = WordType::new("cat", "NN");
        let json = serde_json::to_string(&wt).unwrap();
        let back: WordType = serde_json::from_str(&json).unwrap();
        assert_eq!(wt, back);
    }

    proptest! {
        #[test]
        fn prop_intern_is_idempotent(form in "[a-z]{1,8}", tag in "[A-Z]{0,3}") {
            let mut reg = TypeRegistry::new();
            let first = reg.intern(&form, &tag);
            let second = reg.intern(&form, &tag);
            prop_assert_eq!(first, second);
            prop_assert_eq!(reg.len(), 1);
        }

        #[test]
        fn prop_distinct_pairs_get_distinct_handles(
            form_a in "[a-z]{1,8}", form_b in "[a-z]{1,8}", tag in "[A-Z]{0,3}"
        ) {
            prop_assume!(form_a != form_b);
            let mut reg = TypeRegistry::new();
            let a = reg.intern(&form_a, &tag);
            let b = reg.intern(&form_b, &tag);
            prop_assert_ne!(a, b);
        }
    }
}
