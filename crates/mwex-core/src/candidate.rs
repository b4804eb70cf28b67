//! Candidate identity
//!
//! A candidate is a potential multi-word expression: an ordered tuple of
//! word-type slots, optionally carrying the local tree structure of a
//! dependency extraction. A slot set to `None` is undefined; candidates with
//! undefined slots ("subcandidates") represent the marginal cells of the
//! contingency table. The `order` of a key is its number of undefined slots,
//! zero for concrete candidates.

use std::cmp::Ordering;

use crate::shared::SEP_FACTORS;
use crate::word_type::{TypeId, TypeRegistry};

/// Identity of a candidate: `(order, slots, parent_ids)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateKey {
    /// Word-type slots; `None` marks an undefined slot
    pub slots: Vec<Option<TypeId>>,
    /// Remapped local parent indices (empty in surface mode and for
    /// subcandidates); entry 0 means "outside the candidate"
    pub parent_ids: Vec<u32>,
    /// Number of undefined slots
    pub order: u32,
}

impl CandidateKey {
    /// Build a concrete key (no undefined slots)
    pub fn concrete(types: Vec<TypeId>, parent_ids: Vec<u32>) -> Self {
        Self {
            slots: types.into_iter().map(Some).collect(),
            parent_ids,
            order: 0,
        }
    }

    /// Build a key from raw slots, deriving the order from the `None` count
    pub fn from_slots(slots: Vec<Option<TypeId>>, parent_ids: Vec<u32>) -> Self {
        let order = slots.iter().filter(|s| s.is_none()).count() as u32;
        Self {
            slots,
            parent_ids,
            order,
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True for the (degenerate) zero-slot key
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Lexicographic order used everywhere candidates are serialized
    ///
    /// Discriminates on `order` first, then slot-wise on the word types with
    /// concrete slots ranking before undefined ones, then on the parent ids.
    pub fn cmp_in(&self, other: &Self, registry: &TypeRegistry) -> Ordering {
        match self.order.cmp(&other.order) {
            Ordering::Equal => {}
            ord => return ord,
        }
        for (a, b) in self.slots.iter().zip(&other.slots) {
            let ord = match (a, b) {
                (Some(a), Some(b)) => registry.cmp_types(*a, *b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        self.parent_ids.cmp(&other.parent_ids)
    }

    /// Render the slots as they appear in candidate and statistics files
    ///
    /// Each slot prints as `form` or `form|tag`; when parent ids are present
    /// every slot carries the `|localIndex|localParentIndex` suffix with a
    /// 1-based local index. Undefined slots print as `*`.
    pub fn render(&self, registry: &TypeRegistry) -> String {
        let mut out = String::new();
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            match slot {
                Some(id) => {
                    out.push_str(&registry.display(*id));
                    if !self.parent_ids.is_empty() {
                        out.push(SEP_FACTORS);
                        out.push_str(&(i + 1).to_string());
                        out.push(SEP_FACTORS);
                        out.push_str(&self.parent_ids[i].to_string());
                    }
                }
                None => out.push('*'),
            }
        }
        out
    }
}
