//! Statistics extraction over a loaded candidate list
//!
//! The caller first loads every candidate of interest with zeroed counters;
//! loading interns the full lattice of subcandidates (slots nulled out
//! recursively) that provides the marginal cells of the contingency table.
//! A second corpus pass then replays enumeration: occurrences of loaded
//! candidates bump their counter and every linked subcandidate, optionally
//! collecting immediate (left/right) and broad context multisets, plus a
//! per-type unigram table. `finish` removes the candidate's own types from
//! its broad context before the table is written.

use std::io::Write;
use std::path::Path;

use ahash::AHashMap;
use regex::Regex;
use tracing::debug;

use mwex_core::{CandidateKey, PipelineError, PipelineResult, TypeId, TypeRegistry};
use mwex_io::open_output;

use crate::engine::{AdjacencyMode, Emitted, Enumerator, ExtractorConfig};
use crate::sentence::SentenceBuffer;
use crate::store::compile_anchored;

type Context = AHashMap<TypeId, i64>;

#[derive(Debug)]
struct ContextCandidate {
    key: CandidateKey,
    counter: u64,
    left: Context,
    right: Context,
    broad: Context,
    /// Subcandidate arena ids in lexicographic order
    subs: Vec<usize>,
}

#[derive(Debug)]
struct Subcandidate {
    key: CandidateKey,
    counter: u64,
}

#[derive(Debug, Default)]
struct Unigram {
    counter: u64,
    broad: Context,
}

/// Extractor accumulating contingency counts and contexts
pub struct StatisticExtractor {
    registry: TypeRegistry,
    buffer: SentenceBuffer,
    enumerator: Enumerator,
    immediate_context: bool,
    broad_context: bool,
    tag_filter: Option<Regex>,
    candidates: AHashMap<CandidateKey, usize>,
    cand_arena: Vec<ContextCandidate>,
    /// Subcandidate dedup index, one map per order (order k at index k-1)
    sub_index: Vec<AHashMap<CandidateKey, usize>>,
    sub_arena: Vec<Subcandidate>,
    unigrams: AHashMap<TypeId, Unigram>,
    /// Total candidate occurrences observed across the corpus
    total: u64,
}

impl StatisticExtractor {
    /// Build a statistic extractor
    ///
    /// `tag_filter` restricts which types may enter any context, matched in
    /// full against the type's tag.
    pub fn new(
        config: ExtractorConfig,
        immediate_context: bool,
        broad_context: bool,
        tag_filter: Option<&str>,
    ) -> PipelineResult<Self> {
        config.validate()?;
        let tag_filter = tag_filter.map(compile_anchored).transpose()?;
        let n = config.n;
        Ok(Self {
            registry: TypeRegistry::new(),
            buffer: SentenceBuffer::new(),
            enumerator: Enumerator::new(config),
            immediate_context,
            broad_context,
            tag_filter,
            candidates: AHashMap::new(),
            cand_arena: Vec::new(),
            sub_index: vec![AHashMap::new(); n - 1],
            sub_arena: Vec::new(),
            unigrams: AHashMap::new(),
            total: 0,
        })
    }

    /// Load one candidate from a previously extracted list
    ///
    /// The counter starts at zero so the corpus pass counts real
    /// occurrences; every subcandidate is interned and linked.
    pub fn add_candidate(
        &mut self,
        types: &[(String, String)],
        parent_ids: &[u32],
    ) -> PipelineResult<()> {
        let n = self.enumerator.config().n;
        if types.len() != n {
            return Err(PipelineError::parse(
                "candidate list",
                format!("candidate has {} types, expected {n}", types.len()),
            ));
        }
        let type_ids: Vec<TypeId> = types
            .iter()
            .map(|(form, tag)| self.registry.intern(form, tag))
            .collect();
        let key = CandidateKey::concrete(type_ids, parent_ids.to_vec());
        if self.candidates.contains_key(&key) {
            debug!("candidate '{}' listed twice", key.render(&self.registry));
            return Ok(());
        }

        let idx = self.cand_arena.len();
        let slots = key.slots.clone();
        self.cand_arena.push(ContextCandidate {
            key: key.clone(),
            counter: 0,
            left: Context::new(),
            right: Context::new(),
            broad: Context::new(),
            subs: Vec::new(),
        });
        self.candidates.insert(key, idx);

        self.add_subcandidates(idx, slots, 0);
        let mut subs = std::mem::take(&mut self.cand_arena[idx].subs);
        subs.sort_by(|&x, &y| {
            self.sub_arena[x]
                .key
                .cmp_in(&self.sub_arena[y].key, &self.registry)
        });
        subs.dedup();
        self.cand_arena[idx].subs = subs;
        Ok(())
    }

    /// Null out each defined slot in turn, interning the marginal candidate
    /// and linking it to the concrete candidate
    fn add_subcandidates(&mut self, cand_idx: usize, slots: Vec<Option<TypeId>>, nulled: usize) {
        let n = slots.len();
        for i in 0..n {
            if slots[i].is_none() {
                continue;
            }
            let mut narrowed = slots.clone();
            narrowed[i] = None;
            let key = CandidateKey::from_slots(narrowed.clone(), Vec::new());
            let sub_id = match self.sub_index[nulled].get(&key) {
                Some(&id) => id,
                None => {
                    let id = self.sub_arena.len();
                    self.sub_arena.push(Subcandidate {
                        key: key.clone(),
                        counter: 0,
                    });
                    self.sub_index[nulled].insert(key, id);
                    id
                }
            };
            self.cand_arena[cand_idx].subs.push(sub_id);
            if nulled + 1 < n - 1 {
                self.add_subcandidates(cand_idx, narrowed, nulled + 1);
            }
        }
    }

    /// Append one token of the current sentence
    pub fn add_token(&mut self, raw: &str) -> PipelineResult<()> {
        let config = self.enumerator.config();
        let dependency = config.mode == AdjacencyMode::Dependency;
        let n_factors = config.n_factors;
        self.buffer
            .add_token(raw, n_factors, dependency, &mut self.registry)
    }

    /// Replay enumeration over the accumulated sentence and clear it
    pub fn finish_sentence(&mut self) {
        let emitted = self.enumerator.enumerate(self.buffer.tokens());

        let sentence_types: Vec<TypeId> = self
            .buffer
            .tokens()
            .iter()
            .skip(1)
            .filter_map(|t| t.type_id)
            .collect();
        let broad_addable: Vec<TypeId> = sentence_types
            .iter()
            .copied()
            .filter(|t| self.can_add_to_context(*t))
            .collect();

        for e in emitted {
            self.record_occurrence(e, &broad_addable);
        }

        if self.broad_context {
            // Unigram contexts get their own pass so a type appearing inside
            // many enumerated candidates is still counted once per sentence
            // position.
            for &t in &sentence_types {
                let unigram = self.unigrams.entry(t).or_default();
                unigram.counter += 1;
                for &other in &broad_addable {
                    if other != t {
                        *unigram.broad.entry(other).or_insert(0) += 1;
                    }
                }
            }
        }

        self.buffer.clear();
    }

    /// Count one enumerated occurrence if its candidate was loaded
    ///
    /// Unknown candidates were filtered out upstream and are ignored.
    fn record_occurrence(&mut self, e: Emitted, broad_addable: &[TypeId]) {
        let key = CandidateKey::concrete(e.types, e.parent_ids);
        let Some(&idx) = self.candidates.get(&key) else {
            return;
        };

        if self.immediate_context {
            let prev = e.prev.filter(|t| self.can_add_to_context(*t));
            let next = e.next.filter(|t| self.can_add_to_context(*t));
            let cand = &mut self.cand_arena[idx];
            if let Some(p) = prev {
                *cand.left.entry(p).or_insert(0) += 1;
            }
            if let Some(nx) = next {
                *cand.right.entry(nx).or_insert(0) += 1;
            }
        }

        if self.broad_context {
            let cand = &mut self.cand_arena[idx];
            for &t in broad_addable {
                *cand.broad.entry(t).or_insert(0) += 1;
            }
        }

        self.cand_arena[idx].counter += 1;
        let subs = self.cand_arena[idx].subs.clone();
        for s in subs {
            self.sub_arena[s].counter += 1;
        }
        self.total += 1;
    }

    fn can_add_to_context(&self, t: TypeId) -> bool {
        match &self.tag_filter {
            None => true,
            Some(re) => re.is_match(&self.registry.get(t).tag),
        }
    }

    /// Correct the broad contexts after the corpus pass
    ///
    /// Every occurrence added the candidate's own types to its broad
    /// context, once per slot; subtract them back out, dropping entries that
    /// return to zero. Must be called before writing.
    pub fn finish(&mut self) {
        for cand in &mut self.cand_arena {
            let counter = cand.counter as i64;
            for slot in &cand.key.slots {
                let Some(t) = slot else { continue };
                let emptied = match cand.broad.get_mut(t) {
                    Some(entry) => {
                        *entry -= counter;
                        *entry == 0
                    }
                    None => false,
                };
                if emptied {
                    cand.broad.remove(t);
                }
            }
        }
    }

    /// Total candidate occurrences observed (`N`)
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Interning registry backing this extraction
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Counter of a loaded concrete candidate
    pub fn candidate_counter(&self, key: &CandidateKey) -> Option<u64> {
        self.candidates
            .get(key)
            .map(|&idx| self.cand_arena[idx].counter)
    }

    /// Counter of an interned subcandidate
    pub fn subcandidate_counter(&self, key: &CandidateKey) -> Option<u64> {
        let order = key.order as usize;
        if order == 0 || order > self.sub_index.len() {
            return None;
        }
        self.sub_index[order - 1]
            .get(key)
            .map(|&idx| self.sub_arena[idx].counter)
    }

    /// Contingency row of a loaded candidate: the concrete count, one
    /// marginal cell per subcandidate in stored order, and the residual
    pub fn contingency(&self, key: &CandidateKey) -> Option<Vec<i64>> {
        self.candidates
            .get(key)
            .map(|&idx| self.contingency_row(&self.cand_arena[idx]))
    }

    /// Broad-context count of `of` in the candidate's context
    pub fn broad_count(&self, key: &CandidateKey, of: TypeId) -> Option<i64> {
        self.candidates
            .get(key)
            .and_then(|&idx| self.cand_arena[idx].broad.get(&of).copied())
    }

    fn contingency_row(&self, cand: &ContextCandidate) -> Vec<i64> {
        let a = cand.counter as i64;
        let mut cells = vec![a];
        let mut sum = a;
        for &s in &cand.subs {
            let marginal = self.sub_arena[s].counter as i64 - a;
            cells.push(marginal);
            sum += marginal;
        }
        cells.push(self.total as i64 - sum);
        cells
    }

    /// Write the statistics file: optional unigram block, then one line per
    /// candidate in lexicographic order
    pub fn write_to(&self, writer: &mut dyn Write) -> PipelineResult<()> {
        let wio = |e: std::io::Error| PipelineError::io("write statistics", e);
        let reg = &self.registry;

        if self.broad_context {
            let mut unigrams: Vec<(&TypeId, &Unigram)> = self.unigrams.iter().collect();
            unigrams.sort_by(|a, b| reg.cmp_types(*a.0, *b.0));
            for (t, unigram) in unigrams {
                writeln!(
                    writer,
                    "{}\t{}\t{}",
                    reg.display(*t),
                    unigram.counter,
                    render_context(&unigram.broad, reg)
                )
                .map_err(wio)?;
            }
        }

        let mut ordered: Vec<&ContextCandidate> = self.cand_arena.iter().collect();
        ordered.sort_by(|a, b| a.key.cmp_in(&b.key, reg));
        for cand in ordered {
            let cells: Vec<String> = self
                .contingency_row(cand)
                .iter()
                .map(i64::to_string)
                .collect();
            write!(writer, "{}\t{}", cand.key.render(reg), cells.join(" ")).map_err(wio)?;
            if self.immediate_context {
                write!(writer, "\t{}", render_context(&cand.left, reg)).map_err(wio)?;
                write!(writer, "\t{}", render_context(&cand.right, reg)).map_err(wio)?;
            }
            if self.broad_context {
                write!(writer, "\t{}", render_context(&cand.broad, reg)).map_err(wio)?;
            }
            writeln!(writer).map_err(wio)?;
        }
        Ok(())
    }

    /// Write the statistics to a path, gzip-compressed when it ends in `.gz`
    pub fn write_to_file(&self, path: &Path) -> PipelineResult<()> {
        let mut writer = open_output(path)?;
        self.write_to(&mut writer)?;
        writer
            .flush()
            .map_err(|e| PipelineError::io(format!("flush {}", path.display()), e))
    }
}

/// Render a context multiset as sorted `type:count` entries
fn render_context(context: &Context, registry: &TypeRegistry) -> String {
    let mut entries: Vec<(TypeId, i64)> = context.iter().map(|(t, c)| (*t, *c)).collect();
    entries.sort_by(|a, b| registry.cmp_types(a.0, b.0));
    entries
        .iter()
        .map(|(t, c)| format!("{}:{}", registry.display(*t), c))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface_config(n: usize) -> ExtractorConfig {
        ExtractorConfig {
            n,
            n_factors: 1,
            surf_min: (n - 1) as i64,
            surf_max: (n - 1) as i64,
            mode: AdjacencyMode::Surface,
        }
    }

    fn pair(a: &str, b: &str) -> Vec<(String, String)> {
        vec![(a.into(), String::new()), (b.into(), String::new())]
    }

    fn key_of(se: &StatisticExtractor, types: &[&str]) -> CandidateKey {
        let ids: Vec<TypeId> = types
            .iter()
            .map(|t| se.registry().lookup(t, "").expect("type not interned"))
            .collect();
        CandidateKey::concrete(ids, vec![])
    }

    fn run_sentences(se: &mut StatisticExtractor, sentences: &[&str]) {
        for s in sentences {
            for tok in s.split(' ') {
                se.add_token(tok).unwrap();
            }
            se.finish_sentence();
        }
    }

    #[test]
    fn test_subcandidate_counts_and_contingency() {
        let mut se = StatisticExtractor::new(surface_config(2), false, false, None).unwrap();
        se.add_candidate(&pair("a", "b"), &[]).unwrap();
        se.add_candidate(&pair("a", "c"), &[]).unwrap();

        let corpus: Vec<&str> = std::iter::repeat("a b")
            .take(3)
            .chain(std::iter::repeat("a c").take(5))
            .collect();
        run_sentences(&mut se, &corpus);
        se.finish();

        assert_eq!(se.total(), 8);
        let ab = key_of(&se, &["a", "b"]);
        let ac = key_of(&se, &["a", "c"]);
        assert_eq!(se.candidate_counter(&ab), Some(3));
        assert_eq!(se.candidate_counter(&ac), Some(5));

        let a_star = CandidateKey::from_slots(vec![ab.slots[0], None], vec![]);
        let star_b = CandidateKey::from_slots(vec![None, ab.slots[1]], vec![]);
        let star_c = CandidateKey::from_slots(vec![None, ac.slots[1]], vec![]);
        assert_eq!(se.subcandidate_counter(&a_star), Some(8));
        assert_eq!(se.subcandidate_counter(&star_b), Some(3));
        assert_eq!(se.subcandidate_counter(&star_c), Some(5));

        // a, then sub(a,*)-a, sub(*,b)-a, residual
        assert_eq!(se.contingency(&ab), Some(vec![3, 5, 0, 0]));
        assert_eq!(se.contingency(&ac), Some(vec![5, 3, 0, 0]));
    }

    #[test]
    fn test_contingency_row_sums_to_total() {
        let mut se = StatisticExtractor::new(surface_config(2), false, false, None).unwrap();
        se.add_candidate(&pair("a", "b"), &[]).unwrap();
        run_sentences(&mut se, &["a b", "a c", "x b", "a b"]);
        se.finish();

        let ab = key_of(&se, &["a", "b"]);
        let row = se.contingency(&ab).unwrap();
        assert_eq!(row.iter().sum::<i64>(), se.total() as i64);
    }

    #[test]
    fn test_broad_context_self_subtraction() {
        let mut se = StatisticExtractor::new(surface_config(2), false, true, None).unwrap();
        se.add_candidate(&pair("a", "b"), &[]).unwrap();
        run_sentences(&mut se, &["a b c"]);

        let ab = key_of(&se, &["a", "b"]);
        // Before the correction, the candidate's own types sit in its broad
        // context once per occurrence.
        assert_eq!(se.broad_count(&ab, ab.slots[0].unwrap()), Some(1));
        se.finish();
        assert_eq!(se.broad_count(&ab, ab.slots[0].unwrap()), None);
        assert_eq!(se.broad_count(&ab, ab.slots[1].unwrap()), None);
        let c = se.registry().lookup("c", "").unwrap();
        assert_eq!(se.broad_count(&ab, c), Some(1));
    }

    #[test]
    fn test_unigram_pass_excludes_self_types() {
        let mut se = StatisticExtractor::new(surface_config(2), false, true, None).unwrap();
        se.add_candidate(&pair("a", "b"), &[]).unwrap();
        run_sentences(&mut se, &["a b a"]);
        se.finish();

        let a = se.registry().lookup("a", "").unwrap();
        let unigram = se.unigrams.get(&a).unwrap();
        // Two positions of "a", each adding the other types of the sentence
        assert_eq!(unigram.counter, 2);
        // "a" never enters its own broad context, even from the other position
        assert!(!unigram.broad.contains_key(&a));
    }

    #[test]
    fn test_unloaded_candidates_are_ignored() {
        let mut se = StatisticExtractor::new(surface_config(2), false, false, None).unwrap();
        se.add_candidate(&pair("a", "b"), &[]).unwrap();
        run_sentences(&mut se, &["x y", "a b"]);
        se.finish();
        // (x,y) was never loaded: it contributes nothing, not even to N
        assert_eq!(se.total(), 1);
    }

    #[test]
    fn test_immediate_context_with_tag_filter() {
        let config = ExtractorConfig {
            n: 2,
            n_factors: 3,
            surf_min: 1,
            surf_max: 1,
            mode: AdjacencyMode::Surface,
        };
        let mut se = StatisticExtractor::new(config, true, false, Some("N.*")).unwrap();
        se.add_candidate(
            &[("b".to_string(), "NN".to_string()), ("c".to_string(), "VB".to_string())],
            &[],
        )
        .unwrap();
        run_sentences(&mut se, &["a|a|NN b|b|NN c|c|VB d|d|DT"]);
        se.finish();

        let mut out = Vec::new();
        se.write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        // Left neighbor a|NN passes the tag filter, right neighbor d|DT does not
        assert_eq!(text, "b|NN c|VB\t1 0 0 0\ta|NN:1\t\n");
    }

    #[test]
    fn test_trigram_subcandidate_lattice() {
        let mut se = StatisticExtractor::new(surface_config(3), false, false, None).unwrap();
        se.add_candidate(
            &[
                ("a".to_string(), String::new()),
                ("b".to_string(), String::new()),
                ("c".to_string(), String::new()),
            ],
            &[],
        )
        .unwrap();
        run_sentences(&mut se, &["a b c", "a b c"]);
        se.finish();

        let abc = key_of(&se, &["a", "b", "c"]);
        let row = se.contingency(&abc).unwrap();
        // 8 cells: concrete, six marginals, residual
        assert_eq!(row.len(), 8);
        assert_eq!(row[0], 2);
        assert_eq!(row.iter().sum::<i64>(), se.total() as i64);
    }
}
