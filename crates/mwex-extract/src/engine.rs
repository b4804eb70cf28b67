//! Candidate enumeration over a sentence
//!
//! Two adjacency models share one postprocessing path. Surface enumeration
//! walks the sentence as a left-to-right chain and packs tokens whose span
//! stays inside `[surf_min, surf_max]`. Dependency enumeration collects
//! every set of `n` tree nodes forming a connected subtree of the sentence's
//! dependency tree, visiting each subtree exactly once through its topmost
//! node.

use ahash::AHashMap;
use tracing::warn;

use mwex_core::{NodeId, PipelineError, PipelineResult, Token, Tree, TypeId};

/// Which adjacency model drives the enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjacencyMode {
    /// Linear token order, bounded by the surface distance range
    Surface,
    /// Connected subtrees of the dependency tree
    Dependency,
}

/// Parameters shared by both extractor variants
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Candidate size (2..=4)
    pub n: usize,
    /// Factor count of the corpus tokens
    pub n_factors: usize,
    /// Minimal distance between the two furthest tokens of a candidate
    pub surf_min: i64,
    /// Maximal distance between the two furthest tokens of a candidate
    pub surf_max: i64,
    /// Adjacency model
    pub mode: AdjacencyMode,
}

impl ExtractorConfig {
    /// Check the structural constraints before any work starts
    pub fn validate(&self) -> PipelineResult<()> {
        if !(2..=4).contains(&self.n) {
            return Err(PipelineError::config(format!(
                "n must be between 2 and 4, got {}",
                self.n
            )));
        }
        if self.surf_min > self.surf_max {
            return Err(PipelineError::config(format!(
                "empty distance range {}-{}",
                self.surf_min, self.surf_max
            )));
        }
        if self.mode == AdjacencyMode::Dependency && self.n_factors <= mwex_core::shared::PARENT_ID
        {
            return Err(PipelineError::config(
                "dependency extraction requires a corpus with syntactic annotations",
            ));
        }
        Ok(())
    }
}

/// One enumerated candidate occurrence, ready for a store hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitted {
    /// Word types in sentence order
    pub types: Vec<TypeId>,
    /// Remapped local parent indices (dependency mode only)
    pub parent_ids: Vec<u32>,
    /// Type of the token immediately left of the occurrence
    pub prev: Option<TypeId>,
    /// Type of the token immediately right of the occurrence
    pub next: Option<TypeId>,
}

/// Memoized integer compositions: ways to write `total` as an ordered sum of
/// `parts` nonnegative integers
#[derive(Debug, Default)]
pub struct CompositionCache {
    cache: AHashMap<(u32, usize), Vec<Vec<u32>>>,
}

impl CompositionCache {
    fn compositions(&mut self, total: u32, parts: usize) -> Vec<Vec<u32>> {
        if let Some(found) = self.cache.get(&(total, parts)) {
            return found.clone();
        }
        let built = Self::build(total, parts);
        self.cache.insert((total, parts), built.clone());
        built
    }

    fn build(total: u32, parts: usize) -> Vec<Vec<u32>> {
        if parts == 0 {
            return if total == 0 { vec![Vec::new()] } else { Vec::new() };
        }
        let mut out = Vec::new();
        for first in 0..=total {
            for rest in Self::build(total - first, parts - 1) {
                let mut composition = Vec::with_capacity(parts);
                composition.push(first);
                composition.extend(rest);
                out.push(composition);
            }
        }
        out
    }
}

/// Enumerates candidate occurrences from an assembled sentence
#[derive(Debug)]
pub struct Enumerator {
    config: ExtractorConfig,
    compositions: CompositionCache,
}

impl Enumerator {
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            config,
            compositions: CompositionCache::default(),
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Enumerate every candidate occurrence of the sentence
    ///
    /// `sentence` includes the sentinel root at index 0. Occurrences whose
    /// surface span falls outside the configured distance range are dropped
    /// here, in the shared postprocessing step.
    pub fn enumerate(&mut self, sentence: &[Token]) -> Vec<Emitted> {
        let real = sentence.len().saturating_sub(1);
        if real == 0 {
            return Vec::new();
        }
        let mut out = Vec::new();
        match self.config.mode {
            AdjacencyMode::Surface => {
                // The sentence must be long enough to hold one candidate.
                if real < self.config.n {
                    return Vec::new();
                }
                let mut sets = Vec::new();
                let mut prefix = Vec::new();
                scan_surface_chain(
                    sentence.len(),
                    1,
                    self.config.n as u32,
                    0,
                    self.config.surf_min,
                    self.config.surf_max,
                    &mut prefix,
                    &mut sets,
                );
                for set in sets {
                    if let Some(e) = self.postprocess(sentence, set, false) {
                        out.push(e);
                    }
                }
            }
            AdjacencyMode::Dependency => {
                let Some(tree) = build_dependency_tree(sentence) else {
                    return Vec::new();
                };
                for root in 1..sentence.len() {
                    let sets = scan_dependency_tree(
                        &tree,
                        &mut self.compositions,
                        self.config.n as u32,
                        NodeId::from_index(root),
                    );
                    for set in sets {
                        if let Some(e) = self.postprocess(sentence, set, true) {
                            out.push(e);
                        }
                    }
                }
            }
        }
        out
    }

    /// Shared emit path: order, span check, remap, neighbor lookup
    fn postprocess(
        &self,
        sentence: &[Token],
        mut token_ids: Vec<usize>,
        dependency: bool,
    ) -> Option<Emitted> {
        if dependency {
            token_ids.sort_unstable();
        }
        let first = *token_ids.first()?;
        let last = *token_ids.last()?;
        let distance = (last - first) as i64;
        if distance < self.config.surf_min || distance > self.config.surf_max {
            return None;
        }

        let mut types = Vec::with_capacity(token_ids.len());
        for &t in &token_ids {
            types.push(sentence[t].type_id?);
        }

        let parent_ids = if dependency {
            let mut remap: AHashMap<usize, u32> = AHashMap::new();
            remap.insert(0, 0);
            for (local, &t) in token_ids.iter().enumerate() {
                remap.insert(sentence[t].id, (local + 1) as u32);
            }
            token_ids
                .iter()
                .map(|&t| remap.get(&sentence[t].parent_id).copied().unwrap_or(0))
                .collect()
        } else {
            Vec::new()
        };

        let prev = if first > 1 {
            sentence[first - 1].type_id
        } else {
            None
        };
        let next = if last + 1 < sentence.len() {
            sentence[last + 1].type_id
        } else {
            None
        };

        Some(Emitted {
            types,
            parent_ids,
            prev,
            next,
        })
    }
}

/// Build the dependency tree of a sentence, nodes indexed by token id
///
/// Returns `None` when the sentence's token ids do not form the contiguous
/// 1-based sequence the emit path relies on; such sentences are skipped.
fn build_dependency_tree(sentence: &[Token]) -> Option<Tree<usize>> {
    for (position, token) in sentence.iter().enumerate().skip(1) {
        if token.id != position {
            warn!(
                "token id {} at position {position} breaks the contiguous id sequence, \
                 skipping sentence",
                token.id
            );
            return None;
        }
    }
    let mut tree = Tree::new();
    let nodes: Vec<NodeId> = (0..sentence.len()).map(|i| tree.add_node(i)).collect();
    for (i, token) in sentence.iter().enumerate().skip(1) {
        let mut parent = token.parent_id;
        if parent >= sentence.len() || parent == i {
            warn!("token {i} has parent id {parent} outside the sentence, attaching to root");
            parent = 0;
        }
        tree.link(nodes[i], nodes[parent]);
    }
    Some(tree)
}

/// Every set of exactly `order` node ids inducing a connected subtree whose
/// topmost node is `node`
fn scan_dependency_tree(
    tree: &Tree<usize>,
    compositions: &mut CompositionCache,
    order: u32,
    node: NodeId,
) -> Vec<Vec<usize>> {
    let element = *tree.element(node);
    if order == 1 {
        return vec![vec![element]];
    }
    let children: Vec<NodeId> = tree.children(node).to_vec();
    if children.is_empty() {
        return Vec::new();
    }
    let mut out = Vec::new();
    for composition in compositions.compositions(order - 1, children.len()) {
        let mut partial: Vec<Vec<usize>> = vec![vec![element]];
        let mut feasible = true;
        for (&child, &wanted) in children.iter().zip(composition.iter()) {
            if wanted == 0 {
                continue;
            }
            let sub = scan_dependency_tree(tree, compositions, wanted, child);
            if sub.is_empty() {
                feasible = false;
                break;
            }
            partial = cross_concat(&partial, &sub);
        }
        if feasible {
            out.append(&mut partial);
        }
    }
    out
}

fn cross_concat(prefix: &[Vec<usize>], addition: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let mut out = Vec::with_capacity(prefix.len() * addition.len());
    for p in prefix {
        for a in addition {
            let mut combined = p.clone();
            combined.extend_from_slice(a);
            out.push(combined);
        }
    }
    out
}

/// Chain walk for surface enumeration
///
/// `depth` is 0 until the first token is included and from then on counts
/// the distance from that first token. A singleton completes a candidate
/// when the remaining order is 1 and the span has reached `surf_min`; the
/// walk never steps past `surf_max`.
#[allow(clippy::too_many_arguments)]
fn scan_surface_chain(
    len: usize,
    cur: usize,
    order: u32,
    depth: i64,
    surf_min: i64,
    surf_max: i64,
    prefix: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    if order == 1 {
        if depth >= surf_min {
            let mut complete = prefix.clone();
            complete.push(cur);
            out.push(complete);
        }
    } else if cur + 1 < len && depth < surf_max {
        // Include this node as the next token of the candidate.
        prefix.push(cur);
        scan_surface_chain(
            len,
            cur + 1,
            order - 1,
            depth + 1,
            surf_min,
            surf_max,
            prefix,
            out,
        );
        prefix.pop();
    }
    // Skip this node; depth only advances once a first token was chosen.
    if cur + 1 < len && (depth == 0 || depth < surf_max) {
        let next_depth = if depth == 0 { 0 } else { depth + 1 };
        scan_surface_chain(len, cur + 1, order, next_depth, surf_min, surf_max, prefix, out);
    }
}
