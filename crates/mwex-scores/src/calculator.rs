//! The score calculator state machine
//!
//! The calculator replays a statistics file candidate by candidate: call
//! [`ScoreCalculator::new_candidate`], feed the contingency table and the
//! contexts, then [`ScoreCalculator::compute`] evaluates the configured
//! measure ids against the current state. All arithmetic is single-precision
//! and logarithms are base 2.
//!
//! Measure ids follow the fixed external catalog: 1–9 probability measures,
//! 17–44 contingency measures, 57–60 immediate-context measures, and 62, 68,
//! 75, 77, 81 broad-context measures. Ids 4, 5, 9 and 20 keep the literal
//! operator precedence of the catalog.

use std::collections::BTreeMap;

use ahash::AHashMap;
use tracing::warn;

/// Context multiset keyed by type string; sorted so accumulation order is
/// stable across runs
pub type ScoreContext = BTreeMap<String, f32>;

/// Per-type statistics loaded from the unigram block
#[derive(Debug, Default)]
struct TypeEntry {
    #[allow(dead_code)]
    freq: f32,
    context: ScoreContext,
}

/// Side selector for the immediate context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSide {
    Left,
    Right,
}

/// Computes association measures from contingency rows and contexts
pub struct ScoreCalculator {
    has_immediate: bool,
    has_broad: bool,
    scores_to_compute: Vec<u32>,
    smoothing: f32,

    types: AHashMap<String, TypeEntry>,
    candidate_types: Vec<String>,
    left: ScoreContext,
    right: ScoreContext,
    broad: ScoreContext,

    table: Vec<f32>,
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    sa: f32,
    sb: f32,
    sc: f32,
    sd: f32,
    n: f32,
    p_xy: f32,
    p_x_star: f32,
    p_star_y: f32,
}

impl ScoreCalculator {
    /// Configure the calculator once for a scoring run
    ///
    /// Requested ids with no definition under the configured contexts are
    /// replaced by a null measure returning 0, with one diagnostic each.
    pub fn new(
        has_immediate: bool,
        has_broad: bool,
        scores_to_compute: Vec<u32>,
        smoothing: f32,
    ) -> Self {
        let calc = Self {
            has_immediate,
            has_broad,
            scores_to_compute,
            smoothing,
            types: AHashMap::new(),
            candidate_types: Vec::new(),
            left: ScoreContext::new(),
            right: ScoreContext::new(),
            broad: ScoreContext::new(),
            table: Vec::new(),
            a: 0.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
            sa: 0.0,
            sb: 0.0,
            sc: 0.0,
            sd: 0.0,
            n: 0.0,
            p_xy: 0.0,
            p_x_star: 0.0,
            p_star_y: 0.0,
        };
        for &id in &calc.scores_to_compute {
            if !calc.is_supported(id) {
                warn!("score {id} not defined, replaced by null function");
            }
        }
        calc
    }

    /// True when the id resolves to a measure under the current contexts
    pub fn is_supported(&self, id: u32) -> bool {
        match id {
            1..=9 | 17..=44 => true,
            57..=60 => self.has_immediate,
            62 | 68 | 75 | 77 | 81 => self.has_broad,
            _ => false,
        }
    }

    /// The configured score ids, in computation order
    pub fn score_ids(&self) -> &[u32] {
        &self.scores_to_compute
    }

    /// Register one type from the unigram block
    pub fn add_type(&mut self, name: &str, freq: i64, context: &[(String, i64)]) {
        let mut entry = TypeEntry {
            freq: freq as f32,
            context: ScoreContext::new(),
        };
        for (word, count) in context {
            entry.context.insert(word.clone(), *count as f32);
        }
        self.types.insert(name.to_string(), entry);
    }

    /// Reset the per-candidate buffers and bind the candidate's types
    ///
    /// Pass the type strings (stripped to `form|tag`) when broad-context
    /// measures are configured; they are resolved against the previously
    /// registered unigram entries. A missing entry is logged and treated as
    /// an empty context.
    pub fn new_candidate(&mut self, types: &[String]) {
        self.broad.clear();
        self.left.clear();
        self.right.clear();
        self.candidate_types = types.to_vec();
        for t in types {
            if !self.types.contains_key(t) {
                warn!("word type '{t}' not found in the loaded unigram table");
            }
        }
    }

    /// Set the contingency row of the current candidate
    ///
    /// Only the first four cells feed the 2x2 state; `N` and the marginal
    /// probabilities derive from them, and the smoothed copies add the
    /// smoothing parameter.
    pub fn add_contingency_table(&mut self, cells: &[i64]) {
        self.table = cells.iter().map(|&v| v as f32).collect();
        self.a = self.table.first().copied().unwrap_or(0.0);
        self.b = self.table.get(1).copied().unwrap_or(0.0);
        self.c = self.table.get(2).copied().unwrap_or(0.0);
        self.d = self.table.get(3).copied().unwrap_or(0.0);
        self.n = self.a + self.b + self.c + self.d;
        self.sa = self.a + self.smoothing;
        self.sb = self.b + self.smoothing;
        self.sc = self.c + self.smoothing;
        self.sd = self.d + self.smoothing;
        if self.sb == self.b || self.sc == self.c {
            warn!("smoothing parameter too low: smoothed value equals raw value");
        }
        self.p_xy = self.a / self.n;
        self.p_x_star = (self.a + self.b) / self.n;
        self.p_star_y = (self.a + self.c) / self.n;
    }

    /// Merge entries into the left or right context of the current candidate
    pub fn add_to_immediate_context(&mut self, side: ContextSide, entries: &[(String, i64)]) {
        let context = match side {
            ContextSide::Left => &mut self.left,
            ContextSide::Right => &mut self.right,
        };
        for (word, count) in entries {
            context.insert(word.clone(), *count as f32);
        }
    }

    /// Merge entries into the broad context of the current candidate
    pub fn add_to_broad_context(&mut self, entries: &[(String, i64)]) {
        for (word, count) in entries {
            self.broad.insert(word.clone(), *count as f32);
        }
    }

    /// The full contingency row of the current candidate (8 or 16 cells for
    /// n > 2; the measures consume the first four)
    pub fn contingency_cells(&self) -> &[f32] {
        &self.table
    }

    /// Evaluate every configured score against the current state
    pub fn compute(&self) -> Vec<f32> {
        self.scores_to_compute
            .iter()
            .map(|&id| self.evaluate(id))
            .collect()
    }

    fn evaluate(&self, id: u32) -> f32 {
        let (a, b, c, d) = (self.a, self.b, self.c, self.d);
        let (sa, sb, sc, sd) = (self.sa, self.sb, self.sc, self.sd);
        match id {
            // Probability measures
            1 => self.p_xy,
            2 => self.p_xy / self.p_x_star,
            3 => self.p_xy / self.p_star_y,
            4 => (self.p_xy / self.p_x_star * self.p_star_y).log2(),
            5 => (self.p_xy.powi(2) / self.p_x_star * self.p_star_y).log2(),
            6 => (self.p_xy.powi(2) / (self.p_x_star * self.p_star_y)).log2() + self.p_xy.log2(),
            7 => 2.0 * a / (sb + sc),
            8 => 2.0 * sa * self.p_xy / (sb + sc),
            9 => (self.p_xy.powi(2) / self.p_x_star * self.p_star_y).log2() * a.log2(),
            // Contingency measures
            17 => a / (a + b + c + d),
            18 => (a + d) / (a + b + c + d),
            19 => (a + d) / (a + 2.0 * b + 2.0 * c + d),
            20 => (a + d) - (b + c) / (a + b + c + d),
            21 => (b + c) / (a + d),
            22 => a / (a + b + c),
            23 => sa / (sb + sc),
            24 => a / (a + 2.0 * (b + c)),
            25 => 0.5 * (a / (a + b) + a / (a + c)),
            26 => 0.25 * (a / (a + b) + a / (a + c) + d / (d + b) + d / (d + c)),
            27 => sa * sd / (sb * sc),
            28 => {
                ((sa * sd).sqrt() - (sb * sc).sqrt()) / ((sa * sd).sqrt() + (sb * sc).sqrt())
            }
            29 => (a * d - b * c) / (a * d + b * c),
            30 => a / ((a + b) * (a + c)).sqrt(),
            31 => a * d / ((a + b) * (a + c) * (d + b) * (d + c)).sqrt(),
            32 => (a * d - b * c) / ((a + b) * (a + c) * (d + b) * (d + c)).sqrt(),
            33 => {
                let s = (a * d).sqrt();
                (a + s) / (a + b + c + s)
            }
            34 => a / (a + b).max(a + c),
            35 => a / (a + b).min(a + c),
            36 => 4.0 * (a * d - b * c) / ((a + d).powi(2) + (b + c).powi(2)),
            37 => 2.0 * a / (2.0 * b * c + a * b + a * c),
            38 => a / ((a + b) * (a + c)).sqrt() - 0.5 * b.max(c),
            39 => {
                (sa * sd / (sb * sc)).log2()
                    - 3.29 * (1.0 / sa + 1.0 / sb + 1.0 / sc + 1.0 / sd).sqrt()
            }
            40 => (1.0 + (b.min(c) + a) / (b.max(c) + a)).log2(),
            41 => (1.0 + sb.min(sc) / (sa + 1.0)).log2().powf(-0.5),
            42 => (1.0 + a / (a + b)).log2() * (1.0 + a / (a + c)).log2(),
            43 => (self.evaluate(40) * self.evaluate(41) * self.evaluate(42)).sqrt(),
            44 => {
                (self.p_xy - self.p_x_star * self.p_star_y)
                    / (self.p_x_star
                        * self.p_star_y
                        * (1.0 - self.p_x_star)
                        * (1.0 - self.p_star_y))
                        .sqrt()
            }
            // Immediate-context measures
            57 if self.has_immediate => context_entropy(&self.left),
            58 if self.has_immediate => context_entropy(&self.right),
            59 if self.has_immediate => context_divergence(&self.left, self.p_x_star),
            60 if self.has_immediate => context_divergence(&self.right, self.p_star_y),
            // Broad-context measures
            62 if self.has_broad => self.reverse_cross_entropy(),
            68 if self.has_broad => self.reverse_confusion_probability(),
            75 if self.has_broad => self.phrase_word_cooccurrence(),
            77 if self.has_broad => self.mean_context_cosine(),
            81 if self.has_broad => self.mean_context_dice(),
            _ => 0.0,
        }
    }

    /// Context of the i-th candidate type, when it was registered
    fn type_context(&self, i: usize) -> Option<&ScoreContext> {
        self.candidate_types
            .get(i)
            .and_then(|t| self.types.get(t))
            .map(|entry| &entry.context)
    }

    fn reverse_cross_entropy(&self) -> f32 {
        let (Some(cx), Some(cy)) = (self.type_context(0), self.type_context(1)) else {
            return 0.0;
        };
        if cx.is_empty() || cy.is_empty() {
            return 0.0;
        }
        let cx_size = cx.len() as f32;
        let cy_size = cy.len() as f32;
        let sum = cy.iter().fold(0.0f32, |acc, (word, &f)| {
            let p = cx.get(word).copied().unwrap_or(0.0);
            acc + (f / cy_size) * ((p + self.smoothing) / cx_size).log2()
        });
        -sum
    }

    fn reverse_confusion_probability(&self) -> f32 {
        let (Some(t1), Some(t2)) = (self.candidate_types.first(), self.candidate_types.get(1))
        else {
            return 0.0;
        };
        let sum = self.broad.iter().fold(0.0f32, |acc, (word, &wf)| {
            let Some(entry) = self.types.get(word) else {
                return acc;
            };
            let context = &entry.context;
            let (Some(&v1), Some(&v2)) = (context.get(t1), context.get(t2)) else {
                return acc;
            };
            let size = context.len() as f32;
            acc + (v1 / size) * (v2 / size) * wf
        });
        sum / self.p_star_y
    }

    fn phrase_word_cooccurrence(&self) -> f32 {
        let occurrences = |i: usize| {
            self.candidate_types
                .get(i)
                .and_then(|t| self.broad.get(t))
                .copied()
                .unwrap_or(0.0)
        };
        0.5 * (occurrences(0) / self.a + occurrences(1) / self.a)
    }

    fn mean_context_cosine(&self) -> f32 {
        let cos_x = self.type_context(0).map_or(0.0, |cx| context_cos_bool(cx, &self.broad));
        let cos_y = self.type_context(1).map_or(0.0, |cy| context_cos_bool(cy, &self.broad));
        0.5 * (cos_x + cos_y)
    }

    fn mean_context_dice(&self) -> f32 {
        let dice_x = self
            .type_context(0)
            .map_or(0.0, |cx| context_dice_tf(cx, &self.broad, self.smoothing));
        let dice_y = self
            .type_context(1)
            .map_or(0.0, |cy| context_dice_tf(cy, &self.broad, self.smoothing));
        0.5 * (dice_x + dice_y)
    }
}

/// Values of matching keys in both contexts, paired
fn intersect_contexts(c1: &ScoreContext, c2: &ScoreContext) -> (Vec<f32>, Vec<f32>) {
    let mut v1 = Vec::new();
    let mut v2 = Vec::new();
    for (word, &f) in c1 {
        if let Some(&g) = c2.get(word) {
            v1.push(f);
            v2.push(g);
        }
    }
    (v1, v2)
}

/// Cosine with boolean weights: every present type counts 1
fn context_cos_bool(c1: &ScoreContext, c2: &ScoreContext) -> f32 {
    let (v1, _) = intersect_contexts(c1, c2);
    let product = v1.len() as f32;
    if product == 0.0 {
        0.0
    } else {
        product / ((c1.len() as f32).sqrt() * (c2.len() as f32).sqrt())
    }
}

/// Dice with term-frequency weights over the intersected vectors
fn context_dice_tf(c1: &ScoreContext, c2: &ScoreContext, smoothing: f32) -> f32 {
    let (v1, v2) = intersect_contexts(c1, c2);
    let product: f32 = v1.iter().zip(&v2).map(|(x, y)| x * y).sum();
    if product == 0.0 {
        0.0
    } else {
        let sq_norm_x: f32 = v1.iter().map(|x| x * x).sum();
        let sq_norm_y: f32 = v2.iter().map(|y| y * y).sum();
        2.0 * product / (sq_norm_x + sq_norm_y + smoothing)
    }
}

/// Entropy of a context distribution; probabilities are counts over the
/// number of distinct context types
fn context_entropy(context: &ScoreContext) -> f32 {
    let size = context.len() as f32;
    context.values().fold(0.0f32, |acc, &f| {
        let p = f / size;
        acc - p * p.log2()
    })
}

/// Entropy seeded with the marginal term `p * log2(p)`
fn context_divergence(context: &ScoreContext, marginal: f32) -> f32 {
    let size = context.len() as f32;
    context
        .values()
        .fold(marginal * marginal.log2(), |acc, &f| {
            let p = f / size;
            acc - p * p.log2()
        })
}
