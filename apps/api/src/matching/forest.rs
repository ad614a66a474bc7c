//! Classifier: bagged CART random forest over sparse TF-IDF features.
//!
//! Trees split on Gini impurity with `sqrt(n_features)` candidate features per
//! node and grow until pure. Each tree draws its bootstrap and feature order
//! from its own RNG, seeded from the master seed, so a fixed seed reproduces
//! the same forest.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::matching::vectorizer::SparseVector;
use crate::matching::MatchError;

/// Adjacent feature values closer than this are treated as equal.
const FEATURE_THRESHOLD: f64 = 1e-7;

/// A trained multi-class model. Held behind `Box<dyn Classifier>` so the
/// serving path can be exercised with a fixed probability table in tests.
pub trait Classifier: Send + Sync {
    fn n_classes(&self) -> usize;

    /// Probability per class id, summing to 1.
    fn predict_proba(&self, features: &SparseVector) -> Vec<f64>;

    /// Most probable class id; ties resolve to the lowest id.
    fn predict(&self, features: &SparseVector) -> usize {
        let probabilities = self.predict_proba(features);
        let mut best = 0;
        for (class, p) in probabilities.iter().enumerate() {
            if *p > probabilities[best] {
                best = class;
            }
        }
        best
    }
}

#[derive(Debug, Clone)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 150,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_classes: usize,
}

impl RandomForest {
    /// Fits `params.n_estimators` trees on `(x[i], y[i])`.
    ///
    /// `n_features` is the dimension of the feature space; `y` values must lie
    /// in `0..n_classes`.
    pub fn fit(
        x: &[SparseVector],
        y: &[usize],
        n_classes: usize,
        n_features: usize,
        params: &ForestParams,
    ) -> Result<Self, MatchError> {
        if x.is_empty() || y.is_empty() {
            return Err(MatchError::EmptyCorpus);
        }
        if params.n_estimators == 0 {
            return Err(MatchError::NoEstimators);
        }
        debug_assert_eq!(x.len(), y.len());
        debug_assert!(y.iter().all(|&c| c < n_classes));

        let max_features = ((n_features as f64).sqrt().floor() as usize).max(1);
        let mut master = StdRng::seed_from_u64(params.seed);

        let trees = (0..params.n_estimators)
            .map(|_| {
                let mut rng = StdRng::seed_from_u64(master.gen());
                let weights = bootstrap_weights(x.len(), &mut rng);
                TreeBuilder {
                    x,
                    y,
                    weights: &weights,
                    n_classes,
                    max_features,
                    rng,
                }
                .build()
            })
            .collect();

        Ok(Self { trees, n_classes })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn total_nodes(&self) -> usize {
        self.trees.iter().map(|t| t.nodes.len()).sum()
    }
}

impl Classifier for RandomForest {
    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, features: &SparseVector) -> Vec<f64> {
        let mut probabilities = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (p, leaf) in probabilities.iter_mut().zip(tree.leaf(features)) {
                *p += leaf;
            }
        }
        let n_trees = self.trees.len() as f64;
        probabilities.iter_mut().for_each(|p| *p /= n_trees);
        probabilities
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Decision tree
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        distribution: Vec<f64>,
    },
}

#[derive(Debug, Clone)]
struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn leaf(&self, features: &SparseVector) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features.get(*feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Node::Leaf { distribution } => return distribution,
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
}

struct TreeBuilder<'a> {
    x: &'a [SparseVector],
    y: &'a [usize],
    /// Bootstrap multiplicity per sample; zero means out-of-bag.
    weights: &'a [f64],
    n_classes: usize,
    max_features: usize,
    rng: StdRng,
}

impl TreeBuilder<'_> {
    fn build(mut self) -> DecisionTree {
        let root: Vec<usize> = (0..self.x.len()).filter(|&i| self.weights[i] > 0.0).collect();
        let mut nodes = vec![Node::Leaf {
            distribution: Vec::new(),
        }];
        // Explicit stack: sparse data can produce deep, chain-like trees.
        let mut pending = vec![(0usize, root)];

        while let Some((slot, samples)) = pending.pop() {
            let class_weights = self.class_weights(&samples);
            let split = if samples.len() < 2 || is_pure(&class_weights) {
                None
            } else {
                self.best_split(&samples, &class_weights)
            };

            match split {
                Some(Split { feature, threshold }) => {
                    let (left, right): (Vec<usize>, Vec<usize>) = samples
                        .into_iter()
                        .partition(|&s| self.x[s].get(feature) <= threshold);
                    let left_slot = nodes.len();
                    nodes.push(Node::Leaf {
                        distribution: Vec::new(),
                    });
                    nodes.push(Node::Leaf {
                        distribution: Vec::new(),
                    });
                    nodes[slot] = Node::Split {
                        feature,
                        threshold,
                        left: left_slot,
                        right: left_slot + 1,
                    };
                    pending.push((left_slot + 1, right));
                    pending.push((left_slot, left));
                }
                None => {
                    nodes[slot] = Node::Leaf {
                        distribution: into_distribution(class_weights),
                    };
                }
            }
        }

        DecisionTree { nodes }
    }

    fn class_weights(&self, samples: &[usize]) -> Vec<f64> {
        let mut counts = vec![0.0; self.n_classes];
        for &s in samples {
            counts[self.y[s]] += self.weights[s];
        }
        counts
    }

    /// Lowest weighted child impurity over a random feature order. Keeps
    /// scanning past `max_features` until at least one valid split exists.
    fn best_split(&mut self, samples: &[usize], totals: &[f64]) -> Option<Split> {
        // Features that are zero for every sample in the node are constant.
        let mut candidates: Vec<usize> = samples
            .iter()
            .flat_map(|&s| self.x[s].entries().iter().map(|(i, _)| *i))
            .collect();
        candidates.sort_unstable();
        candidates.dedup();
        candidates.shuffle(&mut self.rng);

        let total_weight: f64 = totals.iter().sum();
        let mut best: Option<(f64, Split)> = None;
        let mut visited = 0;
        let mut column: Vec<(f64, usize)> = Vec::with_capacity(samples.len());
        let mut left = vec![0.0; self.n_classes];

        for feature in candidates {
            if visited >= self.max_features && best.is_some() {
                break;
            }

            column.clear();
            column.extend(samples.iter().map(|&s| (self.x[s].get(feature), s)));
            column.sort_by(|a, b| a.0.total_cmp(&b.0));
            if column[column.len() - 1].0 <= column[0].0 + FEATURE_THRESHOLD {
                continue;
            }
            visited += 1;

            left.iter_mut().for_each(|c| *c = 0.0);
            let mut left_weight = 0.0;
            for i in 0..column.len() - 1 {
                let (value, s) = column[i];
                left[self.y[s]] += self.weights[s];
                left_weight += self.weights[s];

                let next = column[i + 1].0;
                if next <= value + FEATURE_THRESHOLD {
                    continue;
                }

                let right_weight = total_weight - left_weight;
                let left_gini = gini(left.iter().copied(), left_weight);
                let right_gini = gini(
                    totals.iter().zip(&left).map(|(t, l)| t - l),
                    right_weight,
                );
                let score = (left_weight * left_gini + right_weight * right_gini) / total_weight;

                if best.as_ref().map_or(true, |(b, _)| score < *b) {
                    let mut threshold = (value + next) / 2.0;
                    if threshold >= next {
                        threshold = value;
                    }
                    best = Some((score, Split { feature, threshold }));
                }
            }
        }

        best.map(|(_, split)| split)
    }
}

fn bootstrap_weights(n: usize, rng: &mut StdRng) -> Vec<f64> {
    let mut weights = vec![0.0; n];
    for _ in 0..n {
        weights[rng.gen_range(0..n)] += 1.0;
    }
    weights
}

fn gini(counts: impl Iterator<Item = f64>, weight: f64) -> f64 {
    if weight <= 0.0 {
        return 0.0;
    }
    1.0 - counts.map(|c| (c / weight).powi(2)).sum::<f64>()
}

fn is_pure(class_weights: &[f64]) -> bool {
    class_weights.iter().filter(|&&w| w > 0.0).count() <= 1
}

fn into_distribution(mut class_weights: Vec<f64>) -> Vec<f64> {
    let total: f64 = class_weights.iter().sum();
    if total > 0.0 {
        class_weights.iter_mut().for_each(|w| *w /= total);
    }
    class_weights
}
