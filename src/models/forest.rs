//! Random forest classifier trained and served in-process.
//!
//! CART trees with Gini splitting, bootstrap sampling and feature
//! subsampling. Leaves store the class distribution of the training rows
//! that reached them; `predict_proba` averages those distributions across
//! the ensemble, so its output matches the shape the inference path
//! expects: one probability per class observed during training.

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised when querying a fitted model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("feature count mismatch: model expects {expected} features, got {got}")]
    FeatureCount { expected: usize, got: usize },
    #[error("model has no trees")]
    EmptyEnsemble,
}

/// Training hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainParams {
    /// Number of trees in the ensemble
    pub n_trees: usize,
    /// Maximum depth per tree
    pub max_depth: usize,
    /// Minimum rows required to attempt a split
    pub min_samples_split: usize,
    /// RNG seed for bootstrap and feature subsampling
    pub seed: u64,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 12,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Per-class fraction of training rows that reached this leaf
        distribution: Vec<f64>,
    },
}

/// A single decision tree. Nodes are stored in a flat arena; index 0 is
/// the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn leaf_distribution(&self, features: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }
}

/// A fitted fraud classifier: the tree ensemble plus the metadata needed
/// to interpret its output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudClassifier {
    /// Feature names in training order
    feature_names: Vec<String>,
    /// Observed class labels, ascending; `predict_proba` output is indexed
    /// by position in this list
    classes: Vec<u32>,
    trees: Vec<DecisionTree>,
    params: TrainParams,
}

impl FraudClassifier {
    /// Fit a forest on `x` (rows of features) and `y` (class labels).
    pub fn fit(
        x: &[Vec<f64>],
        y: &[u32],
        feature_names: Vec<String>,
        params: TrainParams,
    ) -> Result<Self> {
        if x.is_empty() {
            bail!("training set is empty");
        }
        if x.len() != y.len() {
            bail!(
                "feature rows ({}) and labels ({}) differ in length",
                x.len(),
                y.len()
            );
        }
        let n_features = feature_names.len();
        if x.iter().any(|row| row.len() != n_features) {
            bail!("all feature rows must have {} columns", n_features);
        }
        if params.n_trees == 0 {
            bail!("n_trees must be at least 1");
        }

        let mut classes: Vec<u32> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();
        let class_index =
            |label: u32| classes.iter().position(|&c| c == label).unwrap_or(0);
        let y_idx: Vec<usize> = y.iter().map(|&label| class_index(label)).collect();

        let mut rng = StdRng::seed_from_u64(params.seed);
        // sklearn-style mtry: sqrt of the feature count
        let mtry = ((n_features as f64).sqrt().round() as usize).clamp(1, n_features);

        let mut trees = Vec::with_capacity(params.n_trees);
        for _ in 0..params.n_trees {
            let sample: Vec<usize> = (0..x.len()).map(|_| rng.gen_range(0..x.len())).collect();
            let mut builder = TreeBuilder {
                x,
                y: &y_idx,
                n_classes: classes.len(),
                max_depth: params.max_depth,
                min_samples_split: params.min_samples_split.max(2),
                mtry,
                n_features,
                nodes: Vec::new(),
            };
            builder.build(sample, 0, &mut rng);
            trees.push(DecisionTree {
                nodes: builder.nodes,
            });
        }

        Ok(Self {
            feature_names,
            classes,
            trees,
            params,
        })
    }

    /// Class probability distribution for one feature vector, averaged
    /// over all trees. Output length equals the number of classes seen
    /// during training, so a model fitted on single-class data returns a
    /// single entry.
    pub fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        if features.len() != self.feature_names.len() {
            return Err(ModelError::FeatureCount {
                expected: self.feature_names.len(),
                got: features.len(),
            });
        }
        if self.trees.is_empty() {
            return Err(ModelError::EmptyEnsemble);
        }

        let mut acc = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (slot, p) in acc.iter_mut().zip(tree.leaf_distribution(features)) {
                *slot += p;
            }
        }
        for p in &mut acc {
            *p /= self.trees.len() as f64;
        }
        Ok(acc)
    }

    /// Predicted class label (argmax of the probability distribution).
    pub fn predict(&self, features: &[f64]) -> Result<u32, ModelError> {
        let proba = self.predict_proba(features)?;
        let best = proba
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0);
        Ok(self.classes[best])
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn classes(&self) -> &[u32] {
        &self.classes
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Serialize the model to `path` with bincode.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let bytes = bincode::serialize(self).context("failed to serialize model")?;
        std::fs::write(path, bytes)
            .with_context(|| format!("failed to write model to {}", path.display()))
    }

    /// Deserialize a model previously written by [`FraudClassifier::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read model from {}", path.display()))?;
        bincode::deserialize(&bytes)
            .with_context(|| format!("failed to deserialize model from {}", path.display()))
    }
}

struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [usize],
    n_classes: usize,
    max_depth: usize,
    min_samples_split: usize,
    mtry: usize,
    n_features: usize,
    nodes: Vec<Node>,
}

impl TreeBuilder<'_> {
    /// Grow the subtree for `indices` and return its node index.
    fn build(&mut self, indices: Vec<usize>, depth: usize, rng: &mut StdRng) -> usize {
        let counts = self.class_counts(&indices);
        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;

        if depth >= self.max_depth || indices.len() < self.min_samples_split || is_pure {
            return self.push_leaf(&counts, indices.len());
        }

        let Some((feature, threshold)) = self.best_split(&indices, rng) else {
            return self.push_leaf(&counts, indices.len());
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.x[i][feature] <= threshold);

        let node = self.nodes.len();
        self.nodes.push(Node::Split {
            feature,
            threshold,
            left: 0,
            right: 0,
        });
        let left = self.build(left_idx, depth + 1, rng);
        let right = self.build(right_idx, depth + 1, rng);
        if let Node::Split {
            left: l, right: r, ..
        } = &mut self.nodes[node]
        {
            *l = left;
            *r = right;
        }
        node
    }

    fn push_leaf(&mut self, counts: &[u64], total: usize) -> usize {
        let total = total.max(1) as f64;
        let distribution = counts.iter().map(|&c| c as f64 / total).collect();
        let idx = self.nodes.len();
        self.nodes.push(Node::Leaf { distribution });
        idx
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<u64> {
        let mut counts = vec![0u64; self.n_classes];
        for &i in indices {
            counts[self.y[i]] += 1;
        }
        counts
    }

    /// Search a random feature subset for the split minimizing weighted
    /// Gini impurity. Returns `None` when every candidate feature is
    /// constant over `indices`.
    fn best_split(&self, indices: &[usize], rng: &mut StdRng) -> Option<(usize, f64)> {
        let candidates = rand::seq::index::sample(rng, self.n_features, self.mtry);
        let mut best: Option<(f64, usize, f64)> = None;

        for feature in candidates {
            let mut values: Vec<(f64, usize)> = indices
                .iter()
                .map(|&i| (self.x[i][feature], self.y[i]))
                .collect();
            values.sort_by(|a, b| a.0.total_cmp(&b.0));

            let total = values.len() as f64;
            let mut left_counts = vec![0u64; self.n_classes];
            let mut right_counts = vec![0u64; self.n_classes];
            for &(_, class) in &values {
                right_counts[class] += 1;
            }

            for i in 1..values.len() {
                let (prev_value, prev_class) = values[i - 1];
                left_counts[prev_class] += 1;
                right_counts[prev_class] -= 1;

                let value = values[i].0;
                if value <= prev_value {
                    continue;
                }

                let n_left = i as f64;
                let n_right = total - n_left;
                let score = (n_left / total) * gini(&left_counts, n_left)
                    + (n_right / total) * gini(&right_counts, n_right);

                if best.map_or(true, |(best_score, _, _)| score < best_score) {
                    best = Some((score, feature, (prev_value + value) / 2.0));
                }
            }
        }

        best.map(|(_, feature, threshold)| (feature, threshold))
    }
}

fn gini(counts: &[u64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    let sum_sq: f64 = counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum();
    1.0 - sum_sq
}
