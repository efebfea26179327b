//! Random forest classifier built from seeded CART trees

use crate::models::aggregator::VoteAggregator;
use crate::models::tree::{ClassificationTree, TreeParams};
use anyhow::{Context, Result};
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hyperparameters for [`RandomForest`]
#[derive(Debug, Clone)]
pub struct RandomForestParams {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    /// Features drawn per tree; `None` means ceil(sqrt(n_features))
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for RandomForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            max_features: None,
            seed: 42,
        }
    }
}

impl RandomForestParams {
    pub fn new(n_trees: usize, seed: u64) -> Self {
        Self {
            n_trees,
            seed,
            ..Self::default()
        }
    }

    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Fit the forest. Each tree sees a bootstrap sample of the rows and a
    /// random subset of the columns.
    pub fn fit(
        &self,
        records: ArrayView2<f64>,
        targets: ArrayView1<usize>,
    ) -> Result<RandomForest> {
        let (n_samples, n_features) = records.dim();
        anyhow::ensure!(self.n_trees > 0, "a forest needs at least one tree");
        anyhow::ensure!(n_samples > 0, "cannot fit a forest on an empty dataset");
        anyhow::ensure!(n_features > 0, "cannot fit a forest without features");
        anyhow::ensure!(
            targets.len() == n_samples,
            "{} targets for {} samples",
            targets.len(),
            n_samples
        );

        let n_classes = targets.iter().copied().max().map_or(0, |m| m + 1);
        let per_tree = self
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().ceil() as usize)
            .clamp(1, n_features);

        let tree_params = TreeParams::default().max_depth(self.max_depth);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(self.n_trees);

        for index in 0..self.n_trees {
            let rows: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
            let mut features = rand::seq::index::sample(&mut rng, n_features, per_tree).into_vec();
            features.sort_unstable();

            let sample = records.select(Axis(0), &rows).select(Axis(1), &features);
            let sample_targets: Vec<usize> = rows.iter().map(|&row| targets[row]).collect();

            let model = tree_params
                .fit(sample.view(), &sample_targets, n_classes)
                .with_context(|| format!("Failed to fit tree {}", index))?;

            trees.push(ForestTree { features, model });
        }

        debug!(
            n_trees = trees.len(),
            n_classes,
            features_per_tree = per_tree,
            "Random forest fitted"
        );

        Ok(RandomForest {
            trees,
            n_classes,
            n_features,
        })
    }
}

/// One member of the ensemble and the columns it was trained on
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ForestTree {
    features: Vec<usize>,
    model: ClassificationTree,
}

/// Bagged decision trees with majority voting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<ForestTree>,
    n_classes: usize,
    n_features: usize,
}

impl RandomForest {
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    fn tally(&self, row: ArrayView1<f64>) -> VoteAggregator {
        let mut votes = VoteAggregator::new(self.n_classes);
        for tree in &self.trees {
            let x = row.select(Axis(0), &tree.features);
            votes.vote(tree.model.predict_row(x.view()));
        }
        votes
    }

    /// Majority class for a single feature row
    pub fn predict_row(&self, row: ArrayView1<f64>) -> usize {
        self.tally(row).majority().unwrap_or(0)
    }

    /// Fraction of trees voting for each class
    pub fn predict_proba_row(&self, row: ArrayView1<f64>) -> Vec<f64> {
        self.tally(row).proportions()
    }

    /// Majority class for every row of `records`
    pub fn predict_batch(&self, records: ArrayView2<f64>) -> Array1<usize> {
        records.rows().into_iter().map(|row| self.predict_row(row)).collect()
    }
}
