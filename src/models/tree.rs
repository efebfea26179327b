//! CART classification tree with Gini splits.
//!
//! Leaves keep their class counts and resolve ties to the lowest class index.
//! Candidate splits are scanned in a fixed order, so the same training rows
//! always produce the same tree.

use anyhow::{ensure, Result};
use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Hyperparameters for [`ClassificationTree`]
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    /// Nodes with fewer rows than this become leaves
    pub min_samples_split: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

impl TreeParams {
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Grow a tree on `records`, whose labels must lie in `0..n_classes`.
    pub fn fit(
        &self,
        records: ArrayView2<f64>,
        targets: &[usize],
        n_classes: usize,
    ) -> Result<ClassificationTree> {
        ensure!(records.nrows() > 0, "cannot grow a tree on an empty dataset");
        ensure!(
            records.nrows() == targets.len(),
            "{} targets for {} samples",
            targets.len(),
            records.nrows()
        );
        ensure!(
            targets.iter().all(|&t| t < n_classes),
            "target outside 0..{}",
            n_classes
        );

        let rows: Vec<usize> = (0..records.nrows()).collect();
        let root = self.grow(records, targets, n_classes, rows, 0);

        Ok(ClassificationTree {
            root,
            n_features: records.ncols(),
        })
    }

    fn grow(
        &self,
        records: ArrayView2<f64>,
        targets: &[usize],
        n_classes: usize,
        rows: Vec<usize>,
        depth: usize,
    ) -> Node {
        let mut counts = vec![0; n_classes];
        for &row in &rows {
            counts[targets[row]] += 1;
        }

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let too_deep = self.max_depth.map_or(false, |max| depth >= max);
        if pure || too_deep || rows.len() < self.min_samples_split {
            return Node::Leaf { counts };
        }

        let Some(split) = best_split(records, targets, &counts, &rows) else {
            return Node::Leaf { counts };
        };

        let (left, right): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&row| records[[row, split.feature]] <= split.threshold);
        if left.is_empty() || right.is_empty() {
            return Node::Leaf { counts };
        }

        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.grow(records, targets, n_classes, left, depth + 1)),
            right: Box::new(self.grow(records, targets, n_classes, right, depth + 1)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        counts: Vec<usize>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

struct Split {
    feature: usize,
    threshold: f64,
    score: f64,
}

/// Lowest weighted Gini impurity over every feature and midpoint, or `None`
/// when no split improves on the parent.
fn best_split(
    records: ArrayView2<f64>,
    targets: &[usize],
    parent: &[usize],
    rows: &[usize],
) -> Option<Split> {
    let n = rows.len();
    let parent_impurity = gini(parent, n);
    let mut sorted = rows.to_vec();
    let mut best: Option<Split> = None;

    for feature in 0..records.ncols() {
        sorted.sort_by(|&a, &b| records[[a, feature]].total_cmp(&records[[b, feature]]));

        let mut left = vec![0; parent.len()];
        let mut right = parent.to_vec();

        for i in 0..n - 1 {
            let row = sorted[i];
            left[targets[row]] += 1;
            right[targets[row]] -= 1;

            let value = records[[row, feature]];
            let next = records[[sorted[i + 1], feature]];
            if next.is_nan() || next <= value {
                continue;
            }

            let n_left = i + 1;
            let n_right = n - n_left;
            let weighted =
                n_left as f64 * gini(&left, n_left) + n_right as f64 * gini(&right, n_right);
            let score = weighted / n as f64;

            if best.as_ref().map_or(true, |b| score < b.score) {
                best = Some(Split {
                    feature,
                    threshold: (value + next) / 2.0,
                    score,
                });
            }
        }
    }

    best.filter(|b| b.score < parent_impurity - 1e-12)
}

fn gini(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts.iter().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
}

/// Most frequent class; ties go to the lowest index.
fn modal_class(counts: &[usize]) -> usize {
    let mut best = 0;
    for (class, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class;
        }
    }
    best
}

/// Fitted classification tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationTree {
    root: Node,
    n_features: usize,
}

impl ClassificationTree {
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Class of the leaf `row` lands in
    pub fn predict_row(&self, row: ArrayView1<f64>) -> usize {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { counts } => return modal_class(counts),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn n_leaves(&self) -> usize {
        fn count(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Split { left, right, .. } => count(left) + count(right),
            }
        }
        count(&self.root)
    }

    pub fn depth(&self) -> usize {
        fn depth(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + depth(left).max(depth(right)),
            }
        }
        depth(&self.root)
    }
}
