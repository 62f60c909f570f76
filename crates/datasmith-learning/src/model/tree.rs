//! CART regression trees with the squared-error criterion.

use crate::error::{LearningError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2};

/// A node in the flattened tree. Children are indices into the node arena.
#[derive(Debug, Clone, PartialEq)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Unbounded-depth regression tree.
///
/// Every feature is considered at every split. Rows with
/// `x[feature] <= threshold` go left.
#[derive(Debug, Clone)]
pub struct DecisionTreeRegressor {
    min_samples_split: usize,
    min_samples_leaf: usize,
    nodes: Vec<TreeNode>,
    n_features: usize,
    feature_importances: Option<Array1<f64>>,
}

impl Default for DecisionTreeRegressor {
    fn default() -> Self {
        Self::new()
    }
}

/// Work item for the iterative builder.
struct PendingNode {
    slot: usize,
    rows: Vec<usize>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    /// `sum_l^2 / n_l + sum_r^2 / n_r`; larger means lower child error.
    score: f64,
}

impl DecisionTreeRegressor {
    pub fn new() -> Self {
        Self {
            min_samples_split: 2,
            min_samples_leaf: 1,
            nodes: Vec::new(),
            n_features: 0,
            feature_importances: None,
        }
    }

    #[must_use]
    pub fn with_min_samples_split(mut self, n: usize) -> Self {
        self.min_samples_split = n.max(2);
        self
    }

    #[must_use]
    pub fn with_min_samples_leaf(mut self, n: usize) -> Self {
        self.min_samples_leaf = n.max(1);
        self
    }

    /// Fit on the rows of `x` listed in `rows` (repeats allowed).
    pub fn fit_rows(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>, rows: Vec<usize>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(LearningError::Computation(format!(
                "Feature rows ({}) and target length ({}) differ",
                x.nrows(),
                y.len()
            )));
        }
        if rows.is_empty() {
            return Err(LearningError::Computation(
                "Cannot fit a tree on zero rows".to_string(),
            ));
        }

        self.n_features = x.ncols();
        self.nodes = vec![TreeNode::Leaf { value: 0.0 }];
        let mut importances = vec![0.0; self.n_features];

        let mut stack = vec![PendingNode { slot: 0, rows }];
        while let Some(PendingNode { slot, rows }) = stack.pop() {
            let targets: Vec<f64> = rows.iter().map(|&r| y[r]).collect();
            let node_impurity = variance(&targets);
            let value = mean(&targets);

            let split = if rows.len() < self.min_samples_split || node_impurity <= 0.0 {
                None
            } else {
                self.best_split(x, y, &rows)
            };

            let Some(split) = split else {
                self.nodes[slot] = TreeNode::Leaf { value };
                continue;
            };

            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                .iter()
                .partition(|&&r| x[[r, split.feature]] <= split.threshold);

            let left_y: Vec<f64> = left_rows.iter().map(|&r| y[r]).collect();
            let right_y: Vec<f64> = right_rows.iter().map(|&r| y[r]).collect();
            importances[split.feature] += rows.len() as f64 * node_impurity
                - left_rows.len() as f64 * variance(&left_y)
                - right_rows.len() as f64 * variance(&right_y);

            let left = self.nodes.len();
            let right = left + 1;
            self.nodes.push(TreeNode::Leaf { value: mean(&left_y) });
            self.nodes.push(TreeNode::Leaf { value: mean(&right_y) });
            self.nodes[slot] = TreeNode::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };

            stack.push(PendingNode { slot: right, rows: right_rows });
            stack.push(PendingNode { slot: left, rows: left_rows });
        }

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            importances.iter_mut().for_each(|v| *v /= total);
        }
        self.feature_importances = Some(Array1::from_vec(importances));
        Ok(())
    }

    /// Fit on every row of `x`.
    pub fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        self.fit_rows(x, y, (0..x.nrows()).collect())
    }

    fn best_split(&self, x: ArrayView2<f64>, y: ArrayView1<f64>, rows: &[usize]) -> Option<SplitCandidate> {
        let n = rows.len();
        let total: f64 = rows.iter().map(|&r| y[r]).sum();
        let mut best: Option<SplitCandidate> = None;

        for feature in 0..x.ncols() {
            let mut order: Vec<usize> = rows.to_vec();
            order.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

            let mut left_sum = 0.0;
            for i in 1..n {
                left_sum += y[order[i - 1]];
                let lo = x[[order[i - 1], feature]];
                let hi = x[[order[i], feature]];
                if lo >= hi || i < self.min_samples_leaf || n - i < self.min_samples_leaf {
                    continue;
                }

                let right_sum = total - left_sum;
                let score = left_sum * left_sum / i as f64 + right_sum * right_sum / (n - i) as f64;
                if best.as_ref().is_none_or(|b| score > b.score) {
                    let mut threshold = (lo + hi) / 2.0;
                    if threshold >= hi || !threshold.is_finite() {
                        threshold = lo;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        score,
                    });
                }
            }
        }

        best
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { value }) => return *value,
                None => return 0.0,
            }
        }
    }

    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        if self.nodes.is_empty() {
            return Err(LearningError::Computation(
                "Tree has not been fitted".to_string(),
            ));
        }
        if x.ncols() != self.n_features {
            return Err(LearningError::Computation(format!(
                "Tree expects {} features, got {}",
                self.n_features,
                x.ncols()
            )));
        }
        Ok(x.rows().into_iter().map(|row| self.predict_row(row)).collect())
    }

    /// Impurity-decrease importances normalized to sum to 1 (all zero for a
    /// single-leaf tree).
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance, computed in two passes.
fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}
