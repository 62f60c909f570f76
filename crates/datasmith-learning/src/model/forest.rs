//! Bagged ensembles of regression trees.

use super::tree::DecisionTreeRegressor;
use crate::error::{LearningError, Result};
use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::debug;

/// Random forest regressor.
///
/// Tree `i` draws its bootstrap sample from a `ChaCha8Rng` seeded with
/// `seed + i`, so the fitted forest does not depend on thread scheduling.
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    n_estimators: usize,
    seed: u64,
    trees: Vec<DecisionTreeRegressor>,
    feature_importances: Option<Array1<f64>>,
}

impl RandomForestRegressor {
    pub fn new(n_estimators: usize, seed: u64) -> Self {
        Self {
            n_estimators: n_estimators.max(1),
            seed,
            trees: Vec::new(),
            feature_importances: None,
        }
    }

    pub fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<()> {
        let n_samples = x.nrows();
        if n_samples == 0 {
            return Err(LearningError::Computation(
                "Cannot fit a forest on zero rows".to_string(),
            ));
        }

        let base_seed = self.seed;
        let trees = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(tree_idx as u64));
                let sample: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();

                let mut tree = DecisionTreeRegressor::new();
                tree.fit_rows(x, y, sample)?;
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Fitted {} trees ({} nodes in total)",
            trees.len(),
            trees.iter().map(DecisionTreeRegressor::node_count).sum::<usize>()
        );

        self.feature_importances = Some(average_importances(&trees, x.ncols()));
        self.trees = trees;
        Ok(())
    }

    /// Mean of the per-tree predictions.
    pub fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(LearningError::Computation(
                "Forest has not been fitted".to_string(),
            ));
        }

        let per_tree = self
            .trees
            .par_iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<Vec<_>>>()?;

        let mut sum = Array1::<f64>::zeros(x.nrows());
        for prediction in &per_tree {
            sum += prediction;
        }
        Ok(sum / self.trees.len() as f64)
    }

    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Average the importances of trees that split at least once, normalized to
/// sum to 1.
fn average_importances(trees: &[DecisionTreeRegressor], n_features: usize) -> Array1<f64> {
    let mut total = Array1::<f64>::zeros(n_features);
    let mut counted = 0usize;
    for tree in trees.iter().filter(|t| t.node_count() > 1) {
        if let Some(importances) = tree.feature_importances() {
            total += importances;
            counted += 1;
        }
    }

    if counted == 0 {
        return total;
    }
    total /= counted as f64;

    let sum = total.sum();
    if sum > 0.0 {
        total /= sum;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    fn nonlinear_data() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((40, 2), |(i, j)| if j == 0 { i as f64 } else { (i % 3) as f64 });
        let y = x.column(0).mapv(|v| (v / 5.0).floor() * 10.0);
        (x, y)
    }

    #[test]
    fn test_same_seed_gives_identical_predictions() {
        let (x, y) = nonlinear_data();

        let mut a = RandomForestRegressor::new(10, 42);
        let mut b = RandomForestRegressor::new(10, 42);
        a.fit(x.view(), y.view()).unwrap();
        b.fit(x.view(), y.view()).unwrap();

        assert_eq!(a.predict(x.view()).unwrap(), b.predict(x.view()).unwrap());
        assert_eq!(a.feature_importances(), b.feature_importances());
    }

    #[test]
    fn test_importances_sum_to_one_and_favor_signal() {
        let (x, y) = nonlinear_data();

        let mut forest = RandomForestRegressor::new(20, 7);
        forest.fit(x.view(), y.view()).unwrap();

        let importances = forest.feature_importances().unwrap();
        assert!((importances.sum() - 1.0).abs() < 1e-9);
        assert!(importances[0] > importances[1]);
    }

    #[test]
    fn test_predictions_track_target() {
        let (x, y) = nonlinear_data();

        let mut forest = RandomForestRegressor::new(25, 1);
        forest.fit(x.view(), y.view()).unwrap();
        assert_eq!(forest.n_trees(), 25);

        let predicted = forest.predict(x.view()).unwrap();
        let mae = (&predicted - &y).mapv(f64::abs).mean().unwrap();
        assert!(mae < 3.0, "mae was {mae}");
    }

    #[test]
    fn test_constant_target_has_zero_importances() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![5.0, 5.0, 5.0];

        let mut forest = RandomForestRegressor::new(5, 0);
        forest.fit(x.view(), y.view()).unwrap();

        assert_eq!(forest.feature_importances().unwrap(), &array![0.0]);
        assert_eq!(forest.predict(x.view()).unwrap(), array![5.0, 5.0, 5.0]);
    }
}
