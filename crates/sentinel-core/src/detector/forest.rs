//! Isolation forest ensemble
//!
//! Anomalies are few and different, so random partitioning isolates them
//! in fewer splits. The forest averages path lengths over many randomized
//! trees and normalizes the mean by `c(ψ)`, the expected path length for
//! the per-tree subsample size `ψ`.

use super::tree::{average_path_length, IsolationTree};
use rand::seq::index;
use rand::Rng;

/// Score reported when the forest cannot distinguish any point
const NEUTRAL_SCORE: f64 = 0.5;

/// Parameters controlling how the ensemble is grown
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    /// Number of trees in the ensemble
    pub ensemble_size: usize,
    /// Upper bound on the per-tree subsample size
    pub max_samples: usize,
    /// Shortcut isolation for values outside a node's observed range
    pub isolate_out_of_range: bool,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            ensemble_size: 100,
            max_samples: 256,
            isolate_out_of_range: true,
        }
    }
}

/// Trained ensemble of isolation trees
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    subsample_size: usize,
    normalizer: f64,
    isolate_out_of_range: bool,
}

impl IsolationForest {
    /// Grow `params.ensemble_size` trees over `data`
    pub fn fit<R: Rng + ?Sized>(data: &[f64], params: &ForestParams, rng: &mut R) -> Self {
        let subsample_size = params.max_samples.min(data.len());
        let max_depth = if subsample_size > 1 {
            (subsample_size as f64).log2().ceil() as usize
        } else {
            0
        };

        let trees = if data.is_empty() {
            Vec::new()
        } else {
            (0..params.ensemble_size)
                .map(|_| {
                    let sample: Vec<f64> = index::sample(rng, data.len(), subsample_size)
                        .iter()
                        .map(|i| data[i])
                        .collect();
                    IsolationTree::build(&sample, max_depth, rng)
                })
                .collect()
        };

        Self {
            trees,
            subsample_size,
            normalizer: average_path_length(subsample_size),
            isolate_out_of_range: params.isolate_out_of_range,
        }
    }

    /// Mean path length `E[h(x)]` across all trees
    pub fn path_length(&self, value: f64) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }

        let total: f64 = self
            .trees
            .iter()
            .map(|tree| tree.path_length(value, self.isolate_out_of_range))
            .sum();

        total / self.trees.len() as f64
    }

    /// Anomaly score `2^(-E[h(x)] / c(ψ))` in (0, 1]
    pub fn score(&self, value: f64) -> f64 {
        if self.trees.is_empty() || self.normalizer == 0.0 {
            return NEUTRAL_SCORE;
        }

        2.0_f64.powf(-self.path_length(value) / self.normalizer)
    }

    /// Number of trees in the ensemble
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Points drawn per tree (`ψ`)
    pub fn subsample_size(&self) -> usize {
        self.subsample_size
    }

    pub fn trees(&self) -> &[IsolationTree] {
        &self.trees
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn spread(n: usize, lo: f64, hi: f64) -> Vec<f64> {
        (0..n)
            .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
            .collect()
    }

    #[test]
    fn test_fit_builds_requested_trees() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let params = ForestParams {
            ensemble_size: 10,
            ..Default::default()
        };
        let forest = IsolationForest::fit(&spread(30, 10.0, 20.0), &params, &mut rng);

        assert_eq!(forest.len(), 10);
        assert_eq!(forest.subsample_size(), 30);
    }

    #[test]
    fn test_subsample_bounds_tree_size_and_depth() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let params = ForestParams {
            ensemble_size: 5,
            max_samples: 16,
            ..Default::default()
        };
        let forest = IsolationForest::fit(&spread(500, 0.0, 1000.0), &params, &mut rng);

        assert_eq!(forest.subsample_size(), 16);
        for tree in forest.trees() {
            assert_eq!(tree.size(), 16);
            assert!(tree.height() <= 4);
        }
    }

    #[test]
    fn test_empty_data_scores_neutral() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let forest = IsolationForest::fit(&[], &ForestParams::default(), &mut rng);

        assert!(forest.is_empty());
        assert_eq!(forest.score(10.0), NEUTRAL_SCORE);
    }

    #[test]
    fn test_scores_in_unit_interval() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let data = spread(40, 5.0, 25.0);
        let forest = IsolationForest::fit(&data, &ForestParams::default(), &mut rng);

        for value in data.iter().copied().chain([0.0, 15.0, 2000.0]) {
            let score = forest.score(value);
            assert!(score > 0.0 && score <= 1.0, "score({})={}", value, score);
        }
    }

    #[test]
    fn test_outlier_scores_higher_than_inlier() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut data = spread(30, 10.0, 20.0);
        data.push(900.0);
        let forest = IsolationForest::fit(&data, &ForestParams::default(), &mut rng);

        assert!(forest.score(900.0) > forest.score(15.0));
        assert!(forest.path_length(900.0) < forest.path_length(15.0));
    }

    #[test]
    fn test_zero_variance_scores_half() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let forest = IsolationForest::fit(&[15.0; 20], &ForestParams::default(), &mut rng);

        // Every tree is a single leaf, so E[h] == c(ψ)
        assert!((forest.score(15.0) - 0.5).abs() < 1e-12);
    }
}
