//! Online isolation-forest anomaly detection
//!
//! Every classification retrains an ensemble of isolation trees on the
//! current history and decides whether the query sample belongs to the
//! most isolated `contamination` fraction of history plus query. Forests
//! never outlive a single call.

mod forest;
mod tree;


pub use forest::{ForestParams, IsolationForest};
pub use tree::{average_path_length, IsolationTree};

use crate::error::DetectorError;
use crate::window::DEFAULT_WINDOW_CAPACITY;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the window and the isolation-forest detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Samples kept in the sliding window (default: 50)
    pub window_capacity: usize,
    /// History required before classifying (default: 20)
    pub min_points: usize,
    /// Trees per forest (default: 100)
    pub ensemble_size: usize,
    /// Expected fraction of anomalies, in (0, 1) (default: 0.1)
    pub contamination: f64,
    /// Seed for tree construction (default: 42)
    pub random_seed: u64,
    /// Per-tree subsample bound (default: 256)
    pub max_samples: usize,
    /// End descent early for queries outside a node's observed range.
    /// Training points always fall inside the ranges on their own path, so
    /// they score exactly as in the classic descent.
    pub isolate_out_of_range: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            min_points: 20,
            ensemble_size: 100,
            contamination: 0.1,
            random_seed: 42,
            max_samples: 256,
            isolate_out_of_range: true,
        }
    }
}

impl DetectorConfig {
    /// Check every option against its valid range
    pub fn validate(&self) -> Result<(), DetectorError> {
        if !(self.contamination > 0.0 && self.contamination < 1.0) {
            return Err(DetectorError::config(format!(
                "contamination must be in (0, 1), got {}",
                self.contamination
            )));
        }
        if self.window_capacity == 0 {
            return Err(DetectorError::config("window_capacity must be at least 1"));
        }
        if self.ensemble_size == 0 {
            return Err(DetectorError::config("ensemble_size must be at least 1"));
        }
        if self.max_samples == 0 {
            return Err(DetectorError::config("max_samples must be at least 1"));
        }
        if self.min_points == 0 {
            return Err(DetectorError::config("min_points must be at least 1"));
        }
        if self.window_capacity < self.min_points {
            return Err(DetectorError::config(format!(
                "window_capacity ({}) must be at least min_points ({})",
                self.window_capacity, self.min_points
            )));
        }
        Ok(())
    }

    /// Ensemble parameters derived from this configuration
    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            ensemble_size: self.ensemble_size,
            max_samples: self.max_samples,
            isolate_out_of_range: self.isolate_out_of_range,
        }
    }
}

/// Classification result for one queried sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Isolation score in (0, 1]; near 1 means easily isolated
    pub anomaly_score: f64,
    /// Whether the score falls in the top `contamination` fraction
    pub is_anomaly: bool,
    /// Score cutoff calibrated from the contamination target
    pub threshold: f64,
}

/// Stateless isolation-forest detector
#[derive(Debug, Clone)]
pub struct IsolationForestDetector {
    config: DetectorConfig,
}

impl IsolationForestDetector {
    /// Create a detector, rejecting invalid configuration up front
    pub fn new(config: DetectorConfig) -> Result<Self, DetectorError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Whether a history of `len` samples is enough to classify
    pub fn is_ready(&self, len: usize) -> bool {
        len >= self.config.min_points
    }

    /// Train a forest on `history` and classify `query` against it
    pub fn classify(&self, history: &[f64], query: f64) -> Result<Verdict, DetectorError> {
        if history.len() < self.config.min_points {
            return Err(DetectorError::InsufficientHistory {
                required: self.config.min_points,
                actual: history.len(),
            });
        }
        if let Some(&value) = history
            .iter()
            .chain(std::iter::once(&query))
            .find(|&&v| !is_valid_sample(v))
        {
            return Err(DetectorError::InvalidSample { value });
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.config.random_seed);
        let forest = IsolationForest::fit(history, &self.config.forest_params(), &mut rng);

        let anomaly_score = forest.score(query);
        let mut reference: Vec<f64> = history.iter().map(|&v| forest.score(v)).collect();
        reference.push(anomaly_score);

        let threshold = contamination_threshold(&mut reference, self.config.contamination);
        let is_anomaly = anomaly_score > threshold;

        debug!(
            history = history.len(),
            query = query,
            score = anomaly_score,
            threshold = threshold,
            anomalous = is_anomaly,
            "Classified sample"
        );

        Ok(Verdict {
            anomaly_score,
            is_anomaly,
            threshold,
        })
    }
}

/// Latencies are finite, non-negative milliseconds
pub(crate) fn is_valid_sample(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Linearly interpolated `(1 - contamination)` quantile of `scores`.
///
/// Scores strictly above the result form the top `contamination` fraction.
fn contamination_threshold(scores: &mut [f64], contamination: f64) -> f64 {
    if scores.is_empty() {
        return 1.0;
    }

    scores.sort_by(|a, b| a.total_cmp(b));

    let position = (scores.len() - 1) as f64 * (1.0 - contamination);
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    scores[lower] + (scores[upper] - scores[lower]) * fraction
}
