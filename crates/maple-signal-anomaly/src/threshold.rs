//! ThresholdEstimator: dynamic per-window error thresholds.
//!
//! A single μ + z·σ threshold is inflated by the anomalies it is meant to
//! catch. The pruned strategy repeatedly splits the retained values at the
//! candidate threshold and, while the mean of the values above it sits far
//! enough over the mean of the values below it, discards the upper set and
//! re-estimates μ and σ on what remains.
//!
//! When the anomalies inflate σ so far that nothing lies above the candidate,
//! the split moves down to a boundary between retained values instead,
//! scanning from the largest value downward. The first boundary that meets
//! all of these is pruned:
//!
//! - the values above it are a strict minority;
//! - they exceed μ + z·σ of the values below it;
//! - they pass the same relative-drop test.
//!
//! No such boundary ends the loop.
//!
//! ```text
//!   window values
//!       │  μ, σ (population)
//!       ▼
//!   threshold = μ + z·σ ──► split ──► above / below
//!       ▲                               │
//!       │   (μ_above − μ_below)/|μ_above| > prune_percentage ?
//!       └──── yes: keep below, recompute ┘
//!
//!   above empty ──► boundary split (largest values first) ──► same test
//! ```
//!
//! The loop is bounded by `max_iterations` (default: window length) and every
//! pruning step removes at least one value, so it always terminates.

use tracing::trace;

use crate::config::{DetectionConfig, ThresholdStrategy};

/// Population mean and standard deviation. `(0, 0)` for an empty slice.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len().max(1) as f64
}

/// Statistics behind one window's threshold.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowStats {
    /// Mean of the retained values.
    pub mean: f64,
    /// Population standard deviation of the retained values.
    pub std_dev: f64,
    /// Final threshold (never negative).
    pub threshold: f64,
    /// Pruning steps applied.
    pub iterations: usize,
    /// Values discarded by pruning.
    pub pruned: usize,
}

/// Computes the error threshold of a window.
#[derive(Clone, Debug)]
pub struct ThresholdEstimator {
    z_score: f64,
    prune_percentage: f64,
    max_iterations: Option<usize>,
    strategy: ThresholdStrategy,
}

impl ThresholdEstimator {
    /// Pruned estimator with no explicit iteration bound.
    pub fn new(z_score: f64, prune_percentage: f64) -> Self {
        Self {
            z_score,
            prune_percentage,
            max_iterations: None,
            strategy: ThresholdStrategy::Pruned,
        }
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            z_score: config.z_score,
            prune_percentage: config.prune_percentage,
            max_iterations: config.max_prune_iterations,
            strategy: config.strategy,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_strategy(mut self, strategy: ThresholdStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Threshold for `window_errors`.
    pub fn estimate(&self, window_errors: &[f64]) -> f64 {
        self.estimate_with_stats(window_errors).threshold
    }

    /// Threshold for `window_errors` together with the statistics it came from.
    pub fn estimate_with_stats(&self, window_errors: &[f64]) -> WindowStats {
        let (mut mu, mut sigma) = mean_std(window_errors);
        let mut threshold = self.candidate(mu, sigma);

        let mut iterations = 0;
        let mut retained_len = window_errors.len();

        if self.strategy == ThresholdStrategy::Pruned && sigma >= f64::EPSILON {
            let limit = self.max_iterations.unwrap_or(window_errors.len());
            let mut retained = window_errors.to_vec();

            while iterations < limit {
                let (below, above): (Vec<f64>, Vec<f64>) =
                    retained.iter().partition(|&&v| v <= threshold);
                if below.is_empty() {
                    break;
                }

                if above.is_empty() {
                    let mut sorted = below;
                    sorted.sort_by(|a, b| b.total_cmp(a));
                    let Some(split) = self.boundary_split(&sorted) else {
                        break;
                    };
                    trace!(iteration = iterations, threshold, split, "pruning at boundary");
                    retained = sorted.split_off(split);
                } else {
                    let above_mean = mean(&above);
                    if above_mean.abs() < f64::EPSILON {
                        break;
                    }
                    let drop = (above_mean - mean(&below)) / above_mean.abs();
                    trace!(iteration = iterations, threshold, drop, "pruning candidate");
                    if drop <= self.prune_percentage {
                        break;
                    }
                    retained = below;
                }

                (mu, sigma) = mean_std(&retained);
                threshold = self.candidate(mu, sigma);
                iterations += 1;
            }
            retained_len = retained.len();
        }

        WindowStats {
            mean: mu,
            std_dev: sigma,
            threshold: threshold.max(0.0),
            iterations,
            pruned: window_errors.len() - retained_len,
        }
    }

    /// Number of leading values of `sorted` (descending) to prune when no
    /// value exceeds the current candidate, or `None` if no boundary qualifies.
    ///
    /// Equal values stay on the same side. The upper part must be a strict
    /// minority, its smallest value must exceed the candidate of the lower
    /// part, and the relative drop between the two means must exceed
    /// `prune_percentage`.
    fn boundary_split(&self, sorted: &[f64]) -> Option<usize> {
        let n = sorted.len();
        let total: f64 = sorted.iter().sum();
        let total_sq: f64 = sorted.iter().map(|v| v * v).sum();

        let (mut upper_sum, mut upper_sq) = (0.0, 0.0);
        let mut split = 0;
        while split < n {
            let boundary = sorted[split];
            while split < n && sorted[split] == boundary {
                upper_sum += sorted[split];
                upper_sq += sorted[split] * sorted[split];
                split += 1;
            }
            if 2 * split >= n {
                return None;
            }

            let lower_n = (n - split) as f64;
            let lower_mean = (total - upper_sum) / lower_n;
            let lower_var = ((total_sq - upper_sq) / lower_n - lower_mean * lower_mean).max(0.0);
            if boundary <= self.candidate(lower_mean, lower_var.sqrt()) {
                continue;
            }

            let upper_mean = upper_sum / split as f64;
            if upper_mean.abs() >= f64::EPSILON
                && (upper_mean - lower_mean) / upper_mean.abs() > self.prune_percentage
            {
                return Some(split);
            }
        }
        None
    }

    fn candidate(&self, mu: f64, sigma: f64) -> f64 {
        if sigma < f64::EPSILON {
            mu
        } else {
            mu + self.z_score * sigma
        }
    }
}

impl Default for ThresholdEstimator {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}
