//! Engine configuration.
//!
//! A single `DetectionConfig` is passed into the engine at call time; there is
//! no process-wide state. Partial TOML/JSON documents are accepted and missing
//! fields fall back to the defaults below. Every loader validates before
//! returning, so a `DetectionConfig` obtained from a file is always usable.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnomalyError, AnomalyResult};

/// Default number of samples per window.
pub const DEFAULT_WINDOW_SIZE: usize = 2000;

/// Default distance between consecutive window starts.
pub const DEFAULT_STEP_SIZE: usize = 200;

/// Default threshold multiplier (μ + z·σ).
pub const DEFAULT_Z_SCORE: f64 = 4.0;

/// Default relative mean drop that triggers a pruning step.
pub const DEFAULT_PRUNE_PERCENTAGE: f64 = 0.1;

/// Default minimum confidence for a scored anomaly to survive.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 1e-3;

/// How a window's threshold is derived from its error distribution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdStrategy {
    /// μ + z·σ, re-estimated after iteratively pruning outliers.
    #[default]
    Pruned,
    /// Plain μ + z·σ over the whole window.
    Fixed,
}

impl std::fmt::Display for ThresholdStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pruned => write!(f, "pruned"),
            Self::Fixed => write!(f, "fixed"),
        }
    }
}

/// Configuration for the anomaly scoring engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Samples per window.
    pub window_size: usize,
    /// Distance between window starts; `0 < step_size <= window_size`.
    pub step_size: usize,
    /// Threshold multiplier on the standard deviation.
    pub z_score: f64,
    /// Relative mean drop in (0, 1) above which outliers are pruned.
    pub prune_percentage: f64,
    /// Upper bound on pruning iterations. `None` means the window length.
    pub max_prune_iterations: Option<usize>,
    /// Scored anomalies below this confidence are dropped. In [0, 1).
    pub min_confidence: f64,
    /// Gap (in timestamp units) across which intervals are still merged.
    pub adjacency_tolerance: i64,
    /// Threshold estimation strategy.
    pub strategy: ThresholdStrategy,
    /// Also flag runs that fall far below the window mean.
    pub lower_threshold: bool,
    /// Samples added on each side of an extracted run.
    pub anomaly_padding: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            step_size: DEFAULT_STEP_SIZE,
            z_score: DEFAULT_Z_SCORE,
            prune_percentage: DEFAULT_PRUNE_PERCENTAGE,
            max_prune_iterations: None,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            adjacency_tolerance: 0,
            strategy: ThresholdStrategy::Pruned,
            lower_threshold: false,
            anomaly_padding: 0,
        }
    }
}

impl DetectionConfig {
    /// Default configuration with the given window geometry.
    pub fn with_window(window_size: usize, step_size: usize) -> Self {
        Self {
            window_size,
            step_size,
            ..Self::default()
        }
    }

    /// Check every field, failing on the first out-of-range value.
    pub fn validate(&self) -> AnomalyResult<()> {
        if self.window_size == 0 {
            return Err(AnomalyError::invalid(
                "window_size",
                self.window_size,
                "must be positive",
            ));
        }
        if self.step_size == 0 {
            return Err(AnomalyError::invalid(
                "step_size",
                self.step_size,
                "must be positive",
            ));
        }
        if self.step_size > self.window_size {
            return Err(AnomalyError::invalid(
                "step_size",
                self.step_size,
                "must not exceed window_size",
            ));
        }
        if !self.z_score.is_finite() || self.z_score < 0.0 {
            return Err(AnomalyError::invalid(
                "z_score",
                self.z_score,
                "must be finite and non-negative",
            ));
        }
        if !(self.prune_percentage > 0.0 && self.prune_percentage < 1.0) {
            return Err(AnomalyError::invalid(
                "prune_percentage",
                self.prune_percentage,
                "must be in (0, 1)",
            ));
        }
        if self.max_prune_iterations == Some(0) {
            return Err(AnomalyError::invalid(
                "max_prune_iterations",
                0,
                "must be positive when set",
            ));
        }
        if !(self.min_confidence >= 0.0 && self.min_confidence < 1.0) {
            return Err(AnomalyError::invalid(
                "min_confidence",
                self.min_confidence,
                "must be in [0, 1)",
            ));
        }
        if self.adjacency_tolerance < 0 {
            return Err(AnomalyError::invalid(
                "adjacency_tolerance",
                self.adjacency_tolerance,
                "must be non-negative",
            ));
        }
        Ok(())
    }

    /// Pruning bound for a window of `window_len` samples.
    pub fn prune_limit(&self, window_len: usize) -> usize {
        self.max_prune_iterations.unwrap_or(window_len)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> AnomalyResult<Self> {
        let config: DetectionConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(contents: &str) -> AnomalyResult<Self> {
        let config: DetectionConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file. `.json` files are read as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> AnomalyResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_toml_str(&contents),
        }
    }
}
