//! SeverityScorer: normalized severity and saturating confidence.
//!
//! ```text
//!   severity = max(0, (peak − threshold) / (threshold − window_min))
//!   score    = 1 − e^(−severity)
//! ```
//!
//! The denominator is floored at `f64::EPSILON`, so a spike over a flat
//! window gets a huge but finite severity and a score of 1.

use tracing::debug;

use super::types::{Anomaly, Candidate};

/// Scores candidates and drops those under the confidence floor.
#[derive(Clone, Debug)]
pub struct SeverityScorer {
    min_confidence: f64,
}

impl SeverityScorer {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }

    /// Excess of `peak` over `threshold`, relative to the window's spread below it.
    pub fn severity(peak: f64, threshold: f64, window_min: f64) -> f64 {
        let spread = (threshold - window_min).max(f64::EPSILON);
        ((peak - threshold) / spread).max(0.0)
    }

    /// Monotonic map of severity into [0, 1].
    pub fn confidence(severity: f64) -> f64 {
        (-(-severity).exp_m1()).clamp(0.0, 1.0)
    }

    /// Score `candidate` against its window, or `None` if it is too weak to keep.
    pub fn score(
        &self,
        candidate: &Candidate,
        window_errors: &[f64],
        threshold: f64,
    ) -> Option<Anomaly> {
        let window_min = window_errors
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min)
            .min(threshold);
        let severity = Self::severity(candidate.peak, threshold, window_min);
        let score = Self::confidence(severity);

        if score < self.min_confidence {
            debug!(
                start = candidate.start_timestamp,
                end = candidate.end_timestamp,
                score,
                min_confidence = self.min_confidence,
                "dropping low-confidence anomaly"
            );
            return None;
        }

        Some(Anomaly::new(
            candidate.start_timestamp,
            candidate.end_timestamp,
            score,
            severity,
        ))
    }
}

impl Default for SeverityScorer {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MIN_CONFIDENCE)
    }
}
