//! # maple-signal-anomaly
//!
//! Dynamic-threshold anomaly scoring for model error series.
//!
//! An upstream model (reconstruction or forecasting) produces one error value
//! per timestep. This crate decides which timesteps are anomalous, groups them
//! into intervals, scores each interval, and suppresses weak detections. Model
//! training, inference, and I/O live elsewhere.
//!
//! ## Architecture
//!
//! ```text
//!   ErrorSeries (timestamp, error)
//!       │
//!       ▼
//!   Windower ──► Window (size, step; lazy)
//!       │
//!       ├──► ThresholdEstimator (μ + z·σ, iterative pruning)
//!       ├──► AnomalyExtractor  (runs above threshold)
//!       └──► SeverityScorer    (severity, confidence, min_confidence cut)
//!             │
//!             ▼
//!       IntervalMerger (all windows, all passes) ──► AnomalyList
//! ```
//!
//! ## Invariants
//!
//! - The output is sorted by start and strictly separated:
//!   `list[i].end_timestamp < list[i + 1].start_timestamp`.
//! - Thresholds are never negative; a zero-variance window's threshold is its mean.
//! - Pruning always terminates (bounded by `max_prune_iterations`).
//! - Configuration errors are the only failure mode; degenerate data
//!   (empty, flat, all-zero) simply yields no anomalies.
//!
//! ## Quick Start
//!
//! ```rust
//! use maple_signal_anomaly::{detect_anomalies, DetectionConfig, ErrorSeries};
//!
//! let mut errors = vec![0.0; 100];
//! for e in &mut errors[50..55] {
//!     *e = 100.0;
//! }
//! let series = ErrorSeries::from_values(errors).unwrap();
//!
//! let anomalies = detect_anomalies(&series, &DetectionConfig::with_window(100, 50)).unwrap();
//! assert_eq!(anomalies.len(), 1);
//! assert_eq!(anomalies.as_slice()[0].start_timestamp, 50);
//! assert_eq!(anomalies.as_slice()[0].end_timestamp, 54);
//! ```

#![deny(unsafe_code)]

pub mod anomaly;
pub mod config;
pub mod engine;
pub mod error;
pub mod series;
pub mod threshold;
pub mod window;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use anomaly::{
    merge, Anomaly, AnomalyExtractor, AnomalyList, Candidate, IntervalMerger, SeverityScorer,
};
pub use config::{
    DetectionConfig, ThresholdStrategy, DEFAULT_MIN_CONFIDENCE, DEFAULT_PRUNE_PERCENTAGE,
    DEFAULT_STEP_SIZE, DEFAULT_WINDOW_SIZE, DEFAULT_Z_SCORE,
};
pub use engine::{
    detect_anomalies, AnomalyEngine, AnomalyEngineBuilder, CandidateProducer, GlobalProducer,
    WindowedProducer,
};
pub use error::{AnomalyError, AnomalyResult};
pub use series::{ErrorSeries, Timestamp};
pub use threshold::{mean_std, ThresholdEstimator, WindowStats};
pub use window::{window, Window, Windows};
