//! Candidate extraction, severity scoring, and interval merging.
//!
//! ## Architecture
//!
//! ```text
//!   Window + threshold
//!       │
//!       ▼
//!   AnomalyExtractor ──► Candidate (unscored runs)
//!       │
//!       ▼
//!   SeverityScorer ──► Anomaly (score, severity) ── drops score < min_confidence
//!       │
//!       ▼
//!   IntervalMerger (all windows, all passes) ──► AnomalyList
//! ```

pub mod extractor;
pub mod merger;
pub mod scorer;
pub mod types;

pub use extractor::AnomalyExtractor;
pub use merger::{merge, IntervalMerger};
pub use scorer::SeverityScorer;
pub use types::{Anomaly, AnomalyList, Candidate};
