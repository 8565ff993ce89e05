//! Anomaly type definitions.
//!
//! `Candidate` is an unscored run of above-threshold samples straight out of
//! the extractor. The scorer turns surviving candidates into `Anomaly` values,
//! and the merger folds any number of those into one `AnomalyList`.

use serde::{Deserialize, Serialize};

use crate::series::Timestamp;

// ── Candidate (pre-scoring) ─────────────────────────────────────────────

/// A maximal run of samples above a window's threshold.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// First series index of the run (after padding).
    pub start_index: usize,
    /// Last series index of the run, inclusive (after padding).
    pub end_index: usize,
    pub start_timestamp: Timestamp,
    pub end_timestamp: Timestamp,
    /// Largest error value inside the unpadded run.
    pub peak: f64,
}

// ── Anomaly ─────────────────────────────────────────────────────────────

/// One contiguous anomalous interval.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub start_timestamp: Timestamp,
    pub end_timestamp: Timestamp,
    /// Confidence in [0, 1]; used for ranking and pruning.
    pub score: f64,
    /// Normalized excess over the threshold, `>= 0`.
    pub severity: f64,
}

impl Anomaly {
    pub fn new(start_timestamp: Timestamp, end_timestamp: Timestamp, score: f64, severity: f64) -> Self {
        Self {
            start_timestamp,
            end_timestamp,
            score,
            severity,
        }
    }

    /// Whether `other` starts no later than `tolerance` after this one ends.
    pub fn reaches(&self, other: &Anomaly, tolerance: Timestamp) -> bool {
        other.start_timestamp <= self.end_timestamp.saturating_add(tolerance)
    }

    /// Widen this interval to cover `other`, keeping the stronger score and severity.
    pub fn absorb(&mut self, other: &Anomaly) {
        self.start_timestamp = self.start_timestamp.min(other.start_timestamp);
        self.end_timestamp = self.end_timestamp.max(other.end_timestamp);
        self.score = self.score.max(other.score);
        self.severity = self.severity.max(other.severity);
    }

    /// `(start, end, score, severity)`.
    pub fn to_tuple(&self) -> (Timestamp, Timestamp, f64, f64) {
        (
            self.start_timestamp,
            self.end_timestamp,
            self.score,
            self.severity,
        )
    }
}

// ── Anomaly List (final output) ─────────────────────────────────────────

/// Sorted, non-overlapping anomalies.
///
/// Only `merge` builds one, so for every adjacent pair
/// `list[i].end_timestamp < list[i + 1].start_timestamp`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnomalyList(Vec<Anomaly>);

impl AnomalyList {
    pub(crate) fn from_sorted(anomalies: Vec<Anomaly>) -> Self {
        Self(anomalies)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Anomaly> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Anomaly] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<Anomaly> {
        self.0
    }

    /// The list as `(start, end, score, severity)` tuples.
    pub fn to_tuples(&self) -> Vec<(Timestamp, Timestamp, f64, f64)> {
        self.0.iter().map(Anomaly::to_tuple).collect()
    }

    /// Whether the list is sorted with strictly separated intervals.
    pub fn is_well_formed(&self) -> bool {
        self.0.iter().all(|a| a.start_timestamp <= a.end_timestamp)
            && self
                .0
                .windows(2)
                .all(|pair| pair[0].end_timestamp < pair[1].start_timestamp)
    }
}

impl<'a> IntoIterator for &'a AnomalyList {
    type Item = &'a Anomaly;
    type IntoIter = std::slice::Iter<'a, Anomaly>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for AnomalyList {
    type Item = Anomaly;
    type IntoIter = std::vec::IntoIter<Anomaly>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_takes_union_and_maxima() {
        let mut a = Anomaly::new(10, 20, 0.4, 1.0);
        a.absorb(&Anomaly::new(15, 30, 0.9, 0.5));
        assert_eq!(a.to_tuple(), (10, 30, 0.9, 1.0));
    }

    #[test]
    fn reaches_respects_tolerance() {
        let a = Anomaly::new(0, 10, 0.5, 0.5);
        assert!(a.reaches(&Anomaly::new(10, 12, 0.5, 0.5), 0));
        assert!(!a.reaches(&Anomaly::new(11, 12, 0.5, 0.5), 0));
        assert!(a.reaches(&Anomaly::new(13, 14, 0.5, 0.5), 3));
    }

    #[test]
    fn reaches_does_not_overflow() {
        let a = Anomaly::new(0, i64::MAX, 0.5, 0.5);
        assert!(a.reaches(&Anomaly::new(5, 6, 0.5, 0.5), i64::MAX));
    }

    #[test]
    fn well_formed_checks_strict_separation() {
        let ok = AnomalyList::from_sorted(vec![
            Anomaly::new(0, 5, 0.1, 0.1),
            Anomaly::new(6, 9, 0.1, 0.1),
        ]);
        assert!(ok.is_well_formed());

        let touching = AnomalyList::from_sorted(vec![
            Anomaly::new(0, 5, 0.1, 0.1),
            Anomaly::new(5, 9, 0.1, 0.1),
        ]);
        assert!(!touching.is_well_formed());
    }

    #[test]
    fn anomaly_list_serializes_as_array() {
        let list = AnomalyList::from_sorted(vec![Anomaly::new(1, 2, 0.5, 0.7)]);
        let json = serde_json::to_string(&list).unwrap();
        assert!(json.starts_with('['));
        let restored: AnomalyList = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, list);
    }
}
