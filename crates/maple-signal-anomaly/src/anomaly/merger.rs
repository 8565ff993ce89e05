//! IntervalMerger: folds anomaly sequences into one `AnomalyList`.
//!
//! Inputs may come from overlapping windows or from different detection
//! passes over the same series. All of them are sorted together and swept
//! once; the result depends only on the multiset of inputs, not on which
//! list an anomaly arrived in.

use std::cmp::Ordering;

use crate::series::Timestamp;

use super::types::{Anomaly, AnomalyList};

/// Sweep-line merger of anomalous intervals.
#[derive(Clone, Debug, Default)]
pub struct IntervalMerger {
    tolerance: Timestamp,
}

impl IntervalMerger {
    /// Intervals separated by at most `tolerance` timestamp units are merged.
    /// Touching intervals (`next.start == current.end`) always merge.
    pub fn new(tolerance: Timestamp) -> Self {
        Self {
            tolerance: tolerance.max(0),
        }
    }

    pub fn tolerance(&self) -> Timestamp {
        self.tolerance
    }

    /// Merge any number of unsorted anomaly sequences.
    pub fn merge<I, L>(&self, lists: I) -> AnomalyList
    where
        I: IntoIterator<Item = L>,
        L: IntoIterator<Item = Anomaly>,
    {
        let mut all: Vec<Anomaly> = lists.into_iter().flatten().collect();
        all.sort_by(merge_order);

        let mut merged: Vec<Anomaly> = Vec::with_capacity(all.len());
        let mut current: Option<Anomaly> = None;

        for anomaly in all {
            if let Some(cur) = current.as_mut() {
                if cur.reaches(&anomaly, self.tolerance) {
                    cur.absorb(&anomaly);
                    continue;
                }
            }
            if let Some(done) = current.replace(anomaly) {
                merged.push(done);
            }
        }
        merged.extend(current);

        AnomalyList::from_sorted(merged)
    }
}

/// Start ascending; on equal starts the longer interval first so it anchors
/// the sweep, then the stronger one.
fn merge_order(a: &Anomaly, b: &Anomaly) -> Ordering {
    a.start_timestamp
        .cmp(&b.start_timestamp)
        .then_with(|| b.end_timestamp.cmp(&a.end_timestamp))
        .then_with(|| b.score.total_cmp(&a.score))
        .then_with(|| b.severity.total_cmp(&a.severity))
}

/// Merge with the default (touching-only) tolerance.
pub fn merge<I, L>(lists: I) -> AnomalyList
where
    I: IntoIterator<Item = L>,
    L: IntoIterator<Item = Anomaly>,
{
    IntervalMerger::default().merge(lists)
}
