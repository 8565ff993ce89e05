//! The engine's input: an ordered sequence of (timestamp, error) pairs.

use serde::Serialize;

use crate::error::{AnomalyError, AnomalyResult};

/// Timestamp unit of the upstream signal (sample index or epoch time).
pub type Timestamp = i64;

/// Per-timestep reconstruction/prediction errors produced by an upstream model.
///
/// Stored as parallel vectors so a window's values are a plain `&[f64]`.
/// Timestamps are strictly increasing and every value is finite; both are
/// checked once at construction and the series is immutable afterwards.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ErrorSeries {
    timestamps: Vec<Timestamp>,
    values: Vec<f64>,
}

impl ErrorSeries {
    /// Build a series from parallel timestamp/value vectors.
    pub fn new(timestamps: Vec<Timestamp>, values: Vec<f64>) -> AnomalyResult<Self> {
        if timestamps.len() != values.len() {
            return Err(AnomalyError::LengthMismatch {
                timestamps: timestamps.len(),
                values: values.len(),
            });
        }
        for (index, pair) in timestamps.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(AnomalyError::UnorderedTimestamps {
                    index: index + 1,
                    previous: pair[0],
                    current: pair[1],
                });
            }
        }
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(AnomalyError::NonFiniteValue { index, value });
        }
        Ok(Self { timestamps, values })
    }

    /// Build a series from `(timestamp, value)` pairs.
    pub fn from_pairs<I>(pairs: I) -> AnomalyResult<Self>
    where
        I: IntoIterator<Item = (Timestamp, f64)>,
    {
        let (timestamps, values) = pairs.into_iter().unzip();
        Self::new(timestamps, values)
    }

    /// Build a series whose timestamps are the sample indices `0..n`.
    pub fn from_values(values: Vec<f64>) -> AnomalyResult<Self> {
        let timestamps = (0..values.len() as Timestamp).collect();
        Self::new(timestamps, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Timestamp at `index`, if in range.
    pub fn timestamp(&self, index: usize) -> Option<Timestamp> {
        self.timestamps.get(index).copied()
    }

    /// Iterate `(timestamp, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (Timestamp, f64)> + '_ {
        self.timestamps
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }
}
