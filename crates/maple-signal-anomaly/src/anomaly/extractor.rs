//! AnomalyExtractor: turns above-threshold runs into candidate intervals.

use crate::window::Window;

use super::types::Candidate;

/// Scans a window for maximal runs of values strictly above a threshold.
///
/// Single-sample runs are kept; weak candidates are the scorer's business.
#[derive(Clone, Debug, Default)]
pub struct AnomalyExtractor {
    padding: usize,
}

impl AnomalyExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Widen every run by `padding` samples on each side, clamped to the series.
    pub fn with_padding(padding: usize) -> Self {
        Self { padding }
    }

    /// Candidates from the window's own error values.
    pub fn extract(&self, window: &Window<'_>, threshold: f64) -> Vec<Candidate> {
        self.extract_values(window, window.values(), threshold)
    }

    /// Candidates from `values`, a per-sample transform of the window's errors.
    ///
    /// `values[i]` must correspond to series index `window.start() + i`.
    pub fn extract_values(
        &self,
        window: &Window<'_>,
        values: &[f64],
        threshold: f64,
    ) -> Vec<Candidate> {
        debug_assert_eq!(values.len(), window.len());

        let mut candidates = Vec::new();
        let mut run: Option<(usize, f64)> = None;

        for (offset, &value) in values.iter().enumerate() {
            if value > threshold {
                run = match run {
                    Some((start, peak)) => Some((start, peak.max(value))),
                    None => Some((offset, value)),
                };
            } else if let Some((start, peak)) = run.take() {
                candidates.push(self.candidate(window, start, offset - 1, peak));
            }
        }
        if let Some((start, peak)) = run {
            candidates.push(self.candidate(window, start, values.len() - 1, peak));
        }

        candidates
    }

    fn candidate(&self, window: &Window<'_>, first: usize, last: usize, peak: f64) -> Candidate {
        let series = window.series();
        let start_index = (window.start() + first).saturating_sub(self.padding);
        let end_index = (window.start() + last + self.padding).min(series.len() - 1);
        let timestamps = series.timestamps();
        Candidate {
            start_index,
            end_index,
            start_timestamp: timestamps[start_index],
            end_timestamp: timestamps[end_index],
            peak,
        }
    }
}
