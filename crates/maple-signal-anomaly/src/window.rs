//! Windower: slices an error series into fixed-size overlapping windows.
//!
//! Windows start at `0, step, 2·step, …` for as long as a full window fits.
//! If the last full window stops short of the series end, one shorter tail
//! window `[k·step, n)` is emitted. The sequence is lazy and `Clone`, so a
//! caller can restart it without recomputing anything.

use crate::error::{AnomalyError, AnomalyResult};
use crate::series::{ErrorSeries, Timestamp};

/// A contiguous slice `[start, end)` of an error series.
#[derive(Clone, Copy, Debug)]
pub struct Window<'a> {
    series: &'a ErrorSeries,
    start: usize,
    end: usize,
}

impl<'a> Window<'a> {
    /// The whole series as a single window.
    pub fn whole(series: &'a ErrorSeries) -> Self {
        Self {
            series,
            start: 0,
            end: series.len(),
        }
    }

    /// First index (inclusive).
    pub fn start(&self) -> usize {
        self.start
    }

    /// Last index (exclusive).
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Error values covered by this window.
    pub fn values(&self) -> &'a [f64] {
        &self.series.values()[self.start..self.end]
    }

    /// Timestamps covered by this window.
    pub fn timestamps(&self) -> &'a [Timestamp] {
        &self.series.timestamps()[self.start..self.end]
    }

    /// The series this window was cut from.
    pub fn series(&self) -> &'a ErrorSeries {
        self.series
    }
}

/// Lazy, finite, restartable sequence of windows over one series.
#[derive(Clone, Debug)]
pub struct Windows<'a> {
    series: &'a ErrorSeries,
    window_size: usize,
    step_size: usize,
    next_start: usize,
    done: bool,
}

impl<'a> Iterator for Windows<'a> {
    type Item = Window<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.series.len();
        if self.done || n == 0 {
            self.done = true;
            return None;
        }

        let start = self.next_start;
        let full_end = start + self.window_size;
        if full_end <= n {
            self.next_start += self.step_size;
            if full_end == n {
                self.done = true;
            }
            return Some(Window {
                series: self.series,
                start,
                end: full_end,
            });
        }

        // The previous full window (if any) ended before `n`, and
        // `start <= previous end`, so the tail is non-empty and adds coverage.
        self.done = true;
        Some(Window {
            series: self.series,
            start,
            end: n,
        })
    }
}

/// Slice `series` into windows of `window_size` samples, `step_size` apart.
///
/// Fails with `InvalidConfiguration` when either size is zero or the step
/// exceeds the window.
pub fn window(
    series: &ErrorSeries,
    window_size: usize,
    step_size: usize,
) -> AnomalyResult<Windows<'_>> {
    if window_size == 0 {
        return Err(AnomalyError::invalid(
            "window_size",
            window_size,
            "must be positive",
        ));
    }
    if step_size == 0 {
        return Err(AnomalyError::invalid(
            "step_size",
            step_size,
            "must be positive",
        ));
    }
    if step_size > window_size {
        return Err(AnomalyError::invalid(
            "step_size",
            step_size,
            "must not exceed window_size",
        ));
    }
    Ok(Windows {
        series,
        window_size,
        step_size,
        next_start: 0,
        done: false,
    })
}
