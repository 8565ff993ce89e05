//! The detection engine: candidate producers composed by one merge step.
//!
//! Provides:
//! - `CandidateProducer` trait for pluggable detection passes
//! - 2 built-in passes: `WindowedProducer` (sliding windows) and
//!   `GlobalProducer` (whole series as one window)
//! - `AnomalyEngine` that runs every pass and merges the results

use tracing::{debug, info};

use crate::anomaly::{Anomaly, AnomalyExtractor, AnomalyList, IntervalMerger, SeverityScorer};
use crate::config::DetectionConfig;
use crate::error::AnomalyResult;
use crate::series::ErrorSeries;
use crate::threshold::{mean_std, ThresholdEstimator};
use crate::window::{window, Window};

// ── Trait ────────────────────────────────────────────────────────────────

/// Pluggable detection pass.
///
/// Each pass reads the series under the shared configuration and returns
/// scored anomalies in any order; overlaps are resolved by the engine.
pub trait CandidateProducer: Send + Sync {
    /// Scored anomalies found by this pass.
    fn produce(
        &self,
        series: &ErrorSeries,
        config: &DetectionConfig,
    ) -> AnomalyResult<Vec<Anomaly>>;

    /// Name of this pass (for logging).
    fn name(&self) -> &str;
}

// ── Shared per-window procedure ─────────────────────────────────────────

/// Threshold, extract and score one window, appending survivors to `out`.
fn scan_window(window: &Window<'_>, config: &DetectionConfig, out: &mut Vec<Anomaly>) {
    let values = window.values();
    if values.is_empty() {
        return;
    }

    let estimator = ThresholdEstimator::from_config(config)
        .with_max_iterations(config.prune_limit(values.len()));
    let extractor = AnomalyExtractor::with_padding(config.anomaly_padding);
    let scorer = SeverityScorer::new(config.min_confidence);

    let stats = estimator.estimate_with_stats(values);
    let candidates = extractor.extract(window, stats.threshold);
    let found = candidates.len();
    out.extend(
        candidates
            .iter()
            .filter_map(|c| scorer.score(c, values, stats.threshold)),
    );

    let mut lower_found = 0;
    if config.lower_threshold {
        let (mu, _) = mean_std(values);
        let mirrored: Vec<f64> = values.iter().map(|v| 2.0 * mu - v).collect();
        let lower = estimator.estimate(&mirrored);
        let candidates = extractor.extract_values(window, &mirrored, lower);
        lower_found = candidates.len();
        out.extend(
            candidates
                .iter()
                .filter_map(|c| scorer.score(c, &mirrored, lower)),
        );
    }

    debug!(
        start = window.start(),
        end = window.end(),
        threshold = stats.threshold,
        pruned = stats.pruned,
        candidates = found,
        lower_candidates = lower_found,
        "window scanned"
    );
}

// ── 1. Windowed pass ────────────────────────────────────────────────────

/// Local thresholds over sliding windows of `window_size`, `step_size` apart.
#[derive(Clone, Debug, Default)]
pub struct WindowedProducer;

impl CandidateProducer for WindowedProducer {
    fn produce(
        &self,
        series: &ErrorSeries,
        config: &DetectionConfig,
    ) -> AnomalyResult<Vec<Anomaly>> {
        let mut out = Vec::new();
        for w in window(series, config.window_size, config.step_size)? {
            scan_window(&w, config, &mut out);
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        "windowed"
    }
}

// ── 2. Global pass ──────────────────────────────────────────────────────

/// One threshold for the whole series.
#[derive(Clone, Debug, Default)]
pub struct GlobalProducer;

impl CandidateProducer for GlobalProducer {
    fn produce(
        &self,
        series: &ErrorSeries,
        config: &DetectionConfig,
    ) -> AnomalyResult<Vec<Anomaly>> {
        let mut out = Vec::new();
        scan_window(&Window::whole(series), config, &mut out);
        Ok(out)
    }

    fn name(&self) -> &str {
        "global"
    }
}

// ── Anomaly Engine (orchestrator) ───────────────────────────────────────

/// Runs every registered pass over a series and merges the results.
///
/// Holds only the configuration and the passes, so one engine can serve
/// many series from many threads.
pub struct AnomalyEngine {
    config: DetectionConfig,
    producers: Vec<Box<dyn CandidateProducer>>,
}

impl AnomalyEngine {
    /// Engine with the windowed pass only.
    pub fn new(config: DetectionConfig) -> AnomalyResult<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: DetectionConfig) -> AnomalyEngineBuilder {
        AnomalyEngineBuilder {
            config,
            producers: Vec::new(),
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Number of passes registered.
    pub fn producer_count(&self) -> usize {
        self.producers.len()
    }

    pub fn producer_names(&self) -> Vec<&str> {
        self.producers.iter().map(|p| p.name()).collect()
    }

    /// Detect anomalous intervals in `series`.
    ///
    /// An empty series yields an empty list.
    pub fn detect(&self, series: &ErrorSeries) -> AnomalyResult<AnomalyList> {
        if series.is_empty() {
            return Ok(AnomalyList::default());
        }

        let mut passes = Vec::with_capacity(self.producers.len());
        for producer in &self.producers {
            let found = producer.produce(series, &self.config)?;
            debug!(pass = producer.name(), anomalies = found.len(), "pass complete");
            passes.push(found);
        }

        let merged = IntervalMerger::new(self.config.adjacency_tolerance).merge(passes);
        info!(
            samples = series.len(),
            passes = self.producers.len(),
            anomalies = merged.len(),
            "detection complete"
        );
        Ok(merged)
    }
}

impl std::fmt::Debug for AnomalyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnomalyEngine")
            .field("config", &self.config)
            .field("producers", &self.producer_names())
            .finish()
    }
}

/// Builder for `AnomalyEngine`.
pub struct AnomalyEngineBuilder {
    config: DetectionConfig,
    producers: Vec<Box<dyn CandidateProducer>>,
}

impl AnomalyEngineBuilder {
    pub fn with_producer(mut self, producer: impl CandidateProducer + 'static) -> Self {
        self.producers.push(Box::new(producer));
        self
    }

    pub fn with_windowed(self) -> Self {
        self.with_producer(WindowedProducer)
    }

    pub fn with_global(self) -> Self {
        self.with_producer(GlobalProducer)
    }

    /// Validate the configuration and build. With no passes registered the
    /// windowed pass is used.
    pub fn build(mut self) -> AnomalyResult<AnomalyEngine> {
        self.config.validate()?;
        if self.producers.is_empty() {
            self.producers.push(Box::new(WindowedProducer));
        }
        Ok(AnomalyEngine {
            config: self.config,
            producers: self.producers,
        })
    }
}

/// One-shot detection with the default (windowed) engine.
pub fn detect_anomalies(
    series: &ErrorSeries,
    config: &DetectionConfig,
) -> AnomalyResult<AnomalyList> {
    AnomalyEngine::new(config.clone())?.detect(series)
}
