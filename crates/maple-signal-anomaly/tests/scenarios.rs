//! End-to-end detection scenarios over small synthetic error series.

use maple_signal_anomaly::*;

fn zeros_with_block(n: usize, block: std::ops::Range<usize>, value: f64) -> ErrorSeries {
    let mut v = vec![0.0; n];
    for x in &mut v[block] {
        *x = value;
    }
    ErrorSeries::from_values(v).unwrap()
}

/// 0/1 alternating errors with one spike of 3.5 at index 50.
fn alternating_with_spike() -> ErrorSeries {
    let mut v: Vec<f64> = (0..100).map(|i| (i % 2) as f64).collect();
    v[50] = 3.5;
    ErrorSeries::from_values(v).unwrap()
}

#[test]
fn flat_zero_series_has_no_anomalies() {
    let series = ErrorSeries::from_values(vec![0.0; 100]).unwrap();

    let threshold = ThresholdEstimator::default().estimate(series.values());
    assert!(threshold.abs() < 1e-12);

    let list = detect_anomalies(&series, &DetectionConfig::with_window(100, 50)).unwrap();
    assert!(list.is_empty());
}

#[test]
fn block_of_large_errors_is_one_confident_anomaly() {
    let series = ErrorSeries::from_pairs((0..100).map(|i| {
        let value = if (50..55).contains(&i) { 100.0 } else { 0.0 };
        (1_600_000_000 + i * 60, value)
    }))
    .unwrap();

    let list = detect_anomalies(&series, &DetectionConfig::with_window(100, 100)).unwrap();
    assert_eq!(list.len(), 1);
    let a = list.as_slice()[0];
    assert_eq!(a.start_timestamp, series.timestamp(50).unwrap());
    assert_eq!(a.end_timestamp, series.timestamp(54).unwrap());
    assert!(a.score > 0.99);
}

#[test]
fn overlapping_windows_collapse_to_union() {
    let series = zeros_with_block(100, 48..53, 100.0);
    let config = DetectionConfig::with_window(50, 25);

    // Each window on its own sees part (or all) of the block.
    let estimator = ThresholdEstimator::from_config(&config);
    let extractor = AnomalyExtractor::new();
    let scorer = SeverityScorer::new(config.min_confidence);
    let per_window: Vec<Vec<Anomaly>> = window(&series, 50, 25)
        .unwrap()
        .map(|w| {
            let t = estimator.estimate(w.values());
            extractor
                .extract(&w, t)
                .iter()
                .filter_map(|c| scorer.score(c, w.values(), t))
                .collect()
        })
        .collect();
    let hits: Vec<_> = per_window.iter().filter(|found| !found.is_empty()).collect();
    assert!(hits.len() >= 2, "block should be seen by overlapping windows");

    let list = merge(per_window);
    assert_eq!(list.len(), 1);
    assert_eq!(
        (list.as_slice()[0].start_timestamp, list.as_slice()[0].end_timestamp),
        (48, 52)
    );
}

#[test]
fn weak_single_sample_spike_is_dropped_by_scorer() {
    let series = alternating_with_spike();
    let strict = DetectionConfig {
        min_confidence: 0.5,
        ..DetectionConfig::with_window(100, 100)
    };

    // The extractor does see the spike...
    let w = Window::whole(&series);
    let threshold = ThresholdEstimator::from_config(&strict).estimate(w.values());
    let candidates = AnomalyExtractor::new().extract(&w, threshold);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].start_index, 50);

    // ...but its confidence (≈0.33) is under the floor.
    let scorer = SeverityScorer::new(strict.min_confidence);
    assert!(scorer.score(&candidates[0], w.values(), threshold).is_none());
    assert!(detect_anomalies(&series, &strict).unwrap().is_empty());
}

#[test]
fn weak_spike_survives_default_confidence_floor() {
    let series = alternating_with_spike();
    let list = detect_anomalies(&series, &DetectionConfig::with_window(100, 100)).unwrap();
    assert_eq!(list.len(), 1);
    let a = list.as_slice()[0];
    assert_eq!((a.start_timestamp, a.end_timestamp), (50, 50));
    assert!(a.score > 0.3 && a.score < 0.36, "score was {}", a.score);
}

#[test]
fn pruned_threshold_detects_more_than_fixed() {
    let series = alternating_with_spike();
    let w = Window::whole(&series);
    let pruned = ThresholdEstimator::new(4.0, 0.1).estimate_with_stats(w.values());
    let fixed = ThresholdEstimator::new(4.0, 0.1)
        .with_strategy(ThresholdStrategy::Fixed)
        .estimate_with_stats(w.values());
    assert_eq!(pruned.iterations, 1);
    assert_eq!(pruned.pruned, 1);
    assert!(pruned.threshold < fixed.threshold);
}

#[test]
fn higher_z_never_finds_more_anomalies() {
    let mut v: Vec<f64> = (0..400)
        .map(|i| {
            let x = i as f64;
            1.0 + 0.3 * (x * 0.7).sin() + 0.2 * (x * 2.3).sin()
        })
        .collect();
    for (i, magnitude) in [(40, 3.0), (120, 5.0), (210, 8.0), (300, 12.0), (350, 2.2)] {
        v[i] += magnitude;
    }
    let series = ErrorSeries::from_values(v).unwrap();

    let counts: Vec<usize> = [1.0, 2.0, 3.0, 4.0, 6.0, 8.0, 10.0]
        .iter()
        .map(|&z| {
            let config = DetectionConfig {
                z_score: z,
                ..DetectionConfig::with_window(100, 50)
            };
            detect_anomalies(&series, &config).unwrap().len()
        })
        .collect();

    assert!(
        counts.windows(2).all(|pair| pair[1] <= pair[0]),
        "counts by z: {counts:?}"
    );
    assert_eq!(counts[3], 5, "z = 4 should isolate the five injected spikes");
}

#[test]
fn windowed_and_global_passes_compose() {
    // A local burst in a quiet region plus a global level shift.
    let mut v = vec![0.0; 300];
    for x in &mut v[40..43] {
        *x = 5.0;
    }
    for x in &mut v[200..300] {
        *x = 1.0;
    }
    let series = ErrorSeries::from_values(v).unwrap();
    let config = DetectionConfig::with_window(100, 50);

    let windowed = AnomalyEngine::new(config.clone()).unwrap().detect(&series).unwrap();
    let both = AnomalyEngine::builder(config)
        .with_windowed()
        .with_global()
        .build()
        .unwrap()
        .detect(&series)
        .unwrap();

    assert!(windowed.is_well_formed());
    assert!(both.is_well_formed());
    assert!(both.iter().any(|a| a.start_timestamp <= 40 && a.end_timestamp >= 42));
    // Every windowed detection is covered by the composed result.
    for a in &windowed {
        assert!(both
            .iter()
            .any(|b| b.start_timestamp <= a.start_timestamp && b.end_timestamp >= a.end_timestamp));
    }
}

#[test]
fn adjacency_tolerance_joins_nearby_bursts() {
    let mut v = vec![0.0; 100];
    v[30] = 50.0;
    v[33] = 50.0;
    let series = ErrorSeries::from_values(v).unwrap();

    let tight = detect_anomalies(&series, &DetectionConfig::with_window(100, 100)).unwrap();
    assert_eq!(tight.len(), 2);

    let loose = DetectionConfig {
        adjacency_tolerance: 3,
        ..DetectionConfig::with_window(100, 100)
    };
    let joined = detect_anomalies(&series, &loose).unwrap();
    assert_eq!(joined.to_tuples().len(), 1);
    assert_eq!(joined.as_slice()[0].start_timestamp, 30);
    assert_eq!(joined.as_slice()[0].end_timestamp, 33);
}

#[test]
fn invalid_configuration_is_reported_with_context() {
    let series = ErrorSeries::from_values(vec![1.0; 10]).unwrap();
    let config = DetectionConfig {
        prune_percentage: 1.5,
        ..DetectionConfig::with_window(5, 5)
    };
    let err = detect_anomalies(&series, &config).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("prune_percentage"));
    assert!(msg.contains("1.5"));
}

#[test]
fn output_serializes_for_downstream_tables() {
    let series = zeros_with_block(100, 10..12, 9.0);
    let list = detect_anomalies(&series, &DetectionConfig::with_window(50, 25)).unwrap();
    let json = serde_json::to_value(&list).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["start_timestamp"], 10);
    assert_eq!(rows[0]["end_timestamp"], 11);
}
