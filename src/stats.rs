//! Statistics deriver: the single place descriptive statistics and the
//! qualitative classifications are computed. Consolidates what the
//! dashboard pages used to re-derive ad hoc.

use crate::constants::THRESHOLDS;
use crate::types::{MetricsSummary, QualityRating, QualitySummary, Sample, TrendDirection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variability {
    Low,
    Moderate,
    High,
}

/// Derives descriptive statistics over a batch of samples.
///
/// An empty batch derives to a summary with every field absent; a
/// single sample yields `stddev = 0` and `delta = 0`. `delta` is last
/// minus first in arrival order, matching the feed's own semantics,
/// and `stddev` is the population variant.
pub fn summarize(samples: &[Sample]) -> MetricsSummary {
    if samples.is_empty() {
        return MetricsSummary::default();
    }

    let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
    let n = values.len() as f64;

    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();
    let mad = values.iter().map(|x| (x - mean).abs()).sum::<f64>() / n;

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let median = median_of(&values);

    let (first, last) = match (samples.first(), samples.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return MetricsSummary::default(),
    };
    let delta = last.value - first.value;
    let elapsed = last.timestamp - first.timestamp;
    let rate_of_change = if elapsed != 0 {
        Some(delta / elapsed as f64)
    } else {
        None
    };
    let mean_z_score = if stddev > 0.0 { Some(mad / stddev) } else { None };

    MetricsSummary {
        count: Some(n),
        min: Some(min),
        max: Some(max),
        mean: Some(mean),
        median: Some(median),
        stddev: Some(stddev),
        mad: Some(mad),
        delta: Some(delta),
        rate_of_change,
        mean_z_score,
        explanation: None,
    }
}

/// Midpoint of the sorted values; even-length input averages the two
/// middle values, no interpolation.
fn median_of(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Step function over the standard deviation. Boundary samples:
/// 0.79 is low, 0.8 is moderate, 1.5 is moderate, 1.51 is high.
pub fn classify_variability(stddev: f64) -> Variability {
    let t = &*THRESHOLDS;
    if stddev > t.stddev_high {
        Variability::High
    } else if stddev >= t.stddev_moderate {
        Variability::Moderate
    } else {
        Variability::Low
    }
}

pub fn classify_trend(slope: f64) -> TrendDirection {
    if slope > 0.0 {
        TrendDirection::Rising
    } else if slope < 0.0 {
        TrendDirection::Falling
    } else {
        TrendDirection::Stable
    }
}

/// Whether the slope is large enough to be worth monitoring.
pub fn trend_is_significant(slope: f64) -> bool {
    slope.abs() > THRESHOLDS.slope_significant
}

/// Assesses sensor data quality: the longest run of identical
/// consecutive readings (a long run suggests a stuck sensor) and the
/// mean relative variation between adjacent readings.
pub fn quality_of(samples: &[Sample]) -> QualitySummary {
    if samples.is_empty() {
        return QualitySummary::default();
    }

    let mut longest_run: u64 = 1;
    let mut current_run: u64 = 1;
    let mut variation_sum = 0.0;
    let mut variation_count: u64 = 0;

    for pair in samples.windows(2) {
        if pair[1].value == pair[0].value {
            current_run += 1;
            longest_run = longest_run.max(current_run);
        } else {
            current_run = 1;
        }
        if pair[0].value != 0.0 {
            variation_sum += ((pair[1].value - pair[0].value) / pair[0].value).abs();
            variation_count += 1;
        }
    }

    let mean_relative_variation = if variation_count > 0 {
        variation_sum / variation_count as f64
    } else {
        0.0
    };

    let t = &*THRESHOLDS;
    let overall_quality = if longest_run > t.stuck_sensor_run {
        QualityRating::Poor
    } else if mean_relative_variation <= t.rel_var_good {
        QualityRating::Good
    } else if mean_relative_variation <= t.rel_var_fair {
        QualityRating::Fair
    } else {
        QualityRating::Poor
    };

    QualitySummary {
        repeated_consecutive_readings: longest_run,
        mean_relative_variation,
        overall_quality,
    }
}
