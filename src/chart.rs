//! Visualization adapter: turns analysis results into chart-ready
//! series. Pure data shaping; rendering belongs to the embedding UI.

use crate::constants::FEED_CONFIG;
use crate::types::{AnalysisData, ChartPoint, ChartSeries, ChartX, MetricsSummary, Sample};

/// Time series over raw samples, truncated to the configured point cap.
pub fn raw_series(samples: &[Sample]) -> ChartSeries {
    let cap = FEED_CONFIG.render.chart_max_points;
    let shown = samples.len().min(cap);
    let points = samples[..shown]
        .iter()
        .map(|s| ChartPoint {
            x: ChartX::Time(s.timestamp),
            y: s.value,
        })
        .collect();
    ChartSeries {
        points,
        truncated: samples.len() > shown,
        shown,
        available: samples.len(),
    }
}

/// Bar series over a metrics summary, in a fixed order so the chart is
/// stable across refreshes. Absent statistics are skipped, not zeroed.
pub fn summary_bars(summary: &MetricsSummary) -> ChartSeries {
    let bars = [
        ("min", summary.min),
        ("mean", summary.mean),
        ("median", summary.median),
        ("max", summary.max),
    ];
    let points: Vec<ChartPoint> = bars
        .iter()
        .filter_map(|&(label, value)| {
            value.map(|y| ChartPoint {
                x: ChartX::Label(label),
                y,
            })
        })
        .collect();
    let shown = points.len();
    ChartSeries {
        points,
        truncated: false,
        shown,
        available: shown,
    }
}

/// Picks the series for whatever the active analysis produced. Trend
/// and quality results are narrative-only and draw nothing.
pub fn series_for(data: &AnalysisData) -> Option<ChartSeries> {
    match data {
        AnalysisData::Metrics(summary) => Some(summary_bars(summary)),
        AnalysisData::Raw(samples) => Some(raw_series(samples)),
        AnalysisData::Trend(_) | AnalysisData::Quality(_) => None,
    }
}
