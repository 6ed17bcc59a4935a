//! Narrative report generator. Pure text over an `AnalysisData`: no
//! network, no clock, no randomness, so the same scope and data always
//! produce the same report.

use std::fmt::Write as _;

use crate::constants::{FEED_CONFIG, THRESHOLDS};
use crate::stats::{self, Variability};
use crate::types::{
    AnalysisData, AnalysisKind, AnalysisScope, MetricsSummary, QualityRating, QualitySummary,
    Report, ReportSection, Sample, TrendDirection, TrendSummary,
};

/// Builds the narrative report for the active scope.
pub fn generate(scope: &AnalysisScope, data: &AnalysisData) -> Report {
    let title = format!("{} ({})", scope.kind.label(), scope.period.label());
    let sections = match data {
        AnalysisData::Metrics(summary) => metrics_sections(summary, scope.kind),
        AnalysisData::Trend(trend) => trend_sections(trend),
        AnalysisData::Quality(quality) => quality_sections(quality),
        AnalysisData::Raw(samples) => raw_sections(samples),
    };
    Report { title, sections }
}

/// Renders an optional value, or "N/A" when the feed omitted it. The
/// report never invents a zero for a missing statistic.
fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.3}"),
        None => "N/A".to_string(),
    }
}

fn fmt_count(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.0}"),
        None => "N/A".to_string(),
    }
}

fn metrics_sections(summary: &MetricsSummary, kind: AnalysisKind) -> Vec<ReportSection> {
    let mut sections = Vec::new();

    let mut overview = String::new();
    let _ = writeln!(overview, "Readings analyzed: {}", fmt_count(summary.count));
    let _ = writeln!(
        overview,
        "Operating range: {} to {} bar",
        fmt_opt(summary.min),
        fmt_opt(summary.max)
    );
    let _ = writeln!(overview, "Mean: {} bar", fmt_opt(summary.mean));
    let _ = writeln!(overview, "Median: {} bar", fmt_opt(summary.median));
    let _ = writeln!(
        overview,
        "Standard deviation: {} bar",
        fmt_opt(summary.stddev)
    );
    if kind == AnalysisKind::FullMetrics {
        let _ = writeln!(overview, "Mean absolute deviation: {}", fmt_opt(summary.mad));
        let _ = writeln!(overview, "Delta over the period: {}", fmt_opt(summary.delta));
        let _ = writeln!(
            overview,
            "Rate of change: {} bar/s",
            fmt_opt(summary.rate_of_change)
        );
        let _ = writeln!(
            overview,
            "Dispersion ratio: {}",
            fmt_opt(summary.mean_z_score)
        );
    }
    if let Some(explanation) = &summary.explanation {
        let _ = writeln!(overview, "Feed notes: {explanation}");
    }
    sections.push(ReportSection {
        heading: "Operating overview".to_string(),
        body: overview.trim_end().to_string(),
    });

    sections.push(ReportSection {
        heading: "Diagnosis".to_string(),
        body: diagnosis_text(summary),
    });

    sections.push(ReportSection {
        heading: "Recommendations".to_string(),
        body: recommendations_text(summary),
    });

    sections
}

fn diagnosis_text(summary: &MetricsSummary) -> String {
    let mut body = String::new();

    match summary.stddev {
        Some(stddev) => {
            let assessment = match stats::classify_variability(stddev) {
                Variability::High => {
                    "High variability: pressure swings widely, which usually points to \
                     irregular demand or a regulation problem."
                }
                Variability::Moderate => {
                    "Moderate variability: pressure moves with the duty cycle but stays \
                     within a workable band."
                }
                Variability::Low => {
                    "Low variability: pressure is stable and the regulation loop is \
                     holding its setpoint."
                }
            };
            let _ = writeln!(body, "{assessment}");
        }
        None => {
            let _ = writeln!(body, "Variability could not be assessed: no spread data.");
        }
    }

    match summary.amplitude() {
        Some(amplitude) => {
            let _ = writeln!(
                body,
                "Observed amplitude over the period: {amplitude:.3} bar."
            );
        }
        None => {
            let _ = writeln!(body, "Operating amplitude unavailable.");
        }
    }

    body.trim_end().to_string()
}

fn recommendations_text(summary: &MetricsSummary) -> String {
    let mut lines: Vec<&str> = Vec::new();

    let variability = summary.stddev.map(stats::classify_variability);
    match variability {
        Some(Variability::High) => {
            lines.push("- Inspect pressure regulation valves and check for oscillating demand.");
            lines.push("- Run a leak survey on the distribution lines.");
            lines.push("- Verify sensor calibration before acting on the readings.");
        }
        Some(Variability::Moderate) => {
            lines.push("- Review intake filters and schedule routine valve maintenance.");
            lines.push("- Keep an eye on the trend analysis for drift.");
        }
        Some(Variability::Low) => {
            lines.push("- No corrective action needed; keep the current maintenance schedule.");
        }
        None => {
            lines.push("- Collect more readings before drawing conclusions.");
        }
    }

    lines.join("\n")
}

fn trend_sections(trend: &TrendSummary) -> Vec<ReportSection> {
    let mut body = String::new();

    let direction = match trend.direction {
        TrendDirection::Rising => "Pressure is trending upward",
        TrendDirection::Falling => "Pressure is trending downward",
        TrendDirection::Stable => "Pressure shows no directional trend",
    };
    let _ = writeln!(body, "{} (slope {:.5}).", direction, trend.slope);

    if stats::trend_is_significant(trend.slope) {
        let _ = writeln!(
            body,
            "The slope exceeds {:.2} in magnitude; monitor the asset and plan an inspection.",
            THRESHOLDS.slope_significant
        );
    } else {
        let _ = writeln!(body, "The slope is negligible; the system reads as stable.");
    }

    let _ = writeln!(
        body,
        "Mean acceleration: {:.5}.",
        trend.mean_acceleration
    );

    vec![ReportSection {
        heading: "Trend".to_string(),
        body: body.trim_end().to_string(),
    }]
}

fn quality_sections(quality: &QualitySummary) -> Vec<ReportSection> {
    let mut body = String::new();

    if quality.repeated_consecutive_readings > THRESHOLDS.stuck_sensor_run {
        let _ = writeln!(
            body,
            "Longest run of identical readings: {} (possible stuck sensor).",
            quality.repeated_consecutive_readings
        );
    } else {
        let _ = writeln!(
            body,
            "Longest run of identical readings: {}.",
            quality.repeated_consecutive_readings
        );
    }

    let _ = writeln!(
        body,
        "Mean relative variation between readings: {:.4}.",
        quality.mean_relative_variation
    );

    let rating = match quality.overall_quality {
        QualityRating::Good => "Overall quality: good. The readings are trustworthy.",
        QualityRating::Fair => {
            "Overall quality: fair. Usable, but cross-check against a reference gauge."
        }
        QualityRating::Poor => {
            "Overall quality: poor. Do not base decisions on this sensor until it is serviced."
        }
    };
    let _ = writeln!(body, "{rating}");

    vec![ReportSection {
        heading: "Data quality".to_string(),
        body: body.trim_end().to_string(),
    }]
}

fn raw_sections(samples: &[Sample]) -> Vec<ReportSection> {
    let render = &FEED_CONFIG.render;
    let shown = samples.len().min(render.report_sample_cap);
    let prefix = &samples[..shown];

    let mut body = String::new();
    if samples.len() > shown {
        let _ = writeln!(
            body,
            "Analyzing the first {shown} of {} accumulated samples.",
            samples.len()
        );
    } else {
        let _ = writeln!(body, "Analyzing {shown} samples.");
    }

    let summary = stats::summarize(prefix);
    let _ = writeln!(
        body,
        "Range: {} to {} bar, mean {}.",
        fmt_opt(summary.min),
        fmt_opt(summary.max),
        fmt_opt(summary.mean)
    );

    let pair_window = prefix.len().min(render.report_pair_cap + 1);
    let pairs = pair_window.saturating_sub(1);
    if pairs > 0 {
        let stable = prefix[..pair_window]
            .windows(2)
            .filter(|pair| pair[1].value == pair[0].value)
            .count();
        let _ = writeln!(
            body,
            "Stability: {stable} of {pairs} adjacent readings unchanged."
        );
    }

    vec![ReportSection {
        heading: "Raw sample summary".to_string(),
        body: body.trim_end().to_string(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scope(kind: crate::types::AnalysisKind) -> AnalysisScope {
        AnalysisScope {
            network_id: "factory-1".to_string(),
            asset_id: "compressor-a3".to_string(),
            kind,
            period: crate::types::Period::Week,
            date_range: None,
        }
    }

    fn samples_from(values: &[f64]) -> Vec<Sample> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| Sample {
                timestamp: i as i64,
                value,
            })
            .collect()
    }

    #[test]
    fn same_input_same_report() {
        let summary = MetricsSummary {
            count: Some(3.0),
            min: Some(5.0),
            max: Some(15.0),
            mean: Some(10.0),
            median: Some(10.0),
            stddev: Some(4.08),
            ..MetricsSummary::default()
        };
        let scope = scope(crate::types::AnalysisKind::BasicMetrics);
        let data = AnalysisData::Metrics(summary);
        let a = generate(&scope, &data);
        let b = generate(&scope, &data);
        assert_eq!(a, b);
        assert_eq!(a.title, "Basic metrics (Last week)");
    }

    #[test]
    fn missing_statistics_render_as_not_available() {
        let scope = scope(crate::types::AnalysisKind::BasicMetrics);
        let report = generate(&scope, &AnalysisData::Metrics(MetricsSummary::default()));
        let text = report.to_text();
        assert!(text.contains("N/A"));
        assert!(!text.contains("0.000 to 0.000"));
    }

    #[test]
    fn high_variability_drives_the_recommendations() {
        let summary = MetricsSummary {
            stddev: Some(2.0),
            ..MetricsSummary::default()
        };
        let scope = scope(crate::types::AnalysisKind::BasicMetrics);
        let report = generate(&scope, &AnalysisData::Metrics(summary));
        let text = report.to_text();
        assert!(text.contains("High variability"));
        assert!(text.contains("leak survey"));
    }

    #[test]
    fn full_metrics_report_includes_the_extra_fields() {
        let summary = MetricsSummary {
            mad: Some(0.5),
            delta: Some(1.2),
            rate_of_change: Some(0.002),
            ..MetricsSummary::default()
        };
        let scope = scope(crate::types::AnalysisKind::FullMetrics);
        let report = generate(&scope, &AnalysisData::Metrics(summary));
        let text = report.to_text();
        assert!(text.contains("Mean absolute deviation"));
        assert!(text.contains("Rate of change"));
    }

    #[test]
    fn raw_report_reads_only_the_sample_prefix() {
        let mut values = vec![7.0; 100];
        values.extend(vec![1000.0; 200]);
        let scope = scope(crate::types::AnalysisKind::RawSamples);
        let report = generate(&scope, &AnalysisData::Raw(samples_from(&values)));
        let text = report.to_text();
        assert!(text.contains("first 100 of 300"));
        // The prefix is all 7.0, so the outliers never reach the summary.
        assert!(text.contains("7.000 to 7.000"));
    }

    #[test]
    fn stuck_sensor_is_called_out() {
        let quality = QualitySummary {
            repeated_consecutive_readings: 150,
            mean_relative_variation: 0.0,
            overall_quality: QualityRating::Poor,
        };
        let scope = scope(crate::types::AnalysisKind::Quality);
        let report = generate(&scope, &AnalysisData::Quality(quality));
        assert!(report.to_text().contains("possible stuck sensor"));
    }
}
