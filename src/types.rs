use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::FEED_CONFIG;

/// One timestamped sensor reading. The upstream feed spells the value
/// field `valor`; everything inside the crate uses the normalized name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: i64,
    #[serde(alias = "valor")]
    pub value: f64,
}

/// Descriptive statistics over a batch of samples, or the body of an
/// aggregate feed response. Every numeric field is optional: the feed
/// omits keys freely and an empty batch derives to nothing, never to
/// zeros. Aliases cover the feed's Portuguese key spellings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    #[serde(default, alias = "número de leituras")]
    pub count: Option<f64>,
    #[serde(default, alias = "valor mínimo")]
    pub min: Option<f64>,
    #[serde(default, alias = "valor máximo")]
    pub max: Option<f64>,
    #[serde(default, alias = "média")]
    pub mean: Option<f64>,
    #[serde(default, alias = "mediana")]
    pub median: Option<f64>,
    #[serde(default, alias = "desvio padrão")]
    pub stddev: Option<f64>,
    #[serde(default)]
    pub mad: Option<f64>,
    #[serde(default)]
    pub delta: Option<f64>,
    #[serde(default, alias = "rateOfChange")]
    pub rate_of_change: Option<f64>,
    #[serde(default, alias = "meanZScore")]
    pub mean_z_score: Option<f64>,
    #[serde(default, alias = "explicação")]
    pub explanation: Option<String>,
}

impl MetricsSummary {
    /// Amplitude of the operating range, when both bounds are known.
    pub fn amplitude(&self) -> Option<f64> {
        match (self.min, self.max) {
            (Some(lo), Some(hi)) => Some(hi - lo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
}

impl Default for TrendDirection {
    fn default() -> Self {
        TrendDirection::Stable
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    #[serde(default)]
    pub slope: f64,
    #[serde(default)]
    pub direction: TrendDirection,
    #[serde(default, alias = "meanAcceleration")]
    pub mean_acceleration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityRating {
    Good,
    Fair,
    Poor,
}

impl Default for QualityRating {
    fn default() -> Self {
        QualityRating::Good
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualitySummary {
    #[serde(default, alias = "repeatedConsecutiveReadings")]
    pub repeated_consecutive_readings: u64,
    #[serde(default, alias = "meanRelativeVariation")]
    pub mean_relative_variation: f64,
    #[serde(default, alias = "overallQuality")]
    pub overall_quality: QualityRating,
}

/// Which analysis the user selected; also decides the feed endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisKind {
    BasicMetrics,
    FullMetrics,
    Trend,
    Quality,
    RawSamples,
}

impl AnalysisKind {
    /// Path segment the feed expects for this kind.
    pub fn as_endpoint(&self) -> &'static str {
        match self {
            AnalysisKind::BasicMetrics => "metricasBasicas",
            AnalysisKind::FullMetrics => "metricasCompleta",
            AnalysisKind::Trend => "tendencia",
            AnalysisKind::Quality => "qualidadeDados",
            AnalysisKind::RawSamples => "dadosBrutos",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalysisKind::BasicMetrics => "Basic metrics",
            AnalysisKind::FullMetrics => "Full metrics",
            AnalysisKind::Trend => "Trend analysis",
            AnalysisKind::Quality => "Data quality",
            AnalysisKind::RawSamples => "Raw samples",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    Today,
    Week,
    Month,
    LastMonth,
    All,
}

impl Period {
    /// Path segment the feed expects for this period.
    pub fn as_endpoint(&self) -> &'static str {
        match self {
            Period::Today => "dia",
            Period::Week => "semana",
            Period::Month => "mes",
            Period::LastMonth => "mespassado",
            Period::All => "tudo",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::Today => "Today",
            Period::Week => "Last week",
            Period::Month => "Current month",
            Period::LastMonth => "Last month",
            Period::All => "All data",
        }
    }
}

/// Inclusive date filter for raw sample queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// The tuple gating every fetch: which network/asset is being analyzed,
/// which analysis runs, over which period. Exactly one scope is active
/// at a time; changing any field invalidates all derived state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisScope {
    pub network_id: String,
    pub asset_id: String,
    pub kind: AnalysisKind,
    pub period: Period,
    pub date_range: Option<DateRange>,
}

/// Whatever the active analysis produced; the single input of the
/// report generator and the visualization adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisData {
    Metrics(MetricsSummary),
    Trend(TrendSummary),
    Quality(QualitySummary),
    Raw(Vec<Sample>),
}

/// One heading plus its body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSection {
    pub heading: String,
    pub body: String,
}

/// Generated narrative over a summary or raw batch. Read-only: a new
/// scope or fresh data produces a new report, never an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub title: String,
    pub sections: Vec<ReportSection>,
}

impl Report {
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        for section in &self.sections {
            out.push('\n');
            out.push_str("## ");
            out.push_str(&section.heading);
            out.push('\n');
            out.push_str(&section.body);
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartX {
    Time(i64),
    Label(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: ChartX,
    pub y: f64,
}

/// Chart-ready series, capped to a fixed point count. `shown` vs
/// `available` tells the caller how much was cut instead of dropping
/// context silently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub points: Vec<ChartPoint>,
    pub truncated: bool,
    pub shown: usize,
    pub available: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

/// Timed, dismissible notification surfaced to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    pub ttl: Duration,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Info, message)
    }

    fn with_severity(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            ttl: FEED_CONFIG.notice_ttl,
        }
    }
}

/// File handed to the injected exporter capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub name: String,
    pub content: String,
}
