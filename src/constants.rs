// constants.rs
use once_cell::sync::Lazy;
use std::time::Duration;

pub static FEED_CONFIG: Lazy<FeedConfig> = Lazy::new(FeedConfig::default);

pub static THRESHOLDS: Lazy<Thresholds> = Lazy::new(Thresholds::default);

/// Default base URL of the sensor feed; individual assets may override it
/// through the asset directory.
pub const DEFAULT_BASE_URL: &str = "http://18.212.36.236:8080";

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub page: PageLimits,
    pub render: RenderLimits,
    pub notice_ttl: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            page: PageLimits::default(),
            render: RenderLimits::default(),
            notice_ttl: Duration::from_secs(4),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PageLimits {
    /// Number of raw samples requested per page.
    pub page_size: usize,
    /// Hard cap applied to every page response before it is merged,
    /// independent of the requested page size.
    pub max_page_items: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            page_size: 20,
            max_page_items: 200,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderLimits {
    /// Maximum points emitted in a chart series.
    pub chart_max_points: usize,
    /// Number of samples the report generator reads from an accumulated
    /// raw batch.
    pub report_sample_cap: usize,
    /// Number of adjacent sample pairs compared for the stability count.
    pub report_pair_cap: usize,
}

impl Default for RenderLimits {
    fn default() -> Self {
        Self {
            chart_max_points: 100,
            report_sample_cap: 100,
            report_pair_cap: 50,
        }
    }
}

/// Classification thresholds shared by the deriver and the report text.
#[derive(Debug, Clone)]
pub struct Thresholds {
    /// Standard deviation above which variability is high.
    pub stddev_high: f64,
    /// Standard deviation at or above which variability is moderate.
    pub stddev_moderate: f64,
    /// Absolute slope above which a trend is worth monitoring.
    pub slope_significant: f64,
    /// Run length of identical consecutive readings that suggests a
    /// stuck sensor.
    pub stuck_sensor_run: u64,
    /// Mean relative variation bounds for the quality rating.
    pub rel_var_good: f64,
    pub rel_var_fair: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            stddev_high: 1.5,
            stddev_moderate: 0.8,
            slope_significant: 0.01,
            stuck_sensor_run: 100,
            rel_var_good: 0.1,
            rel_var_fair: 0.25,
        }
    }
}
