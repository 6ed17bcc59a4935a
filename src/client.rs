//! HTTP client for the remote metrics feed.
//!
//! Aggregate analyses are served from `{base}/{kind}/{period}`; raw
//! samples from `{base}/dadosBrutos` with limit/offset paging and an
//! optional inclusive date filter. Failures are normalized into the
//! `FetchError` taxonomy and always surfaced; the client never
//! substitutes canned data for a dead feed.

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;
use url::Url;

use crate::constants::FeedConfig;
use crate::error::FetchError;
use crate::stats;
use crate::types::{
    AnalysisData, AnalysisKind, DateRange, MetricsSummary, Period, QualitySummary, Sample,
    TrendSummary,
};

/// Parameters of one raw-samples page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPageQuery {
    pub limit: usize,
    pub offset: usize,
    pub date_range: Option<DateRange>,
}

/// Seam between the session and the network. The production
/// implementation is [`MetricsClient`]; tests substitute scripted feeds.
pub trait SampleFeed {
    fn fetch_aggregate(
        &self,
        kind: AnalysisKind,
        period: Period,
    ) -> impl std::future::Future<Output = Result<AnalysisData, FetchError>>;

    fn fetch_raw_page(
        &self,
        query: &RawPageQuery,
    ) -> impl std::future::Future<Output = Result<Vec<Sample>, FetchError>>;
}

/// Lets callers share a feed (e.g. to keep a handle on it after the
/// session takes ownership) by delegating through `Arc`.
impl<F: SampleFeed> SampleFeed for std::sync::Arc<F> {
    async fn fetch_aggregate(
        &self,
        kind: AnalysisKind,
        period: Period,
    ) -> Result<AnalysisData, FetchError> {
        self.as_ref().fetch_aggregate(kind, period).await
    }

    async fn fetch_raw_page(&self, query: &RawPageQuery) -> Result<Vec<Sample>, FetchError> {
        self.as_ref().fetch_raw_page(query).await
    }
}

pub struct MetricsClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl MetricsClient {
    pub fn new(config: &FeedConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FetchError::InvalidRequest(format!("failed to build client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            request_timeout: config.request_timeout,
        })
    }

    /// Builds a feed URL with proper encoding.
    fn build_url(&self, path: &str) -> Result<Url, FetchError> {
        Url::parse(&format!("{}/{}", self.base_url, path))
            .map_err(|e| FetchError::InvalidRequest(format!("invalid URL: {e}")))
    }

    fn aggregate_url(&self, kind: AnalysisKind, period: Period) -> Result<Url, FetchError> {
        self.build_url(&format!("{}/{}", kind.as_endpoint(), period.as_endpoint()))
    }

    fn raw_page_url(&self, query: &RawPageQuery) -> Result<Url, FetchError> {
        let mut url = self.build_url(AnalysisKind::RawSamples.as_endpoint())?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("limit", &query.limit.to_string());
            pairs.append_pair("offset", &query.offset.to_string());
            if let Some(range) = query.date_range {
                pairs.append_pair("data_inicio", &range.start.format("%Y-%m-%d").to_string());
                pairs.append_pair("data_fim", &range.end.format("%Y-%m-%d").to_string());
            }
        }
        Ok(url)
    }

    /// Issues a GET and decodes the JSON body, bounded by the configured
    /// timeout.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        debug!(%url, "fetching");
        let response = timeout(self.request_timeout, self.client.get(url).send())
            .await
            .map_err(|_| FetchError::Timeout(self.request_timeout))?
            .map_err(|e| FetchError::from_reqwest(e, self.request_timeout))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok().filter(|b| !b.is_empty());
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))
    }
}

impl SampleFeed for MetricsClient {
    async fn fetch_aggregate(
        &self,
        kind: AnalysisKind,
        period: Period,
    ) -> Result<AnalysisData, FetchError> {
        let url = self.aggregate_url(kind, period)?;
        match kind {
            AnalysisKind::BasicMetrics | AnalysisKind::FullMetrics => {
                let summary: MetricsSummary = self.get_json(url).await?;
                Ok(AnalysisData::Metrics(summary))
            }
            AnalysisKind::Trend => {
                let mut trend: TrendSummary = self.get_json(url).await?;
                // The feed omits the direction at times; derive it from
                // the slope so downstream consumers see one truth.
                trend.direction = stats::classify_trend(trend.slope);
                Ok(AnalysisData::Trend(trend))
            }
            AnalysisKind::Quality => {
                let quality: QualitySummary = self.get_json(url).await?;
                Ok(AnalysisData::Quality(quality))
            }
            AnalysisKind::RawSamples => Err(FetchError::InvalidRequest(
                "raw samples are fetched page by page".into(),
            )),
        }
    }

    async fn fetch_raw_page(&self, query: &RawPageQuery) -> Result<Vec<Sample>, FetchError> {
        let url = self.raw_page_url(query)?;
        self.get_json(url).await
    }
}
