//! End-to-end session tests against a scripted feed.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

use airscan_analytics::client::RawPageQuery;
use airscan_analytics::session::AnalysisSession;
use airscan_analytics::types::{MetricsSummary, Notice, Severity};
use airscan_analytics::{AnalysisData, AnalysisKind, FetchError, Period, Sample, SampleFeed};

/// Feed stub that replays scripted responses and counts calls.
#[derive(Default)]
struct ScriptedFeed {
    aggregates: Mutex<VecDeque<Result<AnalysisData, FetchError>>>,
    pages: Mutex<VecDeque<Result<Vec<Sample>, FetchError>>>,
    aggregate_calls: AtomicUsize,
    page_calls: AtomicUsize,
}

impl ScriptedFeed {
    fn with_aggregate(result: Result<AnalysisData, FetchError>) -> Self {
        let feed = Self::default();
        feed.aggregates.lock().unwrap().push_back(result);
        feed
    }

    fn with_pages(pages: Vec<Result<Vec<Sample>, FetchError>>) -> Self {
        let feed = Self::default();
        *feed.pages.lock().unwrap() = pages.into();
        feed
    }
}

impl SampleFeed for ScriptedFeed {
    async fn fetch_aggregate(
        &self,
        _kind: AnalysisKind,
        _period: Period,
    ) -> Result<AnalysisData, FetchError> {
        self.aggregate_calls.fetch_add(1, Ordering::SeqCst);
        self.aggregates
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(FetchError::InvalidRequest("script exhausted".into())))
    }

    async fn fetch_raw_page(&self, _query: &RawPageQuery) -> Result<Vec<Sample>, FetchError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(FetchError::InvalidRequest("script exhausted".into())))
    }
}

// `Arc<ScriptedFeed>` is a `SampleFeed` via the library's blanket
// `Arc` impl, letting a test keep a handle on the call counters after
// the session takes ownership of the feed.

fn page(count: usize, base: i64) -> Vec<Sample> {
    (0..count)
        .map(|i| Sample {
            timestamp: base + i as i64,
            value: 7.0 + i as f64 * 0.01,
        })
        .collect()
}

fn severities(notices: &[Notice]) -> Vec<Severity> {
    notices.iter().map(|n| n.severity).collect()
}

fn select_raw<F: SampleFeed>(session: &mut AnalysisSession<F>) {
    session.select_network("factory-1");
    session.select_asset("compressor-a3");
    session.select_kind(AnalysisKind::RawSamples);
}

#[tokio::test]
async fn refresh_without_a_selection_is_rejected() {
    let mut session = AnalysisSession::new(ScriptedFeed::default());
    assert!(session.refresh().await.is_err());
    assert!(session.report().is_none());
}

#[tokio::test]
async fn aggregate_refresh_derives_report_and_chart() {
    let summary = MetricsSummary {
        count: Some(3.0),
        min: Some(5.0),
        max: Some(15.0),
        mean: Some(10.0),
        median: Some(10.0),
        stddev: Some(4.08),
        ..MetricsSummary::default()
    };
    let feed = ScriptedFeed::with_aggregate(Ok(AnalysisData::Metrics(summary)));
    let mut session = AnalysisSession::new(feed);
    session.select_network("factory-1");
    session.select_asset("compressor-a3");

    session.refresh().await.unwrap();

    let report = session.report().expect("report after refresh");
    assert_eq!(report.title, "Basic metrics (Today)");
    assert!(report.to_text().contains("High variability"));

    let chart = session.chart().expect("chart after refresh");
    assert_eq!(chart.points.len(), 4);

    let notices = session.take_notices();
    assert_eq!(severities(&notices), vec![Severity::Success]);
}

#[tokio::test]
async fn fetch_failure_surfaces_a_notice_and_keeps_prior_state() {
    let feed = ScriptedFeed::default();
    feed.aggregates.lock().unwrap().push_back(Ok(AnalysisData::Metrics(
        MetricsSummary {
            mean: Some(7.0),
            ..MetricsSummary::default()
        },
    )));
    feed.aggregates.lock().unwrap().push_back(Err(FetchError::HttpStatus {
        status: 500,
        body: None,
    }));

    let mut session = AnalysisSession::new(feed);
    session.select_network("factory-1");
    session.select_asset("compressor-a3");

    session.refresh().await.unwrap();
    let first_report = session.report().cloned();
    session.take_notices();

    session.refresh().await.unwrap();

    // The failed refresh never replaces what the user is looking at.
    assert_eq!(session.report().cloned(), first_report);
    let notices = session.take_notices();
    assert_eq!(severities(&notices), vec![Severity::Error]);
    assert!(notices[0].message.contains("status 500"));
}

#[tokio::test]
async fn stale_aggregate_response_is_discarded() {
    let mut session = AnalysisSession::new(ScriptedFeed::default());
    session.select_network("factory-1");
    session.select_asset("compressor-a3");

    let request = session.begin_aggregate().unwrap().unwrap();

    // Selection changes while the request is in flight.
    session.select_period(Period::Week);

    session.complete_aggregate(
        request,
        Ok(AnalysisData::Metrics(MetricsSummary {
            mean: Some(7.0),
            ..MetricsSummary::default()
        })),
    );

    assert!(session.report().is_none());
    assert!(session.take_notices().is_empty());
}

#[tokio::test]
async fn raw_pages_accumulate_until_a_short_page_exhausts_the_feed() {
    let feed = Arc::new(ScriptedFeed::with_pages(vec![
        Ok(page(20, 0)),
        Ok(page(20, 20)),
        Ok(page(5, 40)),
    ]));
    let mut session = AnalysisSession::new(Arc::clone(&feed));
    select_raw(&mut session);

    session.refresh().await.unwrap();
    assert_eq!(session.samples().len(), 20);
    assert!(session.has_more_samples());

    session.load_more().await;
    assert_eq!(session.samples().len(), 40);
    assert!(session.has_more_samples());

    session.load_more().await;
    assert_eq!(session.samples().len(), 45);
    assert!(!session.has_more_samples());
    session.take_notices();

    // Asking again issues nothing and tells the user why.
    session.load_more().await;
    assert_eq!(session.samples().len(), 45);
    assert_eq!(feed.page_calls.load(Ordering::SeqCst), 3);
    let notices = session.take_notices();
    assert_eq!(severities(&notices), vec![Severity::Info]);
    assert!(notices[0].message.contains("No more data"));
}

#[tokio::test]
async fn duplicate_page_request_is_not_issued() {
    let feed = Arc::new(ScriptedFeed::with_pages(vec![Ok(page(20, 0))]));
    let mut session = AnalysisSession::new(Arc::clone(&feed));
    select_raw(&mut session);

    let (request, query) = session.begin_first_page().unwrap().unwrap();
    // A second begin while the first is outstanding yields nothing.
    assert!(session.begin_first_page().unwrap().is_none());

    let result = feed.fetch_raw_page(&query).await;
    session.complete_page(request, result);

    assert_eq!(feed.page_calls.load(Ordering::SeqCst), 1);
    assert_eq!(session.samples().len(), 20);
}

#[tokio::test]
async fn stale_page_response_is_discarded() {
    let mut session = AnalysisSession::new(ScriptedFeed::default());
    select_raw(&mut session);

    let (request, _query) = session.begin_first_page().unwrap().unwrap();

    session.select_period(Period::Month);

    session.complete_page(request, Ok(page(20, 0)));
    assert!(session.samples().is_empty());
    assert!(session.report().is_none());
}

#[tokio::test]
async fn first_page_failure_clears_and_notifies() {
    let feed = ScriptedFeed::with_pages(vec![Err(FetchError::NetworkUnreachable(
        "connection refused".into(),
    ))]);
    let mut session = AnalysisSession::new(feed);
    select_raw(&mut session);

    session.refresh().await.unwrap();

    assert!(session.samples().is_empty());
    assert!(session.report().is_none());
    let notices = session.take_notices();
    assert_eq!(severities(&notices), vec![Severity::Error]);
}

#[tokio::test]
async fn next_page_failure_preserves_the_buffer() {
    let feed = ScriptedFeed::with_pages(vec![
        Ok(page(20, 0)),
        Err(FetchError::Timeout(std::time::Duration::from_secs(10))),
        Ok(page(20, 20)),
    ]);
    let mut session = AnalysisSession::new(feed);
    select_raw(&mut session);

    session.refresh().await.unwrap();
    session.take_notices();

    session.load_more().await;
    assert_eq!(session.samples().len(), 20);
    assert!(session.has_more_samples());
    let notices = session.take_notices();
    assert_eq!(severities(&notices), vec![Severity::Error]);

    // The retry succeeds and appends.
    session.load_more().await;
    assert_eq!(session.samples().len(), 40);
}

#[tokio::test]
async fn scope_change_drops_the_accumulated_buffer() {
    let feed = ScriptedFeed::with_pages(vec![Ok(page(20, 0)), Ok(page(20, 100))]);
    let mut session = AnalysisSession::new(feed);
    select_raw(&mut session);

    session.refresh().await.unwrap();
    assert_eq!(session.samples().len(), 20);

    session.select_asset("compressor-b1");
    assert!(session.samples().is_empty());
    assert!(session.report().is_none());

    session.refresh().await.unwrap();
    assert_eq!(session.samples().len(), 20);
    assert_eq!(session.samples()[0].timestamp, 100);
}

#[tokio::test]
async fn export_uses_the_conventional_file_name() {
    let feed = ScriptedFeed::with_aggregate(Ok(AnalysisData::Trend(Default::default())));
    let mut session = AnalysisSession::new(feed);
    session.select_network("factory-1");
    session.select_asset("compressor-a3");
    session.select_kind(AnalysisKind::Trend);
    session.select_period(Period::Month);

    assert!(session.export(Utc::now()).is_none());

    session.refresh().await.unwrap();

    let generated_at = Utc.timestamp_millis_opt(1_747_000_000_123).single().unwrap();
    let file = session.export(generated_at).expect("export after refresh");
    assert_eq!(file.name, "analise-tendencia-mes-1747000000123.txt");
    assert!(file.content.contains("Asset: compressor-a3"));
    assert!(file.content.contains("## Report"));
}
