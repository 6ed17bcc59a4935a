//! Analysis session: the orchestrator tying selection state, the feed,
//! the pagination controller, and the derived report and chart together.
//!
//! Fetches run through an explicit begin/complete handshake. `begin_*`
//! captures the scope generation in a request handle; `complete_*`
//! compares it against the current generation and drops superseded
//! responses. The async `refresh`/`load_more` wrappers drive the
//! handshake against a real feed.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use tracing::{debug, info};

use crate::chart;
use crate::client::{RawPageQuery, SampleFeed};
use crate::constants::FEED_CONFIG;
use crate::error::{FetchError, ScopeError};
use crate::export;
use crate::pagination::{PageController, PageOutcome, PageRequest};
use crate::report;
use crate::scope::ScopeState;
use crate::types::{
    AnalysisData, AnalysisKind, ChartSeries, DateRange, ExportFile, Notice, Period, Report, Sample,
};

/// Error notice with a retry hint when the failure looks temporary.
fn failure_notice(prefix: &str, err: &FetchError) -> Notice {
    if err.is_transient() {
        Notice::error(format!("{prefix}: {err}. Try again."))
    } else {
        Notice::error(format!("{prefix}: {err}"))
    }
}

/// Handle for one in-flight aggregate fetch. Carries the scope
/// generation captured when the request was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateRequest {
    pub kind: AnalysisKind,
    pub period: Period,
    pub generation: u64,
}

pub struct AnalysisSession<F: SampleFeed> {
    feed: F,
    scope: ScopeState,
    pager: PageController,
    data: Option<AnalysisData>,
    report: Option<Report>,
    chart: Option<ChartSeries>,
    notices: VecDeque<Notice>,
}

impl<F: SampleFeed> AnalysisSession<F> {
    pub fn new(feed: F) -> Self {
        let page = &FEED_CONFIG.page;
        Self {
            feed,
            scope: ScopeState::new(),
            pager: PageController::new(page.page_size, page.max_page_items),
            data: None,
            report: None,
            chart: None,
            notices: VecDeque::new(),
        }
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    pub fn chart(&self) -> Option<&ChartSeries> {
        self.chart.as_ref()
    }

    pub fn data(&self) -> Option<&AnalysisData> {
        self.data.as_ref()
    }

    pub fn samples(&self) -> &[Sample] {
        self.pager.samples()
    }

    pub fn has_more_samples(&self) -> bool {
        self.pager.has_more()
    }

    /// Drains the pending notices for the UI layer to display.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    pub fn select_network(&mut self, network_id: impl Into<String>) {
        if self.scope.set_network(network_id) {
            self.invalidate();
        }
    }

    pub fn select_asset(&mut self, asset_id: impl Into<String>) {
        if self.scope.set_asset(asset_id) {
            self.invalidate();
        }
    }

    pub fn select_kind(&mut self, kind: AnalysisKind) {
        if self.scope.set_kind(kind) {
            self.invalidate();
        }
    }

    pub fn select_period(&mut self, period: Period) {
        if self.scope.set_period(period) {
            self.invalidate();
        }
    }

    pub fn select_date_range(&mut self, range: Option<DateRange>) {
        if self.scope.set_date_range(range) {
            self.invalidate();
        }
    }

    /// Derived state never survives a scope change. Buffered samples,
    /// report, and chart all go; the new scope starts from nothing.
    fn invalidate(&mut self) {
        debug!(generation = self.scope.generation(), "scope changed");
        self.pager.reset(self.scope.generation());
        self.data = None;
        self.report = None;
        self.chart = None;
    }

    /// Starts an aggregate fetch for the active scope. Returns `None`
    /// when the selected analysis is the raw view, which loads through
    /// the page handshake instead.
    pub fn begin_aggregate(&self) -> Result<Option<AggregateRequest>, ScopeError> {
        let scope = self.scope.scope()?;
        if scope.kind == AnalysisKind::RawSamples {
            return Ok(None);
        }
        Ok(Some(AggregateRequest {
            kind: scope.kind,
            period: scope.period,
            generation: self.scope.generation(),
        }))
    }

    /// Starts the first raw page load. Returns `None` when the active
    /// analysis is not the raw view or a load is already in flight.
    pub fn begin_first_page(
        &mut self,
    ) -> Result<Option<(PageRequest, RawPageQuery)>, ScopeError> {
        let scope = self.scope.scope()?;
        if scope.kind != AnalysisKind::RawSamples {
            return Ok(None);
        }
        Ok(self
            .pager
            .begin_first_page()
            .map(|req| self.with_query(req)))
    }

    /// Starts the next raw page load. `None` when nothing more can be
    /// requested; an exhausted feed additionally surfaces a notice.
    pub fn begin_next_page(&mut self) -> Option<(PageRequest, RawPageQuery)> {
        if !self.pager.has_more() {
            self.notices
                .push_back(Notice::info("No more data available."));
            return None;
        }
        self.pager.begin_next_page().map(|req| self.with_query(req))
    }

    fn with_query(&self, request: PageRequest) -> (PageRequest, RawPageQuery) {
        let query = RawPageQuery {
            limit: request.limit,
            offset: request.offset,
            date_range: self.scope.date_range(),
        };
        (request, query)
    }

    /// Resolves an aggregate fetch. Responses for a superseded scope are
    /// dropped; failures surface a notice and leave prior state alone.
    pub fn complete_aggregate(
        &mut self,
        request: AggregateRequest,
        result: Result<AnalysisData, FetchError>,
    ) {
        if request.generation != self.scope.generation() {
            debug!(
                stale = request.generation,
                current = self.scope.generation(),
                "discarding aggregate response for a superseded scope"
            );
            return;
        }
        match result {
            Ok(data) => {
                self.rederive(data);
                self.notices
                    .push_back(Notice::success("Analysis updated."));
                info!(kind = ?request.kind, period = ?request.period, "analysis loaded");
            }
            Err(err) => {
                self.notices
                    .push_back(failure_notice("Failed to load analysis", &err));
            }
        }
    }

    /// Resolves a raw page load and rederives the report and chart from
    /// the accumulated buffer.
    pub fn complete_page(
        &mut self,
        request: PageRequest,
        result: Result<Vec<Sample>, FetchError>,
    ) {
        match self.pager.apply(request, result) {
            PageOutcome::Loaded { count, .. } => {
                self.rederive(AnalysisData::Raw(self.pager.samples().to_vec()));
                self.notices
                    .push_back(Notice::success(format!("Loaded {count} samples.")));
            }
            PageOutcome::Appended { added, .. } => {
                self.rederive(AnalysisData::Raw(self.pager.samples().to_vec()));
                self.notices
                    .push_back(Notice::success(format!("Loaded {added} more samples.")));
            }
            PageOutcome::FirstPageFailed(err) => {
                self.data = None;
                self.report = None;
                self.chart = None;
                self.notices
                    .push_back(failure_notice("Failed to load samples", &err));
            }
            PageOutcome::NextPageFailed(err) => {
                self.notices
                    .push_back(failure_notice("Failed to load more", &err));
            }
            PageOutcome::Stale => {}
        }
    }

    fn rederive(&mut self, data: AnalysisData) {
        // scope() cannot fail here: data only arrives for a generation
        // issued after both ids were selected.
        if let Ok(scope) = self.scope.scope() {
            self.report = Some(report::generate(&scope, &data));
            self.chart = chart::series_for(&data);
            self.data = Some(data);
        }
    }

    /// Fetches the active analysis from the feed and resolves it. For
    /// the raw view this loads the first page.
    pub async fn refresh(&mut self) -> Result<(), ScopeError> {
        if let Some(request) = self.begin_aggregate()? {
            let result = self
                .feed
                .fetch_aggregate(request.kind, request.period)
                .await;
            self.complete_aggregate(request, result);
            return Ok(());
        }
        if let Some((request, query)) = self.begin_first_page()? {
            let result = self.feed.fetch_raw_page(&query).await;
            self.complete_page(request, result);
        }
        Ok(())
    }

    /// Fetches the next raw page, if one can be requested.
    pub async fn load_more(&mut self) {
        if let Some((request, query)) = self.begin_next_page() {
            let result = self.feed.fetch_raw_page(&query).await;
            self.complete_page(request, result);
        }
    }

    /// Renders the current analysis as a downloadable file. `None` until
    /// a report exists for the active scope.
    pub fn export(&self, generated_at: DateTime<Utc>) -> Option<ExportFile> {
        let scope = self.scope.scope().ok()?;
        let report = self.report.as_ref()?;
        export::export_file(&scope, self.pager.samples(), report, generated_at).ok()
    }
}
