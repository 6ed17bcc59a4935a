//! Pagination controller for the raw-samples view.
//!
//! Owns the accumulated buffer for the lifetime of one scope and
//! serializes page loads: at most one request is outstanding, and a
//! response carrying a stale scope generation is discarded instead of
//! merged. Requests are issued and resolved through an explicit
//! begin/apply handshake so the rules live in one place and can be
//! tested without a network.

use tracing::{debug, warn};

use crate::error::FetchError;
use crate::types::Sample;

/// `Loaded` means more pages may exist; `Exhausted` is terminal until a
/// full reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    Empty,
    Loading,
    Loaded,
    LoadingMore,
    Exhausted,
}

/// Handle for one in-flight page load. Captures the scope generation at
/// request time; `apply` compares it against the current generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page_index: usize,
    pub limit: usize,
    pub offset: usize,
    pub generation: u64,
}

#[derive(Debug)]
pub enum PageOutcome {
    /// Response arrived for a scope that is no longer current; dropped.
    Stale,
    /// First page replaced the buffer.
    Loaded { count: usize, exhausted: bool },
    /// Follow-up page appended to the buffer.
    Appended { added: usize, exhausted: bool },
    /// First page failed; the buffer was cleared back to `Empty`.
    FirstPageFailed(FetchError),
    /// Follow-up page failed; the buffer and `has_more` are preserved.
    NextPageFailed(FetchError),
}

#[derive(Debug)]
pub struct PageController {
    state: PageState,
    accumulated: Vec<Sample>,
    page_index: usize,
    generation: u64,
    page_size: usize,
    max_page_items: usize,
}

impl PageController {
    pub fn new(page_size: usize, max_page_items: usize) -> Self {
        Self {
            state: PageState::Empty,
            accumulated: Vec::new(),
            page_index: 0,
            generation: 0,
            page_size,
            max_page_items,
        }
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn samples(&self) -> &[Sample] {
        &self.accumulated
    }

    pub fn has_more(&self) -> bool {
        !matches!(self.state, PageState::Exhausted)
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, PageState::Loading | PageState::LoadingMore)
    }

    /// Clears everything for a new scope. Must run before any request is
    /// issued for the new scope.
    pub fn reset(&mut self, generation: u64) {
        debug!(generation, "resetting page buffer");
        self.state = PageState::Empty;
        self.accumulated.clear();
        self.page_index = 0;
        self.generation = generation;
    }

    /// Starts the first page load. Returns `None` while a load is
    /// already in flight; the buffer is replaced, not appended, when the
    /// response arrives.
    pub fn begin_first_page(&mut self) -> Option<PageRequest> {
        if self.is_in_flight() {
            return None;
        }
        self.state = PageState::Loading;
        Some(PageRequest {
            page_index: 0,
            limit: self.page_size,
            offset: 0,
            generation: self.generation,
        })
    }

    /// Starts the next page load. Returns `None` when a load is in
    /// flight, the feed is exhausted, or no first page has loaded yet.
    /// A duplicate call never issues a second request.
    pub fn begin_next_page(&mut self) -> Option<PageRequest> {
        if self.state != PageState::Loaded {
            return None;
        }
        let next_index = self.page_index + 1;
        self.state = PageState::LoadingMore;
        Some(PageRequest {
            page_index: next_index,
            limit: self.page_size,
            offset: next_index * self.page_size,
            generation: self.generation,
        })
    }

    /// Resolves an in-flight load. Stale responses (generation mismatch
    /// after a reset) are dropped without touching the buffer.
    pub fn apply(
        &mut self,
        request: PageRequest,
        result: Result<Vec<Sample>, FetchError>,
    ) -> PageOutcome {
        if request.generation != self.generation {
            debug!(
                stale = request.generation,
                current = self.generation,
                "discarding page response for a superseded scope"
            );
            return PageOutcome::Stale;
        }

        match (self.state, result) {
            (PageState::Loading, Ok(items)) => {
                let returned = items.len();
                let capped = self.cap(items);
                let exhausted = returned < self.page_size;
                self.accumulated = capped;
                self.page_index = 0;
                self.state = if exhausted {
                    PageState::Exhausted
                } else {
                    PageState::Loaded
                };
                PageOutcome::Loaded {
                    count: self.accumulated.len(),
                    exhausted,
                }
            }
            (PageState::Loading, Err(err)) => {
                self.accumulated.clear();
                self.page_index = 0;
                self.state = PageState::Empty;
                PageOutcome::FirstPageFailed(err)
            }
            (PageState::LoadingMore, Ok(items)) => {
                let returned = items.len();
                let mut capped = self.cap(items);
                let added = capped.len();
                let exhausted = returned < self.page_size;
                self.accumulated.append(&mut capped);
                self.page_index = request.page_index;
                self.state = if exhausted {
                    PageState::Exhausted
                } else {
                    PageState::Loaded
                };
                PageOutcome::Appended { added, exhausted }
            }
            (PageState::LoadingMore, Err(err)) => {
                // Keep what we have; the user can retry.
                self.state = PageState::Loaded;
                PageOutcome::NextPageFailed(err)
            }
            (state, _) => {
                warn!(?state, "page response arrived with no load in flight");
                PageOutcome::Stale
            }
        }
    }

    /// Defensive bound against a misbehaving upstream returning
    /// unbounded arrays, independent of the requested page size.
    fn cap(&self, mut items: Vec<Sample>) -> Vec<Sample> {
        if items.len() > self.max_page_items {
            warn!(
                returned = items.len(),
                cap = self.max_page_items,
                "page response exceeded the per-page cap; truncating"
            );
            items.truncate(self.max_page_items);
        }
        items
    }
}
