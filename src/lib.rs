//! Client-side analytics for compressed-air sensor networks.
//!
//! Fetches aggregate analyses and paged raw samples from a remote
//! metrics feed, derives descriptive statistics and qualitative
//! classifications, and produces narrative reports, chart-ready series,
//! and text exports. The [`session::AnalysisSession`] orchestrator owns
//! the active selection and guarantees that responses from a superseded
//! selection never reach the screen.

pub mod chart;
pub mod client;
pub mod constants;
pub mod error;
pub mod export;
pub mod pagination;
pub mod registry;
pub mod report;
pub mod scope;
pub mod session;
pub mod stats;
pub mod types;

pub use client::{MetricsClient, RawPageQuery, SampleFeed};
pub use error::{FetchError, ScopeError};
pub use session::AnalysisSession;
pub use types::{AnalysisData, AnalysisKind, AnalysisScope, Period, Sample};
