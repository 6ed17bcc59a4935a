//! Selection state: which network, asset, analysis kind, and period the
//! user is looking at. Single writer of the active `AnalysisScope`;
//! every change bumps a generation counter so responses from a previous
//! selection can be recognized and dropped.

use crate::error::ScopeError;
use crate::types::{AnalysisKind, AnalysisScope, DateRange, Period};

#[derive(Debug)]
pub struct ScopeState {
    network_id: Option<String>,
    asset_id: Option<String>,
    kind: AnalysisKind,
    period: Period,
    date_range: Option<DateRange>,
    generation: u64,
}

impl Default for ScopeState {
    fn default() -> Self {
        Self {
            network_id: None,
            asset_id: None,
            kind: AnalysisKind::BasicMetrics,
            period: Period::Today,
            date_range: None,
            generation: 0,
        }
    }
}

impl ScopeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn kind(&self) -> AnalysisKind {
        self.kind
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn date_range(&self) -> Option<DateRange> {
        self.date_range
    }

    /// Picking a network clears the asset: assets belong to a network
    /// and the old one is meaningless under the new parent.
    /// Returns true when the selection actually changed.
    pub fn set_network(&mut self, network_id: impl Into<String>) -> bool {
        let network_id = network_id.into();
        if self.network_id.as_deref() == Some(network_id.as_str()) {
            return false;
        }
        self.network_id = Some(network_id);
        self.asset_id = None;
        self.bump();
        true
    }

    pub fn set_asset(&mut self, asset_id: impl Into<String>) -> bool {
        let asset_id = asset_id.into();
        if self.asset_id.as_deref() == Some(asset_id.as_str()) {
            return false;
        }
        self.asset_id = Some(asset_id);
        self.bump();
        true
    }

    pub fn set_kind(&mut self, kind: AnalysisKind) -> bool {
        if self.kind == kind {
            return false;
        }
        self.kind = kind;
        self.bump();
        true
    }

    pub fn set_period(&mut self, period: Period) -> bool {
        if self.period == period {
            return false;
        }
        self.period = period;
        self.bump();
        true
    }

    pub fn set_date_range(&mut self, range: Option<DateRange>) -> bool {
        if self.date_range == range {
            return false;
        }
        self.date_range = range;
        self.bump();
        true
    }

    /// Builds the active scope, or reports that the user has not picked
    /// enough yet. Fetches are gated on this.
    pub fn scope(&self) -> Result<AnalysisScope, ScopeError> {
        let network_id = self
            .network_id
            .clone()
            .ok_or(ScopeError::MissingSelection)?;
        let asset_id = self.asset_id.clone().ok_or(ScopeError::MissingSelection)?;
        Ok(AnalysisScope {
            network_id,
            asset_id,
            kind: self.kind,
            period: self.period,
            date_range: self.date_range,
        })
    }

    fn bump(&mut self) {
        self.generation += 1;
    }
}
