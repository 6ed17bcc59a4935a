//! Network and asset directory. The backing store (a hosted document
//! database in production) sits behind a trait so sessions and tests
//! never touch it directly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::FeedConfig;

/// A monitored compressed-air network, grouping a set of assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// A monitored asset (compressor, dryer, header) within a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    #[serde(alias = "networkId")]
    pub network_id: String,
    pub name: String,
    /// Per-asset feed override; absent assets use the shared default.
    #[serde(default, alias = "feedUrl")]
    pub feed_url: Option<String>,
}

#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("unknown id: {0}")]
    NotFound(String),

    #[error("directory backend error: {0}")]
    Backend(String),
}

/// Lookup seam for the network/asset catalog.
pub trait AssetDirectory {
    fn networks(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Network>, DirectoryError>>;

    fn assets_in(
        &self,
        network_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Asset>, DirectoryError>>;
}

/// Feed configuration for one asset, honoring its URL override.
pub fn feed_config_for(asset: &Asset) -> FeedConfig {
    let mut config = FeedConfig::default();
    if let Some(url) = &asset.feed_url {
        config.base_url = url.trim_end_matches('/').to_string();
    }
    config
}
