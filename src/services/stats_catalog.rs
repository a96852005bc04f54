//! Trait and types for interacting with a published statistics catalog.

use anyhow::Result;
use speed_tiers::store::StatsMonth;

/// A downloadable usage snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotLink {
    /// Cache file name, `{YYYY}-{MM}-{format}-{rating}.json`.
    pub file_name: String,
    pub url: String,
}

/// Abstraction over a statistics provider (e.g., Smogon).
#[async_trait::async_trait]
pub trait StatsCatalog {
    /// Returns every usage snapshot published for `month`.
    async fn list_snapshots(&self, month: StatsMonth) -> Result<Vec<SnapshotLink>>;

    async fn download(&self, url: &str) -> Result<Vec<u8>>;

    /// Returns the raw reference dex JSON.
    async fn fetch_pokedex(&self) -> Result<Vec<u8>>;

    /// Returns the display names of every format the provider defines.
    async fn fetch_format_names(&self) -> Result<Vec<String>>;
}
