//! Catalog resolution.
//!
//! # Data Flow
//! ```text
//! http handlers (after the gate)
//!     → CatalogStore (list / search / detail / episode)
//!     → sqlite.rs (sqlx queries)
//!
//! sync job
//!     → CatalogWriter::upsert_anime
//! ```
//!
//! # Design Decisions
//! - Read and write sides are separate traits; the server never writes
//! - Absent rows are `Ok(None)`, store faults are `Err`

use async_trait::async_trait;

use crate::store::StoreResult;

pub mod sqlite;
pub mod types;

pub use sqlite::SqliteCatalog;
pub use types::{
    AnimeDetail, AnimeRecord, AnimeSummary, EpisodeLinks, SearchFilter, SearchParams, SocialLinks,
    PAGE_SIZE,
};

/// Read access to the catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// One page of the catalog, 1-based.
    async fn list(&self, page: u32) -> StoreResult<Vec<AnimeSummary>>;

    /// One page of titles matching every filter present in `filter`.
    async fn search(&self, filter: &SearchFilter) -> StoreResult<Vec<AnimeSummary>>;

    /// Full detail with tags, or `None` when the id is unknown.
    async fn detail(&self, id: &str) -> StoreResult<Option<AnimeDetail>>;

    /// Links for one episode, or `None` when no row exists.
    async fn episode(&self, id: &str, number: u32) -> StoreResult<Option<EpisodeLinks>>;
}

/// Write access used by the sync job.
#[async_trait]
pub trait CatalogWriter: Send + Sync {
    /// Insert a title or refresh its mutable fields, then attach its tags.
    async fn upsert_anime(&self, record: &AnimeRecord) -> StoreResult<()>;
}
