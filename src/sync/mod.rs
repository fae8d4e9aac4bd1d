//! Catalog sync job.
//!
//! # Data Flow
//! ```text
//! for page in 1..=pages:
//!     anilist.rs (fetch page)        → error: log, treat as empty
//!     for media in page:
//!         transform.rs (AnimeRecord) → error: log, skip
//!         CatalogWriter::upsert      → error: log, skip
//! ```
//!
//! Every step is idempotent, so a failed run is repaired by the next one.

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::CatalogWriter;
use crate::observability::metrics;

pub mod anilist;
pub mod transform;

pub use anilist::{AniListClient, Media};

/// Errors raised while fetching or mapping source data.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("source returned status {0}")]
    Status(u16),

    #[error("media {0} has no title")]
    MissingTitle(i64),
}

/// A paged source of media entries.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Media>, SyncError>;
}

/// Counts from one sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub pages_failed: u32,
    pub upserted: u32,
    pub skipped: u32,
}

/// Run one sync pass over `pages` pages.
pub async fn run_once<S, W>(source: &S, writer: &W, pages: u32) -> SyncReport
where
    S: MediaSource + ?Sized,
    W: CatalogWriter + ?Sized,
{
    let mut report = SyncReport::default();

    for page in 1..=pages {
        let media = match source.fetch_page(page).await {
            Ok(media) => media,
            Err(e) => {
                tracing::warn!(page, error = %e, "Failed to fetch page");
                report.pages_failed += 1;
                continue;
            }
        };
        tracing::debug!(page, items = media.len(), "Fetched page");

        for item in &media {
            let record = match transform::transform(item) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(media_id = item.id, error = %e, "Skipping media");
                    metrics::record_sync_upsert("skipped");
                    report.skipped += 1;
                    continue;
                }
            };

            match writer.upsert_anime(&record).await {
                Ok(()) => {
                    metrics::record_sync_upsert("ok");
                    report.upserted += 1;
                }
                Err(e) => {
                    tracing::error!(id = %record.id, error = %e, "Upsert failed");
                    metrics::record_sync_upsert("failed");
                    report.skipped += 1;
                }
            }
        }
    }

    tracing::info!(
        upserted = report.upserted,
        skipped = report.skipped,
        pages_failed = report.pages_failed,
        "Sync run complete"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AnimeRecord, CatalogStore, SqliteCatalog};
    use crate::store::{StoreError, StoreResult};
    use crate::sync::anilist::MediaTitle;
    use std::sync::Mutex;

    struct FakeSource;

    fn media(id: i64, title: Option<&str>) -> Media {
        Media {
            id,
            title: MediaTitle {
                romaji: title.map(String::from),
                english: None,
            },
            ..Media::default()
        }
    }

    #[async_trait]
    impl MediaSource for FakeSource {
        async fn fetch_page(&self, page: u32) -> Result<Vec<Media>, SyncError> {
            match page {
                1 => Ok(vec![media(1, Some("Mushishi")), media(2, None)]),
                2 => Err(SyncError::Status(502)),
                _ => Ok(vec![media(3, Some("Monster")), media(4, Some("Broken"))]),
            }
        }
    }

    #[derive(Default)]
    struct FlakyWriter {
        written: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl CatalogWriter for FlakyWriter {
        async fn upsert_anime(&self, record: &AnimeRecord) -> StoreResult<()> {
            if record.title == "Broken" {
                return Err(StoreError::Corrupt("constraint failed".into()));
            }
            self.written.lock().unwrap().push(record.id.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_run_skips_and_continues() {
        let writer = FlakyWriter::default();
        let report = run_once(&FakeSource, &writer, 3).await;

        assert_eq!(
            report,
            SyncReport {
                pages_failed: 1,
                upserted: 2,
                skipped: 2,
            }
        );
        assert_eq!(
            *writer.written.lock().unwrap(),
            vec!["mushishi-1".to_string(), "monster-3".to_string()]
        );
    }

    #[tokio::test]
    async fn test_run_into_sqlite() {
        let catalog = SqliteCatalog::in_memory().await.unwrap();
        let report = run_once(&FakeSource, &catalog, 1).await;
        assert_eq!(report.upserted, 1);

        let detail = catalog.detail("mushishi-1").await.unwrap().unwrap();
        assert_eq!(detail.audio.as_deref(), Some("SUB"));
    }
}
