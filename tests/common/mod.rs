//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use tower::ServiceExt;

use catalog_edge::catalog::{
    AnimeDetail, AnimeRecord, AnimeSummary, CatalogStore, CatalogWriter, EpisodeLinks,
    SearchFilter, SqliteCatalog,
};
use catalog_edge::config::AppConfig;
use catalog_edge::store::{MemoryKvStore, StoreError, StoreResult};
use catalog_edge::HttpServer;

pub const ORIGIN: &str = "https://anime.example";
pub const SECRET: &str = "s3cr3t";
pub const BROWSER: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// How the test catalog behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Fail,
    Panic,
    /// Every query stalls far past any request deadline.
    Slow,
}

/// Wraps an in-memory SQLite catalog, counting every query.
pub struct CountingCatalog {
    pub inner: SqliteCatalog,
    pub calls: AtomicUsize,
    pub mode: Mode,
}

impl CountingCatalog {
    async fn enter(&self) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            Mode::Slow => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            }
            Mode::Normal => Ok(()),
            Mode::Fail => Err(StoreError::Corrupt(
                "no such table: anime (SELECT * FROM anime WHERE id = ?)".into(),
            )),
            Mode::Panic => panic!("catalog exploded"),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogStore for CountingCatalog {
    async fn list(&self, page: u32) -> StoreResult<Vec<AnimeSummary>> {
        self.enter().await?;
        self.inner.list(page).await
    }

    async fn search(&self, filter: &SearchFilter) -> StoreResult<Vec<AnimeSummary>> {
        self.enter().await?;
        self.inner.search(filter).await
    }

    async fn detail(&self, id: &str) -> StoreResult<Option<AnimeDetail>> {
        self.enter().await?;
        self.inner.detail(id).await
    }

    async fn episode(&self, id: &str, number: u32) -> StoreResult<Option<EpisodeLinks>> {
        self.enter().await?;
        self.inner.episode(id, number).await
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.gate.allowed_origin = ORIGIN.to_string();
    config.signature.secret = SECRET.to_string();
    config
}

pub fn record(id: &str, title: &str, tags: &[&str]) -> AnimeRecord {
    AnimeRecord {
        id: id.to_string(),
        title: title.to_string(),
        year: Some(2023),
        kind: Some("TV".into()),
        image: Some(format!("https://img.example/{}.jpg", id)),
        overview: Some("An elf mage outlives her party.".into()),
        episodes: 28,
        duration: Some("24 min".into()),
        audio: "SUB".into(),
        dubbed_languages: None,
        rating: Some(91),
        popularity: Some(400_000),
        top_genre_rank: Some("Top #1".into()),
        airing_status: Some("COMPLETED".into()),
        airing_date: Some("2023-09-29".into()),
        studio: Some("Madhouse".into()),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        total_seasons: 1,
    }
}

/// A running app over a seeded catalog and fresh in-memory counters.
pub struct TestApp {
    pub router: Router,
    pub catalog: Arc<CountingCatalog>,
    pub kv: MemoryKvStore,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_mode(Mode::Normal).await
    }

    pub async fn with_mode(mode: Mode) -> Self {
        Self::with_config(mode, test_config()).await
    }

    pub async fn with_config(mode: Mode, config: AppConfig) -> Self {
        let inner = SqliteCatalog::in_memory().await.unwrap();
        inner
            .upsert_anime(&record("frieren-154587", "Frieren", &["Adventure", "Fantasy"]))
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO episode_links (anime_id, episode_number, stream_url, download_url) \
             VALUES ('frieren-154587', 5, 'https://stream.example/f/5', 'https://dl.example/f/5')",
        )
        .execute(inner.pool())
        .await
        .unwrap();

        let catalog = Arc::new(CountingCatalog {
            inner,
            calls: AtomicUsize::new(0),
            mode,
        });
        let kv = MemoryKvStore::new();
        let server = HttpServer::new(config, catalog.clone(), Arc::new(kv.clone()));

        Self {
            router: server.router(),
            catalog,
            kv,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// A browser GET without an Origin header.
    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(browser_get(uri).body(Body::empty()).unwrap()).await
    }
}

pub const CLIENT_IP: &str = "203.0.113.50";

pub fn browser_get(uri: &str) -> axum::http::request::Builder {
    browser_get_from(uri, CLIENT_IP)
}

/// A browser GET from a specific client address.
pub fn browser_get_from(uri: &str, ip: &str) -> axum::http::request::Builder {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("user-agent", BROWSER)
        .header("cf-connecting-ip", ip)
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}
