//! SQLite catalog implementation.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::catalog::types::{page_offset, PAGE_SIZE};
use crate::catalog::{
    AnimeDetail, AnimeRecord, AnimeSummary, CatalogStore, CatalogWriter, EpisodeLinks,
    SearchFilter, SocialLinks,
};
use crate::store::StoreResult;

const SCHEMA: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS anime (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        year INTEGER,
        type TEXT,
        image TEXT,
        url TEXT,
        episodes INTEGER,
        audio TEXT,
        dubbed_languages TEXT,
        duration TEXT,
        watch_link TEXT,
        rating INTEGER,
        popularity INTEGER,
        overview TEXT,
        studio TEXT,
        tags TEXT,
        top_genre_rank TEXT,
        airing_status TEXT,
        airing_date TEXT,
        total_seasons INTEGER,
        telegram TEXT,
        reddit TEXT,
        updated_at TEXT DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS anime_tags (
        anime_id TEXT NOT NULL,
        tag_name TEXT NOT NULL,
        PRIMARY KEY (anime_id, tag_name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS episode_links (
        anime_id TEXT NOT NULL,
        episode_number INTEGER NOT NULL,
        stream_url TEXT,
        download_url TEXT,
        PRIMARY KEY (anime_id, episode_number)
    )
    "#,
];

const SUMMARY_COLUMNS: &str =
    "anime.id, anime.title, anime.year, anime.type, anime.image, anime.duration, anime.rating";

#[derive(sqlx::FromRow)]
struct AnimeRow {
    id: String,
    title: String,
    year: Option<i64>,
    #[sqlx(rename = "type")]
    kind: Option<String>,
    image: Option<String>,
    url: Option<String>,
    episodes: Option<i64>,
    audio: Option<String>,
    duration: Option<String>,
    watch_link: Option<String>,
    rating: Option<i64>,
    overview: Option<String>,
    telegram: Option<String>,
    reddit: Option<String>,
}

impl AnimeRow {
    fn into_detail(self, tags: Vec<String>) -> AnimeDetail {
        AnimeDetail {
            id: self.id,
            title: self.title,
            year: self.year,
            kind: self.kind,
            image: self.image,
            url: self.url,
            episodes: self.episodes,
            audio: self.audio,
            duration: self.duration,
            watch_link: self.watch_link,
            rating: self.rating,
            overview: self.overview,
            tags,
            social: SocialLinks {
                telegram: self.telegram,
                reddit: self.reddit,
            },
        }
    }
}

/// Catalog backed by a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    /// Connect to `url` and make sure the schema exists.
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        info!("Creating SQLite catalog pool");
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await?;
        Self::with_pool(pool).await
    }

    /// A private in-memory catalog. One connection, kept open for the pool's life.
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> StoreResult<Self> {
        let catalog = Self { pool };
        catalog.migrate().await?;
        Ok(catalog)
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn migrate(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("Catalog schema ready");
        Ok(())
    }
}

fn push_condition(builder: &mut QueryBuilder<'_, Sqlite>, has_where: &mut bool) {
    builder.push(if *has_where { " AND " } else { " WHERE " });
    *has_where = true;
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    async fn list(&self, page: u32) -> StoreResult<Vec<AnimeSummary>> {
        let rows = sqlx::query_as::<_, AnimeSummary>(&format!(
            "SELECT {} FROM anime LIMIT ? OFFSET ?",
            SUMMARY_COLUMNS
        ))
        .bind(PAGE_SIZE)
        .bind(page_offset(page))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn search(&self, filter: &SearchFilter) -> StoreResult<Vec<AnimeSummary>> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT DISTINCT ");
        builder.push(SUMMARY_COLUMNS).push(" FROM anime");

        if filter.tag.is_some() {
            builder.push(" JOIN anime_tags ON anime.id = anime_tags.anime_id");
        }

        let mut has_where = false;
        if let Some(q) = &filter.q {
            let pattern = format!("%{}%", q);
            push_condition(&mut builder, &mut has_where);
            builder
                .push("(LOWER(anime.title) LIKE ")
                .push_bind(pattern.clone())
                .push(" OR LOWER(anime.id) LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(kind) = &filter.kind {
            push_condition(&mut builder, &mut has_where);
            builder.push("LOWER(anime.type) = ").push_bind(kind.clone());
        }
        if let Some(year) = &filter.year {
            push_condition(&mut builder, &mut has_where);
            builder.push("anime.year = ").push_bind(year.clone());
        }
        if let Some(tag) = &filter.tag {
            push_condition(&mut builder, &mut has_where);
            builder
                .push("LOWER(anime_tags.tag_name) = ")
                .push_bind(tag.clone());
        }

        builder
            .push(" LIMIT ")
            .push_bind(PAGE_SIZE)
            .push(" OFFSET ")
            .push_bind(page_offset(filter.page));

        let rows = builder
            .build_query_as::<AnimeSummary>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn detail(&self, id: &str) -> StoreResult<Option<AnimeDetail>> {
        let Some(row) = sqlx::query_as::<_, AnimeRow>("SELECT * FROM anime WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let tags = sqlx::query_scalar::<_, String>(
            "SELECT tag_name FROM anime_tags WHERE anime_id = ? ORDER BY tag_name",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(row.into_detail(tags)))
    }

    async fn episode(&self, id: &str, number: u32) -> StoreResult<Option<EpisodeLinks>> {
        let row = sqlx::query_as::<_, (Option<String>, Option<String>)>(
            "SELECT stream_url, download_url FROM episode_links \
             WHERE anime_id = ? AND episode_number = ?",
        )
        .bind(id)
        .bind(i64::from(number))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(stream, download)| EpisodeLinks::new(number, stream, download)))
    }
}

#[async_trait]
impl CatalogWriter for SqliteCatalog {
    async fn upsert_anime(&self, record: &AnimeRecord) -> StoreResult<()> {
        let tags_json = serde_json::to_string(&record.tags)
            .map_err(|e| crate::store::StoreError::Corrupt(e.to_string()))?;

        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO anime (
                id, airing_date, airing_status, audio, dubbed_languages, duration,
                episodes, image, overview, popularity, rating, studio, tags, title,
                top_genre_rank, total_seasons, type, year
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                airing_date = excluded.airing_date,
                airing_status = excluded.airing_status,
                episodes = excluded.episodes,
                popularity = excluded.popularity,
                rating = excluded.rating,
                overview = excluded.overview,
                image = excluded.image,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&record.id)
        .bind(&record.airing_date)
        .bind(&record.airing_status)
        .bind(&record.audio)
        .bind(&record.dubbed_languages)
        .bind(&record.duration)
        .bind(record.episodes)
        .bind(&record.image)
        .bind(&record.overview)
        .bind(record.popularity)
        .bind(record.rating)
        .bind(&record.studio)
        .bind(tags_json)
        .bind(&record.title)
        .bind(&record.top_genre_rank)
        .bind(record.total_seasons)
        .bind(&record.kind)
        .bind(record.year)
        .execute(&mut *tx)
        .await?;

        for tag in &record.tags {
            sqlx::query("INSERT OR IGNORE INTO anime_tags (anime_id, tag_name) VALUES (?, ?)")
                .bind(&record.id)
                .bind(tag)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
