//! AniList GraphQL client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::SyncConfig;
use crate::sync::{MediaSource, SyncError};

const MEDIA_QUERY: &str = r#"
query ($page: Int, $perPage: Int) {
  Page(page: $page, perPage: $perPage) {
    media(type: ANIME, sort: START_DATE_DESC) {
      id
      title { romaji english }
      description
      format
      status
      episodes
      duration
      seasonYear
      startDate { year month day }
      averageScore
      popularity
      genres
      rankings { rank type format }
      studios(isMain: true) {
        nodes { name }
      }
      coverImage { extraLarge }
    }
  }
}"#;

/// One AniList media entry, as much of it as the catalog uses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: i64,
    #[serde(default)]
    pub title: MediaTitle,
    pub description: Option<String>,
    pub format: Option<String>,
    pub status: Option<String>,
    pub episodes: Option<i64>,
    pub duration: Option<i64>,
    pub season_year: Option<i64>,
    pub start_date: Option<FuzzyDate>,
    pub average_score: Option<i64>,
    pub popularity: Option<i64>,
    pub genres: Option<Vec<String>>,
    pub rankings: Option<Vec<Ranking>>,
    pub studios: Option<StudioConnection>,
    pub cover_image: Option<CoverImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
}

/// A date where any part may be unknown.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FuzzyDate {
    pub year: Option<i64>,
    pub month: Option<i64>,
    pub day: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ranking {
    pub rank: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudioConnection {
    #[serde(default)]
    pub nodes: Vec<Studio>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Studio {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverImage {
    pub extra_large: Option<String>,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<PageData>,
}

#[derive(Deserialize)]
struct PageData {
    #[serde(rename = "Page")]
    page: Option<MediaPage>,
}

#[derive(Deserialize)]
struct MediaPage {
    media: Option<Vec<Media>>,
}

/// Fetches pages of recently started anime from AniList.
pub struct AniListClient {
    client: reqwest::Client,
    endpoint: String,
    per_page: u32,
}

impl AniListClient {
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            per_page: config.per_page,
        })
    }
}

#[async_trait]
impl MediaSource for AniListClient {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Media>, SyncError> {
        let body = json!({
            "query": MEDIA_QUERY,
            "variables": { "page": page, "perPage": self.per_page },
        });

        let res = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(SyncError::Status(status.as_u16()));
        }

        let parsed: GraphQlResponse = res.json().await?;
        Ok(parsed
            .data
            .and_then(|d| d.page)
            .and_then(|p| p.media)
            .unwrap_or_default())
    }
}
