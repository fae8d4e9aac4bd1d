//! Catalog row and response types.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Rows returned per listing or search page.
pub const PAGE_SIZE: i64 = 20;

/// Row offset for a 1-based page number. Pages below 1 read as 1.
pub fn page_offset(page: u32) -> i64 {
    (i64::from(page.max(1)) - 1) * PAGE_SIZE
}

/// One row of a listing or search page.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct AnimeSummary {
    pub id: String,
    pub title: String,
    pub year: Option<i64>,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: Option<String>,
    pub image: Option<String>,
    pub duration: Option<String>,
    pub rating: Option<i64>,
}

/// Social links shown on the detail page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialLinks {
    pub telegram: Option<String>,
    pub reddit: Option<String>,
}

/// Full detail for one title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimeDetail {
    pub id: String,
    pub title: String,
    pub year: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub episodes: Option<i64>,
    pub audio: Option<String>,
    pub duration: Option<String>,
    pub watch_link: Option<String>,
    pub rating: Option<i64>,
    pub overview: Option<String>,
    pub tags: Vec<String>,
    pub social: SocialLinks,
}

/// Stream and download URLs for one episode.
///
/// Serializes as `{"E{n}": stream_url, "D{n}": download_url}`.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeLinks {
    pub stream_key: String,
    pub stream_url: Option<String>,
    pub download_key: String,
    pub download_url: Option<String>,
}

impl EpisodeLinks {
    pub fn new(number: u32, stream_url: Option<String>, download_url: Option<String>) -> Self {
        Self {
            stream_key: format!("E{}", number),
            stream_url,
            download_key: format!("D{}", number),
            download_url,
        }
    }
}

impl Serialize for EpisodeLinks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(&self.stream_key, &self.stream_url)?;
        map.serialize_entry(&self.download_key, &self.download_url)?;
        map.end()
    }
}

/// Raw search query parameters.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub q: Option<String>,
    pub kind: Option<String>,
    pub year: Option<String>,
    pub tag: Option<String>,
    pub page: Option<String>,
}

/// Normalized search filter. Text filters are trimmed and lowercased, except
/// `year` which is only trimmed; blank values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    pub q: Option<String>,
    pub kind: Option<String>,
    pub year: Option<String>,
    pub tag: Option<String>,
    pub page: u32,
}

impl SearchFilter {
    pub fn from_params(params: SearchParams) -> Self {
        Self {
            q: non_blank(params.q).map(|s| s.to_lowercase()),
            kind: non_blank(params.kind).map(|s| s.to_lowercase()),
            year: non_blank(params.year),
            tag: non_blank(params.tag).map(|s| s.to_lowercase()),
            page: parse_page(params.page.as_deref()),
        }
    }

    /// True when no filter was given; the page number alone does not count.
    pub fn is_empty(&self) -> bool {
        self.q.is_none() && self.kind.is_none() && self.year.is_none() && self.tag.is_none()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse a 1-based page number. Missing, malformed or zero pages read as 1.
pub fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|p| p.trim().parse::<u32>().ok())
        .unwrap_or(1)
        .max(1)
}

/// A title as written by the sync job.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimeRecord {
    pub id: String,
    pub title: String,
    pub year: Option<i64>,
    pub kind: Option<String>,
    pub image: Option<String>,
    pub overview: Option<String>,
    pub episodes: i64,
    pub duration: Option<String>,
    pub audio: String,
    pub dubbed_languages: Option<String>,
    pub rating: Option<i64>,
    pub popularity: Option<i64>,
    pub top_genre_rank: Option<String>,
    pub airing_status: Option<String>,
    pub airing_date: Option<String>,
    pub studio: Option<String>,
    pub tags: Vec<String>,
    pub total_seasons: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_links_field_names() {
        let links = EpisodeLinks::new(
            7,
            Some("https://cdn.example/s/7".into()),
            Some("https://cdn.example/d/7".into()),
        );
        let json = serde_json::to_value(&links).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "E7": "https://cdn.example/s/7",
                "D7": "https://cdn.example/d/7"
            })
        );
    }

    #[test]
    fn test_summary_serializes_type_field() {
        let row = AnimeSummary {
            id: "frieren-154587".into(),
            title: "Frieren".into(),
            year: Some(2023),
            kind: Some("TV".into()),
            image: None,
            duration: Some("24 min".into()),
            rating: Some(91),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["type"], "TV");
        assert!(json["image"].is_null());
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_search_filter_normalization() {
        let filter = SearchFilter::from_params(SearchParams {
            q: Some("  Frieren ".into()),
            kind: Some("TV".into()),
            year: Some(" 2023 ".into()),
            tag: Some("   ".into()),
            page: Some("0".into()),
        });
        assert_eq!(filter.q.as_deref(), Some("frieren"));
        assert_eq!(filter.kind.as_deref(), Some("tv"));
        assert_eq!(filter.year.as_deref(), Some("2023"));
        assert_eq!(filter.tag, None);
        assert_eq!(filter.page, 1);
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_page_only_is_empty_search() {
        let filter = SearchFilter::from_params(SearchParams {
            page: Some("3".into()),
            ..SearchParams::default()
        });
        assert!(filter.is_empty());
        assert_eq!(filter.page, 3);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some("-4")), 1);
        assert_eq!(page_offset(1), 0);
        assert_eq!(page_offset(3), 40);
        assert_eq!(page_offset(0), 0);
    }
}
