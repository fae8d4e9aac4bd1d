//! Route handlers.
//!
//! Each handler validates its own path and query shape before touching the
//! catalog. Path segments are parsed from the raw URI so that malformed paths
//! get a route-specific 400 rather than a routing 404.

use std::collections::HashMap;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::Uri,
    Json,
};

use crate::catalog::types::parse_page;
use crate::catalog::{AnimeDetail, AnimeSummary, EpisodeLinks, SearchFilter, SearchParams};
use crate::error::{ApiError, ApiResult};
use crate::http::server::AppState;

/// Raw query pairs as the router hands them over.
pub type RawQuery = Result<Query<Vec<(String, String)>>, QueryRejection>;

/// Decoded query parameters where the first occurrence of a key wins.
///
/// An undecodable query string reads as if no parameters were sent.
#[derive(Debug, Default)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut values = HashMap::with_capacity(pairs.len());
        for (key, value) in pairs {
            values.entry(key).or_insert(value);
        }
        Self(values)
    }

    fn from_query(query: RawQuery) -> Self {
        query
            .map(|Query(pairs)| Self::from_pairs(pairs))
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Remove `key`, treating an empty value as absent.
    pub fn take_present(&mut self, key: &str) -> Option<String> {
        self.0.remove(key).filter(|v| !v.is_empty())
    }

    fn into_search(mut self) -> SearchParams {
        SearchParams {
            q: self.0.remove("q"),
            kind: self.0.remove("type"),
            year: self.0.remove("year"),
            tag: self.0.remove("tag"),
            page: self.0.remove("page"),
        }
    }
}

/// `GET /api/anime?page=N`
pub async fn list_anime(
    State(state): State<AppState>,
    query: RawQuery,
) -> ApiResult<Json<Vec<AnimeSummary>>> {
    let params = QueryParams::from_query(query);
    let page = parse_page(params.get("page"));
    Ok(Json(state.catalog.list(page).await?))
}

/// `GET /api/search?q=&type=&year=&tag=&page=`
pub async fn search_anime(
    State(state): State<AppState>,
    query: RawQuery,
) -> ApiResult<Json<Vec<AnimeSummary>>> {
    let filter = SearchFilter::from_params(QueryParams::from_query(query).into_search());
    if filter.is_empty() {
        return Err(ApiError::MalformedRequest("Empty Search"));
    }
    Ok(Json(state.catalog.search(&filter).await?))
}

/// `GET /api/anime/{id}`
pub async fn anime_detail(
    State(state): State<AppState>,
    uri: Uri,
) -> ApiResult<Json<AnimeDetail>> {
    let id = parse_detail_path(uri.path())?;
    match state.catalog.detail(id).await? {
        Some(detail) => Ok(Json(detail)),
        None => Err(ApiError::NotFound("Not Found")),
    }
}

/// `GET /api/episode/{id}/{number}?ts=&sig=`
pub async fn episode_links(
    State(state): State<AppState>,
    uri: Uri,
    query: RawQuery,
) -> ApiResult<Json<EpisodeLinks>> {
    let (id, number) = parse_episode_path(uri.path(), state.max_episode_number)?;

    let mut params = QueryParams::from_query(query);
    let (Some(ts), Some(sig)) = (params.take_present("ts"), params.take_present("sig")) else {
        return Err(ApiError::SignatureMissing);
    };
    state.verifier.check_now(id, number, &ts, &sig)?;

    match state.catalog.episode(id, number).await? {
        Some(links) => Ok(Json(links)),
        None => Err(ApiError::NotFound("Episode Not Found")),
    }
}

/// Anything the router does not know.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not Found")
}

/// `/api/anime/{id}`: exactly one non-empty segment after the prefix.
pub fn parse_detail_path(path: &str) -> ApiResult<&str> {
    let parts: Vec<&str> = path.split('/').collect();
    match parts.as_slice() {
        ["", "api", "anime", id] if !id.is_empty() => Ok(*id),
        _ => Err(ApiError::MalformedRequest("Invalid Request")),
    }
}

/// `/api/episode/{id}/{number}` with `1 <= number <= max_number`.
pub fn parse_episode_path(path: &str, max_number: u32) -> ApiResult<(&str, u32)> {
    let parts: Vec<&str> = path.split('/').collect();
    let (id, raw_number) = match parts.as_slice() {
        ["", "api", "episode", id, number] if !id.is_empty() && !number.is_empty() => {
            (*id, *number)
        }
        _ => return Err(ApiError::MalformedRequest("Invalid Episode Request")),
    };

    match raw_number.parse::<u32>() {
        Ok(n) if (1..=max_number).contains(&n) => Ok((id, n)),
        _ => Err(ApiError::MalformedRequest("Invalid Episode Number")),
    }
}
