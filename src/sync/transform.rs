//! Mapping AniList media onto catalog records.

use crate::catalog::AnimeRecord;
use crate::sync::anilist::{FuzzyDate, Media, Ranking};
use crate::sync::SyncError;

const MAX_OVERVIEW_CHARS: usize = 2000;

/// Build the catalog record for `media`.
pub fn transform(media: &Media) -> Result<AnimeRecord, SyncError> {
    let title = non_empty(&media.title.english)
        .or_else(|| non_empty(&media.title.romaji))
        .ok_or(SyncError::MissingTitle(media.id))?
        .to_string();

    Ok(AnimeRecord {
        id: format!("{}-{}", slugify(&title), media.id),
        year: positive(media.season_year),
        kind: media.format.clone(),
        image: media.cover_image.as_ref().and_then(|c| c.extra_large.clone()),
        overview: media.description.as_deref().and_then(clean_html),
        episodes: media.episodes.unwrap_or(0),
        duration: positive(media.duration).map(|d| format!("{} min", d)),
        audio: "SUB".to_string(),
        dubbed_languages: None,
        rating: positive(media.average_score),
        popularity: positive(media.popularity),
        top_genre_rank: media.rankings.as_deref().and_then(top_rank),
        airing_status: media.status.as_deref().and_then(map_status).map(String::from),
        airing_date: media.start_date.as_ref().and_then(format_date),
        studio: media
            .studios
            .as_ref()
            .and_then(|s| s.nodes.first())
            .map(|s| s.name.clone()),
        tags: media.genres.clone().unwrap_or_default(),
        total_seasons: 1,
        title,
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn positive(value: Option<i64>) -> Option<i64> {
    value.filter(|v| *v != 0)
}

/// Lowercase, drop everything but ASCII word characters and whitespace, and
/// turn each whitespace run into a single `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_space = false;
    for c in title.to_lowercase().chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
                in_space = true;
            }
        } else if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c);
            in_space = false;
        }
    }
    slug
}

/// Strip `<...>` tags and cap the length. Blank input yields `None`.
pub fn clean_html(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('<') {
        match rest[start..].find('>') {
            Some(len) => {
                out.push_str(&rest[..start]);
                rest = &rest[start + len + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);

    Some(out.chars().take(MAX_OVERVIEW_CHARS).collect())
}

pub fn map_status(status: &str) -> Option<&'static str> {
    match status {
        "RELEASING" => Some("AIRING"),
        "FINISHED" => Some("COMPLETED"),
        "CANCELLED" => Some("DISMISSED"),
        _ => None,
    }
}

/// `YYYY-MM-DD`, with unknown month or day as `01`.
pub fn format_date(date: &FuzzyDate) -> Option<String> {
    let year = positive(date.year)?;
    let month = positive(date.month).unwrap_or(1);
    let day = positive(date.day).unwrap_or(1);
    Some(format!("{}-{:02}-{:02}", year, month, day))
}

/// Prefer the best-rated ranking, then the most-popular one.
pub fn top_rank(rankings: &[Ranking]) -> Option<String> {
    rankings
        .iter()
        .find(|r| r.kind == "RATED")
        .or_else(|| rankings.iter().find(|r| r.kind == "POPULAR"))
        .map(|r| format!("Top #{}", r.rank))
}
