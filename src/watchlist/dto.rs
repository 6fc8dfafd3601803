use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Tracked status of one title, lowercase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchlistStatus {
    Watching,
    Completed,
    #[default]
    Planned,
}

impl WatchlistStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Watching => "watching",
            Self::Completed => "completed",
            Self::Planned => "planned",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TitleDto {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverImageDto {
    pub large: Option<String>,
    pub medium: Option<String>,
}

/// Request body for adding a title; mirrors the AniList media shape the
/// browser client already holds, so the wire format is camelCase.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRequest {
    pub anilist_id: i64,
    #[serde(default)]
    pub title: TitleDto,
    #[serde(default)]
    pub cover_image: CoverImageDto,
    pub description: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub episodes: Option<i32>,
    pub average_score: Option<i32>,
    #[serde(default)]
    pub status: WatchlistStatus,
}

/// Catalog-cache row as returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimeDto {
    pub id: Uuid,
    pub anilist_id: i64,
    pub title: TitleDto,
    pub cover_image: CoverImageDto,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub episodes: Option<i32>,
    pub average_score: Option<i32>,
}

/// One watchlist entry with its catalog row inlined.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    pub id: Uuid,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub anime: AnimeDto,
}

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}
