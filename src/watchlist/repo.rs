use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Catalog-cache row: a local snapshot of one AniList title, written on the
/// first watchlist add that references it and never refreshed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Anime {
    pub id: Uuid,
    pub anilist_id: i64,
    pub title_romaji: Option<String>,
    pub title_english: Option<String>,
    pub title_native: Option<String>,
    pub cover_large: Option<String>,
    pub cover_medium: Option<String>,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub episodes: Option<i32>,
    pub average_score: Option<i32>,
    pub created_at: OffsetDateTime,
}

/// Fields needed to create a catalog-cache row.
#[derive(Debug, Clone)]
pub struct NewAnime {
    pub anilist_id: i64,
    pub title_romaji: Option<String>,
    pub title_english: Option<String>,
    pub title_native: Option<String>,
    pub cover_large: Option<String>,
    pub cover_medium: Option<String>,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub episodes: Option<i32>,
    pub average_score: Option<i32>,
}

impl Anime {
    pub async fn find_by_anilist_id(db: &PgPool, anilist_id: i64) -> anyhow::Result<Option<Anime>> {
        let anime = sqlx::query_as::<_, Anime>(
            r#"
            SELECT id, anilist_id, title_romaji, title_english, title_native,
                   cover_large, cover_medium, description, genres, episodes,
                   average_score, created_at
            FROM anime
            WHERE anilist_id = $1
            "#,
        )
        .bind(anilist_id)
        .fetch_optional(db)
        .await?;
        Ok(anime)
    }

    pub async fn create(db: &PgPool, new: &NewAnime) -> anyhow::Result<Anime> {
        let anime = sqlx::query_as::<_, Anime>(
            r#"
            INSERT INTO anime (anilist_id, title_romaji, title_english, title_native,
                               cover_large, cover_medium, description, genres,
                               episodes, average_score)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, anilist_id, title_romaji, title_english, title_native,
                      cover_large, cover_medium, description, genres, episodes,
                      average_score, created_at
            "#,
        )
        .bind(new.anilist_id)
        .bind(&new.title_romaji)
        .bind(&new.title_english)
        .bind(&new.title_native)
        .bind(&new.cover_large)
        .bind(&new.cover_medium)
        .bind(&new.description)
        .bind(&new.genres)
        .bind(new.episodes)
        .bind(new.average_score)
        .fetch_one(db)
        .await?;
        Ok(anime)
    }

    /// Look up the cached row, creating it on first reference.
    pub async fn find_or_create(db: &PgPool, new: &NewAnime) -> anyhow::Result<Anime> {
        if let Some(existing) = Self::find_by_anilist_id(db, new.anilist_id).await? {
            return Ok(existing);
        }
        Self::create(db, new).await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WatchlistEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub anime_id: Uuid,
    pub status: String,
    pub created_at: OffsetDateTime,
}

/// Flat join row: one watchlist entry with its anime columns aliased in.
#[derive(Debug, Clone, FromRow)]
pub struct EntryWithAnime {
    pub entry_id: Uuid,
    pub status: String,
    pub entry_created_at: OffsetDateTime,
    pub anime_id: Uuid,
    pub anilist_id: i64,
    pub title_romaji: Option<String>,
    pub title_english: Option<String>,
    pub title_native: Option<String>,
    pub cover_large: Option<String>,
    pub cover_medium: Option<String>,
    pub description: Option<String>,
    pub genres: Vec<String>,
    pub episodes: Option<i32>,
    pub average_score: Option<i32>,
}

impl WatchlistEntry {
    /// Lookup-before-insert duplicate check; uniqueness of (user, anime) is
    /// application-level, not a database constraint.
    pub async fn find(
        db: &PgPool,
        user_id: Uuid,
        anime_id: Uuid,
    ) -> anyhow::Result<Option<WatchlistEntry>> {
        let entry = sqlx::query_as::<_, WatchlistEntry>(
            r#"
            SELECT id, user_id, anime_id, status, created_at
            FROM watchlist_entries
            WHERE user_id = $1 AND anime_id = $2
            "#,
        )
        .bind(user_id)
        .bind(anime_id)
        .fetch_optional(db)
        .await?;
        Ok(entry)
    }

    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        anime_id: Uuid,
        status: &str,
    ) -> anyhow::Result<WatchlistEntry> {
        let entry = sqlx::query_as::<_, WatchlistEntry>(
            r#"
            INSERT INTO watchlist_entries (user_id, anime_id, status)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, anime_id, status, created_at
            "#,
        )
        .bind(user_id)
        .bind(anime_id)
        .bind(status)
        .fetch_one(db)
        .await?;
        Ok(entry)
    }

    /// Delete the (user, anime) pair; returns the number of rows removed.
    /// Removing a non-member pair deletes nothing.
    pub async fn delete(db: &PgPool, user_id: Uuid, anime_id: Uuid) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM watchlist_entries
            WHERE user_id = $1 AND anime_id = $2
            "#,
        )
        .bind(user_id)
        .bind(anime_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }

    /// All of a user's entries, newest first, anime row joined in.
    pub async fn list_with_anime(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<EntryWithAnime>> {
        let rows = sqlx::query_as::<_, EntryWithAnime>(
            r#"
            SELECT w.id AS entry_id, w.status, w.created_at AS entry_created_at,
                   a.id AS anime_id, a.anilist_id, a.title_romaji, a.title_english,
                   a.title_native, a.cover_large, a.cover_medium, a.description,
                   a.genres, a.episodes, a.average_score
            FROM watchlist_entries w
            JOIN anime a ON a.id = w.anime_id
            WHERE w.user_id = $1
            ORDER BY w.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
