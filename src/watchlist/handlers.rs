use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    state::AppState,
    watchlist::{
        dto::{AddRequest, AnimeDto, CoverImageDto, Message, TitleDto, WatchlistItem},
        repo::{Anime, EntryWithAnime, NewAnime, WatchlistEntry},
    },
};

pub fn watchlist_routes() -> Router<AppState> {
    Router::new()
        .route("/watchlist", get(list))
        .route("/watchlist/add", post(add))
        .route("/watchlist/remove/:id", delete(remove))
}

impl From<&AddRequest> for NewAnime {
    fn from(req: &AddRequest) -> Self {
        Self {
            anilist_id: req.anilist_id,
            title_romaji: req.title.romaji.clone(),
            title_english: req.title.english.clone(),
            title_native: req.title.native.clone(),
            cover_large: req.cover_image.large.clone(),
            cover_medium: req.cover_image.medium.clone(),
            description: req.description.clone(),
            genres: req.genres.clone(),
            episodes: req.episodes,
            average_score: req.average_score,
        }
    }
}

impl From<EntryWithAnime> for WatchlistItem {
    fn from(row: EntryWithAnime) -> Self {
        Self {
            id: row.entry_id,
            status: row.status,
            created_at: row.entry_created_at,
            anime: AnimeDto {
                id: row.anime_id,
                anilist_id: row.anilist_id,
                title: TitleDto {
                    romaji: row.title_romaji,
                    english: row.title_english,
                    native: row.title_native,
                },
                cover_image: CoverImageDto {
                    large: row.cover_large,
                    medium: row.cover_medium,
                },
                description: row.description,
                genres: row.genres,
                episodes: row.episodes,
                average_score: row.average_score,
            },
        }
    }
}

#[instrument(skip(state, auth, payload))]
pub async fn add(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<AddRequest>,
) -> Result<Json<Message>, (StatusCode, String)> {
    let anime = match Anime::find_or_create(&state.db, &NewAnime::from(&payload)).await {
        Ok(a) => a,
        Err(e) => {
            error!(error = %e, anilist_id = payload.anilist_id, "anime upsert failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Server error".into()));
        }
    };

    match WatchlistEntry::find(&state.db, auth.id, anime.id).await {
        Ok(Some(_)) => {
            warn!(user_id = %auth.id, anime_id = %anime.id, "duplicate watchlist add");
            return Err((StatusCode::CONFLICT, "Already in watchlist".into()));
        }
        Ok(None) => {}
        Err(e) => {
            error!(error = %e, "watchlist lookup failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Server error".into()));
        }
    }

    if let Err(e) =
        WatchlistEntry::insert(&state.db, auth.id, anime.id, payload.status.as_str()).await
    {
        error!(error = %e, "watchlist insert failed");
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "Server error".into()));
    }

    info!(user_id = %auth.id, anime_id = %anime.id, status = payload.status.as_str(), "added to watchlist");
    Ok(Json(Message {
        message: "Added to watchlist",
    }))
}

#[instrument(skip(state, auth))]
pub async fn remove(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(anime_id): Path<Uuid>,
) -> Result<Json<Message>, (StatusCode, String)> {
    match WatchlistEntry::delete(&state.db, auth.id, anime_id).await {
        Ok(removed) => {
            // Removing a non-member entry is a silent no-op
            debug!(user_id = %auth.id, %anime_id, removed, "watchlist remove");
            Ok(Json(Message {
                message: "Removed from watchlist",
            }))
        }
        Err(e) => {
            error!(error = %e, "watchlist delete failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Server error".into()))
        }
    }
}

#[instrument(skip(state, auth))]
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<WatchlistItem>>, (StatusCode, String)> {
    let rows = match WatchlistEntry::list_with_anime(&state.db, auth.id).await {
        Ok(rows) => rows,
        Err(e) => {
            error!(error = %e, user_id = %auth.id, "watchlist list failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Server error".into()));
        }
    };

    Ok(Json(rows.into_iter().map(WatchlistItem::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn sample_row() -> EntryWithAnime {
        EntryWithAnime {
            entry_id: Uuid::new_v4(),
            status: "watching".into(),
            entry_created_at: OffsetDateTime::UNIX_EPOCH,
            anime_id: Uuid::new_v4(),
            anilist_id: 16498,
            title_romaji: Some("Shingeki no Kyojin".into()),
            title_english: Some("Attack on Titan".into()),
            title_native: None,
            cover_large: Some("https://img/large.jpg".into()),
            cover_medium: None,
            description: None,
            genres: vec!["Action".into()],
            episodes: Some(25),
            average_score: Some(84),
        }
    }

    #[test]
    fn join_row_maps_to_item_with_inlined_anime() {
        let row = sample_row();
        let anilist_id = row.anilist_id;
        let item = WatchlistItem::from(row);
        assert_eq!(item.status, "watching");
        assert_eq!(item.anime.anilist_id, anilist_id);
        assert_eq!(item.anime.title.english.as_deref(), Some("Attack on Titan"));
        assert_eq!(item.anime.cover_image.medium, None);
    }

    #[test]
    fn add_request_maps_to_new_anime() {
        let req: AddRequest = serde_json::from_str(
            r#"{"anilistId": 1, "title": {"romaji": "Cowboy Bebop"}, "genres": ["Sci-Fi"]}"#,
        )
        .unwrap();
        let new = NewAnime::from(&req);
        assert_eq!(new.anilist_id, 1);
        assert_eq!(new.title_romaji.as_deref(), Some("Cowboy Bebop"));
        assert_eq!(new.genres, vec!["Sci-Fi".to_string()]);
        assert_eq!(new.episodes, None);
    }

    fn add_body(anilist_id: i64) -> AddRequest {
        serde_json::from_value(serde_json::json!({ "anilistId": anilist_id })).unwrap()
    }

    #[sqlx::test]
    async fn adding_same_anime_twice_is_rejected(pool: sqlx::PgPool) {
        use crate::auth::repo::User;

        let state = AppState::fake_with_pool(pool);
        let user = User::create(&state.db, "bob", "bob@example.com", "not-a-real-hash")
            .await
            .expect("user");
        let auth = |user: &User| AuthUser {
            id: user.id,
            username: user.username.clone(),
        };

        add(State(state.clone()), auth(&user), Json(add_body(21)))
            .await
            .expect("first add");

        let (status, msg) = add(State(state.clone()), auth(&user), Json(add_body(21)))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(msg, "Already in watchlist");

        // The duplicate attempt left a single entry behind
        let items = list(State(state), auth(&user)).await.expect("list");
        assert_eq!(items.0.len(), 1);
        assert_eq!(items.0[0].anime.anilist_id, 21);
    }
}
