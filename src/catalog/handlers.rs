use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, instrument};

use crate::state::AppState;

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/anime/trending", get(trending))
        .route("/anime/popular", get(popular))
        .route("/anime/search", get(search))
        .route("/anime/:id", get(detail))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
}

#[instrument(skip(state))]
pub async fn trending(
    State(state): State<AppState>,
) -> Result<Json<Vec<Value>>, (StatusCode, String)> {
    match state.catalog.trending().await {
        Ok(items) => Ok(Json(items)),
        Err(e) => {
            error!(error = %e, "trending query failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching new anime".into(),
            ))
        }
    }
}

#[instrument(skip(state))]
pub async fn popular(
    State(state): State<AppState>,
) -> Result<Json<Vec<Value>>, (StatusCode, String)> {
    match state.catalog.popular().await {
        Ok(items) => Ok(Json(items)),
        Err(e) => {
            error!(error = %e, "popular query failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching trending anime".into(),
            ))
        }
    }
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Value>>, (StatusCode, String)> {
    match state.catalog.search(&params.q).await {
        Ok(items) => Ok(Json(items)),
        Err(e) => {
            error!(error = %e, q = %params.q, "search query failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching anime data".into(),
            ))
        }
    }
}

#[instrument(skip(state))]
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, (StatusCode, String)> {
    match state.catalog.detail(id).await {
        Ok(Some(media)) => Ok(Json(media)),
        Ok(None) => Err((StatusCode::NOT_FOUND, "Anime not found".into())),
        Err(e) => {
            error!(error = %e, id, "detail query failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error fetching anime details".into(),
            ))
        }
    }
}
