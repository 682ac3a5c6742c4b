use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{Better, BetterId};
use crate::storage::CreatedObjects;

pub async fn list_betters(State(state): State<AppState>) -> Json<Vec<Better>> {
    let store = state.store.read().await;
    Json(store.list_betters())
}

pub async fn create_better(
    State(state): State<AppState>,
    Json(better): Json<Better>,
) -> Result<(StatusCode, Json<Better>), ApiError> {
    let created = state.write(move |store| store.add_better(better)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_better(
    State(state): State<AppState>,
    Path(id): Path<BetterId>,
) -> Result<Json<Better>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.get_better(id)?))
}

pub async fn delete_better(
    State(state): State<AppState>,
    Path(id): Path<BetterId>,
) -> Result<StatusCode, ApiError> {
    state.write(move |store| store.delete_better(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Everything the better has created.
pub async fn created_by_better(
    State(state): State<AppState>,
    Path(id): Path<BetterId>,
) -> Result<Json<CreatedObjects>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.created_by_better(id)?))
}
