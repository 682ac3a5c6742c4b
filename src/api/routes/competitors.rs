use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{CompetitionId, Competitor, CompetitorId};

#[derive(Debug, Deserialize)]
pub struct CreateCompetitorRequest {
    #[serde(flatten)]
    pub competitor: Competitor,

    /// Competition the new competitor takes part in
    #[serde(default)]
    pub competition_id: Option<CompetitionId>,
}

pub async fn list_competitors(State(state): State<AppState>) -> Json<Vec<Competitor>> {
    let store = state.store.read().await;
    Json(store.list_competitors())
}

pub async fn create_competitor(
    State(state): State<AppState>,
    Json(request): Json<CreateCompetitorRequest>,
) -> Result<(StatusCode, Json<Competitor>), ApiError> {
    let created = state
        .write(move |store| store.add_competitor(request.competitor, request.competition_id))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_competitor(
    State(state): State<AppState>,
    Path(id): Path<CompetitorId>,
) -> Result<Json<Competitor>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.get_competitor(id)?))
}

pub async fn delete_competitor(
    State(state): State<AppState>,
    Path(id): Path<CompetitorId>,
) -> Result<StatusCode, ApiError> {
    state.write(move |store| store.delete_competitor(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
