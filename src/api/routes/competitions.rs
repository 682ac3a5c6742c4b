use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{
    Bet, BetEvent, Competition, CompetitionDetails, CompetitionId, CompetitionMetrics,
    CompetitionResult, CompetitorId,
};

pub async fn list_competitions(State(state): State<AppState>) -> Json<Vec<Competition>> {
    let store = state.store.read().await;
    Json(store.list_competitions())
}

pub async fn create_competition(
    State(state): State<AppState>,
    Json(competition): Json<Competition>,
) -> Result<(StatusCode, Json<Competition>), ApiError> {
    let created = state
        .write(move |store| store.add_competition(competition))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_competition(
    State(state): State<AppState>,
    Path(id): Path<CompetitionId>,
) -> Result<Json<CompetitionDetails>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.get_competition(id)?))
}

pub async fn delete_competition(
    State(state): State<AppState>,
    Path(id): Path<CompetitionId>,
) -> Result<StatusCode, ApiError> {
    state.write(move |store| store.delete_competition(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn competition_metrics(
    State(state): State<AppState>,
    Path(id): Path<CompetitionId>,
) -> Result<Json<CompetitionMetrics>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.competition_metrics(id)?))
}

pub async fn competition_bets(
    State(state): State<AppState>,
    Path(id): Path<CompetitionId>,
) -> Result<Json<Vec<Bet>>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.bets_for_competition(id)?))
}

/// Submit the final result. Responds with the metrics at lock time.
pub async fn lock_competition(
    State(state): State<AppState>,
    Path(id): Path<CompetitionId>,
    Json(results): Json<Vec<CompetitionResult>>,
) -> Result<Json<CompetitionMetrics>, ApiError> {
    let metrics = state
        .write(move |store| store.lock_competition(id, results))
        .await?;

    state.broadcast(&BetEvent::CompetitionLocked { competition_id: id });
    Ok(Json(metrics))
}

pub async fn add_competitor(
    State(state): State<AppState>,
    Path((id, competitor_id)): Path<(CompetitionId, CompetitorId)>,
) -> Result<Json<CompetitionDetails>, ApiError> {
    let details = state
        .write(move |store| {
            store.add_competitor_to_competition(competitor_id, id)?;
            store.get_competition(id)
        })
        .await?;
    Ok(Json(details))
}
