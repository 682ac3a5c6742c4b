use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{Bet, BetEvent, BetId};

pub async fn list_bets(State(state): State<AppState>) -> Json<Vec<Bet>> {
    let store = state.store.read().await;
    Json(store.list_bets())
}

/// Place a bet, or update the better's earlier bet on the same competitor.
pub async fn create_bet(
    State(state): State<AppState>,
    Json(bet): Json<Bet>,
) -> Result<(StatusCode, Json<Bet>), ApiError> {
    let saved = state.write(move |store| store.add_bet(bet)).await?;

    state.broadcast(&BetEvent::BetPlaced { bet: saved.clone() });
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn get_bet(
    State(state): State<AppState>,
    Path(id): Path<BetId>,
) -> Result<Json<Bet>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.get_bet(id)?))
}

pub async fn delete_bet(
    State(state): State<AppState>,
    Path(id): Path<BetId>,
) -> Result<StatusCode, ApiError> {
    let removed = state.write(move |store| store.delete_bet(id)).await?;

    state.broadcast(&BetEvent::BetDeleted {
        bet_id: removed.id,
        competition_id: removed.competition_id,
    });
    Ok(StatusCode::NO_CONTENT)
}
