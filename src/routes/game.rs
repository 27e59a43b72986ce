use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dao::models::Roster,
    dto::{linescore::LinescoreResponse, plays::PlayEventDto},
    error::AppError,
    routes::checked_game_id,
    services::{play_log_service, scoring_service},
    state::SharedState,
};

/// Read-only views over the play log and lineups of a game.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games/{game_id}/plays", get(list_plays))
        .route("/games/{game_id}/linescore", get(linescore))
        .route("/games/{game_id}/roster", get(roster))
}

/// Play log in recording order.
#[utoipa::path(
    get,
    path = "/games/{game_id}/plays",
    tag = "plays",
    params(("game_id" = String, Path, description = "Game identifier")),
    responses((status = 200, description = "Logged plays, oldest first", body = [PlayEventDto]))
)]
pub async fn list_plays(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Json<Vec<PlayEventDto>>, AppError> {
    checked_game_id(&game_id)?;
    let plays = play_log_service::list_plays(&state, &game_id).await?;
    Ok(Json(plays))
}

#[utoipa::path(
    get,
    path = "/games/{game_id}/linescore",
    tag = "plays",
    params(("game_id" = String, Path, description = "Game identifier")),
    responses((status = 200, description = "Runs per half-inning and R/H/E totals", body = LinescoreResponse))
)]
/// Runs per half-inning with R/H/E totals.
pub async fn linescore(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Json<LinescoreResponse>, AppError> {
    checked_game_id(&game_id)?;
    let line = play_log_service::linescore_for(&state, &game_id).await?;
    Ok(Json(line))
}

/// Both lineups in batting order; a side without a roster document is empty.
#[utoipa::path(
    get,
    path = "/games/{game_id}/roster",
    tag = "plays",
    params(("game_id" = String, Path, description = "Game identifier")),
    responses((status = 200, description = "Home and away lineups", body = Roster))
)]
pub async fn roster(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Json<Roster>, AppError> {
    checked_game_id(&game_id)?;
    let roster = scoring_service::roster(&state, &game_id).await?;
    Ok(Json(roster))
}
