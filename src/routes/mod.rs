use axum::Router;

use crate::{dto::validation::validate_game_id, error::AppError, state::SharedState};

/// Swagger UI.
pub mod docs;
/// Play log, linescore and roster reads.
pub mod game;
/// Health check.
pub mod health;
/// Scoring commands.
pub mod scoring;
/// Live game stream.
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(scoring::router(state.clone()))
        .merge(game::router())
        .merge(sse::router());

    api_router.merge(docs::router()).with_state(state)
}

/// Reject game ids that cannot be used as a single document path segment.
fn checked_game_id(game_id: &str) -> Result<(), AppError> {
    validate_game_id(game_id).map_err(|err| {
        let reason = err
            .message
            .map(|message| message.into_owned())
            .unwrap_or_else(|| err.code.into_owned());
        AppError::BadRequest(reason)
    })
}
