use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;
use tracing::info;

use crate::{error::AppError, routes::checked_game_id, services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/games/{game_id}/sse",
    tag = "sse",
    params(("game_id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Live game stream: handshake, game_state, plays and half_inning events", content_type = "text/event-stream", body = String),
        (status = 503, description = "Storage unavailable")
    )
)]
/// Stream live state, play log and half-inning changes of one game.
pub async fn game_stream(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    checked_game_id(&game_id)?;
    let events = sse_service::subscribe_game(&state, &game_id).await?;
    info!(game_id, "new game SSE connection");
    Ok(sse_service::to_sse_stream(
        events,
        state.config().sse_capacity,
        game_id,
    ))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/games/{game_id}/sse", get(game_stream))
}
