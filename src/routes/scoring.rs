use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Method, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use validator::Validate;

use crate::{
    dto::scoring::{
        InitScoringRequest, InitScoringResponse, ScoringEventRequest, ScoringEventResponse,
        SetActiveRequest, UndoResponse, UpdateTeamRequest,
    },
    error::AppError,
    routes::checked_game_id,
    services::scoring_service::{self, EventCommand},
    state::{SharedState, adjustments::Base, game::{GameState, TeamSide}},
};

const SCORER_TOKEN_HEADER: &str = "x-scorer-token";

/// Live scoring endpoints. Writes require the scorer token when one is configured.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route(
            "/games/{game_id}/scoring",
            get(get_scoring).post(init_scoring),
        )
        .route("/games/{game_id}/scoring/events", post(record_event))
        .route("/games/{game_id}/scoring/undo", post(undo_play))
        .route("/games/{game_id}/scoring/teams/{side}", put(update_team))
        .route(
            "/games/{game_id}/scoring/bases/{base}/toggle",
            post(toggle_base),
        )
        .route("/games/{game_id}/scoring/switch-half", post(switch_half))
        .route("/games/{game_id}/scoring/reset-count", post(reset_count))
        .route("/games/{game_id}/scoring/active", put(set_active))
        .route_layer(middleware::from_fn_with_state(state, require_scorer_token))
}

/// Current live state, or the configured defaults for a game not yet initialized.
#[utoipa::path(
    get,
    path = "/games/{game_id}/scoring",
    tag = "scoring",
    params(("game_id" = String, Path, description = "Game identifier")),
    responses(
        (status = 200, description = "Live game state", body = GameState),
        (status = 400, description = "Invalid game id"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn get_scoring(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Json<GameState>, AppError> {
    checked_game_id(&game_id)?;
    let current = scoring_service::current_state(&state, &game_id).await?;
    Ok(Json(current))
}

/// Create the scoring document of a game. An existing document is returned untouched.
#[utoipa::path(
    post,
    path = "/games/{game_id}/scoring",
    tag = "scoring",
    params(
        ("X-Scorer-Token" = Option<String>, Header, description = "Scorer token when the backend requires one"),
        ("game_id" = String, Path, description = "Game identifier")
    ),
    request_body = InitScoringRequest,
    responses(
        (status = 200, description = "Scoring document present", body = InitScoringResponse),
        (status = 400, description = "Invalid team names"),
        (status = 401, description = "Missing or wrong scorer token")
    )
)]
pub async fn init_scoring(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
    Json(payload): Json<InitScoringRequest>,
) -> Result<Json<InitScoringResponse>, AppError> {
    checked_game_id(&game_id)?;
    payload.validate()?;
    let trim = |name: Option<String>| name.map(|name| name.trim().to_string());
    let response = scoring_service::init_game(
        &state,
        &game_id,
        trim(payload.home_name),
        trim(payload.away_name),
    )
    .await?;
    Ok(Json(response))
}

/// Apply one scoring event to the live state and append it to the play log.
#[utoipa::path(
    post,
    path = "/games/{game_id}/scoring/events",
    tag = "scoring",
    params(
        ("X-Scorer-Token" = Option<String>, Header, description = "Scorer token when the backend requires one"),
        ("game_id" = String, Path, description = "Game identifier")
    ),
    request_body = ScoringEventRequest,
    responses(
        (status = 200, description = "Event applied", body = ScoringEventResponse),
        (status = 400, description = "Event rejected by the engine"),
        (status = 404, description = "Game not initialized")
    )
)]
pub async fn record_event(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
    Json(payload): Json<ScoringEventRequest>,
) -> Result<Json<ScoringEventResponse>, AppError> {
    checked_game_id(&game_id)?;
    payload.validate()?;
    let command = EventCommand {
        event: payload.event.into(),
        batter_id: payload.batter_id,
        pitcher_id: payload.pitcher_id,
        pitch_type: payload.pitch_type,
    };
    let response = scoring_service::apply_event(&state, &game_id, command).await?;
    Ok(Json(response))
}

/// Remove the latest play and restore the state captured before it.
#[utoipa::path(
    post,
    path = "/games/{game_id}/scoring/undo",
    tag = "scoring",
    params(
        ("X-Scorer-Token" = Option<String>, Header, description = "Scorer token when the backend requires one"),
        ("game_id" = String, Path, description = "Game identifier")
    ),
    responses((status = 200, description = "Undo outcome", body = UndoResponse))
)]
pub async fn undo_play(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Json<UndoResponse>, AppError> {
    checked_game_id(&game_id)?;
    let response = scoring_service::undo(&state, &game_id).await?;
    Ok(Json(response))
}

/// Rename a team or correct its runs and errors.
#[utoipa::path(
    put,
    path = "/games/{game_id}/scoring/teams/{side}",
    tag = "scoring",
    params(
        ("X-Scorer-Token" = Option<String>, Header, description = "Scorer token when the backend requires one"),
        ("game_id" = String, Path, description = "Game identifier"),
        ("side" = TeamSide, Path, description = "`home` or `away`")
    ),
    request_body = UpdateTeamRequest,
    responses(
        (status = 200, description = "Team updated", body = GameState),
        (status = 404, description = "Game not initialized")
    )
)]
pub async fn update_team(
    State(state): State<SharedState>,
    Path((game_id, side)): Path<(String, TeamSide)>,
    Json(payload): Json<UpdateTeamRequest>,
) -> Result<Json<GameState>, AppError> {
    checked_game_id(&game_id)?;
    payload.validate()?;
    let updated = scoring_service::adjust_team(&state, &game_id, side, payload.into()).await?;
    Ok(Json(updated))
}

/// Flip the occupancy of one base.
#[utoipa::path(
    post,
    path = "/games/{game_id}/scoring/bases/{base}/toggle",
    tag = "scoring",
    params(
        ("X-Scorer-Token" = Option<String>, Header, description = "Scorer token when the backend requires one"),
        ("game_id" = String, Path, description = "Game identifier"),
        ("base" = Base, Path, description = "`first`, `second` or `third`")
    ),
    responses((status = 200, description = "Base toggled", body = GameState))
)]
pub async fn toggle_base(
    State(state): State<SharedState>,
    Path((game_id, base)): Path<(String, Base)>,
) -> Result<Json<GameState>, AppError> {
    checked_game_id(&game_id)?;
    let updated = scoring_service::toggle_base(&state, &game_id, base).await?;
    Ok(Json(updated))
}

/// Force the other half of the inning, clearing count, outs and bases.
#[utoipa::path(
    post,
    path = "/games/{game_id}/scoring/switch-half",
    tag = "scoring",
    params(
        ("X-Scorer-Token" = Option<String>, Header, description = "Scorer token when the backend requires one"),
        ("game_id" = String, Path, description = "Game identifier")
    ),
    responses((status = 200, description = "Half switched", body = GameState))
)]
pub async fn switch_half(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Json<GameState>, AppError> {
    checked_game_id(&game_id)?;
    let updated = scoring_service::switch_half(&state, &game_id).await?;
    Ok(Json(updated))
}

/// Zero balls and strikes for the current at-bat.
#[utoipa::path(
    post,
    path = "/games/{game_id}/scoring/reset-count",
    tag = "scoring",
    params(
        ("X-Scorer-Token" = Option<String>, Header, description = "Scorer token when the backend requires one"),
        ("game_id" = String, Path, description = "Game identifier")
    ),
    responses((status = 200, description = "Count reset", body = GameState))
)]
pub async fn reset_count(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
) -> Result<Json<GameState>, AppError> {
    checked_game_id(&game_id)?;
    let updated = scoring_service::reset_count(&state, &game_id).await?;
    Ok(Json(updated))
}

/// Mark the game as live or finished.
#[utoipa::path(
    put,
    path = "/games/{game_id}/scoring/active",
    tag = "scoring",
    params(
        ("X-Scorer-Token" = Option<String>, Header, description = "Scorer token when the backend requires one"),
        ("game_id" = String, Path, description = "Game identifier")
    ),
    request_body = SetActiveRequest,
    responses((status = 200, description = "Flag stored", body = GameState))
)]
pub async fn set_active(
    State(state): State<SharedState>,
    Path(game_id): Path<String>,
    Json(payload): Json<SetActiveRequest>,
) -> Result<Json<GameState>, AppError> {
    checked_game_id(&game_id)?;
    let updated = scoring_service::set_active(&state, &game_id, payload.is_active).await?;
    Ok(Json(updated))
}

async fn require_scorer_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.config().scorer_token.as_deref() else {
        return Ok(next.run(req).await);
    };
    if req.method() == Method::GET {
        return Ok(next.run(req).await);
    }

    let provided = req
        .headers()
        .get(SCORER_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized("missing scorer token header `X-Scorer-Token`".into())
        })?;

    if tokens_match(expected.as_bytes(), provided.as_bytes()) {
        Ok(next.run(req).await)
    } else {
        Err(AppError::Unauthorized("invalid scorer token".into()))
    }
}

/// Compares without short-circuiting on the first differing byte.
fn tokens_match(expected: &[u8], provided: &[u8]) -> bool {
    expected.len() == provided.len()
        && expected
            .iter()
            .zip(provided)
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
}
