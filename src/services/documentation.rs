use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the live scorer backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::scoring::get_scoring,
        crate::routes::scoring::init_scoring,
        crate::routes::scoring::record_event,
        crate::routes::scoring::undo_play,
        crate::routes::scoring::update_team,
        crate::routes::scoring::toggle_base,
        crate::routes::scoring::switch_half,
        crate::routes::scoring::reset_count,
        crate::routes::scoring::set_active,
        crate::routes::game::list_plays,
        crate::routes::game::linescore,
        crate::routes::game::roster,
        crate::routes::sse::game_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::scoring::InitScoringRequest,
            crate::dto::scoring::InitScoringResponse,
            crate::dto::scoring::ScoringEventInput,
            crate::dto::scoring::StrikeKindInput,
            crate::dto::scoring::ScoringEventRequest,
            crate::dto::scoring::ScoringEventResponse,
            crate::dto::scoring::UndoResponse,
            crate::dto::scoring::UpdateTeamRequest,
            crate::dto::scoring::SetActiveRequest,
            crate::dto::plays::PlayEventDto,
            crate::dto::linescore::LinescoreResponse,
            crate::dto::linescore::HalfInningRunsDto,
            crate::dto::linescore::TeamTotals,
            crate::dto::sse::Handshake,
            crate::dto::sse::HalfInningEvent,
            crate::dao::models::Roster,
            crate::dao::models::Player,
            crate::state::game::GameState,
            crate::state::game::TeamState,
            crate::state::game::BatterStat,
            crate::state::game::TeamSide,
            crate::state::play::PitchType,
            crate::state::adjustments::Base,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "scoring", description = "Live scoring commands and manual corrections"),
        (name = "plays", description = "Play log, linescore and roster reads"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
