use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Block Rush Back.
#[openapi(
    paths(
        crate::routes::booking::claim_block,
        crate::routes::booking::reset_board,
        crate::routes::game::game_status,
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::booking::ClaimRequest,
            crate::dto::booking::ClaimResponse,
            crate::dto::game::GamePhaseDto,
            crate::dto::game::GameStatusResponse,
            crate::dto::game::RewardBlockSummary,
            crate::dto::health::HealthResponse,
            crate::dto::sse::BatchClaimEvent,
            crate::dto::sse::BlockClaim,
            crate::dto::ws::PlayerInboundMessage,
            crate::dto::ws::PresenceAck,
        )
    ),
    tags(
        (name = "booking", description = "Block claim operations"),
        (name = "game", description = "Round status"),
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events stream"),
        (name = "presence", description = "WebSocket presence sessions"),
    )
)]
pub struct ApiDoc;
