use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use validator::Validate;

use crate::{
    dto::booking::{ClaimRequest, ClaimResponse},
    error::AppError,
    services::booking_service,
    state::SharedState,
};

/// Routes handling block claims and the administrative reset.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/blocks/{id}/claim", post(claim_block))
        .route("/admin/reset", post(reset_board))
}

/// Claim a block for a participant.
#[utoipa::path(
    post,
    path = "/blocks/{id}/claim",
    tag = "booking",
    params(("id" = u32, Path, description = "Block to claim (1 to grid size)")),
    request_body = ClaimRequest,
    responses(
        (status = 200, description = "Block claimed", body = ClaimResponse),
        (status = 400, description = "Invalid block id or participant name"),
        (status = 409, description = "Block already claimed or no round in progress"),
        (status = 503, description = "Reservation store unavailable")
    )
)]
pub async fn claim_block(
    State(state): State<SharedState>,
    Path(id): Path<u32>,
    Json(payload): Json<ClaimRequest>,
) -> Result<Json<ClaimResponse>, AppError> {
    payload.validate()?;
    let response = booking_service::claim_block(&state, id, payload).await?;
    Ok(Json(response))
}

/// Clear every reservation outside the normal round flow.
#[utoipa::path(
    post,
    path = "/admin/reset",
    tag = "booking",
    responses(
        (status = 200, description = "Board cleared"),
        (status = 503, description = "Reservation store unavailable")
    )
)]
pub async fn reset_board(State(state): State<SharedState>) -> Result<(), AppError> {
    booking_service::reset_board(&state).await?;
    Ok(())
}
