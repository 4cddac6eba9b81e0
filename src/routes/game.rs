use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::game::GameStatusResponse, error::AppError, services::game_service, state::SharedState,
};

/// Routes exposing the round status.
pub fn router() -> Router<SharedState> {
    Router::new().route("/game", get(game_status))
}

/// Return the current round phase and claimed-block snapshot.
#[utoipa::path(
    get,
    path = "/game",
    tag = "game",
    responses(
        (status = 200, description = "Current round status", body = GameStatusResponse),
        (status = 503, description = "Reservation store unavailable")
    )
)]
pub async fn game_status(
    State(state): State<SharedState>,
) -> Result<Json<GameStatusResponse>, AppError> {
    let status = game_service::round_status(&state).await?;
    Ok(Json(status))
}
