//! Public leaderboard endpoint.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::{ApiError, ApiErrorBody};
use crate::leaderboard::LeaderboardEntry;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/leaderboard", get(get_leaderboard))
}

// ---------------------------------------------------------------------------
// GET /api/v1/leaderboard
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/leaderboard",
    tag = "Leaderboard",
    responses(
        (status = 200, description = "Ranked participants", body = [LeaderboardEntry]),
        (status = 500, description = "Storage unavailable", body = ApiErrorBody),
    ),
)]
pub async fn get_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    Ok(Json(state.store.leaderboard().await?))
}
