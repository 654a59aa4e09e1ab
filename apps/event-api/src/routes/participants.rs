//! Participant registration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::auth::middleware::AdminUser;
use crate::error::{ApiError, ApiErrorBody, FieldError};
use crate::models::participant::{Participant, RegisterParticipant};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/admin/participants",
        get(list_participants).post(register_participant),
    )
}

// ---------------------------------------------------------------------------
// GET /api/v1/admin/participants
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/admin/participants",
    tag = "Participants",
    security(("basic" = [])),
    responses(
        (status = 200, description = "Registered participants", body = [Participant]),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
    ),
)]
pub async fn list_participants(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Participant>>, ApiError> {
    Ok(Json(state.store.participants().await?))
}

// ---------------------------------------------------------------------------
// POST /api/v1/admin/participants
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/v1/admin/participants",
    tag = "Participants",
    security(("basic" = [])),
    request_body = RegisterParticipant,
    responses(
        (status = 201, description = "Participant registered", body = Participant),
        (status = 400, description = "Validation error", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 409, description = "Username already registered", body = ApiErrorBody),
    ),
)]
pub async fn register_participant(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(body): Json<RegisterParticipant>,
) -> Result<(StatusCode, Json<Participant>), ApiError> {
    let username = body.username.trim();
    if username.is_empty() {
        return Err(ApiError::validation(vec![FieldError {
            field: "username".to_string(),
            message: "Username cannot be empty".to_string(),
        }]));
    }
    let preferred = body
        .preferred_username
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let participant = state.store.create_participant(username, preferred).await?;
    tracing::info!(
        participant_id = participant.id,
        mm_id = participant.mm_id,
        username = %participant.username,
        "participant registered"
    );

    // New participants rank with zero points; keep the live board in step.
    if !state.hub.publish_leaderboard().await {
        tracing::warn!(mm_id = participant.mm_id, "leaderboard not refreshed after registration");
    }

    Ok((StatusCode::CREATED, Json(participant)))
}
