//! Qualification schedule: public listing plus admin import and edits.

use std::collections::HashMap;
use std::sync::atomic::Ordering;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::middleware::AdminUser;
use crate::error::{ApiError, ApiErrorBody, FieldError};
use crate::gateway::events::Visibility;
use crate::models::quals_match::{NewQualsMatch, QualsMatch};
use crate::schedule::parse_schedule;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/schedule", get(get_schedule))
        .route("/admin/schedule", get(get_admin_schedule).post(import_schedule))
        .route("/admin/toggle_schedule", post(toggle_schedule))
        .route("/admin/matches", post(create_match))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleSide {
    pub mm_id: i32,
    /// `None` when no participant holds this matchmaker id.
    pub display_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduledMatch {
    /// 1-based position in the schedule.
    pub match_number: i32,
    pub match_id: i32,
    pub red: ScheduleSide,
    pub blue: ScheduleSide,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleResponse {
    pub public: bool,
    pub matches: Vec<ScheduledMatch>,
}

/// Every stored match with both sides' display names resolved.
async fn load_schedule(state: &AppState) -> Result<Vec<ScheduledMatch>, ApiError> {
    let names: HashMap<i32, String> = state
        .store
        .participants()
        .await?
        .iter()
        .map(|p| (p.mm_id, p.display_name().to_string()))
        .collect();
    let side = |mm_id: i32| ScheduleSide {
        mm_id,
        display_name: names.get(&mm_id).cloned(),
    };

    Ok(state
        .store
        .quals_matches()
        .await?
        .into_iter()
        .zip(1..)
        .map(|(m, match_number)| ScheduledMatch {
            match_number,
            match_id: m.id,
            red: side(m.red_player_id),
            blue: side(m.blue_player_id),
        })
        .collect())
}

/// Reject pairings that name an unregistered id or the same id twice.
async fn check_pairings(state: &AppState, pairings: &[NewQualsMatch]) -> Result<(), ApiError> {
    let known: Vec<i32> = state
        .store
        .participants()
        .await?
        .into_iter()
        .map(|p| p.mm_id)
        .collect();

    let mut errors = Vec::new();
    for (pairing, match_number) in pairings.iter().zip(1..) {
        for mm_id in [pairing.red_player_id, pairing.blue_player_id] {
            if !known.contains(&mm_id) {
                errors.push(FieldError {
                    field: "schedule".to_string(),
                    message: format!("match {match_number}: matchmaker id {mm_id} is not registered"),
                });
            }
        }
        if pairing.red_player_id == pairing.blue_player_id {
            errors.push(FieldError {
                field: "schedule".to_string(),
                message: format!("match {match_number}: a participant cannot play themselves"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(errors))
    }
}

// ---------------------------------------------------------------------------
// GET /api/v1/schedule
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/schedule",
    tag = "Schedule",
    responses(
        (status = 200, description = "Schedule; empty while hidden", body = ScheduleResponse),
        (status = 500, description = "Storage unavailable", body = ApiErrorBody),
    ),
)]
pub async fn get_schedule(State(state): State<AppState>) -> Result<Json<ScheduleResponse>, ApiError> {
    let public = state.schedule_visible.load(Ordering::SeqCst);
    let matches = if public {
        load_schedule(&state).await?
    } else {
        Vec::new()
    };
    Ok(Json(ScheduleResponse { public, matches }))
}

// ---------------------------------------------------------------------------
// GET /api/v1/admin/schedule
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/admin/schedule",
    tag = "Schedule",
    security(("basic" = [])),
    responses(
        (status = 200, description = "Full schedule regardless of visibility", body = ScheduleResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
    ),
)]
pub async fn get_admin_schedule(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    Ok(Json(ScheduleResponse {
        public: state.schedule_visible.load(Ordering::SeqCst),
        matches: load_schedule(&state).await?,
    }))
}

// ---------------------------------------------------------------------------
// POST /api/v1/admin/schedule
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct ImportScheduleRequest {
    /// Schedule text, one round of two matches per line.
    pub schedule: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/schedule",
    tag = "Schedule",
    security(("basic" = [])),
    request_body = ImportScheduleRequest,
    responses(
        (status = 200, description = "Schedule replaced; all scores cleared", body = [QualsMatch]),
        (status = 400, description = "Unparseable line or unknown matchmaker id", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
    ),
)]
pub async fn import_schedule(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(body): Json<ImportScheduleRequest>,
) -> Result<Json<Vec<QualsMatch>>, ApiError> {
    let pairings = parse_schedule(&body.schedule).map_err(ApiError::validation)?;
    check_pairings(&state, &pairings).await?;

    let rows = state.store.replace_quals_matches(&pairings).await?;
    tracing::info!(matches = rows.len(), "qualification schedule replaced");

    // Every score went with the old schedule.
    if !state.hub.publish_leaderboard().await {
        tracing::warn!("leaderboard not refreshed after schedule import");
    }

    Ok(Json(rows))
}

// ---------------------------------------------------------------------------
// POST /api/v1/admin/toggle_schedule
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/v1/admin/toggle_schedule",
    tag = "Schedule",
    security(("basic" = [])),
    responses(
        (status = 200, description = "New schedule visibility", body = Visibility),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
    ),
)]
pub async fn toggle_schedule(_admin: AdminUser, State(state): State<AppState>) -> Json<Visibility> {
    let show = !state.schedule_visible.fetch_xor(true, Ordering::SeqCst);
    tracing::info!(show, "schedule visibility toggled");
    Json(Visibility { show })
}

// ---------------------------------------------------------------------------
// POST /api/v1/admin/matches
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/v1/admin/matches",
    tag = "Schedule",
    security(("basic" = [])),
    request_body = NewQualsMatch,
    responses(
        (status = 201, description = "Match appended to the schedule", body = QualsMatch),
        (status = 400, description = "Unknown matchmaker id", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
    ),
)]
pub async fn create_match(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(body): Json<NewQualsMatch>,
) -> Result<(StatusCode, Json<QualsMatch>), ApiError> {
    check_pairings(&state, std::slice::from_ref(&body)).await?;
    let row = state.store.create_quals_match(&body).await?;
    tracing::info!(
        match_id = row.id,
        red = row.red_player_id,
        blue = row.blue_player_id,
        "qualification match created"
    );
    Ok((StatusCode::CREATED, Json(row)))
}
