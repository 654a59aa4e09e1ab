//! Admin endpoints that drive the live displays.
//!
//! Every handler mutates durable state first (where there is any), then calls
//! the matching hub setter so connected clients see the change.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::middleware::AdminUser;
use crate::error::{ApiError, ApiErrorBody, FieldError};
use crate::gateway::events::{ActiveMatch, Visibility};
use crate::models::alliance_selection::AllianceSelection;
use crate::models::quals_match::{QualsMatch, ScoreSheet};
use crate::AppState;

/// Alliances are numbered 1 through this value.
pub const MAX_ALLIANCES: i32 = 8;

pub const LEVEL_QUALS: &str = "Quals";
pub const LEVEL_PLAYOFFS: &str = "Playoffs";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/active_match", post(set_active_match))
        .route("/admin/event_name", post(set_event_name))
        .route("/admin/toggle_leaderboard", post(toggle_leaderboard))
        .route("/admin/toggle_alliance_selection", post(toggle_alliance_selection))
        .route("/admin/alliance_selection", post(set_alliance_selection))
        .route("/admin/matches/{id}/score", post(score_match))
        .route("/admin/matches/{id}/end_screen", post(show_end_screen))
}

/// Display names of a stored match's red and blue players.
async fn side_names(state: &AppState, m: &QualsMatch) -> Result<(String, String), ApiError> {
    let red = state.store.display_name(m.red_player_id).await?.unwrap_or_default();
    let blue = state.store.display_name(m.blue_player_id).await?.unwrap_or_default();
    Ok((red, blue))
}

/// [`side_names`] for paths that have already persisted something: a lookup
/// failure is logged and both names fall back to empty.
async fn side_names_or_blank(state: &AppState, m: &QualsMatch) -> (String, String) {
    match side_names(state, m).await {
        Ok(names) => names,
        Err(err) => {
            tracing::warn!(%err, match_id = m.id, "failed to resolve player names; using blanks");
            (String::new(), String::new())
        }
    }
}

async fn find_match(state: &AppState, id: i32) -> Result<QualsMatch, ApiError> {
    state
        .store
        .quals_match(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Match not found"))
}

// ---------------------------------------------------------------------------
// POST /api/v1/admin/active_match
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct ActiveMatchRequest {
    pub level: String,
    pub match_id: i32,
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/active_match",
    tag = "Admin",
    security(("basic" = [])),
    request_body = ActiveMatchRequest,
    responses(
        (status = 200, description = "Active match published", body = ActiveMatch),
        (status = 400, description = "Unknown match level", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 404, description = "Match not found", body = ApiErrorBody),
    ),
)]
pub async fn set_active_match(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(body): Json<ActiveMatchRequest>,
) -> Result<Json<ActiveMatch>, ApiError> {
    let (red, blue) = match body.level.as_str() {
        LEVEL_QUALS => {
            let m = find_match(&state, body.match_id).await?;
            side_names(&state, &m).await?
        }
        LEVEL_PLAYOFFS => (String::new(), String::new()),
        other => return Err(ApiError::bad_request(format!("Unknown match level '{other}'"))),
    };

    state
        .hub
        .publish_active_match(&body.level, body.match_id, &red, &blue);

    Ok(Json(state.hub.topics().active_match()))
}

// ---------------------------------------------------------------------------
// POST /api/v1/admin/event_name
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct EventNameRequest {
    pub name: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/event_name",
    tag = "Admin",
    security(("basic" = [])),
    request_body = EventNameRequest,
    responses(
        (status = 204, description = "Event name updated"),
        (status = 400, description = "Validation error", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
    ),
)]
pub async fn set_event_name(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(body): Json<EventNameRequest>,
) -> Result<StatusCode, ApiError> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::validation(vec![FieldError {
            field: "name".to_string(),
            message: "Event name cannot be empty".to_string(),
        }]));
    }

    state.hub.set_event_name(name);
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// POST /api/v1/admin/toggle_leaderboard
// POST /api/v1/admin/toggle_alliance_selection
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/v1/admin/toggle_leaderboard",
    tag = "Admin",
    security(("basic" = [])),
    responses(
        (status = 200, description = "New leaderboard visibility", body = Visibility),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
    ),
)]
pub async fn toggle_leaderboard(_admin: AdminUser, State(state): State<AppState>) -> Json<Visibility> {
    Json(Visibility {
        show: state.hub.toggle_leaderboard_visible(),
    })
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/toggle_alliance_selection",
    tag = "Admin",
    security(("basic" = [])),
    responses(
        (status = 200, description = "New alliance selection visibility", body = Visibility),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
    ),
)]
pub async fn toggle_alliance_selection(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Json<Visibility> {
    Json(Visibility {
        show: state.hub.toggle_alliance_selection_visible(),
    })
}

// ---------------------------------------------------------------------------
// POST /api/v1/admin/alliance_selection
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct AllianceSelectionRequest {
    pub alliance: i32,
    #[serde(default)]
    pub captain: String,
    #[serde(default)]
    pub selection: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/alliance_selection",
    tag = "Admin",
    security(("basic" = [])),
    request_body = AllianceSelectionRequest,
    responses(
        (status = 200, description = "Selection stored and published", body = AllianceSelection),
        (status = 400, description = "Alliance out of range", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
    ),
)]
pub async fn set_alliance_selection(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(body): Json<AllianceSelectionRequest>,
) -> Result<Json<AllianceSelection>, ApiError> {
    if !(1..=MAX_ALLIANCES).contains(&body.alliance) {
        return Err(ApiError::validation(vec![FieldError {
            field: "alliance".to_string(),
            message: format!("Alliance must be between 1 and {MAX_ALLIANCES}"),
        }]));
    }

    let row = AllianceSelection {
        alliance_number: body.alliance,
        alliance_captain: body.captain,
        alliance_selection: body.selection,
    };
    state.store.upsert_alliance_selection(&row).await?;

    state
        .hub
        .publish_alliance_selection(row.alliance_number, &row.alliance_captain, &row.alliance_selection);

    Ok(Json(row))
}

// ---------------------------------------------------------------------------
// POST /api/v1/admin/matches/:id/score
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/v1/admin/matches/{id}/score",
    tag = "Admin",
    security(("basic" = [])),
    params(("id" = i32, Path, description = "Qualification match ID")),
    request_body = ScoreSheet,
    responses(
        (status = 200, description = "Match scored", body = QualsMatch),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 404, description = "Match not found", body = ApiErrorBody),
    ),
)]
pub async fn score_match(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<ScoreSheet>,
) -> Result<Json<QualsMatch>, ApiError> {
    let result = body.into_result();
    let saved = state
        .store
        .record_match_result(id, &result)
        .await?
        .ok_or_else(|| ApiError::not_found("Match not found"))?;

    tracing::info!(
        match_id = id,
        red_score = saved.red_score,
        blue_score = saved.blue_score,
        "match scored"
    );

    // The score is stored; from here on displays must still hear about it.
    if !state.hub.publish_leaderboard().await {
        tracing::warn!(match_id = id, "leaderboard not refreshed after scoring");
    }
    let (red, blue) = side_names_or_blank(&state, &saved).await;
    state.hub.publish_match_saved(vec![red], vec![blue]);

    Ok(Json(saved))
}

// ---------------------------------------------------------------------------
// POST /api/v1/admin/matches/:id/end_screen
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
pub struct EndScreenResponse {
    pub red_alliance: Vec<String>,
    pub blue_alliance: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/matches/{id}/end_screen",
    tag = "Admin",
    security(("basic" = [])),
    params(("id" = i32, Path, description = "Qualification match ID")),
    responses(
        (status = 200, description = "End screen announced", body = EndScreenResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 404, description = "Match not found", body = ApiErrorBody),
    ),
)]
pub async fn show_end_screen(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EndScreenResponse>, ApiError> {
    let m = find_match(&state, id).await?;
    let (red, blue) = side_names(&state, &m).await?;

    let response = EndScreenResponse {
        red_alliance: vec![red],
        blue_alliance: vec![blue],
    };
    state
        .hub
        .publish_match_saved(response.red_alliance.clone(), response.blue_alliance.clone());

    Ok(Json(response))
}
