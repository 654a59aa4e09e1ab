pub mod admin;
pub mod health;
pub mod leaderboard;
pub mod participants;
pub mod schedule;

use axum::Router;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(crate::gateway::server::router())
        .nest(
            "/api/v1",
            leaderboard::router()
                .merge(schedule::router())
                .merge(participants::router())
                .merge(admin::router()),
        )
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health,
        // Leaderboard
        leaderboard::get_leaderboard,
        // Schedule
        schedule::get_schedule,
        schedule::get_admin_schedule,
        schedule::import_schedule,
        schedule::toggle_schedule,
        schedule::create_match,
        // Participants
        participants::list_participants,
        participants::register_participant,
        // Admin
        admin::set_active_match,
        admin::set_event_name,
        admin::toggle_leaderboard,
        admin::toggle_alliance_selection,
        admin::set_alliance_selection,
        admin::score_match,
        admin::show_end_screen,
    ),
    components(
        schemas(
            // Error types
            crate::error::ApiErrorBody,
            crate::error::ApiErrorDetail,
            crate::error::FieldError,
            // Models
            crate::leaderboard::LeaderboardEntry,
            crate::models::quals_match::QualsMatch,
            crate::models::quals_match::ScoreSheet,
            crate::models::quals_match::NewQualsMatch,
            crate::models::participant::Participant,
            crate::models::participant::RegisterParticipant,
            crate::models::alliance_selection::AllianceSelection,
            crate::gateway::events::ActiveMatch,
            crate::gateway::events::Visibility,
            // Route request/response types
            health::HealthResponse,
            admin::ActiveMatchRequest,
            admin::EventNameRequest,
            admin::AllianceSelectionRequest,
            admin::EndScreenResponse,
            schedule::ScheduleSide,
            schedule::ScheduledMatch,
            schedule::ScheduleResponse,
            schedule::ImportScheduleRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Leaderboard", description = "Qualification standings"),
        (name = "Schedule", description = "Qualification match schedule"),
        (name = "Participants", description = "Participant registration"),
        (name = "Admin", description = "Event control for live displays"),
    )
)]
pub struct ApiDoc;
