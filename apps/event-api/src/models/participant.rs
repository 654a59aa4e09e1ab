use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::schema::participants;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = participants)]
pub struct Participant {
    pub id: i32,
    pub username: String,
    pub preferred_username: Option<String>,
    /// Matchmaker id referenced by `quals_matches.red_player_id` / `blue_player_id`.
    pub mm_id: i32,
}

impl Participant {
    /// Preferred username when set, otherwise the login username.
    pub fn display_name(&self) -> &str {
        match self.preferred_username.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.username,
        }
    }
}

/// Body of a participant registration.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterParticipant {
    pub username: String,
    #[serde(default)]
    pub preferred_username: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = participants)]
pub struct NewParticipant<'a> {
    pub username: &'a str,
    pub preferred_username: Option<&'a str>,
    pub mm_id: i32,
}
