//! Wire-format messages exchanged with display clients.
//!
//! Every frame is `{"type": <string>, "payload": <type-specific>}`. Each
//! direction is a closed set of variants; inbound frames are decoded by tag
//! first so an unknown type is recognised before any payload parsing.

use axum::extract::ws::Utf8Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::leaderboard::LeaderboardEntry;

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// The match currently on the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ActiveMatch {
    pub match_level: String,
    pub match_id: i32,
    pub event_name: String,
    pub red_alliance: Vec<String>,
    pub blue_alliance: Vec<String>,
}

impl ActiveMatch {
    /// Placeholder shown before any match has been activated.
    pub fn empty(event_name: &str) -> Self {
        Self {
            match_level: String::new(),
            match_id: 0,
            event_name: event_name.to_string(),
            red_alliance: vec![String::new()],
            blue_alliance: vec![String::new()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Visibility {
    pub show: bool,
}

/// Captain and most recent pick for one alliance slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AlliancePick {
    pub alliance_number: i32,
    pub alliance_captain: String,
    pub alliance_selection: String,
}

impl AlliancePick {
    pub fn is_blank(&self) -> bool {
        self.alliance_captain.is_empty() && self.alliance_selection.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSaved {
    pub red_alliance: Vec<String>,
    pub blue_alliance: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailableTeams {
    pub teams: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSelection {
    pub username: String,
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// An event pushed to clients, either as a broadcast or during bootstrap.
///
/// Both paths go through [`ServerEvent::encode`], so clients see one shape.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    ActiveMatchUpdate(ActiveMatch),
    LeaderboardUpdate(Vec<LeaderboardEntry>),
    LeaderboardToggle(Visibility),
    AllianceSelectionToggle(Visibility),
    AllianceSelection(AlliancePick),
    MatchSaved(MatchSaved),
    AvailableTeamsUpdate(AvailableTeams),
    TeamSelectionMade(TeamSelection),
}

impl ServerEvent {
    /// The `type` tag as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ActiveMatchUpdate(_) => EventName::ACTIVE_MATCH_UPDATE,
            Self::LeaderboardUpdate(_) => EventName::LEADERBOARD_UPDATE,
            Self::LeaderboardToggle(_) => EventName::LEADERBOARD_TOGGLE,
            Self::AllianceSelectionToggle(_) => EventName::ALLIANCE_SELECTION_TOGGLE,
            Self::AllianceSelection(_) => EventName::ALLIANCE_SELECTION,
            Self::MatchSaved(_) => EventName::MATCH_SAVED,
            Self::AvailableTeamsUpdate(_) => EventName::AVAILABLE_TEAMS_UPDATE,
            Self::TeamSelectionMade(_) => EventName::TEAM_SELECTION_MADE,
        }
    }

    /// Serialize into a text frame that can be cloned cheaply per connection.
    pub fn encode(&self) -> Result<Utf8Bytes, serde_json::Error> {
        serde_json::to_string(self).map(Utf8Bytes::from)
    }
}

/// Outbound event type tags.
pub struct EventName;

impl EventName {
    pub const ACTIVE_MATCH_UPDATE: &'static str = "active_match_update";
    pub const LEADERBOARD_UPDATE: &'static str = "leaderboard_update";
    pub const LEADERBOARD_TOGGLE: &'static str = "leaderboard_toggle";
    pub const ALLIANCE_SELECTION_TOGGLE: &'static str = "alliance_selection_toggle";
    pub const ALLIANCE_SELECTION: &'static str = "alliance_selection";
    pub const MATCH_SAVED: &'static str = "match_saved";
    pub const AVAILABLE_TEAMS_UPDATE: &'static str = "available_teams_update";
    pub const TEAM_SELECTION_MADE: &'static str = "team_selection_made";
}

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// Raw inbound frame, before the payload is interpreted.
#[derive(Debug, Deserialize)]
pub struct ClientEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, Deserialize)]
pub struct TeamSelectedPayload {
    pub username: String,
}

/// Recognised inbound messages.
#[derive(Debug)]
pub enum ClientMessage {
    StatusbarInit,
    RequestAvailableTeams,
    TeamSelected(TeamSelectedPayload),
}

impl ClientMessage {
    pub const STATUSBAR_INIT: &'static str = "statusbar_init";
    pub const REQUEST_AVAILABLE_TEAMS: &'static str = "request_available_teams";
    pub const TEAM_SELECTED: &'static str = "team_selected";

    /// Decode a text frame.
    ///
    /// `Ok(None)` means a well-formed frame with an unrecognised type; such
    /// frames are ignored so newer clients can talk to this server.
    pub fn decode(text: &str) -> Result<Option<Self>, serde_json::Error> {
        let envelope: ClientEnvelope = serde_json::from_str(text)?;
        Self::from_envelope(envelope)
    }

    pub fn from_envelope(envelope: ClientEnvelope) -> Result<Option<Self>, serde_json::Error> {
        let msg = match envelope.kind.as_str() {
            Self::STATUSBAR_INIT => Self::StatusbarInit,
            Self::REQUEST_AVAILABLE_TEAMS => Self::RequestAvailableTeams,
            Self::TEAM_SELECTED => Self::TeamSelected(serde_json::from_value(envelope.payload)?),
            _ => return Ok(None),
        };
        Ok(Some(msg))
    }
}
