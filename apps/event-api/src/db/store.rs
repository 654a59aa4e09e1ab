//! Durable event data consumed by the live gateway and the admin routes.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::ApiError;
use crate::leaderboard::{self, LeaderboardEntry};
use crate::models::alliance_selection::AllianceSelection;
use crate::models::participant::Participant;
use crate::models::quals_match::{MatchResult, NewQualsMatch, QualsMatch};

/// Abstraction over persisted participants, matches and alliance selections.
///
/// Backed by Postgres in production and an in-memory store in tests.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Ranked leaderboard rows, derived fields already computed.
    async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError>;

    async fn alliance_selections(&self) -> Result<Vec<AllianceSelection>, ApiError>;

    /// Every registered participant, in registration order.
    async fn participants(&self) -> Result<Vec<Participant>, ApiError>;

    /// Register a participant under the next matchmaker id (highest so far
    /// plus one). Fails with a conflict if the username is taken.
    async fn create_participant(
        &self,
        username: &str,
        preferred_username: Option<&str>,
    ) -> Result<Participant, ApiError>;

    /// Display name of the participant with the given matchmaker id.
    async fn display_name(&self, mm_id: i32) -> Result<Option<String>, ApiError>;

    /// Insert or replace the row for `selection.alliance_number`.
    async fn upsert_alliance_selection(&self, selection: &AllianceSelection) -> Result<(), ApiError>;

    async fn quals_match(&self, id: i32) -> Result<Option<QualsMatch>, ApiError>;

    /// The qualification schedule, ordered by match id.
    async fn quals_matches(&self) -> Result<Vec<QualsMatch>, ApiError>;

    async fn create_quals_match(&self, pairing: &NewQualsMatch) -> Result<QualsMatch, ApiError>;

    /// Drop every qualification match (scores included) and insert
    /// `pairings` in order. Match ids restart at 1.
    async fn replace_quals_matches(
        &self,
        pairings: &[NewQualsMatch],
    ) -> Result<Vec<QualsMatch>, ApiError>;

    /// Overwrite a match's scores. Returns `None` if the match does not exist.
    async fn record_match_result(
        &self,
        id: i32,
        result: &MatchResult,
    ) -> Result<Option<QualsMatch>, ApiError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation (for tests and local demos)
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryData {
    participants: Vec<Participant>,
    matches: Vec<QualsMatch>,
    selections: Vec<AllianceSelection>,
}

pub struct MemoryStore {
    data: Mutex<MemoryData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(MemoryData::default()),
        }
    }

    pub fn with_participants(participants: Vec<Participant>) -> Self {
        let store = Self::new();
        store.data.lock().participants = participants;
        store
    }

}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError> {
        let data = self.data.lock();
        Ok(leaderboard::rank(&data.participants, &data.matches))
    }

    async fn alliance_selections(&self) -> Result<Vec<AllianceSelection>, ApiError> {
        Ok(self.data.lock().selections.clone())
    }

    async fn participants(&self) -> Result<Vec<Participant>, ApiError> {
        Ok(self.data.lock().participants.clone())
    }

    async fn create_participant(
        &self,
        username: &str,
        preferred_username: Option<&str>,
    ) -> Result<Participant, ApiError> {
        let mut data = self.data.lock();
        if data.participants.iter().any(|p| p.username == username) {
            return Err(ApiError::conflict("Username is already registered"));
        }
        let participant = Participant {
            id: data.participants.iter().map(|p| p.id).max().unwrap_or(0) + 1,
            username: username.to_string(),
            preferred_username: preferred_username.map(str::to_string),
            mm_id: data.participants.iter().map(|p| p.mm_id).max().unwrap_or(0) + 1,
        };
        data.participants.push(participant.clone());
        Ok(participant)
    }

    async fn display_name(&self, mm_id: i32) -> Result<Option<String>, ApiError> {
        Ok(self
            .data
            .lock()
            .participants
            .iter()
            .find(|p| p.mm_id == mm_id)
            .map(|p| p.display_name().to_string()))
    }

    async fn upsert_alliance_selection(&self, selection: &AllianceSelection) -> Result<(), ApiError> {
        let mut data = self.data.lock();
        match data
            .selections
            .iter_mut()
            .find(|s| s.alliance_number == selection.alliance_number)
        {
            Some(existing) => *existing = selection.clone(),
            None => data.selections.push(selection.clone()),
        }
        Ok(())
    }

    async fn quals_match(&self, id: i32) -> Result<Option<QualsMatch>, ApiError> {
        Ok(self.data.lock().matches.iter().find(|m| m.id == id).cloned())
    }

    async fn quals_matches(&self) -> Result<Vec<QualsMatch>, ApiError> {
        let mut rows = self.data.lock().matches.clone();
        rows.sort_by_key(|m| m.id);
        Ok(rows)
    }

    async fn create_quals_match(&self, pairing: &NewQualsMatch) -> Result<QualsMatch, ApiError> {
        let mut data = self.data.lock();
        let id = data.matches.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        let row = QualsMatch::scheduled(id, pairing.red_player_id, pairing.blue_player_id);
        data.matches.push(row.clone());
        Ok(row)
    }

    async fn replace_quals_matches(
        &self,
        pairings: &[NewQualsMatch],
    ) -> Result<Vec<QualsMatch>, ApiError> {
        let rows: Vec<QualsMatch> = (1..)
            .zip(pairings)
            .map(|(id, p)| QualsMatch::scheduled(id, p.red_player_id, p.blue_player_id))
            .collect();
        self.data.lock().matches = rows.clone();
        Ok(rows)
    }

    async fn record_match_result(
        &self,
        id: i32,
        result: &MatchResult,
    ) -> Result<Option<QualsMatch>, ApiError> {
        let mut data = self.data.lock();
        let Some(row) = data.matches.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        row.apply(result);
        Ok(Some(row.clone()))
    }
}
