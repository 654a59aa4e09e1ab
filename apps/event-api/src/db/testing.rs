//! Store wrapper for unit tests that need failing or slow reads.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::db::store::{EventStore, MemoryStore};
use crate::error::ApiError;
use crate::leaderboard::LeaderboardEntry;
use crate::models::alliance_selection::AllianceSelection;
use crate::models::participant::Participant;
use crate::models::quals_match::{MatchResult, NewQualsMatch, QualsMatch};

/// Delegates to a [`MemoryStore`] unless a failure flag is set.
///
/// Leaderboard reads can also be scripted: each queued entry is returned
/// (after its delay) by one call, in order, before falling back to `inner`.
pub(crate) struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_leaderboard: AtomicBool,
    pub fail_selections: AtomicBool,
    pub fail_display_name: AtomicBool,
    scripted_leaderboards: Mutex<VecDeque<(Duration, Vec<LeaderboardEntry>)>>,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_leaderboard: AtomicBool::new(false),
            fail_selections: AtomicBool::new(false),
            fail_display_name: AtomicBool::new(false),
            scripted_leaderboards: Mutex::new(VecDeque::new()),
        }
    }

    pub fn script_leaderboard(&self, delay: Duration, rows: Vec<LeaderboardEntry>) {
        self.scripted_leaderboards.lock().push_back((delay, rows));
    }

    fn unavailable() -> ApiError {
        ApiError::internal("store unavailable")
    }
}

/// A leaderboard row with only a name and rank filled in.
pub(crate) fn entry(rank: u32, display_name: &str) -> LeaderboardEntry {
    LeaderboardEntry {
        id: rank as i32,
        display_name: display_name.to_string(),
        rank,
        total_rp: 0,
        win_rp: 0,
        bonus_rp: 0,
        total_points: 0,
        auto_points: 0,
        teleop_points: 0,
        endgame_points: 0,
    }
}

#[async_trait]
impl EventStore for FlakyStore {
    async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError> {
        if self.fail_leaderboard.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let scripted = self.scripted_leaderboards.lock().pop_front();
        match scripted {
            Some((delay, rows)) => {
                tokio::time::sleep(delay).await;
                Ok(rows)
            }
            None => self.inner.leaderboard().await,
        }
    }

    async fn alliance_selections(&self) -> Result<Vec<AllianceSelection>, ApiError> {
        if self.fail_selections.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.alliance_selections().await
    }

    async fn participants(&self) -> Result<Vec<Participant>, ApiError> {
        self.inner.participants().await
    }

    async fn create_participant(
        &self,
        username: &str,
        preferred_username: Option<&str>,
    ) -> Result<Participant, ApiError> {
        self.inner.create_participant(username, preferred_username).await
    }

    async fn display_name(&self, mm_id: i32) -> Result<Option<String>, ApiError> {
        if self.fail_display_name.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        self.inner.display_name(mm_id).await
    }

    async fn upsert_alliance_selection(&self, selection: &AllianceSelection) -> Result<(), ApiError> {
        self.inner.upsert_alliance_selection(selection).await
    }

    async fn quals_match(&self, id: i32) -> Result<Option<QualsMatch>, ApiError> {
        self.inner.quals_match(id).await
    }

    async fn quals_matches(&self) -> Result<Vec<QualsMatch>, ApiError> {
        self.inner.quals_matches().await
    }

    async fn create_quals_match(&self, pairing: &NewQualsMatch) -> Result<QualsMatch, ApiError> {
        self.inner.create_quals_match(pairing).await
    }

    async fn replace_quals_matches(
        &self,
        pairings: &[NewQualsMatch],
    ) -> Result<Vec<QualsMatch>, ApiError> {
        self.inner.replace_quals_matches(pairings).await
    }

    async fn record_match_result(
        &self,
        id: i32,
        result: &MatchResult,
    ) -> Result<Option<QualsMatch>, ApiError> {
        self.inner.record_match_result(id, result).await
    }
}
