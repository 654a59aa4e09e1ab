//! Postgres-backed [`EventStore`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::OptionalExtension;
use diesel::upsert::excluded;
use diesel_async::{AsyncConnection, RunQueryDsl};
use scoped_futures::ScopedFutureExt;

use crate::db::pool::DbPool;
use crate::db::schema::{alliance_selections, participants, quals_matches};
use crate::db::store::EventStore;
use crate::error::ApiError;
use crate::leaderboard::{self, LeaderboardEntry};
use crate::models::alliance_selection::AllianceSelection;
use crate::models::participant::{NewParticipant, Participant};
use crate::models::quals_match::{MatchResult, NewQualsMatch, QualsMatch};

pub struct PgStore {
    db: DbPool,
}

impl PgStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError> {
        let mut conn = self.db.get().await?;

        let all_participants: Vec<Participant> = participants::table
            .order(participants::id.asc())
            .select(Participant::as_select())
            .load(&mut conn)
            .await?;

        let all_matches: Vec<QualsMatch> = quals_matches::table
            .select(QualsMatch::as_select())
            .load(&mut conn)
            .await?;

        Ok(leaderboard::rank(&all_participants, &all_matches))
    }

    async fn alliance_selections(&self) -> Result<Vec<AllianceSelection>, ApiError> {
        let mut conn = self.db.get().await?;
        let rows = alliance_selections::table
            .order(alliance_selections::alliance_number.asc())
            .select(AllianceSelection::as_select())
            .load(&mut conn)
            .await?;
        Ok(rows)
    }

    async fn participants(&self) -> Result<Vec<Participant>, ApiError> {
        let mut conn = self.db.get().await?;
        let rows = participants::table
            .order(participants::id.asc())
            .select(Participant::as_select())
            .load(&mut conn)
            .await?;
        Ok(rows)
    }

    async fn create_participant(
        &self,
        username: &str,
        preferred_username: Option<&str>,
    ) -> Result<Participant, ApiError> {
        let mut conn = self.db.get().await?;

        // Existence check and mm_id allocation share one transaction so two
        // registrations cannot claim the same id.
        conn.transaction::<_, ApiError, _>(|conn| {
            async move {
                let existing: Option<i32> = participants::table
                    .filter(participants::username.eq(username))
                    .select(participants::id)
                    .first(conn)
                    .await
                    .optional()?;
                if existing.is_some() {
                    return Err(ApiError::conflict("Username is already registered"));
                }

                diesel::sql_query("LOCK TABLE participants IN SHARE ROW EXCLUSIVE MODE")
                    .execute(conn)
                    .await?;
                let last_mm_id: Option<i32> = participants::table
                    .select(diesel::dsl::max(participants::mm_id))
                    .get_result(conn)
                    .await?;

                let participant = diesel::insert_into(participants::table)
                    .values(NewParticipant {
                        username,
                        preferred_username,
                        mm_id: last_mm_id.unwrap_or(0) + 1,
                    })
                    .returning(Participant::as_returning())
                    .get_result(conn)
                    .await?;
                Ok(participant)
            }
            .scope_boxed()
        })
        .await
    }

    async fn display_name(&self, mm_id: i32) -> Result<Option<String>, ApiError> {
        let mut conn = self.db.get().await?;
        let participant: Option<Participant> = participants::table
            .filter(participants::mm_id.eq(mm_id))
            .select(Participant::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(participant.map(|p| p.display_name().to_string()))
    }

    async fn upsert_alliance_selection(&self, selection: &AllianceSelection) -> Result<(), ApiError> {
        let mut conn = self.db.get().await?;
        diesel::insert_into(alliance_selections::table)
            .values(selection)
            .on_conflict(alliance_selections::alliance_number)
            .do_update()
            .set((
                alliance_selections::alliance_captain
                    .eq(excluded(alliance_selections::alliance_captain)),
                alliance_selections::alliance_selection
                    .eq(excluded(alliance_selections::alliance_selection)),
            ))
            .execute(&mut conn)
            .await?;
        Ok(())
    }

    async fn quals_match(&self, id: i32) -> Result<Option<QualsMatch>, ApiError> {
        let mut conn = self.db.get().await?;
        let row = quals_matches::table
            .find(id)
            .select(QualsMatch::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(row)
    }

    async fn quals_matches(&self) -> Result<Vec<QualsMatch>, ApiError> {
        let mut conn = self.db.get().await?;
        let rows = quals_matches::table
            .order(quals_matches::id.asc())
            .select(QualsMatch::as_select())
            .load(&mut conn)
            .await?;
        Ok(rows)
    }

    async fn create_quals_match(&self, pairing: &NewQualsMatch) -> Result<QualsMatch, ApiError> {
        let mut conn = self.db.get().await?;
        let row = diesel::insert_into(quals_matches::table)
            .values(pairing)
            .returning(QualsMatch::as_returning())
            .get_result(&mut conn)
            .await?;
        Ok(row)
    }

    async fn replace_quals_matches(
        &self,
        pairings: &[NewQualsMatch],
    ) -> Result<Vec<QualsMatch>, ApiError> {
        let mut conn = self.db.get().await?;

        conn.transaction::<_, ApiError, _>(|conn| {
            async move {
                diesel::sql_query("TRUNCATE quals_matches RESTART IDENTITY")
                    .execute(conn)
                    .await?;
                if pairings.is_empty() {
                    return Ok(Vec::new());
                }
                let rows = diesel::insert_into(quals_matches::table)
                    .values(pairings)
                    .returning(QualsMatch::as_returning())
                    .get_results(conn)
                    .await?;
                Ok(rows)
            }
            .scope_boxed()
        })
        .await
    }

    async fn record_match_result(
        &self,
        id: i32,
        result: &MatchResult,
    ) -> Result<Option<QualsMatch>, ApiError> {
        let mut conn = self.db.get().await?;
        let row = diesel::update(quals_matches::table.find(id))
            .set(result)
            .returning(QualsMatch::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?;
        Ok(row)
    }
}
