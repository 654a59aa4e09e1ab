//! The live-state hub: connection registry, topic store and dispatcher.
//!
//! Constructed once at startup and shared through `AppState`. HTTP handlers
//! call the `publish_*` / `toggle_*` setters after mutating durable state;
//! gateway connections call [`BroadcastHub::bootstrap`] and the relay paths.
//!
//! Every setter updates the topic store and publishes while holding the
//! topic write lock. Bootstrap reads under the read lock, so a client that
//! bootstraps concurrently with a setter sees either the old value followed
//! by the live update, or the new value, never a torn snapshot.
//!
//! Leaderboard refreshes additionally hold an async refresh lock across
//! fetch, store and publish, so concurrent refreshes complete in the order
//! they started and the retained value is always the newest fetch.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;

use super::bootstrap;
use super::events::{ActiveMatch, AlliancePick, MatchSaved, ServerEvent, TeamSelection, Visibility};
use super::fanout::Dispatcher;
use super::registry::ConnectionRegistry;
use super::session::{ClientConnection, ConnectionClosed};
use super::topics::TopicState;
use crate::db::store::EventStore;
use crate::leaderboard::LeaderboardEntry;

pub struct BroadcastHub {
    registry: Arc<ConnectionRegistry>,
    dispatcher: Dispatcher,
    topics: RwLock<TopicState>,
    store: Arc<dyn EventStore>,
    leaderboard_refresh: Mutex<()>,
}

impl BroadcastHub {
    pub fn new(store: Arc<dyn EventStore>, event_name: impl Into<String>) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        Self {
            dispatcher: Dispatcher::new(registry.clone()),
            registry,
            topics: RwLock::new(TopicState::new(event_name)),
            store,
            leaderboard_refresh: Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn EventStore> {
        &self.store
    }

    /// A copy of the current topic values.
    pub fn topics(&self) -> TopicState {
        self.topics.read().clone()
    }

    /// Load alliance picks and the leaderboard from durable storage.
    ///
    /// Called once before serving. Nothing is broadcast; a failed load leaves
    /// that topic at its default.
    pub async fn initialize(&self) {
        tracing::info!("initializing live state from storage");

        match self.store.alliance_selections().await {
            Ok(rows) => {
                let count = rows.len();
                self.topics
                    .write()
                    .replace_alliance_picks(rows.into_iter().map(AlliancePick::from));
                tracing::info!(count, "loaded alliance selections");
            }
            Err(err) => tracing::error!(%err, "failed to load alliance selections"),
        }

        let _refresh = self.leaderboard_refresh.lock().await;
        match self.store.leaderboard().await {
            Ok(rows) => {
                let count = rows.len();
                self.topics.write().set_leaderboard(rows);
                tracing::info!(count, "loaded leaderboard");
            }
            Err(err) => tracing::error!(%err, "failed to load leaderboard"),
        }
    }

    // -----------------------------------------------------------------------
    // Setters (store, then publish)
    // -----------------------------------------------------------------------

    pub fn event_name(&self) -> String {
        self.topics.read().event_name().to_string()
    }

    /// Rename the event. Not broadcast; the next active-match update carries it.
    pub fn set_event_name(&self, name: impl Into<String>) {
        let mut topics = self.topics.write();
        topics.set_event_name(name);
        tracing::info!(event_name = %topics.event_name(), "event name updated");
    }

    pub fn publish_active_match(
        &self,
        match_level: &str,
        match_id: i32,
        red_name: &str,
        blue_name: &str,
    ) {
        let mut topics = self.topics.write();
        let active = ActiveMatch {
            match_level: match_level.to_string(),
            match_id,
            event_name: topics.event_name().to_string(),
            red_alliance: vec![red_name.to_string()],
            blue_alliance: vec![blue_name.to_string()],
        };
        topics.set_active_match(active.clone());
        self.dispatcher.publish(&ServerEvent::ActiveMatchUpdate(active));
        tracing::info!(match_level, match_id, red = red_name, blue = blue_name, "active match published");
    }

    /// Recompute the leaderboard from storage and publish it.
    ///
    /// On a fetch failure nothing is sent and the last good value is kept.
    /// Overlapping calls run one at a time, in arrival order.
    pub async fn publish_leaderboard(&self) -> bool {
        let _refresh = self.leaderboard_refresh.lock().await;
        let rows = match self.store.leaderboard().await {
            Ok(rows) => rows,
            Err(err) => {
                tracing::error!(%err, "failed to fetch leaderboard; skipping publish");
                return false;
            }
        };

        let count = rows.len();
        {
            let mut topics = self.topics.write();
            topics.set_leaderboard(rows.clone());
            self.dispatcher.publish(&ServerEvent::LeaderboardUpdate(rows));
        }
        tracing::info!(count, "leaderboard published");
        true
    }

    /// Flip leaderboard visibility. Returns the new value.
    pub fn toggle_leaderboard_visible(&self) -> bool {
        let mut topics = self.topics.write();
        let show = !topics.leaderboard_visible();
        topics.set_leaderboard_visible(show);
        self.dispatcher.publish(&ServerEvent::LeaderboardToggle(Visibility { show }));
        tracing::info!(show, "leaderboard visibility toggled");
        show
    }

    /// Flip alliance-selection board visibility. Returns the new value.
    pub fn toggle_alliance_selection_visible(&self) -> bool {
        let mut topics = self.topics.write();
        let show = !topics.alliance_selection_visible();
        topics.set_alliance_selection_visible(show);
        self.dispatcher
            .publish(&ServerEvent::AllianceSelectionToggle(Visibility { show }));
        tracing::info!(show, "alliance selection visibility toggled");
        show
    }

    pub fn publish_alliance_selection(&self, alliance_number: i32, captain: &str, selection: &str) {
        let pick = AlliancePick {
            alliance_number,
            alliance_captain: captain.to_string(),
            alliance_selection: selection.to_string(),
        };
        let mut topics = self.topics.write();
        topics.set_alliance_pick(pick.clone());
        self.dispatcher.publish(&ServerEvent::AllianceSelection(pick));
        tracing::info!(alliance_number, captain, selection, "alliance selection published");
    }

    /// Announce a saved match, then clear the active match and alliance picks.
    pub fn publish_match_saved(&self, red_alliance: Vec<String>, blue_alliance: Vec<String>) {
        let mut topics = self.topics.write();
        tracing::info!(red = ?red_alliance, blue = ?blue_alliance, "match saved published");
        self.dispatcher.publish(&ServerEvent::MatchSaved(MatchSaved {
            red_alliance,
            blue_alliance,
        }));
        topics.clear_match_state();
    }

    /// Reset `active_match` and `alliance_picks` to their defaults.
    pub fn clear_match_state(&self) {
        self.topics.write().clear_match_state();
        tracing::info!("cleared active match and alliance selections");
    }

    // -----------------------------------------------------------------------
    // Gateway-facing operations
    // -----------------------------------------------------------------------

    /// Relay a one-shot notification that is not retained as topic state.
    ///
    /// Goes through the topic lock so it never lands in the middle of
    /// another connection's bootstrap sequence.
    pub fn relay(&self, event: &ServerEvent) -> usize {
        let _topics = self.topics.write();
        self.dispatcher.publish(event)
    }

    pub fn relay_team_selection(&self, username: &str) -> usize {
        let delivered = self.relay(&ServerEvent::TeamSelectionMade(TeamSelection {
            username: username.to_string(),
        }));
        tracing::info!(username, delivered, "team selection relayed");
        delivered
    }

    /// Send every topic's current value to `conn`.
    ///
    /// On a failed send the connection is removed from the registry.
    pub fn bootstrap(&self, conn: &ClientConnection) -> Result<usize, ConnectionClosed> {
        let result = {
            let topics = self.topics.read();
            bootstrap::send_snapshot(&topics, conn)
        };
        match result {
            Ok(sent) => tracing::debug!(conn_id = %conn.id, sent, "bootstrap sent"),
            Err(_) => {
                tracing::warn!(conn_id = %conn.id, "bootstrap aborted; connection closed");
                self.registry.remove(&conn.id);
            }
        }
        result
    }

    /// Ranked participants not yet named as a captain or pick.
    ///
    /// Names are taken from both persisted selections and the live
    /// `alliance_picks` topic. `None` if the leaderboard cannot be fetched.
    pub async fn available_teams(&self) -> Option<Vec<LeaderboardEntry>> {
        let rows = match self.store.leaderboard().await {
            Ok(rows) => rows,
            Err(err) => {
                tracing::error!(%err, "failed to fetch participants for available teams");
                return None;
            }
        };

        let mut taken: HashSet<String> = HashSet::new();
        match self.store.alliance_selections().await {
            Ok(selections) => {
                for s in selections {
                    taken.insert(s.alliance_captain);
                    taken.insert(s.alliance_selection);
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to fetch alliance selections; using live picks only")
            }
        }
        {
            let topics = self.topics.read();
            for pick in topics.alliance_picks() {
                taken.insert(pick.alliance_captain.clone());
                taken.insert(pick.alliance_selection.clone());
            }
        }
        taken.remove("");

        let total = rows.len();
        let available: Vec<LeaderboardEntry> = rows
            .into_iter()
            .filter(|row| !taken.contains(&row.display_name))
            .collect();
        tracing::debug!(available = available.len(), total, "computed available teams");
        Some(available)
    }
}
