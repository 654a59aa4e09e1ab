//! Latest known value of every synchronized topic.

use std::collections::BTreeMap;

use super::events::{ActiveMatch, AlliancePick, ServerEvent, Visibility};
use crate::leaderboard::LeaderboardEntry;

/// Server-held truth for each topic. Last write wins.
///
/// This is plain data; [`super::hub::BroadcastHub`] owns it behind a lock and
/// is the only writer.
#[derive(Debug, Clone)]
pub struct TopicState {
    event_name: String,
    active_match: Option<ActiveMatch>,
    leaderboard: Option<Vec<LeaderboardEntry>>,
    leaderboard_visible: bool,
    alliance_selection_visible: bool,
    /// Keyed by alliance number, so a second write for a slot replaces it.
    alliance_picks: BTreeMap<i32, AlliancePick>,
}

impl TopicState {
    pub fn new(event_name: impl Into<String>) -> Self {
        Self {
            event_name: event_name.into(),
            active_match: None,
            leaderboard: None,
            leaderboard_visible: false,
            alliance_selection_visible: false,
            alliance_picks: BTreeMap::new(),
        }
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    /// Also rewrites the event name of the stored active match, if any.
    pub fn set_event_name(&mut self, name: impl Into<String>) {
        self.event_name = name.into();
        if let Some(active) = self.active_match.as_mut() {
            active.event_name = self.event_name.clone();
        }
    }

    /// Current match, or the empty placeholder if none is active.
    pub fn active_match(&self) -> ActiveMatch {
        self.active_match
            .clone()
            .unwrap_or_else(|| ActiveMatch::empty(&self.event_name))
    }

    pub fn set_active_match(&mut self, active: ActiveMatch) {
        self.active_match = Some(active);
    }

    /// `None` until a leaderboard has been set at least once.
    pub fn leaderboard(&self) -> Option<&[LeaderboardEntry]> {
        self.leaderboard.as_deref()
    }

    pub fn set_leaderboard(&mut self, rows: Vec<LeaderboardEntry>) {
        self.leaderboard = Some(rows);
    }

    pub fn leaderboard_visible(&self) -> bool {
        self.leaderboard_visible
    }

    pub fn set_leaderboard_visible(&mut self, show: bool) {
        self.leaderboard_visible = show;
    }

    pub fn alliance_selection_visible(&self) -> bool {
        self.alliance_selection_visible
    }

    pub fn set_alliance_selection_visible(&mut self, show: bool) {
        self.alliance_selection_visible = show;
    }

    pub fn alliance_picks(&self) -> impl Iterator<Item = &AlliancePick> {
        self.alliance_picks.values()
    }

    pub fn alliance_pick(&self, alliance_number: i32) -> Option<&AlliancePick> {
        self.alliance_picks.get(&alliance_number)
    }

    pub fn set_alliance_pick(&mut self, pick: AlliancePick) {
        self.alliance_picks.insert(pick.alliance_number, pick);
    }

    pub fn replace_alliance_picks(&mut self, picks: impl IntoIterator<Item = AlliancePick>) {
        self.alliance_picks = picks
            .into_iter()
            .map(|p| (p.alliance_number, p))
            .collect();
    }

    /// Reset the active match and alliance picks once a match has ended.
    pub fn clear_match_state(&mut self) {
        self.active_match = None;
        self.alliance_picks.clear();
    }

    /// Current value of every topic, in bootstrap order.
    ///
    /// Order is part of the client contract: status bar, leaderboard,
    /// visibility toggles, then selection board entries.
    pub fn snapshot_events(&self) -> Vec<ServerEvent> {
        let mut events = vec![ServerEvent::ActiveMatchUpdate(self.active_match())];
        if let Some(rows) = &self.leaderboard {
            events.push(ServerEvent::LeaderboardUpdate(rows.clone()));
        }
        events.push(ServerEvent::LeaderboardToggle(Visibility {
            show: self.leaderboard_visible,
        }));
        events.push(ServerEvent::AllianceSelectionToggle(Visibility {
            show: self.alliance_selection_visible,
        }));
        events.extend(
            self.alliance_picks
                .values()
                .filter(|p| !p.is_blank())
                .cloned()
                .map(ServerEvent::AllianceSelection),
        );
        events
    }
}
