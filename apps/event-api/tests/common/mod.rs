#![allow(dead_code)]

use std::sync::Arc;

use event_api::auth::middleware::{basic_header, ADMIN_USER};
use event_api::config::Config;
use event_api::db::store::{EventStore, MemoryStore};
use event_api::models::participant::Participant;
use event_api::models::quals_match::NewQualsMatch;
use event_api::AppState;

pub const ADMIN_PASSWORD: &str = "test-admin-password";
pub const EVENT_NAME: &str = "Test Robotics Cup";

/// Config for tests; nothing is read from the environment.
pub fn test_config() -> Config {
    Config {
        database_url: String::new(),
        admin_password: ADMIN_PASSWORD.to_string(),
        port: 0,
        event_name: EVENT_NAME.to_string(),
    }
}

/// Four participants (mm ids 101..=104, "Team Four" has a preferred name)
/// and two unscored qualification matches: 1 = 101 v 102, 2 = 103 v 104.
pub async fn seeded_store() -> Arc<MemoryStore> {
    let participants = [
        (1, "alpha", None),
        (2, "bravo", None),
        (3, "charlie", None),
        (4, "delta", Some("Team Four")),
    ]
    .into_iter()
    .map(|(id, username, preferred)| Participant {
        id,
        username: username.to_string(),
        preferred_username: preferred.map(str::to_string),
        mm_id: 100 + id,
    })
    .collect();

    let store = Arc::new(MemoryStore::with_participants(participants));
    for (red_player_id, blue_player_id) in [(101, 102), (103, 104)] {
        store
            .create_quals_match(&NewQualsMatch {
                red_player_id,
                blue_player_id,
            })
            .await
            .expect("seed match");
    }
    store
}

/// Build a test AppState over the seeded in-memory store.
pub async fn test_state() -> (AppState, Arc<MemoryStore>) {
    let store = seeded_store().await;
    let dyn_store: Arc<dyn EventStore> = store.clone();
    let state = AppState::new(dyn_store, test_config());
    state.hub.initialize().await;
    (state, store)
}

pub fn admin_auth() -> String {
    basic_header(ADMIN_USER, ADMIN_PASSWORD)
}
