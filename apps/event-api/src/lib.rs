pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod leaderboard;
pub mod models;
pub mod routes;
pub mod schedule;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use config::Config;
use db::store::EventStore;
use gateway::BroadcastHub;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EventStore>,
    pub hub: Arc<BroadcastHub>,
    pub config: Arc<Config>,
    /// Whether `GET /api/v1/schedule` lists matches. Starts hidden.
    pub schedule_visible: Arc<AtomicBool>,
}

impl AppState {
    /// Build state around `store`, with a hub holding default topic values.
    pub fn new(store: Arc<dyn EventStore>, config: Config) -> Self {
        let hub = Arc::new(BroadcastHub::new(store.clone(), config.event_name.clone()));
        Self {
            store,
            hub,
            config: Arc::new(config),
            schedule_visible: Arc::new(AtomicBool::new(false)),
        }
    }
}
