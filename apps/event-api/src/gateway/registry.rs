//! Registry of live display-client connections.

use std::sync::Arc;

use dashmap::DashMap;

use super::session::ClientConnection;

/// Process-wide set of open connections.
///
/// Uses `DashMap` for shard-level concurrency: membership changes lock one
/// shard, iteration takes a snapshot so callbacks may remove members freely.
pub struct ConnectionRegistry {
    connections: DashMap<String, Arc<ClientConnection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a connection and move it to `Open`. Idempotent.
    ///
    /// Returns `false` if the connection was already closed and was not added.
    pub fn add(&self, conn: Arc<ClientConnection>) -> bool {
        if !conn.mark_open() {
            return false;
        }
        let id = conn.id.clone();
        if self.connections.insert(id.clone(), conn).is_none() {
            tracing::info!(
                conn_id = %id,
                connections = self.connections.len(),
                "live connection added"
            );
        }
        true
    }

    /// Remove a connection and mark it `Closed`. Idempotent.
    pub fn remove(&self, conn_id: &str) -> Option<Arc<ClientConnection>> {
        let (_, conn) = self.connections.remove(conn_id)?;
        conn.mark_closed();
        tracing::info!(
            conn_id = %conn_id,
            connections = self.connections.len(),
            "live connection removed"
        );
        Some(conn)
    }

    pub fn contains(&self, conn_id: &str) -> bool {
        self.connections.contains_key(conn_id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Snapshot of the current members. No ordering guarantee.
    pub fn snapshot(&self) -> Vec<Arc<ClientConnection>> {
        self.connections
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Apply `f` to every member of a stable snapshot.
    ///
    /// `f` may call [`ConnectionRegistry::remove`]; no shard lock is held
    /// while it runs.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&Arc<ClientConnection>),
    {
        for conn in self.snapshot() {
            f(&conn);
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
