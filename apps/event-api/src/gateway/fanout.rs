//! Fan-out of server events to every registered connection.

use std::sync::Arc;

use super::events::ServerEvent;
use super::registry::ConnectionRegistry;

/// Delivers one event to every connection registered at call time.
///
/// Each event is encoded once and the same frame is queued on every
/// connection. A connection whose queue is gone or full is pruned from the
/// registry; delivery to the rest continues.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Publish `event`. Returns the number of connections it was queued on.
    pub fn publish(&self, event: &ServerEvent) -> usize {
        let frame = match event.encode() {
            Ok(frame) => frame,
            Err(err) => {
                tracing::error!(?err, kind = event.kind(), "failed to encode event");
                return 0;
            }
        };

        let mut delivered = 0;
        let mut dead = Vec::new();
        self.registry.for_each(|conn| match conn.send(&frame) {
            Ok(()) => delivered += 1,
            Err(_) => dead.push(conn.id.clone()),
        });

        for conn_id in &dead {
            tracing::warn!(conn_id = %conn_id, kind = event.kind(), "pruning unreachable connection");
            self.registry.remove(conn_id);
        }

        tracing::debug!(kind = event.kind(), delivered, pruned = dead.len(), "event published");
        delivered
    }
}
