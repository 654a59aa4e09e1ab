//! Per-connection handle and lifecycle state.

use std::fmt;

use axum::extract::ws::{Message, Utf8Bytes};
use event_common::id::prefix;
use event_common::PrefixedId;
use parking_lot::Mutex;
use tokio::sync::{mpsc, Notify};

/// Frames a connection may have queued before it is treated as too slow and
/// dropped from the registry.
pub const QUEUE_CAPACITY: usize = 256;

/// Sender half feeding a connection's writer task.
pub type ConnectionSender = mpsc::Sender<Message>;

/// Receiver half drained by a connection's writer task.
pub type ConnectionReceiver = mpsc::Receiver<Message>;

/// Create the bounded outbound queue for one connection.
pub fn queue() -> (ConnectionSender, ConnectionReceiver) {
    mpsc::channel(QUEUE_CAPACITY)
}

/// Lifecycle of a single display-client connection.
///
/// There is no resume state: a client that reconnects after `Closed` gets a
/// brand-new handle and must bootstrap again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
}

/// Returned when a frame cannot be queued because the connection is gone or
/// its queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionClosed;

impl fmt::Display for ConnectionClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("connection closed")
    }
}

impl std::error::Error for ConnectionClosed {}

/// An opaque bidirectional channel to one client.
///
/// Frames are queued on a bounded channel drained by the connection's writer
/// task. Sends never await: a full queue fails the send like a dropped peer,
/// so one stalled client cannot grow memory without limit.
pub struct ClientConnection {
    /// `ws_` prefixed ULID, used for logging and registry membership.
    pub id: String,
    tx: ConnectionSender,
    state: Mutex<ConnectionState>,
    closed: Notify,
}

impl PrefixedId for ClientConnection {
    const PREFIX: &'static str = prefix::CONNECTION;
}

impl ClientConnection {
    pub fn new(id: String, tx: ConnectionSender) -> Self {
        Self {
            id,
            tx,
            state: Mutex::new(ConnectionState::Connecting),
            closed: Notify::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    /// Move to `Open`. A closed connection never reopens.
    pub(crate) fn mark_open(&self) -> bool {
        let mut state = self.state.lock();
        match *state {
            ConnectionState::Closed => false,
            _ => {
                *state = ConnectionState::Open;
                true
            }
        }
    }

    /// Move to `Closed`. Returns `false` if it was already closed.
    pub(crate) fn mark_closed(&self) -> bool {
        let mut state = self.state.lock();
        let was_closed = *state == ConnectionState::Closed;
        *state = ConnectionState::Closed;
        drop(state);
        if !was_closed {
            self.closed.notify_one();
        }
        !was_closed
    }

    /// Resolves once the connection has been marked closed, e.g. after the
    /// dispatcher pruned it for falling behind.
    pub async fn closed(&self) {
        if self.state() == ConnectionState::Closed {
            return;
        }
        self.closed.notified().await;
    }

    /// Queue a pre-encoded text frame.
    pub fn send(&self, frame: &Utf8Bytes) -> Result<(), ConnectionClosed> {
        if self.state() == ConnectionState::Closed {
            return Err(ConnectionClosed);
        }
        self.tx
            .try_send(Message::Text(frame.clone()))
            .map_err(|_| ConnectionClosed)
    }
}

impl fmt::Debug for ClientConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConnection")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish()
    }
}
