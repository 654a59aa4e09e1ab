//! Catch-up sequence sent to a client in reply to `statusbar_init`.

use super::session::{ClientConnection, ConnectionClosed};
use super::topics::TopicState;

/// Send the current value of every topic, in order, over `conn`.
///
/// Frames are encoded by the same path as live broadcasts. The first failed
/// send aborts the remaining steps; the caller tears the connection down.
/// Returns the number of frames sent.
pub fn send_snapshot(topics: &TopicState, conn: &ClientConnection) -> Result<usize, ConnectionClosed> {
    let mut sent = 0;
    for event in topics.snapshot_events() {
        let frame = match event.encode() {
            Ok(frame) => frame,
            Err(err) => {
                tracing::error!(?err, kind = event.kind(), "failed to encode bootstrap event");
                continue;
            }
        };
        conn.send(&frame)?;
        sent += 1;
    }
    Ok(sent)
}
