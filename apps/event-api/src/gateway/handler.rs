//! Inbound message dispatch: `statusbar_init`, `request_available_teams`,
//! `team_selected`, and unknown types.

use super::events::{AvailableTeams, ClientMessage, ServerEvent};
use super::hub::BroadcastHub;
use super::session::{ClientConnection, ConnectionClosed};

/// Route one inbound text frame.
///
/// Malformed frames and unknown types are logged and dropped; the connection
/// stays open. `Err` only when a reply could not be queued, in which case the
/// connection has already been removed from the registry.
pub async fn handle_client_message(
    hub: &BroadcastHub,
    conn: &ClientConnection,
    text: &str,
) -> Result<(), ConnectionClosed> {
    let msg = match ClientMessage::decode(text) {
        Ok(Some(msg)) => msg,
        Ok(None) => {
            tracing::debug!(conn_id = %conn.id, "ignoring unknown message type");
            return Ok(());
        }
        Err(err) => {
            tracing::warn!(conn_id = %conn.id, %err, "ignoring malformed frame");
            return Ok(());
        }
    };

    match msg {
        ClientMessage::StatusbarInit => hub.bootstrap(conn).map(|_| ()),
        ClientMessage::RequestAvailableTeams => send_available_teams(hub, conn).await,
        ClientMessage::TeamSelected(payload) => {
            hub.relay_team_selection(&payload.username);
            Ok(())
        }
    }
}

/// Reply to the requester only. Nothing is sent if the lookup fails.
async fn send_available_teams(hub: &BroadcastHub, conn: &ClientConnection) -> Result<(), ConnectionClosed> {
    let Some(teams) = hub.available_teams().await else {
        return Ok(());
    };

    let event = ServerEvent::AvailableTeamsUpdate(AvailableTeams { teams });
    let frame = match event.encode() {
        Ok(frame) => frame,
        Err(err) => {
            tracing::error!(?err, "failed to encode available teams");
            return Ok(());
        }
    };

    conn.send(&frame).inspect_err(|_| {
        hub.registry().remove(&conn.id);
    })
}
