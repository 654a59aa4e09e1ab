//! WebSocket upgrade handler and per-connection event loop.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use event_common::PrefixedId;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};

use crate::AppState;

use super::handler::handle_client_message;
use super::session::{self, ClientConnection, ConnectionReceiver};

pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_upgrade))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: AppState) {
    let (ws_tx, mut ws_rx) = socket.split();
    let (tx, rx) = session::queue();

    let conn = Arc::new(ClientConnection::new(ClientConnection::generate(), tx));
    let hub = state.hub.clone();
    hub.registry().add(conn.clone());
    tracing::info!(conn_id = %conn.id, "display client connected");

    let mut writer = tokio::spawn(write_frames(ws_tx, rx));

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if handle_client_message(&hub, &conn, text.as_str()).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(?e, conn_id = %conn.id, "ws read error");
                        break;
                    }
                    // Ping/pong are answered by axum; binary frames carry nothing for us.
                    Some(Ok(_)) => continue,
                }
            }

            // Writer exits when the socket rejects a send.
            _ = &mut writer => break,

            // Pruned by the dispatcher, typically for a full queue.
            _ = conn.closed() => {
                tracing::warn!(conn_id = %conn.id, "display client dropped by hub");
                break;
            }
        }
    }

    hub.registry().remove(&conn.id);
    writer.abort();
    tracing::info!(conn_id = %conn.id, "display client disconnected");
}

/// Drain a connection's queue onto its socket, in order.
async fn write_frames(mut ws_tx: SplitSink<WebSocket, Message>, mut rx: ConnectionReceiver) {
    while let Some(msg) = rx.recv().await {
        if ws_tx.send(msg).await.is_err() {
            break;
        }
    }
    let _ = ws_tx.close().await;
}
