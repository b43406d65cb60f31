//! Dashboard WebSocket Fan-Out

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::AppState;

/// Upgrade a dashboard connection and subscribe it to the alert broadcast
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let feed = state.broadcaster.subscribe();
    ws.on_upgrade(move |socket| handle_dashboard(socket, feed))
}

/// Pump broadcast alerts to one dashboard until it goes away.
///
/// Inbound frames are drained only to notice the close; dashboards never
/// send meaningful data. A client that lags behind the broadcast buffer is
/// disconnected rather than back-pressured; it reconnects and resumes with
/// live alerts only (no replay).
async fn handle_dashboard(mut socket: WebSocket, mut feed: broadcast::Receiver<String>) {
    loop {
        tokio::select! {
            alert = feed.recv() => {
                match alert {
                    Ok(payload) => {
                        if socket.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Dashboard client lagging, disconnecting");
                        break;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            inbound = socket.recv() => {
                match inbound {
                    Some(Ok(_)) => {} // keepalive chatter, ignored
                    _ => break,
                }
            }
        }
    }

    debug!("Dashboard client disconnected");
}
