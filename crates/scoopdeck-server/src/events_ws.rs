//! Notification WebSocket: pushes every notification and accepts requests.

use crate::state::AppState;
use anyhow::Result;
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use scoopdeck_types::ScoopRequest;
use std::sync::Arc;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::{debug, info, trace, warn};

/// Maximum size of a client request frame.
const MAX_REQUEST_SIZE: usize = 4 * 1024;

/// Handle one notification WebSocket connection.
pub async fn handle_events_websocket(socket: WebSocket, state: Arc<AppState>) -> Result<()> {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let mut notifications = BroadcastStream::new(state.dispatch.subscribe());

    info!(target: "scoopdeck::ws", "Event WebSocket client connected");

    let mut send_task = tokio::spawn(async move {
        while let Some(item) = notifications.next().await {
            let notification = match item {
                Ok(notification) => notification,
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(target: "scoopdeck::ws", "Event WebSocket client lagged, skipped {} notifications", skipped);
                    continue;
                }
            };
            let json = match serde_json::to_string(&notification) {
                Ok(j) => j,
                Err(_) => continue,
            };
            if ws_tx.send(Message::Text(json.into())).await.is_err() {
                debug!(target: "scoopdeck::ws", "Event WebSocket send failed");
                break;
            }
        }
    });

    let dispatch = state.dispatch.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_rx.next().await {
            match msg {
                Message::Text(text) => {
                    if text.len() > MAX_REQUEST_SIZE {
                        warn!(target: "scoopdeck::ws", "Rejected oversized request ({} bytes)", text.len());
                        continue;
                    }
                    match serde_json::from_str::<ScoopRequest>(&text) {
                        Ok(request) => {
                            debug!(target: "scoopdeck::ws", "Request {} from WebSocket", request.kind());
                            if dispatch.submit(request).is_err() {
                                warn!(target: "scoopdeck::ws", "Dispatcher stopped, dropping request");
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(target: "scoopdeck::ws", "Rejected unknown request {:?}: {}", text.as_str(), e);
                        }
                    }
                }
                Message::Ping(_) => {
                    // Pong is handled automatically by axum
                    trace!(target: "scoopdeck::ws", "Received ping from event WebSocket client");
                }
                Message::Close(_) => {
                    debug!(target: "scoopdeck::ws", "Event WebSocket client closed connection");
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    info!(target: "scoopdeck::ws", "Event WebSocket client disconnected");
    Ok(())
}
