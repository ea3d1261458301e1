//! Background task keeping the app table in sync with the notification stream.

use crate::state::AppState;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

/// Spawn the single consumer that applies notifications to the app table.
///
/// Subscribes before returning, so requests submitted afterwards are not missed.
pub fn spawn_table_processor(state: Arc<AppState>) -> tokio::task::JoinHandle<()> {
    let mut rx = state.dispatch.subscribe();

    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(notification) => {
                    debug!(target: "scoopdeck::table", "Applying {}", notification.channel());
                    state.table.write().await.apply(&notification);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(target: "scoopdeck::table", "Table processor lagged, skipped {} notifications", skipped);
                }
                Err(RecvError::Closed) => {
                    debug!(target: "scoopdeck::table", "Notification stream closed");
                    break;
                }
            }
        }
    })
}
