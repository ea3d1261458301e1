//! Shared application state.

use crate::config::Config;
use scoopdeck_core::{AppTable, DispatchHandle};
use tokio::sync::RwLock;

/// Shared application state.
pub struct AppState {
    pub dispatch: DispatchHandle,
    pub table: RwLock<AppTable>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, dispatch: DispatchHandle) -> Self {
        Self {
            dispatch,
            table: RwLock::new(AppTable::new()),
            config,
        }
    }
}
