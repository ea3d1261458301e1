//! Error types for Scoopdeck.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoopError {
    #[error("Process spawn failed: {0}")]
    ProcessSpawnFailed(String),

    #[error("Favorite bucket store error at {path:?}: {message}")]
    Persistence { path: PathBuf, message: String },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Channel send error")]
    ChannelSendError,
}
