//! Notifications published by the core to every connected client.

use crate::{AppEntry, CommandKind, CorrelationId};
use serde::{Deserialize, Serialize};

/// Messages sent from the core to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Notification {
    /// An invocation was accepted and its process is about to be spawned.
    Started {
        command: CommandKind,
        correlation_id: CorrelationId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        item: Option<String>,
    },
    /// The invocation's process exited (or never started).
    Finished {
        command: CommandKind,
        correlation_id: CorrelationId,
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        item: Option<String>,
    },
    /// Partial app record from a list or status pass.
    AppEntry(AppEntry),
    /// An app was uninstalled.
    AppEntryRemoved { name: String },
    /// A bucket from a bucket-list pass.
    BucketEntry { name: String, is_favorite: bool },
    /// Raw process output, forwarded verbatim for display.
    ConsoleLog { text: String },
}

impl Notification {
    /// Channel name of this notification, e.g. `update-app-finished`.
    pub fn channel(&self) -> String {
        match self {
            Notification::Started { command, .. } => format!("{command}-started"),
            Notification::Finished { command, .. } => format!("{command}-finished"),
            Notification::AppEntry(_) => "app-entry".to_string(),
            Notification::AppEntryRemoved { .. } => "app-entry-removed".to_string(),
            Notification::BucketEntry { .. } => "bucket-entry".to_string(),
            Notification::ConsoleLog { .. } => "console-log".to_string(),
        }
    }
}
