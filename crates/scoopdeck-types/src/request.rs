//! Requests a client may issue and the command kinds they map to.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A request to run one Scoop operation.
///
/// This is the complete set of operations a client can trigger. Anything that
/// does not deserialize into one of these variants never reaches the process
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ScoopRequest {
    /// `scoop list`
    List,
    /// `scoop status`
    Status,
    /// `scoop bucket list`
    BucketList,
    /// `scoop update` (Scoop itself and its buckets).
    Update,
    /// `scoop update <name>`
    UpdateApp { name: String },
    /// `scoop update *`
    UpdateAll,
    /// `scoop uninstall <name>`
    UninstallApp { name: String },
    /// `checkver.ps1 * <bucket dir> -u`
    Checkver { bucket: String },
}

impl ScoopRequest {
    /// The payload-free kind of this request.
    pub fn kind(&self) -> CommandKind {
        match self {
            ScoopRequest::List => CommandKind::List,
            ScoopRequest::Status => CommandKind::Status,
            ScoopRequest::BucketList => CommandKind::BucketList,
            ScoopRequest::Update => CommandKind::Update,
            ScoopRequest::UpdateApp { .. } => CommandKind::UpdateApp,
            ScoopRequest::UpdateAll => CommandKind::UpdateAll,
            ScoopRequest::UninstallApp { .. } => CommandKind::UninstallApp,
            ScoopRequest::Checkver { .. } => CommandKind::Checkver,
        }
    }

    /// The user-supplied item this request targets, if any.
    pub fn item(&self) -> Option<&str> {
        match self {
            ScoopRequest::UpdateApp { name } | ScoopRequest::UninstallApp { name } => Some(name),
            ScoopRequest::Checkver { bucket } => Some(bucket),
            _ => None,
        }
    }
}

/// Payload-free discriminant of a [`ScoopRequest`], carried on lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommandKind {
    List,
    Status,
    BucketList,
    Update,
    UpdateApp,
    UpdateAll,
    UninstallApp,
    Checkver,
}

impl CommandKind {
    /// Channel name used in logs and on the notification stream.
    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::List => "list",
            CommandKind::Status => "status",
            CommandKind::BucketList => "bucket-list",
            CommandKind::Update => "update",
            CommandKind::UpdateApp => "update-app",
            CommandKind::UpdateAll => "update-all",
            CommandKind::UninstallApp => "uninstall-app",
            CommandKind::Checkver => "checkver",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque token tying a `started` notification to its `finished` notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let json = serde_json::to_string(&ScoopRequest::UpdateApp { name: "git".into() }).unwrap();
        assert_eq!(json, r#"{"type":"update-app","name":"git"}"#);

        let parsed: ScoopRequest = serde_json::from_str(r#"{"type":"bucket-list"}"#).unwrap();
        assert_eq!(parsed, ScoopRequest::BucketList);
    }

    #[test]
    fn test_unknown_request_is_rejected() {
        assert!(serde_json::from_str::<ScoopRequest>(r#"{"type":"install","name":"x"}"#).is_err());
        assert!(serde_json::from_str::<ScoopRequest>(r#"{"type":"update-app"}"#).is_err());
    }

    #[test]
    fn test_item_only_for_targeted_requests() {
        assert_eq!(ScoopRequest::Checkver { bucket: "extras".into() }.item(), Some("extras"));
        assert_eq!(ScoopRequest::UninstallApp { name: "git".into() }.item(), Some("git"));
        assert_eq!(ScoopRequest::UpdateAll.item(), None);
        assert_eq!(ScoopRequest::UpdateAll.kind().as_str(), "update-all");
    }

    #[test]
    fn test_correlation_ids_are_unique() {
        let a = CorrelationId::new();
        let b = CorrelationId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().len(), 36);
    }
}
