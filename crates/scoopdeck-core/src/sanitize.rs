//! Sanitizing user-chosen names before they become process arguments.

/// Characters Scoop itself refuses in app and bucket names.
const BLOCKED: [char; 8] = ['/', '\\', '?', ':', '*', '<', '>', '|'];

/// Remove every path or wildcard character from a name.
pub fn sanitize(name: &str) -> String {
    name.chars().filter(|c| !BLOCKED.contains(c)).collect()
}
