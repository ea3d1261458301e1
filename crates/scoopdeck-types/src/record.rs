//! App and bucket records.

use serde::{Deserialize, Serialize};

/// Partial app information produced by one listing pass.
///
/// A `list` pass fills `version` and `bucket`, a `status` pass fills
/// `version` and `latest`. Partials are merged by name into an [`AppRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
}

/// Merged view of one installed app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    pub name: String,
    pub version: Option<String>,
    pub latest: Option<String>,
    pub bucket: Option<String>,
    pub up_to_date: bool,
    pub update_available: bool,
}

impl AppRecord {
    /// Overwrite every field the partial carries, keep the rest, then
    /// recompute the derived flags.
    pub fn merge(&mut self, entry: AppEntry) {
        if entry.version.is_some() {
            self.version = entry.version;
        }
        if entry.latest.is_some() {
            self.latest = entry.latest;
        }
        if entry.bucket.is_some() {
            self.bucket = entry.bucket;
        }
        self.refresh_flags();
    }

    fn refresh_flags(&mut self) {
        let (up_to_date, update_available) = match (&self.version, &self.latest) {
            (_, None) => (true, false),
            (Some(version), Some(latest)) => (version == latest, version != latest),
            (None, Some(_)) => (false, false),
        };
        self.up_to_date = up_to_date;
        self.update_available = update_available;
    }
}

impl From<AppEntry> for AppRecord {
    fn from(entry: AppEntry) -> Self {
        let mut record = Self {
            name: entry.name,
            version: entry.version,
            latest: entry.latest,
            bucket: entry.bucket,
            up_to_date: true,
            update_available: false,
        };
        record.refresh_flags();
        record
    }
}

/// A known bucket and whether it is the remembered favorite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketRecord {
    pub name: String,
    pub is_favorite: bool,
}
