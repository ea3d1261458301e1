//! In-memory app and bucket collections fed by notifications.

use scoopdeck_types::{AppEntry, AppRecord, BucketRecord, Notification};
use std::collections::BTreeMap;
use tracing::debug;

/// Current apps and buckets as seen through the notification stream.
///
/// All mutation goes through [`AppTable::apply`], which is meant to be
/// called from a single consumer so notifications are applied in order.
#[derive(Debug, Default)]
pub struct AppTable {
    apps: BTreeMap<String, AppRecord>,
    buckets: BTreeMap<String, bool>,
}

impl AppTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one notification. Lifecycle and console notifications are ignored.
    pub fn apply(&mut self, notification: &Notification) {
        match notification {
            Notification::AppEntry(entry) => self.merge_app(entry.clone()),
            Notification::AppEntryRemoved { name } => {
                if self.apps.remove(name).is_none() {
                    debug!(target: "scoopdeck::table", "Removed app {} not found", name);
                }
            }
            Notification::BucketEntry { name, is_favorite } => {
                self.add_bucket(name, *is_favorite);
            }
            _ => {}
        }
    }

    /// Merge a partial record into the app with the same name.
    pub fn merge_app(&mut self, entry: AppEntry) {
        match self.apps.get_mut(&entry.name) {
            Some(record) => record.merge(entry),
            None => {
                self.apps.insert(entry.name.clone(), AppRecord::from(entry));
            }
        }
    }

    /// Record a bucket, replacing its favorite flag.
    ///
    /// There is at most one favorite: a bucket arriving as favorite clears
    /// the flag on every other bucket.
    pub fn add_bucket(&mut self, name: &str, is_favorite: bool) {
        if is_favorite {
            for (other, flag) in self.buckets.iter_mut() {
                if *flag && other != name {
                    debug!(target: "scoopdeck::table", "Bucket {} is no longer the favorite", other);
                    *flag = false;
                }
            }
        }
        self.buckets.insert(name.to_string(), is_favorite);
    }

    pub fn app(&self, name: &str) -> Option<&AppRecord> {
        self.apps.get(name)
    }

    /// Apps sorted by name.
    pub fn apps(&self) -> Vec<AppRecord> {
        self.apps.values().cloned().collect()
    }

    /// Buckets sorted by name.
    pub fn buckets(&self) -> Vec<BucketRecord> {
        self.buckets
            .iter()
            .map(|(name, is_favorite)| BucketRecord {
                name: name.clone(),
                is_favorite: *is_favorite,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{extract, ExtractMode, Record};
    use scoopdeck_types::{CommandKind, CorrelationId};

    fn scraped(line: &str, mode: ExtractMode) -> Notification {
        match extract(line, mode) {
            Some(Record::App(entry)) => Notification::AppEntry(entry),
            other => panic!("Expected app record, got {:?}", other),
        }
    }

    #[test]
    fn test_list_then_status_merges_by_name() {
        let mut table = AppTable::new();
        table.apply(&scraped("  git         2.30.0      [main]", ExtractMode::List));
        table.apply(&scraped("  git: 2.30.0 -> 2.31.1", ExtractMode::Status));

        assert_eq!(table.len(), 1);
        let git = table.app("git").unwrap();
        assert_eq!(git.version.as_deref(), Some("2.30.0"));
        assert_eq!(git.latest.as_deref(), Some("2.31.1"));
        assert_eq!(git.bucket.as_deref(), Some("main"));
        assert!(git.update_available);
        assert!(!git.up_to_date);
    }

    #[test]
    fn test_distinct_names_make_distinct_records() {
        let mut table = AppTable::new();
        table.apply(&scraped("  git    2.31.1", ExtractMode::List));
        table.apply(&scraped("  7zip   19.00   [extras]", ExtractMode::List));

        let names: Vec<_> = table.apps().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec!["7zip", "git"]);
    }

    #[test]
    fn test_removal() {
        let mut table = AppTable::new();
        table.apply(&scraped("  git    2.31.1", ExtractMode::List));
        table.apply(&Notification::AppEntryRemoved { name: "git".into() });
        table.apply(&Notification::AppEntryRemoved { name: "missing".into() });
        assert!(table.is_empty());
    }

    #[test]
    fn test_buckets_are_unique_and_sorted() {
        let mut table = AppTable::new();
        table.apply(&Notification::BucketEntry { name: "scoop".into(), is_favorite: false });
        table.apply(&Notification::BucketEntry { name: "extras".into(), is_favorite: false });
        table.apply(&Notification::BucketEntry { name: "extras".into(), is_favorite: false });

        let names: Vec<_> = table.buckets().into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["extras", "scoop"]);
    }

    #[test]
    fn test_favorite_change_replaces_previous_favorite() {
        let mut table = AppTable::new();
        table.apply(&Notification::BucketEntry { name: "main".into(), is_favorite: true });
        table.apply(&Notification::BucketEntry { name: "extras".into(), is_favorite: false });

        // next listing after the favorite moved to extras
        table.apply(&Notification::BucketEntry { name: "extras".into(), is_favorite: true });

        assert_eq!(
            table.buckets(),
            vec![
                BucketRecord { name: "extras".into(), is_favorite: true },
                BucketRecord { name: "main".into(), is_favorite: false },
            ]
        );

        table.apply(&Notification::BucketEntry { name: "main".into(), is_favorite: false });
        assert_eq!(table.buckets().iter().filter(|b| b.is_favorite).count(), 1);
    }

    #[test]
    fn test_lifecycle_notifications_do_not_touch_table() {
        let mut table = AppTable::new();
        table.apply(&Notification::Finished {
            command: CommandKind::List,
            correlation_id: CorrelationId::new(),
            success: true,
            item: None,
        });
        table.apply(&Notification::ConsoleLog { text: "  git 1.0\n".into() });
        assert!(table.is_empty());
        assert!(table.buckets().is_empty());
    }
}
