//! Persistence of the favorite bucket.

use crate::{Result, ScoopError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const FILE_NAME: &str = "favorite-bucket.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredFavorite {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bucket: Option<String>,
}

/// Single-key JSON store holding the favorite bucket name.
#[derive(Debug, Clone)]
pub struct FavoriteStore {
    path: PathBuf,
}

impl FavoriteStore {
    /// Store the favorite in `favorite-bucket.json` under `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored favorite. A missing file means no favorite.
    pub fn load(&self) -> Result<Option<String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.persistence_error(e)),
        };
        let stored: StoredFavorite =
            serde_json::from_str(&content).map_err(|e| self.persistence_error(e))?;
        Ok(stored.bucket)
    }

    /// Overwrite the stored favorite.
    pub fn save(&self, bucket: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.persistence_error(e))?;
        }
        let content = serde_json::to_string(&StoredFavorite {
            bucket: Some(bucket.to_string()),
        })?;
        std::fs::write(&self.path, content).map_err(|e| self.persistence_error(e))?;
        debug!(target: "scoopdeck::favorites", "Wrote favorite bucket to {:?}", self.path);
        Ok(())
    }

    fn persistence_error(&self, e: impl std::fmt::Display) -> ScoopError {
        ScoopError::Persistence {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}

/// The remembered favorite bucket, cached in memory and backed by a store.
#[derive(Debug)]
pub struct FavoriteBucket {
    store: FavoriteStore,
    current: Option<String>,
}

impl FavoriteBucket {
    /// Restore the favorite from the store.
    pub fn restore(store: FavoriteStore) -> Result<Self> {
        let current = store.load()?;
        match &current {
            Some(bucket) => {
                info!(target: "scoopdeck::favorites", "Restored favorite bucket {}", bucket)
            }
            None => info!(target: "scoopdeck::favorites", "No favorite bucket set"),
        }
        Ok(Self { store, current })
    }

    pub fn get(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Remember `bucket` as the new favorite and persist it.
    pub fn set(&mut self, bucket: &str) -> Result<()> {
        self.current = Some(bucket.to_string());
        self.store.save(bucket)?;
        info!(target: "scoopdeck::favorites", "Saved bucket {} as favorite", bucket);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_means_no_favorite() {
        let temp_dir = TempDir::new().unwrap();
        let favorite = FavoriteBucket::restore(FavoriteStore::in_dir(temp_dir.path())).unwrap();
        assert_eq!(favorite.get(), None);
        assert_ne!(favorite.get(), Some("extras"));
    }

    #[test]
    fn test_set_persists_across_restore() {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("nested").join("scoopdeck");

        let mut favorite = FavoriteBucket::restore(FavoriteStore::in_dir(&data_dir)).unwrap();
        favorite.set("extras").unwrap();
        assert_eq!(favorite.get(), Some("extras"));

        let restored = FavoriteBucket::restore(FavoriteStore::in_dir(&data_dir)).unwrap();
        assert_eq!(restored.get(), Some("extras"));
    }

    #[test]
    fn test_reads_legacy_document_shape() {
        let temp_dir = TempDir::new().unwrap();
        let store = FavoriteStore::in_dir(temp_dir.path());
        std::fs::write(store.path(), r#"{"bucket":"main"}"#).unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("main"));

        std::fs::write(store.path(), "{}").unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_corrupt_store_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = FavoriteStore::in_dir(temp_dir.path());
        std::fs::write(store.path(), "not json").unwrap();
        assert!(matches!(store.load(), Err(ScoopError::Persistence { .. })));
    }

    #[test]
    fn test_unwritable_store_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        // a regular file where the data directory should be
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let mut favorite = FavoriteBucket {
            store: FavoriteStore::in_dir(&blocker.join("data")),
            current: None,
        };
        assert!(matches!(favorite.set("extras"), Err(ScoopError::Persistence { .. })));
    }
}
