//! Flat-file cache holding the last fetched catalog.
use crate::models::CatalogSnapshot;
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache file {} is corrupt", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cache file {} could not be accessed", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog could not be serialized")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the cached snapshot. A missing or blank file yields `Ok(None)`.
    pub async fn read(&self) -> Result<Option<CatalogSnapshot>, CacheError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No cache file at {}", self.path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(CacheError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if text.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| CacheError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    /// Replaces the cache file with `snapshot`.
    ///
    /// Content goes to a sibling `.tmp` file first and is renamed over the
    /// target, so readers never observe a half-written cache.
    pub async fn write(&self, snapshot: &CatalogSnapshot) -> Result<(), CacheError> {
        let json = serde_json::to_string_pretty(snapshot)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|source| self.io_error(source))?;
        if let Err(source) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(self.io_error(source));
        }
        debug!(
            "Wrote {} movies to {}",
            snapshot.items.len(),
            self.path.display()
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_error(&self, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MovieRecord;

    fn movie(id: &str, title: &str) -> MovieRecord {
        MovieRecord {
            id: Some(id.to_string()),
            rank: Some("1".to_string()),
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("Movies.json"));
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn blank_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Movies.json");
        std::fs::write(&path, "  \n\t").unwrap();
        let store = CacheStore::new(path);
        assert!(store.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Movies.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = CacheStore::new(path);
        assert!(matches!(
            store.read().await,
            Err(CacheError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn write_then_read_returns_same_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("Movies.json"));
        let snapshot = CatalogSnapshot {
            items: vec![movie("tt1", "First"), movie("tt2", "Second")],
            error_message: None,
        };
        store.write(&snapshot).await.unwrap();
        assert_eq!(store.read().await.unwrap(), Some(snapshot));
        assert!(!dir.path().join("Movies.json.tmp").exists());
    }

    #[tokio::test]
    async fn write_overwrites_previous_content_indented() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path().join("nested").join("Movies.json"));
        store
            .write(&CatalogSnapshot {
                items: vec![movie("tt1", "Old")],
                error_message: None,
            })
            .await
            .unwrap();
        let newer = CatalogSnapshot {
            items: vec![movie("tt9", "New")],
            error_message: None,
        };
        store.write(&newer).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\n  \"Items\""));
        assert!(!raw.contains("Old"));
        assert!(!raw.contains("ErrorMessage"));
        assert_eq!(store.read().await.unwrap(), Some(newer));
    }
}
