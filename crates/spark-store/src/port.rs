//! Persistence port and its JSON-file implementation.
//!
//! The store talks to durable storage only through [`JournalPort`], so the
//! backing medium is swappable. The production port keeps the two
//! collections as pretty-printed JSON documents in a data directory:
//!
//! ```text
//! data/
//!   ideas.json
//!   folders.json
//! ```
//!
//! Loads tolerate a missing file (first run) and malformed content
//! (corrupted storage) by returning the empty collection; neither is fatal.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tracing::warn;

use spark_models::{Folder, Idea};

use crate::{Error, Result};

/// Durable storage boundary for the two journal collections.
///
/// Ideas and folders are persisted independently; each save replaces the
/// whole collection.
#[async_trait]
pub trait JournalPort: Send + Sync {
    async fn load_ideas(&self) -> Result<Vec<Idea>>;
    async fn load_folders(&self) -> Result<Vec<Folder>>;
    async fn save_ideas(&self, ideas: &[Idea]) -> Result<()>;
    async fn save_folders(&self, folders: &[Folder]) -> Result<()>;
}

/// JSON-file port: one document per collection under a data directory.
pub struct JsonFilePort {
    data_dir: PathBuf,
}

impl JsonFilePort {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn ideas_path(&self) -> PathBuf {
        self.data_dir.join("ideas.json")
    }

    fn folders_path(&self) -> PathBuf {
        self.data_dir.join("folders.json")
    }

    /// Read a collection document, degrading to empty on absence or
    /// malformed content.
    async fn load_collection<T: DeserializeOwned>(&self, path: &Path) -> Vec<T> {
        let raw = match fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read collection, starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupted collection file, starting empty");
                Vec::new()
            }
        }
    }

    /// Write a collection document atomically: temp file then rename, so a
    /// crash mid-write never leaves a torn document behind.
    async fn save_collection<T: Serialize>(&self, path: &Path, items: &[T]) -> Result<()> {
        fs::create_dir_all(&self.data_dir).await.map_err(|e| {
            Error::Internal(format!(
                "Failed to create data directory {}: {}",
                self.data_dir.display(),
                e
            ))
        })?;

        let json = serde_json::to_string_pretty(items)?;

        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &json).await.map_err(|e| {
            Error::Internal(format!(
                "Failed to write collection file {}: {}",
                temp_path.display(),
                e
            ))
        })?;
        fs::rename(&temp_path, path).await.map_err(|e| {
            Error::Internal(format!(
                "Failed to rename collection file to {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(())
    }
}

#[async_trait]
impl JournalPort for JsonFilePort {
    async fn load_ideas(&self) -> Result<Vec<Idea>> {
        Ok(self.load_collection(&self.ideas_path()).await)
    }

    async fn load_folders(&self) -> Result<Vec<Folder>> {
        Ok(self.load_collection(&self.folders_path()).await)
    }

    async fn save_ideas(&self, ideas: &[Idea]) -> Result<()> {
        self.save_collection(&self.ideas_path(), ideas).await
    }

    async fn save_folders(&self, folders: &[Folder]) -> Result<()> {
        self.save_collection(&self.folders_path(), folders).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_missing_files_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let port = JsonFilePort::new(dir.path());

        assert!(port.load_ideas().await.unwrap().is_empty());
        assert!(port.load_folders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_corrupted_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ideas.json"), "{not json!").unwrap();

        let port = JsonFilePort::new(dir.path());
        assert!(port.load_ideas().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let port = JsonFilePort::new(dir.path());

        let ideas = vec![Idea::new("a", "x"), Idea::new("b", "y")];
        let folders = vec![Folder::new("Projects")];

        port.save_ideas(&ideas).await.unwrap();
        port.save_folders(&folders).await.unwrap();

        assert_eq!(port.load_ideas().await.unwrap(), ideas);
        assert_eq!(port.load_folders().await.unwrap(), folders);
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let port = JsonFilePort::new(dir.path());

        port.save_ideas(&[Idea::new("a", "")]).await.unwrap();
        assert!(!dir.path().join("ideas.tmp").exists());
        assert!(dir.path().join("ideas.json").exists());
    }
}
