//! Durable key-value slots
//!
//! Every piece of persisted state lives in one string-keyed slot and is
//! read and written whole: the two message sessions as JSON arrays, the
//! treatise and the preferences as raw text. Slots are backed by an
//! embedded `sled` database.

use crate::error::{Result, StoryWeaverError};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

pub mod keys;

/// Slot store backed by an embedded database
///
/// Cloning is cheap; clones share the same underlying database.
#[derive(Clone)]
pub struct SlotStore {
    db: sled::Db,
}

impl SlotStore {
    /// Open or create a slot store at the given directory
    ///
    /// # Errors
    ///
    /// Returns `StoryWeaverError::Storage` if the database cannot be opened
    ///
    /// # Examples
    ///
    /// ```
    /// use storyweaver::storage::SlotStore;
    ///
    /// # fn main() -> storyweaver::error::Result<()> {
    /// let dir = tempfile::tempdir()?;
    /// let store = SlotStore::open(dir.path().join("slots"))?;
    /// store.write("theme", "dark")?;
    /// assert_eq!(store.read("theme")?.as_deref(), Some("dark"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoryWeaverError::Storage(format!("Failed to create data directory: {}", e))
            })?;
        }

        let db = sled::open(path)
            .map_err(|e| StoryWeaverError::Storage(format!("Failed to open database: {}", e)))?;
        tracing::debug!("Opened slot store at {}", path.display());
        Ok(Self { db })
    }

    /// Open the slot store in the user's data directory
    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    /// Open a throwaway store that is removed when dropped
    pub fn temporary() -> Result<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| StoryWeaverError::Storage(format!("Failed to open database: {}", e)))?;
        Ok(Self { db })
    }

    /// Read a slot
    ///
    /// Returns `None` when the slot has never been written.
    ///
    /// # Errors
    ///
    /// Returns `StoryWeaverError::Storage` if the read fails or the stored
    /// bytes are not UTF-8
    pub fn read(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .db
            .get(key.as_bytes())
            .map_err(|e| StoryWeaverError::Storage(format!("Get failed: {}", e)))?;

        match value {
            Some(bytes) => {
                let text = String::from_utf8(bytes.to_vec()).map_err(|e| {
                    StoryWeaverError::Storage(format!("Slot {} is not valid UTF-8: {}", key, e))
                })?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    /// Replace the contents of a slot and flush to disk
    pub fn write(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| StoryWeaverError::Storage(format!("Insert failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| StoryWeaverError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    /// Remove a slot; removing a missing slot is not an error
    pub fn remove(&self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .map_err(|e| StoryWeaverError::Storage(format!("Remove failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| StoryWeaverError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }
}

/// Default database location in the platform data directory
pub fn default_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "storyweaver", "storyweaver").ok_or_else(|| {
        StoryWeaverError::Storage("Could not determine data directory".to_string())
    })?;
    Ok(proj_dirs.data_dir().join("slots"))
}
