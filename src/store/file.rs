//! # Filesystem-backed key-value store
//!
//! [`FileStore`] keeps one file per key under a base directory:
//!
//! ```text
//! <base_dir>/
//! ├── books.json
//! └── users.json
//! ```
//!
//! Writes go to a temporary sibling first and are renamed into place, so a
//! crash mid-write leaves the previous document intact.

use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::KeyValueStore;
use crate::error::Result;

#[derive(Clone, Debug)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base.join(format!("{key}.json"))
    }

    fn tmp_path(&self, key: &str) -> PathBuf {
        self.base.join(format!(".{key}.json.tmp"))
    }
}

/// Temp file contents reach the disk before the rename.
fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.key_path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        std::fs::create_dir_all(&self.base)?;
        let tmp = self.tmp_path(key);
        let written = write_synced(&tmp, value.as_bytes())
            .and_then(|()| std::fs::rename(&tmp, self.key_path(key)));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp);
            tracing::warn!(key, error = %e, "write failed");
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.get("books").unwrap().is_none());
    }

    #[test]
    fn set_creates_base_dir_and_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("nested"));
        store.set("users", "[]".to_string()).unwrap();
        assert_eq!(store.get("users").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("nested/users.json").exists());
        assert!(!dir.path().join("nested/.users.json.tmp").exists());

        store.remove("users").unwrap();
        assert!(store.get("users").unwrap().is_none());
        store.remove("users").unwrap();
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in the target's place makes the rename fail.
        std::fs::create_dir_all(dir.path().join("books.json/occupied")).unwrap();
        let mut store = FileStore::new(dir.path());
        assert!(store.set("books", "[]".to_string()).is_err());
        assert!(!dir.path().join(".books.json.tmp").exists());
        assert!(dir.path().join("books.json/occupied").exists());
    }
}
