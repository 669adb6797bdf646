//! File-backed document store

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::debug;

use super::{StorageError, StoragePort};

/// Stores each document as `<data_dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StorageError::Io {
            key: root.display().to_string(),
            source,
        })?;
        debug!("Opened file store at {}", root.display());
        Ok(Self { root })
    }

    /// Directory holding the documents
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.root.join(format!("{}.json", file_name))
    }
}

impl StoragePort for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { key: key.to_string(), source }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Write then rename so a crash never leaves a half-written document
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let io_err = |source| StorageError::Io { key: key.to_string(), source };

        fs::write(&tmp, value).map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Io { key: key.to_string(), source }),
        }
    }
}
