use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tilematch_core::{SnapshotStore, StorageError};

/// Keeps each document as a file named after its key inside one directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl SnapshotStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StorageError::Read {
                key: key.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    fn write(&mut self, key: &str, contents: &str) -> Result<(), StorageError> {
        let write_err = |err: io::Error| StorageError::Write {
            key: key.to_string(),
            reason: err.to_string(),
        };
        fs::create_dir_all(&self.dir).map_err(write_err)?;
        fs::write(self.path(key), contents).map_err(write_err)?;
        log::debug!("wrote {}", self.path(key).display());
        Ok(())
    }
}
