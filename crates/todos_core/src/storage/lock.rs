use crate::error::AppError;
use crate::storage::json_store::sibling_path;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Exclusive advisory lock on `<store>.lock`, held for one
/// load-mutate-save cycle and released on drop.
/// The lock file itself is left in place.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Blocks until no other process holds the lock for `store_path`.
    pub fn acquire(store_path: &Path) -> Result<Self, AppError> {
        let path = lock_path(store_path);
        let io_error = |err: std::io::Error| AppError::io(format!("{}: {}", path.display(), err));

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(io_error)?;
        file.lock().map_err(io_error)?;
        debug!(path = %path.display(), "acquired store lock");

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        match self.file.unlock() {
            Ok(()) => debug!(path = %self.path.display(), "released store lock"),
            Err(err) => warn!(path = %self.path.display(), "failed to release store lock: {}", err),
        }
    }
}

pub fn lock_path(store_path: &Path) -> PathBuf {
    sibling_path(store_path, ".lock")
}
