//! The live lock handle.

use super::backend::{Backend, Platform};
use super::types::LockMode;
use crate::error::{Error, Result};
use std::fs::File;
use std::path::{Path, PathBuf};

/// An outstanding advisory lock on one open handle.
///
/// Release it with [`FileLock::unlock`] to observe unlock errors. A handle that
/// is dropped instead is released on drop; failures there are logged, never
/// panicked on.
#[derive(Debug)]
pub struct FileLock {
    /// `None` once released.
    file: Option<File>,

    /// Path the lock was requested on.
    path: PathBuf,

    mode: LockMode,
}

impl FileLock {
    pub(super) fn new(file: File, path: PathBuf, mode: LockMode) -> Self {
        Self {
            file: Some(file),
            path,
            mode,
        }
    }

    /// Get the path this lock was taken on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }

    /// Release the lock and close the handle.
    ///
    /// The handle is closed even when the unlock call itself fails.
    pub fn unlock(mut self) -> Result<()> {
        match self.file.take() {
            Some(file) => release(file, &self.path, self.mode),
            None => Ok(()),
        }
    }
}

fn release(file: File, path: &Path, mode: LockMode) -> Result<()> {
    let result = Platform::unlock(&file).map_err(|source| Error::UnlockFailed {
        path: path.to_path_buf(),
        source,
    });
    drop(file);
    tracing::debug!(path = %path.display(), %mode, "released lock");
    result
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take()
            && let Err(e) = release(file, &self.path, self.mode)
        {
            tracing::warn!("failed to release lock on drop: {}", e);
        }
    }
}
