//! A held resource and the release half of the protocol.

use super::resource::Cleanup;
use crate::error::{Error, Result};
use crate::lock::{self, FileLock};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// One holder's claim on a shared resource.
///
/// The claim is a shared lock on the entry's lock file, so it lives exactly as
/// long as this process keeps it (or dies). Call [`Lease::release`] to see
/// release errors; dropping a lease releases too but can only log them.
pub struct Lease {
    path: PathBuf,
    root: PathBuf,
    entry_dir: PathBuf,
    lock_file: PathBuf,
    token: Option<FileLock>,
    cleanup: Option<Cleanup>,
}

impl Lease {
    pub(super) fn new(
        path: PathBuf,
        root: PathBuf,
        entry_dir: PathBuf,
        lock_file: PathBuf,
        token: FileLock,
        cleanup: Option<Cleanup>,
    ) -> Self {
        Self {
            path,
            root,
            entry_dir,
            lock_file,
            token: Some(token),
            cleanup,
        }
    }

    /// Location of the resource, as returned by the factory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the resource and its lock file.
    pub fn entry_dir(&self) -> &Path {
        &self.entry_dir
    }

    /// Give up this holder's claim.
    ///
    /// When no other holder remains, the cleanup closure runs and the entry
    /// directory is removed. Every step is attempted even if an earlier one
    /// fails; all failures come back together.
    pub fn release(mut self) -> Result<()> {
        self.release_holder()
    }

    fn release_holder(&mut self) -> Result<()> {
        let Some(token) = self.token.take() else {
            return Ok(());
        };
        let cleanup = self.cleanup.take();

        let root_lock = match lock::lock_exclusive(&self.root) {
            Ok(lock) => lock,
            Err(e) => {
                // Without the root lock nothing may be deleted; just drop our claim.
                let mut errors = vec![e];
                errors.extend(token.unlock().err());
                return Error::join(errors);
            }
        };

        let mut errors = Vec::new();

        match lock::lock_exclusive(&self.entry_dir) {
            Ok(dir_lock) => {
                errors.extend(self.drop_claim(token, cleanup).err());
                errors.extend(dir_lock.unlock().err());
            }
            Err(e) => {
                errors.push(e);
                errors.extend(token.unlock().err());
            }
        }

        errors.extend(root_lock.unlock().err());
        Error::join(errors)
    }

    /// Unlock our token, then find out whether anyone else still holds one.
    ///
    /// Called with both the root and the entry locked, so no new holder can
    /// register between the check and the removal.
    fn drop_claim(&self, token: FileLock, cleanup: Option<Cleanup>) -> Result<()> {
        let mut errors = Vec::new();
        errors.extend(token.unlock().err());

        let last = match lock::try_lock_exclusive(&self.lock_file) {
            Ok(last) => last,
            Err(e) if e.is_would_block() => {
                tracing::debug!(
                    entry = %self.entry_dir.display(),
                    "released claim, other holders remain"
                );
                return Error::join(errors);
            }
            Err(e) => {
                errors.push(e);
                return Error::join(errors);
            }
        };

        if let Some(cleanup) = cleanup {
            cleanup();
        }
        errors.extend(last.unlock().err());

        if let Err(e) = fs::remove_dir_all(&self.entry_dir) {
            errors.push(Error::filesystem(
                format!("failed to remove '{}'", self.entry_dir.display()),
                e,
            ));
        } else {
            tracing::info!(entry = %self.entry_dir.display(), "last holder released, removed entry");
        }

        Error::join(errors)
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Err(e) = self.release_holder() {
            tracing::warn!(entry = %self.entry_dir.display(), "failed to release lease: {}", e);
        }
    }
}

impl fmt::Debug for Lease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease")
            .field("path", &self.path)
            .field("entry_dir", &self.entry_dir)
            .field("held", &self.token.is_some())
            .finish()
    }
}
