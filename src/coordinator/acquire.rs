//! The acquisition half of the protocol.

use super::lease::Lease;
use super::resource::Resource;
use super::{Coordinator, LOCK_FILE_NAME};
use crate::error::{Error, Result, combine};
use crate::lock::{self, FileLock};
use crate::path::validate_key;
use std::path::Path;

impl Coordinator {
    /// Acquire the resource stored under `key`, creating it with `factory` if needed.
    ///
    /// `factory` receives the entry directory and runs while this process holds
    /// the entry's exclusive lock, so no two factories for the same key ever
    /// overlap. It is expected to return the existing resource when one is
    /// already there. Holders that already have a lease keep reading meanwhile.
    ///
    /// # Errors
    ///
    /// * The factory's own error, returned unchanged
    /// * `Error::InvalidArgument` (converted into `E`) for a bad key, before
    ///   anything is created
    /// * Lock or filesystem errors (converted into `E`); every lock taken so
    ///   far is released first
    pub fn acquire<F, E>(&self, key: &str, factory: F) -> std::result::Result<Lease, E>
    where
        F: FnOnce(&Path) -> std::result::Result<Resource, E>,
        E: From<Error>,
    {
        validate_key(key)?;

        let entry_dir = self.entry_dir(key);
        let lock_file = entry_dir.join(LOCK_FILE_NAME);

        let dir_lock = self.lock_entry(&entry_dir)?;
        if !lock_file.exists() {
            tracing::info!(key, entry = %entry_dir.display(), "creating entry");
        }
        let (token, dir_lock) = register_holder(&self.permissions, &lock_file, dir_lock)?;

        let resource = match factory(&entry_dir) {
            Ok(resource) => resource,
            Err(err) => {
                let unwound = Error::join(
                    [token.unlock(), dir_lock.unlock()]
                        .into_iter()
                        .filter_map(std::result::Result::err)
                        .collect(),
                );
                if let Err(e) = unwound {
                    tracing::warn!(key, "failed to unwind locks after factory error: {}", e);
                }
                return Err(err);
            }
        };

        // The holder token now protects the resource. Closing the handle drops
        // the OS lock even if the unlock call reports an error.
        if let Err(e) = dir_lock.unlock() {
            tracing::warn!(key, "failed to release entry lock: {}", e);
        }

        let (path, cleanup) = resource.into_parts();
        tracing::debug!(key, path = %path.display(), "acquired resource");

        Ok(Lease::new(
            path,
            self.root.clone(),
            entry_dir,
            lock_file,
            token,
            cleanup,
        ))
    }

    /// Create the root and entry directories and lock the entry exclusively.
    ///
    /// The root lock guards the "does the entry exist" decision and is only
    /// released once the entry lock is held, so a concurrent last release can
    /// never delete the directory in between.
    fn lock_entry(&self, entry_dir: &Path) -> Result<FileLock> {
        self.permissions.create_dir_all(&self.root)?;
        let root_lock = lock::lock_exclusive(&self.root)?;

        let dir_lock = match self.permissions.create_dir_all(entry_dir) {
            Ok(()) => lock::lock_exclusive(entry_dir),
            Err(e) => Err(e),
        };

        match dir_lock {
            Ok(dir_lock) => {
                if let Err(e) = root_lock.unlock() {
                    tracing::warn!("failed to release root lock: {}", e);
                }
                Ok(dir_lock)
            }
            Err(e) => combine(Err(e), root_lock.unlock()),
        }
    }
}

/// Create the lock file if needed and take this holder's shared token on it.
///
/// On failure the entry lock is released before returning.
fn register_holder(
    permissions: &crate::fs::Permissions,
    lock_file: &Path,
    dir_lock: FileLock,
) -> Result<(FileLock, FileLock)> {
    let token = permissions
        .touch(lock_file)
        .and_then(|()| lock::lock_shared(lock_file));

    match token {
        Ok(token) => Ok((token, dir_lock)),
        Err(e) => combine(Err(e), dir_lock.unlock()),
    }
}
