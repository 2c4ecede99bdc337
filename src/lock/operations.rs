//! Lock acquisition and scoped-lock operations.

use super::backend::{Backend, Platform};
use super::guard::FileLock;
use super::types::LockMode;
use crate::error::{Error, Result, combine};
use std::path::Path;

/// Place an exclusive lock on `path`, blocking until no other handle holds any lock on it.
///
/// # Returns
///
/// * `Ok(FileLock)` - The lock is held until unlocked or dropped
/// * `Err(Error::LockFailed)` - The path could not be opened or locked
pub fn lock_exclusive<P: AsRef<Path>>(path: P) -> Result<FileLock> {
    acquire(path.as_ref(), LockMode::Exclusive)
}

/// Place a shared lock on `path`, blocking only while an exclusive lock is held elsewhere.
pub fn lock_shared<P: AsRef<Path>>(path: P) -> Result<FileLock> {
    acquire(path.as_ref(), LockMode::Shared)
}

/// Try to place an exclusive lock on `path` without blocking.
///
/// # Returns
///
/// * `Ok(FileLock)` - Lock acquired
/// * `Err(Error::WouldBlock)` - Some other handle holds a lock on the path
/// * `Err(Error::LockFailed)` - The path could not be opened or locked
pub fn try_lock_exclusive<P: AsRef<Path>>(path: P) -> Result<FileLock> {
    try_acquire(path.as_ref(), LockMode::Exclusive)
}

/// Try to place a shared lock on `path` without blocking.
///
/// Fails with `Error::WouldBlock` only while an exclusive lock is held elsewhere.
pub fn try_lock_shared<P: AsRef<Path>>(path: P) -> Result<FileLock> {
    try_acquire(path.as_ref(), LockMode::Shared)
}

/// Release a lock and close its handle.
pub fn unlock(lock: FileLock) -> Result<()> {
    lock.unlock()
}

/// Run `body` while holding an exclusive lock on `path`.
///
/// The lock is released on every exit path. When both `body` and the release
/// fail, both errors are returned as `Error::Multiple`.
pub fn with_exclusive<P, T, F>(path: P, body: F) -> Result<T>
where
    P: AsRef<Path>,
    F: FnOnce() -> Result<T>,
{
    scoped(lock_exclusive(path)?, body)
}

/// Run `body` while holding a shared lock on `path`.
pub fn with_shared<P, T, F>(path: P, body: F) -> Result<T>
where
    P: AsRef<Path>,
    F: FnOnce() -> Result<T>,
{
    scoped(lock_shared(path)?, body)
}

fn scoped<T, F>(lock: FileLock, body: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    // A panic in body unwinds through FileLock's Drop, which releases too.
    let outcome = body();
    combine(outcome, lock.unlock())
}

fn acquire(path: &Path, mode: LockMode) -> Result<FileLock> {
    let file = Platform::open(path).map_err(|source| lock_failed(path, source))?;

    // On failure the handle is dropped, which closes it.
    Platform::lock(&file, mode).map_err(|source| lock_failed(path, source))?;

    tracing::debug!(path = %path.display(), %mode, "acquired lock");
    Ok(FileLock::new(file, path.to_path_buf(), mode))
}

fn try_acquire(path: &Path, mode: LockMode) -> Result<FileLock> {
    let file = Platform::open(path).map_err(|source| lock_failed(path, source))?;

    match Platform::try_lock(&file, mode) {
        Ok(true) => {
            tracing::debug!(path = %path.display(), %mode, "acquired lock without waiting");
            Ok(FileLock::new(file, path.to_path_buf(), mode))
        }
        Ok(false) => Err(Error::WouldBlock {
            path: path.to_path_buf(),
        }),
        Err(source) => Err(lock_failed(path, source)),
    }
}

fn lock_failed(path: &Path, source: std::io::Error) -> Error {
    Error::LockFailed {
        path: path.to_path_buf(),
        source,
    }
}
