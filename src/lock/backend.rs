//! The capability set every platform lock backend provides.
//!
//! Locking itself goes through `fs2`, which uses `flock` on unix and
//! `LockFileEx` on Windows. Platforms differ only in which file the lock is
//! placed on, so exactly one `open` is compiled in, chosen with `cfg`.

use super::types::LockMode;
use fs2::FileExt;
use std::fs::File;
use std::io;
use std::path::Path;

pub(crate) trait Backend {
    /// Opens the handle the lock is placed on. Each call yields a fresh handle.
    fn open(path: &Path) -> io::Result<File>;

    /// Blocks until the lock is placed.
    fn lock(file: &File, mode: LockMode) -> io::Result<()> {
        retry_interrupted(|| match mode {
            LockMode::Shared => FileExt::lock_shared(file),
            LockMode::Exclusive => FileExt::lock_exclusive(file),
        })
    }

    /// Places the lock without blocking. `Ok(false)` means a conflicting lock
    /// is held through another handle.
    fn try_lock(file: &File, mode: LockMode) -> io::Result<bool> {
        let attempt = retry_interrupted(|| match mode {
            LockMode::Shared => FileExt::try_lock_shared(file),
            LockMode::Exclusive => FileExt::try_lock_exclusive(file),
        });

        match attempt {
            Ok(()) => Ok(true),
            Err(e) if is_contended(&e) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn unlock(file: &File) -> io::Result<()> {
        FileExt::unlock(file)
    }
}

#[cfg(unix)]
pub(crate) type Platform = super::unix::Flock;

#[cfg(windows)]
pub(crate) type Platform = super::windows::LockFileEx;

/// Repeats `op` while a signal interrupts it.
fn retry_interrupted(mut op: impl FnMut() -> io::Result<()>) -> io::Result<()> {
    loop {
        match op() {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            result => return result,
        }
    }
}

fn is_contended(err: &io::Error) -> bool {
    err.raw_os_error().is_some()
        && err.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
