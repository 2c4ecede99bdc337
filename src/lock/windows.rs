//! Windows backend: `LockFileEx` on a sidecar file.
//!
//! Directories cannot be opened for byte-range locking, so the lock is placed
//! on a sibling `<path>.lock` file, created on first use. The handle is the
//! unit of ownership just like a unix open file description.

use super::backend::Backend;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

pub(crate) struct LockFileEx;

impl Backend for LockFileEx {
    fn open(path: &Path) -> io::Result<File> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(sidecar(path))
    }
}

fn sidecar(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}
