//! Unix backend: `flock(2)` on the path itself.
//!
//! Locks belong to the open file description, so two handles opened by the
//! same process conflict with each other exactly like two processes would,
//! and the kernel drops every lock of a process that dies.

use super::backend::Backend;
use std::fs::File;
use std::io;
use std::path::Path;

pub(crate) struct Flock;

impl Backend for Flock {
    fn open(path: &Path) -> io::Result<File> {
        // Read-only is enough for flock and also works on directories.
        File::open(path)
    }
}
