//! What a factory hands back to the coordinator.

use std::fmt;
use std::path::{Path, PathBuf};

/// Runs once, in whichever process turns out to be the last holder.
pub type Cleanup = Box<dyn FnOnce() + Send + 'static>;

/// A materialized resource inside an entry directory.
pub struct Resource {
    path: PathBuf,
    cleanup: Option<Cleanup>,
}

impl Resource {
    /// A resource living at `path` (usually somewhere under the entry directory).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cleanup: None,
        }
    }

    /// Attach a closure to run right before the entry directory is removed.
    ///
    /// It only runs on a voluntary release by the last holder; a holder that
    /// crashes never runs its cleanup.
    pub fn with_cleanup<F>(mut self, cleanup: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.cleanup = Some(Box::new(cleanup));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(super) fn into_parts(self) -> (PathBuf, Option<Cleanup>) {
        (self.path, self.cleanup)
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("path", &self.path)
            .field("has_cleanup", &self.cleanup.is_some())
            .finish()
    }
}
