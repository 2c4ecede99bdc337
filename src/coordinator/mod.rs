//! Reference-counted, lazily created resources shared between processes.
//!
//! A [`Coordinator`] maps string keys to entry directories under one root:
//!
//! ```text
//! root/
//!   <key>/
//!     .lock        # zero-byte; one shared lock per live holder
//!     ...          # whatever the factory put there
//! ```
//!
//! The number of holders is never written down. Each holder keeps a shared
//! lock on the entry's `.lock` file, and a releasing holder learns it was the
//! last one when a non-blocking exclusive lock on that file succeeds. Because
//! the OS drops the locks of a dead process, a crash counts as a release.
//!
//! # Lock Ordering
//!
//! Root before entry directory, always. Structural changes (creating or
//! removing an entry) happen only while both are held exclusively, so an
//! acquire can never observe a half-deleted entry and a release can never
//! delete an entry somebody just joined.

mod acquire;
mod lease;
mod maintenance;
mod resource;


use crate::config::Config;
use crate::error::Result;
use crate::fs::Permissions;
use crate::path::validate_root;
use std::path::{Path, PathBuf};

// Re-export public API
pub use lease::Lease;
pub use maintenance::{EntryState, EntryStatus};
pub use resource::{Cleanup, Resource};

/// Name of the holder-token file inside every entry directory.
pub const LOCK_FILE_NAME: &str = ".lock";

/// Hands out leases on resources stored under one root directory.
///
/// Cheap to construct and holds no OS resources; any number of coordinators,
/// in any number of processes, may share a root.
#[derive(Debug, Clone)]
pub struct Coordinator {
    root: PathBuf,
    permissions: Permissions,
}

impl Coordinator {
    /// A coordinator rooted at `root`, using the default permissions.
    ///
    /// Nothing is created until the first `acquire`.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` if `root` contains a `..` component or a
    /// component that is not a valid file name.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        validate_root(&root)?;
        Ok(Self {
            root,
            permissions: Permissions::default(),
        })
    }

    /// Use `permissions` for every directory and file the coordinator creates.
    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.root_dir())?.with_permissions(config.permissions()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn permissions(&self) -> &Permissions {
        &self.permissions
    }

    /// Where `key` lives. The key is not validated here.
    pub fn entry_dir(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}
