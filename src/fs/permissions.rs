//! Creation modes for directories and files.
//!
//! Passed explicitly to whatever creates things on disk, instead of relying on
//! the process umask. Modes are ignored on platforms without unix permissions.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, DirBuilder, File, OpenOptions};
use std::path::Path;

/// Default mode for created directories (owner only).
pub const DEFAULT_DIR_MODE: u32 = 0o700;

/// Default mode for created files (owner read/write).
pub const DEFAULT_FILE_MODE: u32 = 0o600;

/// Modes applied to created directories and files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub dir_mode: u32,
    pub file_mode: u32,
}

impl Default for Permissions {
    fn default() -> Self {
        Self {
            dir_mode: DEFAULT_DIR_MODE,
            file_mode: DEFAULT_FILE_MODE,
        }
    }
}

impl Permissions {
    pub fn new(dir_mode: u32, file_mode: u32) -> Self {
        Self {
            dir_mode,
            file_mode,
        }
    }

    /// Create `path` and any missing parents. Existing directories are fine.
    pub fn create_dir_all(&self, path: &Path) -> Result<()> {
        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(self.dir_mode);
        }

        builder.create(path).map_err(|e| {
            Error::filesystem(format!("failed to create directory '{}'", path.display()), e)
        })
    }

    /// Create an empty file at `path` unless one already exists.
    pub fn touch(&self, path: &Path) -> Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(false);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(self.file_mode);
        }

        options.open(path).map(drop).map_err(|e| {
            Error::filesystem(format!("failed to create file '{}'", path.display()), e)
        })
    }

    /// Apply the file mode to an already-open file.
    pub fn apply_to_file(&self, file: &File) -> Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(self.file_mode))
                .map_err(|e| Error::filesystem("failed to set file permissions", e))?;
        }
        #[cfg(not(unix))]
        let _ = file;

        Ok(())
    }
}
