//! Atomic file writes.
//!
//! All atomic writes follow this pattern:
//! 1. Write content to a uniquely named temporary file in the same directory
//! 2. Apply the configured file mode and sync the file to disk
//! 3. Atomically replace the target file
//!
//! # Cross-Platform Behavior
//!
//! - **POSIX**: `rename()` replaces the target atomically on the same
//!   filesystem; the parent directory is synced afterwards.
//! - **Windows**: `MoveFileExW` with `MOVEFILE_REPLACE_EXISTING`, via
//!   `tempfile`'s `persist`.
//!
//! Concurrent writers to one target each get their own temporary file; the
//! last rename wins. A crash may leave a `.tmp*` file behind.

use super::permissions::Permissions;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically write bytes to a file.
///
/// The target is never observed partially written: readers see either the
/// old content or the new content.
///
/// # Example
///
/// ```no_run
/// use refshare::fs::{atomic_write, Permissions};
/// use std::path::Path;
///
/// atomic_write(Path::new("state.json"), b"{}", &Permissions::default())?;
/// # Ok::<(), refshare::Error>(())
/// ```
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8], perms: &Permissions) -> Result<()> {
    let path = path.as_ref();

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.exists() {
        perms.create_dir_all(parent)?;
    }

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| {
        Error::filesystem(
            format!("failed to create temporary file in '{}'", parent.display()),
            e,
        )
    })?;

    // Dropping `temp` on an error path removes the temporary file.
    fill(temp.as_file_mut(), content, perms)?;

    temp.persist(path).map_err(|e| {
        Error::filesystem(
            format!("failed to atomically replace '{}'", path.display()),
            e.error,
        )
    })?;

    sync_dir(parent);
    Ok(())
}

fn fill(file: &mut File, content: &[u8], perms: &Permissions) -> Result<()> {
    perms.apply_to_file(file)?;
    file.write_all(content)
        .map_err(|e| Error::filesystem("failed to write temporary file", e))?;
    file.sync_all()
        .map_err(|e| Error::filesystem("failed to sync temporary file", e))
}

/// Persist the directory entry too. Best effort.
#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Ok(dir) = File::open(dir) {
        let _ = dir.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::{Arc, Barrier};
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");

        atomic_write(&file_path, b"hello world", &Permissions::default()).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "hello world");
    }

    #[test]
    fn test_atomic_write_replace_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");
        fs::write(&file_path, "original content").unwrap();

        atomic_write(&file_path, b"new content", &Permissions::default()).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("nested").join("dirs").join("test.txt");

        atomic_write(&file_path, b"nested content", &Permissions::default()).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "nested content");
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");

        atomic_write(&file_path, b"content", &Permissions::default()).unwrap();

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .filter(|n| n != "test.txt")
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_write_applies_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("private.json");

        atomic_write(&file_path, b"{}", &Permissions::new(0o700, 0o640)).unwrap();

        let mode = fs::metadata(&file_path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }

    #[test]
    fn test_atomic_write_concurrent_different_files() {
        let temp_dir = TempDir::new().unwrap();

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let path = temp_dir.path().join(format!("file_{}.txt", i));
                let content = format!("content {}", i);
                std::thread::spawn(move || {
                    atomic_write(&path, content.as_bytes(), &Permissions::default()).unwrap();
                    (path, content)
                })
            })
            .collect();

        for handle in handles {
            let (path, expected) = handle.join().unwrap();
            assert_eq!(fs::read_to_string(&path).unwrap(), expected);
        }
    }

    #[test]
    fn test_atomic_write_concurrent_same_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("manifest.json");
        let writers = 4;

        for round in 0..20 {
            let barrier = Arc::new(Barrier::new(writers));
            let handles: Vec<_> = (0..writers)
                .map(|i| {
                    let path = path.clone();
                    let barrier = Arc::clone(&barrier);
                    std::thread::spawn(move || {
                        let content = format!("round {} writer {}", round, i);
                        barrier.wait();
                        atomic_write(&path, content.as_bytes(), &Permissions::default())
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap().unwrap();
            }

            let content = fs::read_to_string(&path).unwrap();
            assert!(content.starts_with(&format!("round {} writer ", round)));
        }

        let entries = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(entries, 1, "temporary files left behind");
    }
}
