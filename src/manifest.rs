//! Completion manifest for CLI-managed resources.
//!
//! The CLI's factory populates `<entry>/data/` and then atomically writes the
//! manifest next to it. A `data/` directory without a manifest is the remains
//! of a creator that died mid-factory and gets rebuilt.

use crate::error::{Error, Result};
use crate::fs::{Permissions, atomic_write};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Directory inside an entry that holds the resource contents.
pub const DATA_DIR_NAME: &str = "data";

/// Manifest stored in each completed entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Key the resource was created for.
    pub key: String,

    /// Creator of the resource (e.g., `user@HOST`).
    pub owner: String,

    /// Process ID of the creator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,

    /// When creation finished (RFC3339).
    pub created_at: DateTime<Utc>,
}

impl Manifest {
    /// Create a manifest for `key` stamped with the current time and process.
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            owner: owner_string(),
            pid: Some(std::process::id()),
            created_at: Utc::now(),
        }
    }

    /// Parse a manifest from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::filesystem(format!("failed to read manifest '{}'", path.display()), e)
        })?;

        serde_json::from_str(&content).map_err(|e| {
            Error::filesystem(
                format!("failed to parse manifest '{}'", path.display()),
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })
    }

    /// Serialize the manifest to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::filesystem(
                "failed to serialize manifest",
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })
    }

    /// Atomically write the manifest to `path`.
    pub fn write<P: AsRef<Path>>(&self, path: P, perms: &Permissions) -> Result<()> {
        let json = self.to_json()?;
        atomic_write(path, json.as_bytes(), perms)
    }

    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.created_at)
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self) -> String {
        let age = self.age();
        let minutes = age.num_minutes();
        let hours = age.num_hours();
        let days = age.num_days();

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else {
            format!("{}m", minutes)
        }
    }
}

fn owner_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_manifest_is_stamped() {
        let manifest = Manifest::new("img-abc");
        assert_eq!(manifest.key, "img-abc");
        assert_eq!(manifest.pid, Some(std::process::id()));
        assert!(manifest.owner.contains('@'));
        assert!(manifest.age().num_seconds() < 5);
    }

    #[test]
    fn test_write_and_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("manifest.json");

        let manifest = Manifest::new("key");
        manifest.write(&path, &Permissions::default()).unwrap();

        let loaded = Manifest::from_file(&path).unwrap();
        assert_eq!(loaded.key, "key");
        assert_eq!(loaded.owner, manifest.owner);
        assert_eq!(loaded.created_at, manifest.created_at);
    }

    #[test]
    fn test_pid_is_optional() {
        let json = r#"{"key":"k","owner":"a@b","created_at":"2024-01-01T00:00:00Z"}"#;
        let manifest: Manifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.pid, None);
        assert!(!manifest.to_json().unwrap().contains("pid"));
    }

    #[test]
    fn test_corrupt_manifest_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("manifest.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Manifest::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse manifest"));
    }

    #[test]
    fn test_age_string_formats() {
        let mut manifest = Manifest::new("k");

        manifest.created_at = Utc::now() - Duration::minutes(5);
        assert_eq!(manifest.age_string(), "5m");

        manifest.created_at = Utc::now() - Duration::minutes(135);
        assert_eq!(manifest.age_string(), "2h 15m");

        manifest.created_at = Utc::now() - Duration::hours(50);
        assert_eq!(manifest.age_string(), "2d 2h");
    }
}
