//! Config struct definition and default implementation.

use crate::fs::{DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directory created under the system temp dir when no root is configured.
pub const DEFAULT_ROOT_DIR_NAME: &str = "refshare";

/// Completion marker written by the CLI factory.
pub const DEFAULT_MANIFEST_NAME: &str = "manifest.json";

/// Configuration for refshare.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Coordinator root. Falls back to `<temp dir>/refshare`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Mode for created directories.
    #[serde(default = "default_dir_mode")]
    pub dir_mode: u32,

    /// Mode for created files.
    #[serde(default = "default_file_mode")]
    pub file_mode: u32,

    /// File name of the manifest inside each entry directory.
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: None,
            dir_mode: default_dir_mode(),
            file_mode: default_file_mode(),
            manifest_name: default_manifest_name(),
        }
    }
}

fn default_dir_mode() -> u32 {
    DEFAULT_DIR_MODE
}

fn default_file_mode() -> u32 {
    DEFAULT_FILE_MODE
}

fn default_manifest_name() -> String {
    DEFAULT_MANIFEST_NAME.to_string()
}
