//! Config loading, validation, and utility operations.

use super::model::{Config, DEFAULT_ROOT_DIR_NAME};
use crate::coordinator::LOCK_FILE_NAME;
use crate::error::{Error, Result};
use crate::fs::Permissions;
use crate::manifest::DATA_DIR_NAME;
use crate::path::validate_component;
use std::path::{Path, PathBuf};

const MAX_MODE: u32 = 0o777;

impl Config {
    /// Load config from a YAML file.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(Error::Config)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| Error::Config(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| Error::Config(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Validate config values.
    ///
    /// Validation rules:
    /// - `dir_mode` and `file_mode` fit in `0o777`
    /// - `manifest_name` is a single valid path component other than the lock file or
    ///   the data directory
    pub fn validate(&self) -> Result<()> {
        for (name, mode) in [("dir_mode", self.dir_mode), ("file_mode", self.file_mode)] {
            if mode > MAX_MODE {
                return Err(Error::Config(format!(
                    "config validation failed: {} {:#o} exceeds {:#o}",
                    name, mode, MAX_MODE
                )));
            }
        }

        if let Err(e) = validate_component(&self.manifest_name) {
            return Err(Error::Config(format!(
                "config validation failed: manifest_name {:?}: {}",
                self.manifest_name, e
            )));
        }
        for reserved in [LOCK_FILE_NAME, DATA_DIR_NAME] {
            if self.manifest_name == reserved {
                return Err(Error::Config(format!(
                    "config validation failed: manifest_name must not be '{}'",
                    reserved
                )));
            }
        }

        Ok(())
    }

    /// The configured root, or `<temp dir>/refshare`.
    pub fn root_dir(&self) -> PathBuf {
        self.root
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_ROOT_DIR_NAME))
    }

    pub fn permissions(&self) -> Permissions {
        Permissions::new(self.dir_mode, self.file_mode)
    }
}
