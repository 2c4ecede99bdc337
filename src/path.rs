//! Path validation.
//!
//! Keys handed to the coordinator become directory names, so they must be a
//! single, portable path component. Full paths (the coordinator root) are
//! checked component by component and may not contain `..`. Components that
//! are not valid UTF-8 are accepted as long as they pass the byte-level rules.

use crate::error::{Error, Result};
use std::path::{Component, Path};
use thiserror::Error;

/// Longest component accepted, in bytes.
pub const MAX_COMPONENT_LEN: usize = 255;

/// Why a path or component was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path component cannot be empty")]
    Empty,

    #[error("path component must be at most 255 bytes (got {0})")]
    TooLong(usize),

    #[error("path component cannot be '.' or '..'")]
    Reserved,

    #[error("forbidden character {0:?} in path component")]
    ForbiddenChar(char),

    #[error("path component cannot end with '.' or a space")]
    TrailingDotOrSpace,

    #[error("{0:?} is a reserved device name")]
    DeviceName(String),

    #[error("path traversal ('..') is not allowed")]
    Traversal,
}

/// Enforces platform filename restrictions on a single path component.
pub fn validate_component(component: &str) -> std::result::Result<(), PathError> {
    if component.len() > MAX_COMPONENT_LEN {
        return Err(PathError::TooLong(component.len()));
    }
    if component.trim().is_empty() {
        return Err(PathError::Empty);
    }
    if component == "." || component == ".." {
        return Err(PathError::Reserved);
    }
    platform_rules(component)
}

/// Validates every component of a path and rejects traversal.
///
/// Root, drive prefixes and `.` are not components in this sense and are
/// skipped, so `/`, `""` and `C:\` are all accepted.
pub fn validate_path(path: &Path) -> std::result::Result<(), PathError> {
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => return Err(PathError::Traversal),
            Component::Normal(name) => match name.to_str() {
                Some(name) => validate_component(name)?,
                // Unix names are bytes; only the byte rules apply.
                None => {
                    if name.len() > MAX_COMPONENT_LEN {
                        return Err(PathError::TooLong(name.len()));
                    }
                    platform_rules(&name.to_string_lossy())?;
                }
            },
        }
    }
    Ok(())
}

/// Validates a resource key, mapping failures to `Error::InvalidArgument`.
pub fn validate_key(key: &str) -> Result<()> {
    validate_component(key).map_err(|source| Error::InvalidArgument {
        input: key.to_string(),
        source,
    })
}

/// Validates a root path, mapping failures to `Error::InvalidArgument`.
pub fn validate_root(root: &Path) -> Result<()> {
    validate_path(root).map_err(|source| Error::InvalidArgument {
        input: root.display().to_string(),
        source,
    })
}

#[cfg(not(windows))]
fn platform_rules(component: &str) -> std::result::Result<(), PathError> {
    unix_rules(component)
}

#[cfg(windows)]
fn platform_rules(component: &str) -> std::result::Result<(), PathError> {
    unix_rules(component)?;
    windows_rules(component)
}

fn unix_rules(component: &str) -> std::result::Result<(), PathError> {
    match component.chars().find(|c| matches!(c, '/' | '\0')) {
        Some(c) => Err(PathError::ForbiddenChar(c)),
        None => Ok(()),
    }
}

#[cfg_attr(not(windows), allow(dead_code))]
const WINDOWS_FORBIDDEN: &[char] = &['\\', '<', '>', ':', '"', '|', '?', '*'];

#[cfg_attr(not(windows), allow(dead_code))]
const WINDOWS_DEVICES: &[&str] = &["CON", "PRN", "AUX", "NUL"];

#[cfg_attr(not(windows), allow(dead_code))]
fn windows_rules(component: &str) -> std::result::Result<(), PathError> {
    if let Some(c) = component
        .chars()
        .find(|c| WINDOWS_FORBIDDEN.contains(c) || c.is_ascii_control())
    {
        return Err(PathError::ForbiddenChar(c));
    }

    if component.ends_with('.') || component.ends_with(' ') {
        return Err(PathError::TrailingDotOrSpace);
    }

    // Device names are reserved with any extension: "nul.txt" is still NUL.
    let stem = component.split('.').next().unwrap_or(component);
    if is_device_name(stem) {
        return Err(PathError::DeviceName(stem.to_string()));
    }

    Ok(())
}

#[cfg_attr(not(windows), allow(dead_code))]
fn is_device_name(stem: &str) -> bool {
    let upper = stem.to_uppercase();
    if WINDOWS_DEVICES.contains(&upper.as_str()) {
        return true;
    }

    let mut chars = upper.chars();
    let prefix: String = chars.by_ref().take(3).collect();
    if prefix != "COM" && prefix != "LPT" {
        return false;
    }
    let rest: Vec<char> = chars.collect();
    matches!(rest.as_slice(), [d] if d.is_ascii_digit() || matches!(d, '¹' | '²' | '³'))
}
