//! Filesystem utilities.
//!
//! Explicit creation modes and crash-atomic file writes for factories that
//! materialize resource contents.

pub mod atomic;
mod permissions;

pub use atomic::atomic_write;
pub use permissions::{DEFAULT_DIR_MODE, DEFAULT_FILE_MODE, Permissions};
