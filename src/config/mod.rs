//! Configuration model for refshare.
//!
//! A small YAML file that supplies the coordinator root and the creation
//! modes. Unknown fields are ignored, every field has a default, and values
//! are validated on load. Command-line flags override what the file says.

mod model;
mod operations;

#[cfg(test)]
mod tests;

// Re-export public API
pub use model::{Config, DEFAULT_MANIFEST_NAME, DEFAULT_ROOT_DIR_NAME};
