//! Error types for refshare.
//!
//! Uses thiserror for derive macros. Every variant maps to an exit code so the
//! CLI can report lock contention separately from real failures.

use crate::exit_codes;
use crate::path::PathError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for lock and coordinator operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A key or path failed validation. Nothing was touched on disk.
    #[error("invalid argument {input:?}: {source}")]
    InvalidArgument {
        input: String,
        #[source]
        source: PathError,
    },

    /// Opening the file or placing the lock failed for a reason other than contention.
    #[error("failed to acquire lock on '{}': {source}", .path.display())]
    LockFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A non-blocking acquisition found a conflicting lock held elsewhere.
    #[error("lock on '{}' is held elsewhere", .path.display())]
    WouldBlock { path: PathBuf },

    /// Releasing a lock failed. The handle is closed regardless.
    #[error("failed to release lock on '{}': {source}", .path.display())]
    UnlockFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Creating, removing or renaming something on disk failed.
    #[error("filesystem failure: {context}: {source}")]
    Filesystem {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Configuration could not be read, parsed or validated.
    #[error("config error: {0}")]
    Config(String),

    /// Several errors collected along a path that must not stop early.
    #[error("{}", join_messages(.0))]
    Multiple(Vec<Error>),
}

impl Error {
    pub(crate) fn filesystem(context: impl Into<String>, source: io::Error) -> Self {
        Error::Filesystem {
            context: context.into(),
            source,
        }
    }

    /// Folds collected errors into a single result.
    ///
    /// Empty means success, a single error is returned as-is.
    pub fn join(mut errors: Vec<Error>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Error::Multiple(errors)),
        }
    }

    /// True when this is (or only contains) lock contention.
    pub fn is_would_block(&self) -> bool {
        match self {
            Error::WouldBlock { .. } => true,
            Error::Multiple(errors) => {
                !errors.is_empty() && errors.iter().all(Error::is_would_block)
            }
            _ => false,
        }
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArgument { .. } | Error::Config(_) => exit_codes::USER_ERROR,
            Error::WouldBlock { .. } => exit_codes::LOCK_BUSY,
            Error::LockFailed { .. } | Error::UnlockFailed { .. } => exit_codes::LOCK_FAILURE,
            Error::Filesystem { .. } => exit_codes::FILESYSTEM_FAILURE,
            Error::Multiple(errors) => errors
                .first()
                .map(Error::exit_code)
                .unwrap_or(exit_codes::FILESYSTEM_FAILURE),
        }
    }
}

/// Merges the outcome of some work with the result of releasing what guarded it.
pub(crate) fn combine<T>(outcome: Result<T>, released: Result<()>) -> Result<T> {
    match (outcome, released) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(release_err)) => Err(release_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(release_err)) => Err(Error::Multiple(vec![err, release_err])),
    }
}

fn join_messages(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for refshare operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn unlock_failed() -> Error {
        Error::UnlockFailed {
            path: PathBuf::from("/tmp/x"),
            source: io::Error::other("boom"),
        }
    }

    #[test]
    fn invalid_argument_is_user_error() {
        let err = Error::InvalidArgument {
            input: "..".to_string(),
            source: PathError::Reserved,
        };
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
        assert!(err.to_string().contains("\"..\""));
    }

    #[test]
    fn would_block_has_its_own_exit_code() {
        let err = Error::WouldBlock {
            path: PathBuf::from("/tmp/x"),
        };
        assert_eq!(err.exit_code(), exit_codes::LOCK_BUSY);
        assert!(err.is_would_block());
    }

    #[test]
    fn unlock_failure_is_distinct_from_lock_failure_message() {
        let lock = Error::LockFailed {
            path: PathBuf::from("/tmp/x"),
            source: io::Error::other("boom"),
        };
        assert!(lock.to_string().starts_with("failed to acquire lock"));
        assert!(unlock_failed().to_string().starts_with("failed to release lock"));
        assert_eq!(lock.exit_code(), unlock_failed().exit_code());
    }

    #[test]
    fn join_empty_is_ok() {
        assert!(Error::join(Vec::new()).is_ok());
    }

    #[test]
    fn join_single_is_unwrapped() {
        let err = Error::join(vec![unlock_failed()]).unwrap_err();
        assert!(matches!(err, Error::UnlockFailed { .. }));
    }

    #[test]
    fn join_many_keeps_every_message() {
        let err = Error::join(vec![
            Error::Config("first".to_string()),
            unlock_failed(),
        ])
        .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("first"));
        assert!(msg.contains("failed to release lock"));
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
        assert!(!err.is_would_block());
    }
}
