//! Advisory file locking.
//!
//! A thin, platform-abstracted layer over the OS advisory lock:
//! - Blocking and non-blocking acquisition
//! - Shared (read) and exclusive (write) modes
//! - Scoped helpers that release on every exit path
//!
//! # Lock Scope
//!
//! Every acquisition opens its own handle, and the lock belongs to that
//! handle, not to the path or the process. Two `FileLock`s on the same path
//! inside one process therefore conflict the same way two processes would.
//!
//! # Crash Safety
//!
//! The OS drops a handle's lock when the handle is closed, including when the
//! owning process dies. Nothing needs to detect dead holders.
//!
//! # Backends
//!
//! - **unix**: `flock(2)` on the path itself (directories included)
//! - **Windows**: `LockFileEx` over the whole of a sibling `<path>.lock` file

mod backend;
mod guard;
mod operations;
mod types;

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;


// Re-export public API
pub use guard::FileLock;
pub use operations::{
    lock_exclusive, lock_shared, try_lock_exclusive, try_lock_shared, unlock, with_exclusive,
    with_shared,
};
pub use types::LockMode;
