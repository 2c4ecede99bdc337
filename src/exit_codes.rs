//! Exit code constants for the refshare CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid key, bad config)
//! - 2: Lock busy (a non-blocking acquisition hit contention)
//! - 3: Lock or unlock failure
//! - 4: Filesystem failure
//!
//! Commands that run a child process exit with the child's own code instead.

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid key or path, invalid config.
pub const USER_ERROR: i32 = 1;

/// A non-blocking lock attempt found the lock held elsewhere.
pub const LOCK_BUSY: i32 = 2;

/// Placing or releasing an advisory lock failed.
pub const LOCK_FAILURE: i32 = 3;

/// Creating or removing directories and files failed.
pub const FILESYSTEM_FAILURE: i32 = 4;
