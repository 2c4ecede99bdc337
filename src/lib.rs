//! refshare: keyed on-disk resources shared safely between processes.
//!
//! Built on OS advisory locks only. There is no daemon and no registry of
//! holders, so a process that crashes while holding a resource simply stops
//! counting as a holder.
//!
//! - [`lock`]: shared/exclusive advisory locks on files and directories
//! - [`coordinator`]: lazy creation and reference-counted reclamation of keyed
//!   entry directories
//! - [`path`]: key and path validation
//! - [`fs`]: explicit creation modes and atomic writes
//! - [`config`]: YAML configuration
//! - [`manifest`]: the completion marker written by the CLI
//!
//! # Example
//!
//! ```no_run
//! use refshare::{Coordinator, Resource};
//!
//! let coordinator = Coordinator::new("/tmp/refshare")?;
//! let lease = coordinator.acquire("img-abc", |entry_dir| -> refshare::Result<Resource> {
//!     let data = entry_dir.join("data");
//!     if !data.exists() {
//!         std::fs::create_dir(&data).map_err(|e| refshare::Error::Filesystem {
//!             context: "create data".to_string(),
//!             source: e,
//!         })?;
//!     }
//!     Ok(Resource::new(data))
//! })?;
//!
//! println!("using {}", lease.path().display());
//! lease.release()?;
//! # Ok::<(), refshare::Error>(())
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod lock;
pub mod manifest;
pub mod path;

pub use config::Config;
pub use coordinator::{Coordinator, EntryState, EntryStatus, Lease, Resource};
pub use error::{Error, Result};
pub use lock::{FileLock, LockMode};
