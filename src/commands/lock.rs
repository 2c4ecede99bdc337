//! `refshare lock`: run a command while holding an advisory lock on a path.

use super::run_command;
use crate::cli::LockArgs;
use anyhow::{Context, Result};
use refshare::lock::{self, LockMode};
use refshare::Config;

pub fn cmd_lock(config: &Config, args: LockArgs) -> Result<i32> {
    let permissions = config.permissions();

    if !args.path.exists() {
        if let Some(parent) = args.path.parent()
            && !parent.as_os_str().is_empty()
        {
            permissions.create_dir_all(parent)?;
        }
        permissions.touch(&args.path)?;
    }

    let mode = if args.shared {
        LockMode::Shared
    } else {
        LockMode::Exclusive
    };

    let held = match (mode, args.no_wait) {
        (LockMode::Shared, false) => lock::lock_shared(&args.path),
        (LockMode::Shared, true) => lock::try_lock_shared(&args.path),
        (LockMode::Exclusive, false) => lock::lock_exclusive(&args.path),
        (LockMode::Exclusive, true) => lock::try_lock_exclusive(&args.path),
    }?;
    tracing::info!(path = %args.path.display(), %mode, "holding lock");

    let outcome = run_command(&args.command, None);
    held.unlock()
        .with_context(|| format!("failed to unlock '{}'", args.path.display()))?;
    outcome
}
