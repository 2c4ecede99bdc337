//! `refshare sweep`: reap entries nobody holds.

use super::coordinator;
use anyhow::Result;
use refshare::{Config, exit_codes};

pub fn cmd_sweep(config: &Config) -> Result<i32> {
    let coordinator = coordinator(config)?;
    let removed = coordinator.sweep()?;

    if removed.is_empty() {
        println!("Nothing to sweep.");
    } else {
        for path in &removed {
            println!("Removed {}", path.display());
        }
    }

    Ok(exit_codes::SUCCESS)
}
