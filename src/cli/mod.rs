//! CLI argument parsing for refshare.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// refshare: share keyed on-disk resources between processes.
///
/// Resources live in entry directories under a root. The first process to
/// ask for a key creates it; the last one to let go removes it. Holders that
/// crash are counted out automatically.
#[derive(Parser, Debug)]
#[command(name = "refshare")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Root directory for shared entries (overrides the config file).
    #[arg(long, global = true, env = "REFSHARE_ROOT")]
    pub root: Option<PathBuf>,

    /// YAML config file.
    #[arg(long, global = true, env = "REFSHARE_CONFIG")]
    pub config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for refshare.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Hold a keyed resource while running a command.
    ///
    /// Creates the resource on first use (running --init inside its data
    /// directory), exports its path as REFSHARE_PATH, runs the command and
    /// releases. The last holder to release removes the resource.
    Hold(HoldArgs),

    /// Hold an advisory lock on a file while running a command.
    Lock(LockArgs),

    /// List entries under the root and whether anyone holds them.
    Status(StatusArgs),

    /// Remove entries left behind by holders that crashed.
    Sweep,
}

/// Arguments for the `hold` command.
#[derive(Parser, Debug)]
pub struct HoldArgs {
    /// Resource key (a single file name).
    pub key: String,

    /// Command that populates a new resource, run inside its data directory.
    #[arg(long, value_name = "CMD")]
    pub init: Option<String>,

    /// Command to run while the resource is held.
    #[arg(last = true, required = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Arguments for the `lock` command.
#[derive(Parser, Debug)]
pub struct LockArgs {
    /// File or directory to lock. A missing file is created.
    pub path: PathBuf,

    /// Take a shared lock instead of an exclusive one.
    #[arg(long)]
    pub shared: bool,

    /// Fail with exit code 2 instead of waiting when the lock is held.
    #[arg(long)]
    pub no_wait: bool,

    /// Command to run while the lock is held.
    #[arg(last = true, required = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Arguments for the `status` command.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
