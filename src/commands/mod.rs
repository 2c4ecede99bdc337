//! Command implementations for refshare.
//!
//! This module resolves the configuration shared by every command and routes
//! each CLI command to its handler. Handlers return the process exit code.

mod hold;
mod lock;
mod status;
mod sweep;

use crate::cli::{Cli, Command};
use anyhow::{Context, Result, bail};
use refshare::exit_codes;
use refshare::{Config, Coordinator};
use std::path::Path;
use std::process::{ExitStatus, Stdio};

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<i32> {
    let config = load_config(cli.config.as_deref(), cli.root)?;

    match cli.command {
        Command::Hold(args) => hold::cmd_hold(&config, args),
        Command::Lock(args) => lock::cmd_lock(&config, args),
        Command::Status(args) => status::cmd_status(&config, args),
        Command::Sweep => sweep::cmd_sweep(&config),
    }
}

/// Read the config file if one was given, then apply `--root`.
fn load_config(path: Option<&Path>, root: Option<std::path::PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(root) = root {
        config.root = Some(root);
    }

    Ok(config)
}

fn coordinator(config: &Config) -> Result<Coordinator> {
    Ok(Coordinator::from_config(config)?)
}

/// Run `argv` with inherited stdio and return its exit code.
///
/// A child killed by a signal reports `128 + signal`, the way shells do.
fn run_command(argv: &[String], env: Option<(&str, &Path)>) -> Result<i32> {
    let Some((program, args)) = argv.split_first() else {
        bail!("no command given");
    };

    let mut command = std::process::Command::new(program);
    command
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    if let Some((name, value)) = env {
        command.env(name, value);
    }

    let status = command
        .status()
        .with_context(|| format!("failed to execute '{}'", program))?;

    tracing::debug!(program = %program, %status, "command finished");
    Ok(status_code(status))
}

fn status_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    exit_codes::USER_ERROR
}
