//! refshare: share keyed on-disk resources between processes.
//!
//! This is the main entry point for the `refshare` CLI. It parses arguments,
//! dispatches to the appropriate command handler, and maps errors to exit
//! codes.

mod cli;
mod commands;
mod logging;

use cli::Cli;
use refshare::exit_codes;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    if let Err(e) = logging::init_tracing(cli.verbose) {
        eprintln!("Warning: {}", e);
    }

    match commands::dispatch(cli) {
        Ok(code) => ExitCode::from(clamp_exit_code(code)),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {:#}", err);

            ExitCode::from(clamp_exit_code(error_exit_code(&err)))
        }
    }
}

/// Exit code for an error surfaced from a command.
fn error_exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<refshare::Error>()
        .map(refshare::Error::exit_code)
        .unwrap_or(exit_codes::USER_ERROR)
}

fn clamp_exit_code(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(u8::MAX)
}
