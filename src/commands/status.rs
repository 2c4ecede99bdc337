//! `refshare status`: list entries and their holders.

use super::coordinator;
use crate::cli::StatusArgs;
use anyhow::{Context, Result};
use refshare::manifest::Manifest;
use refshare::{Config, EntryState, EntryStatus, exit_codes};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct StatusRow {
    key: String,
    path: PathBuf,
    state: EntryState,
    #[serde(skip_serializing_if = "Option::is_none")]
    manifest: Option<Manifest>,
}

pub fn cmd_status(config: &Config, args: StatusArgs) -> Result<i32> {
    let coordinator = coordinator(config)?;
    let rows: Vec<StatusRow> = coordinator
        .entries()?
        .into_iter()
        .map(|entry| row(entry, &config.manifest_name))
        .collect();

    if args.json {
        let json = serde_json::to_string_pretty(&rows).context("failed to serialize status")?;
        println!("{}", json);
    } else {
        print_table(&coordinator.root().display().to_string(), &rows);
    }

    Ok(exit_codes::SUCCESS)
}

fn row(entry: EntryStatus, manifest_name: &str) -> StatusRow {
    let manifest_path = entry.path.join(manifest_name);
    // Entries not created by `hold` have no manifest.
    let manifest = manifest_path
        .is_file()
        .then(|| Manifest::from_file(&manifest_path).ok())
        .flatten();

    StatusRow {
        key: entry.key,
        path: entry.path,
        state: entry.state,
        manifest,
    }
}

fn print_table(root: &str, rows: &[StatusRow]) {
    println!("Root: {}", root);
    if rows.is_empty() {
        println!("No entries.");
        return;
    }

    let width = rows.iter().map(|r| r.key.len()).max().unwrap_or(0).max(3);
    println!();
    println!("{:<width$}  {:<10}  {}", "KEY", "STATE", "AGE", width = width);
    for row in rows {
        let age = row
            .manifest
            .as_ref()
            .map(Manifest::age_string)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<width$}  {:<10}  {}",
            row.key,
            row.state.as_str(),
            age,
            width = width
        );
    }
}
