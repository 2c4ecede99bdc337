//! `refshare hold`: run a command while holding a keyed resource.

use super::{coordinator, run_command};
use crate::cli::HoldArgs;
use anyhow::{Context, Result, bail};
use refshare::fs::Permissions;
use refshare::manifest::{DATA_DIR_NAME, Manifest};
use refshare::{Config, Resource};
use std::fs;
use std::path::Path;
use std::process::Command;

/// Environment variable carrying the resource path to the child.
pub const PATH_ENV: &str = "REFSHARE_PATH";

pub fn cmd_hold(config: &Config, args: HoldArgs) -> Result<i32> {
    let init = args.init.as_deref().map(parse_init).transpose()?;
    let coordinator = coordinator(config)?;
    let permissions = *coordinator.permissions();

    let lease = coordinator.acquire(&args.key, |entry_dir| {
        materialize(
            entry_dir,
            &args.key,
            &config.manifest_name,
            init.as_deref(),
            &permissions,
        )
    })?;

    let outcome = run_command(&args.command, Some((PATH_ENV, lease.path())));
    lease
        .release()
        .with_context(|| format!("failed to release '{}'", args.key))?;
    outcome
}

/// Split `--init` into argv without involving a shell.
fn parse_init(init: &str) -> Result<Vec<String>> {
    let argv = shell_words::split(init)
        .with_context(|| format!("failed to parse --init '{}'", init))?;
    if argv.is_empty() {
        bail!("--init is empty after parsing");
    }
    Ok(argv)
}

/// The factory: return the existing resource, or build it.
///
/// The manifest is written last, so its presence means `data/` is complete.
/// A `data/` directory without one was left by a creator that died and is
/// rebuilt from scratch.
fn materialize(
    entry_dir: &Path,
    key: &str,
    manifest_name: &str,
    init: Option<&[String]>,
    permissions: &Permissions,
) -> Result<Resource> {
    let data = entry_dir.join(DATA_DIR_NAME);
    let manifest_path = entry_dir.join(manifest_name);

    if manifest_path.is_file() {
        tracing::debug!(key, "resource already complete");
        return Ok(Resource::new(data));
    }

    if data.exists() {
        tracing::warn!(key, "removing incomplete resource left by an earlier creator");
        fs::remove_dir_all(&data)
            .with_context(|| format!("failed to remove '{}'", data.display()))?;
    }
    permissions.create_dir_all(&data)?;

    if let Some([program, args @ ..]) = init {
        let status = Command::new(program)
            .args(args)
            .current_dir(&data)
            .status()
            .with_context(|| format!("failed to execute init command '{}'", program))?;
        if !status.success() {
            bail!("init command '{}' failed with {}", program, status);
        }
    }

    Manifest::new(key).write(&manifest_path, permissions)?;
    tracing::info!(key, path = %data.display(), "created resource");
    Ok(Resource::new(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MANIFEST: &str = "manifest.json";

    #[test]
    fn parse_init_splits_quoted_words() {
        let argv = parse_init("sh -c 'echo hi > out'").unwrap();
        assert_eq!(argv, vec!["sh", "-c", "echo hi > out"]);
    }

    #[test]
    fn parse_init_rejects_bad_input() {
        assert!(parse_init("   ").is_err());
        assert!(parse_init("echo 'unterminated").is_err());
    }

    #[test]
    fn materialize_creates_data_and_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let perms = Permissions::default();

        let resource = materialize(temp_dir.path(), "k", MANIFEST, None, &perms).unwrap();
        assert_eq!(resource.path(), temp_dir.path().join("data"));
        assert!(resource.path().is_dir());

        let manifest = Manifest::from_file(temp_dir.path().join(MANIFEST)).unwrap();
        assert_eq!(manifest.key, "k");
    }

    #[test]
    fn materialize_reuses_complete_resource() {
        let temp_dir = TempDir::new().unwrap();
        let perms = Permissions::default();

        materialize(temp_dir.path(), "k", MANIFEST, None, &perms).unwrap();
        fs::write(temp_dir.path().join("data").join("kept"), b"x").unwrap();

        materialize(temp_dir.path(), "k", MANIFEST, None, &perms).unwrap();
        assert!(temp_dir.path().join("data").join("kept").exists());
    }

    #[test]
    fn materialize_rebuilds_incomplete_resource() {
        let temp_dir = TempDir::new().unwrap();
        let perms = Permissions::default();
        let stale = temp_dir.path().join("data").join("half-written");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, b"x").unwrap();

        materialize(temp_dir.path(), "k", MANIFEST, None, &perms).unwrap();
        assert!(!stale.exists());
        assert!(temp_dir.path().join(MANIFEST).is_file());
    }

    #[cfg(unix)]
    #[test]
    fn materialize_runs_init_inside_data() {
        let temp_dir = TempDir::new().unwrap();
        let perms = Permissions::default();
        let init = parse_init("sh -c 'echo ready > marker'").unwrap();

        let resource =
            materialize(temp_dir.path(), "k", MANIFEST, Some(init.as_slice()), &perms).unwrap();
        assert_eq!(
            fs::read_to_string(resource.path().join("marker")).unwrap(),
            "ready\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn failed_init_leaves_no_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let perms = Permissions::default();
        let init = parse_init("false").unwrap();

        let err = materialize(temp_dir.path(), "k", MANIFEST, Some(init.as_slice()), &perms).unwrap_err();
        assert!(err.to_string().contains("init command"));
        assert!(!temp_dir.path().join(MANIFEST).exists());
    }
}
