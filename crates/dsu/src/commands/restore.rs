//! `dsu restore`: bring back a file or directory saved by `dsu backup`

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use dsu_xtract::dry;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{copy_recursive, ensure_directory, is_directory_target, Context};

static BACKUP_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*)\.(\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2})\.bak$")
        .expect("backup name pattern is valid")
});

#[derive(Debug, Clone, clap::Args)]
pub struct Args {
    /// The backup to restore
    pub backup: PathBuf,

    /// A directory to restore into, or the restored file's path. The current directory by default
    pub target: Option<PathBuf>,
}

/// The name a backup had before it was taken, or `None` if `name` is not a backup
pub fn original_name(name: &str) -> Option<&str> {
    if let Some(captures) = BACKUP_NAME.captures(name) {
        return captures.get(1).map(|m| m.as_str()).filter(|s| !s.is_empty());
    }
    name.strip_suffix(".bak").filter(|s| !s.is_empty())
}

/// Where `backup` is restored to when `target` is given
pub fn restore_path(backup: &Path, target: &Path) -> anyhow::Result<PathBuf> {
    let name = backup
        .file_name()
        .with_context(|| format!("{} has no file name", backup.display()))?
        .to_string_lossy();
    let original = original_name(&name)
        .with_context(|| format!("{} is not a backup", backup.display()))?;

    if is_directory_target(target) {
        Ok(target.join(original))
    } else {
        Ok(target.to_path_buf())
    }
}

pub fn execute(args: &Args, ctx: &Context) -> anyhow::Result<()> {
    let backup = &args.backup;
    fs_err::symlink_metadata(backup)
        .with_context(|| format!("cannot restore {}", backup.display()))?;

    let target = args.target.clone().unwrap_or_else(|| PathBuf::from("."));
    let restored = restore_path(backup, &target)?;

    if let Some(parent) = restored.parent() {
        ensure_directory(parent, ctx)?;
    }

    if restored.exists() {
        if ctx.config.dry_run {
            dry!("would overwrite {}", restored.display());
        } else if !ctx.allows(&format!("{} already exists. Overwrite it?", restored.display())) {
            tracing::warn!("skipped restoring {}", backup.display());
            return Ok(());
        }
    }

    if ctx.config.dry_run {
        dry!("would restore {} to {}", backup.display(), restored.display());
        return Ok(());
    }

    copy_recursive(backup, &restored)?;
    tracing::info!("restored {} to {}", backup.display(), restored.display());
    Ok(())
}
