//! `dsu backup`: timestamped copies of files and directories

use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _};
use chrono::NaiveDateTime;
use dsu_xtract::dry;

use super::{copy_recursive, ensure_directory, is_directory_target, Context};

/// Timestamp embedded in backup names, e.g. `notes.txt.2024-05-01_13-45-00.bak`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

#[derive(Debug, Clone, clap::Args)]
pub struct Args {
    /// The file or directory to back up
    pub source: PathBuf,

    /// A directory to put the backup in, or the backup's file name. The current directory by
    /// default
    pub target: Option<PathBuf>,
}

/// Where the backup of `source` goes when `target` is given
pub fn backup_path(source: &Path, target: &Path, now: NaiveDateTime) -> anyhow::Result<PathBuf> {
    let name = source
        .file_name()
        .with_context(|| format!("{} has no file name", source.display()))?
        .to_string_lossy();

    if is_directory_target(target) {
        return Ok(target.join(format!("{name}.{}.bak", now.format(TIMESTAMP_FORMAT))));
    }

    let file_name = target
        .file_name()
        .with_context(|| format!("{} has no file name", target.display()))?
        .to_string_lossy();
    if file_name.ends_with(".bak") {
        Ok(target.to_path_buf())
    } else {
        Ok(target.with_file_name(format!("{file_name}.bak")))
    }
}

pub fn execute(args: &Args, ctx: &Context) -> anyhow::Result<()> {
    let source = &args.source;
    fs_err::symlink_metadata(source)
        .with_context(|| format!("cannot back up {}", source.display()))?;

    let target = args.target.clone().unwrap_or_else(|| PathBuf::from("."));
    let backup = backup_path(source, &target, chrono::Local::now().naive_local())?;
    if backup.starts_with(source) && source.is_dir() {
        bail!(
            "cannot back up {} into itself ({})",
            source.display(),
            backup.display()
        );
    }

    if let Some(parent) = backup.parent() {
        ensure_directory(parent, ctx)?;
    }

    if backup.exists() {
        if ctx.config.dry_run {
            dry!("would overwrite {}", backup.display());
        } else if !ctx.allows(&format!("{} already exists. Overwrite it?", backup.display())) {
            tracing::warn!("skipped backup of {}", source.display());
            return Ok(());
        }
    }

    if ctx.config.dry_run {
        dry!("would back up {} to {}", source.display(), backup.display());
        return Ok(());
    }

    copy_recursive(source, &backup)?;
    tracing::info!("backed up {} to {}", source.display(), backup.display());
    Ok(())
}
