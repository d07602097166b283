//! The `dsu` subcommands

pub mod backup;
pub mod clipboard;
pub mod cln;
pub mod hog;
pub mod restore;
pub mod xtract;

use std::path::Path;

use anyhow::{bail, Context as _};
use dsu_xtract::{dry, CleanupRegistry, Confirm};
use walkdir::WalkDir;

use crate::{cli::Command, config::Config, prompt::TermConfirm};

/// Everything a command needs besides its own arguments
pub struct Context {
    pub config: Config,
    pub confirm: Box<dyn Confirm + Send>,
    pub cleanup: CleanupRegistry,
}

impl Context {
    pub fn new(config: Config, cleanup: CleanupRegistry) -> Self {
        Self {
            config,
            confirm: Box::new(TermConfirm::new()),
            cleanup,
        }
    }

    /// Apply the force policy to one question
    pub fn allows(&self, question: &str) -> bool {
        self.config.force.allows(self.confirm.as_ref(), question)
    }
}

pub fn execute(command: Command, ctx: &Context) -> anyhow::Result<()> {
    match command {
        Command::Backup(args) => backup::execute(&args, ctx),
        Command::Restore(args) => restore::execute(&args, ctx),
        Command::Cln(args) => cln::execute(&args, ctx),
        Command::Hog(args) => hog::execute(&args),
        Command::Copy => clipboard::copy(ctx),
        Command::Paste => clipboard::paste(),
        Command::Xtract(args) => xtract::execute(&args, ctx),
    }
}

/// Whether `path` names a directory: an existing one, or a missing path without an extension
pub(crate) fn is_directory_target(path: &Path) -> bool {
    path.is_dir() || (!path.exists() && path.extension().is_none())
}

/// Make sure `dir` exists, creating it if the force policy allows
pub(crate) fn ensure_directory(dir: &Path, ctx: &Context) -> anyhow::Result<()> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    if dir.exists() {
        bail!("{} is not a directory", dir.display());
    }

    if ctx.config.dry_run {
        dry!("would create directory {}", dir.display());
        return Ok(());
    }
    let question = format!("Directory {} does not exist. Create it?", dir.display());
    if !ctx.allows(&question) {
        bail!("directory {} does not exist", dir.display());
    }

    fs_err::create_dir_all(dir)?;
    tracing::info!("created directory {}", dir.display());
    Ok(())
}

/// Copy a file, or a directory with everything below it, replacing whatever is at `to`
pub(crate) fn copy_recursive(from: &Path, to: &Path) -> anyhow::Result<()> {
    if let Ok(existing) = fs_err::symlink_metadata(to) {
        if existing.is_dir() {
            fs_err::remove_dir_all(to)?;
        } else {
            fs_err::remove_file(to)?;
        }
    }

    if !from.is_dir() {
        fs_err::copy(from, to)?;
        return Ok(());
    }

    for entry in WalkDir::new(from) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .context("walked outside of the source directory")?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs_err::create_dir_all(&target)?;
        } else if entry.file_type().is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            fs_err::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> anyhow::Result<()> {
    let link = fs_err::read_link(from)?;
    fs_err::os::unix::fs::symlink(link, to)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> anyhow::Result<()> {
    fs_err::copy(from, to)?;
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::test_support::context;
    use super::*;
    use dsu_xtract::ForcePolicy;

    #[test]
    fn test_directory_targets() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        fs_err::write(&file, "x").unwrap();

        assert!(is_directory_target(dir.path()));
        assert!(is_directory_target(&dir.path().join("missing")));
        assert!(!is_directory_target(&dir.path().join("missing.bak")));
        assert!(!is_directory_target(&file));
    }

    #[test]
    fn test_ensure_directory_follows_force_policy() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b");

        assert!(ensure_directory(&target, &context(ForcePolicy::No, false)).is_err());
        assert!(ensure_directory(&target, &context(ForcePolicy::Ask, false)).is_err());
        ensure_directory(&target, &context(ForcePolicy::Yes, true)).unwrap();
        ensure_directory(&target, &context(ForcePolicy::No, true)).unwrap();
        assert!(!target.exists());

        ensure_directory(&target, &context(ForcePolicy::Yes, false)).unwrap();
        assert!(target.is_dir());
    }

    #[test]
    fn test_copy_recursive_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("from");
        fs_err::create_dir_all(from.join("nested")).unwrap();
        fs_err::write(from.join("nested/a.txt"), "a").unwrap();
        let to = dir.path().join("to");
        fs_err::create_dir_all(&to).unwrap();
        fs_err::write(to.join("stale.txt"), "stale").unwrap();

        copy_recursive(&from, &to).unwrap();

        assert_eq!(fs_err::read_to_string(to.join("nested/a.txt")).unwrap(), "a");
        assert!(!to.join("stale.txt").exists());
    }
}
