//! `dsu cln`: rename files so their names only use portable characters

use std::path::{Path, PathBuf};

use anyhow::bail;
use dsu_xtract::dry;
use once_cell::sync::Lazy;
use regex::Regex;

use super::Context;

static CLEAN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\-.]+$").expect("clean name pattern is valid"));
static UNDERSCORES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_{2,}").expect("underscore pattern is valid"));

#[derive(Debug, Clone, clap::Args)]
pub struct Args {
    /// Files or directories to clean
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Descend into directories without a depth limit
    #[arg(short, long)]
    pub recursive: bool,

    /// How many directory levels to descend into
    #[arg(short, long, default_value_t = 1)]
    pub depth: usize,
}

/// The cleaned version of `name`, or `None` when it only uses allowed characters
pub fn clean_name(name: &str) -> Option<String> {
    if CLEAN_NAME.is_match(name) {
        return None;
    }

    let replaced: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    Some(UNDERSCORES.replace_all(&replaced, "_").into_owned())
}

/// Names that lost every meaningful character
fn is_degenerate(name: &str) -> bool {
    name.chars().all(|c| matches!(c, '_' | '.'))
}

struct Cleaner<'a> {
    args: &'a Args,
    ctx: &'a Context,
    failures: usize,
}

impl Cleaner<'_> {
    fn descends(&self, level: usize) -> bool {
        self.args.recursive || level < self.args.depth
    }

    fn visit(&mut self, path: &Path, level: usize) {
        let metadata = match fs_err::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(err) => {
                tracing::error!("{err}");
                self.failures += 1;
                return;
            }
        };

        if metadata.is_dir() && self.descends(level) {
            match fs_err::read_dir(path) {
                Ok(entries) => {
                    let mut children: Vec<_> = entries
                        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
                        .collect();
                    children.sort();
                    for child in children {
                        self.visit(&child, level + 1);
                    }
                }
                Err(err) => {
                    tracing::error!("{err}");
                    self.failures += 1;
                }
            }
        }

        if let Err(err) = self.rename(path) {
            tracing::error!("{err:#}");
            self.failures += 1;
        }
    }

    fn rename(&self, path: &Path) -> anyhow::Result<()> {
        let Some(name) = path.file_name() else {
            return Ok(());
        };
        let name = name.to_string_lossy();
        let Some(clean) = clean_name(&name) else {
            tracing::debug!("{} is already clean", path.display());
            return Ok(());
        };
        let target = path.with_file_name(&clean);
        let exists = fs_err::symlink_metadata(&target).is_ok();

        if self.ctx.config.dry_run {
            if exists {
                dry!("would overwrite {}", target.display());
            }
            dry!("would rename {} to {}", path.display(), target.display());
            return Ok(());
        }

        if is_degenerate(&clean)
            && !self
                .ctx
                .allows(&format!("Rename {} to the bare name {clean}?", path.display()))
        {
            tracing::warn!("skipped {}", path.display());
            return Ok(());
        }
        if exists
            && !self
                .ctx
                .allows(&format!("{} already exists. Overwrite it?", target.display()))
        {
            tracing::warn!("skipped {}, {} already exists", path.display(), target.display());
            return Ok(());
        }

        fs_err::rename(path, &target)?;
        tracing::info!("renamed {} to {}", path.display(), target.display());
        Ok(())
    }
}

pub fn execute(args: &Args, ctx: &Context) -> anyhow::Result<()> {
    let mut cleaner = Cleaner {
        args,
        ctx,
        failures: 0,
    };
    for path in &args.paths {
        cleaner.visit(path, 0);
    }

    match cleaner.failures {
        0 => Ok(()),
        1 => bail!("1 path could not be cleaned"),
        n => bail!("{n} paths could not be cleaned"),
    }
}
