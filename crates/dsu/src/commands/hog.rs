//! `dsu hog`: find what takes up space in a directory

use std::path::{Path, PathBuf};

use anyhow::{ensure, Context as _};
use humansize::{format_size, BINARY};
use walkdir::WalkDir;

#[derive(Debug, Clone, clap::Args)]
pub struct Args {
    /// The directory to inspect
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Print sizes in KiB, MiB and so on
    #[arg(short = 'H', long)]
    pub human_readable: bool,

    /// How many entries to show
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usage {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Bytes used by `path` and everything below it. Symlinks are not followed.
pub fn size_of(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!("skipping: {err}");
                None
            }
        })
        .filter_map(|entry| entry.metadata().ok())
        .filter(|metadata| !metadata.is_dir())
        .map(|metadata| metadata.len())
        .sum()
}

/// Usage of every direct child of `dir`, largest first
pub fn usage(dir: &Path) -> anyhow::Result<Vec<Usage>> {
    ensure!(dir.is_dir(), "{} is not a directory", dir.display());

    let mut usage = fs_err::read_dir(dir)?
        .map(|entry| {
            let path = entry?.path();
            let bytes = size_of(&path);
            Ok(Usage { path, bytes })
        })
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("failed to read {}", dir.display()))?;
    usage.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.path.cmp(&b.path)));
    Ok(usage)
}

fn format_bytes(bytes: u64, human_readable: bool) -> String {
    if human_readable {
        format_size(bytes, BINARY)
    } else {
        bytes.to_string()
    }
}

pub fn execute(args: &Args) -> anyhow::Result<()> {
    let usage = usage(&args.dir)?;
    let total: u64 = usage.iter().map(|u| u.bytes).sum();

    for entry in usage.iter().take(args.limit) {
        println!(
            "{:>12}  {}",
            format_bytes(entry.bytes, args.human_readable),
            entry.path.display()
        );
    }
    if usage.len() > args.limit {
        tracing::debug!("{} smaller entries not shown", usage.len() - args.limit);
    }
    println!("{:>12}  total", format_bytes(total, args.human_readable));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_is_sorted_largest_first() {
        let dir = tempfile::tempdir().unwrap();
        fs_err::write(dir.path().join("small"), vec![0u8; 10]).unwrap();
        fs_err::create_dir(dir.path().join("nested")).unwrap();
        fs_err::write(dir.path().join("nested/a"), vec![0u8; 100]).unwrap();
        fs_err::write(dir.path().join("nested/b"), vec![0u8; 50]).unwrap();
        fs_err::write(dir.path().join("empty"), b"").unwrap();

        let usage = usage(dir.path()).unwrap();
        let summary: Vec<_> = usage
            .iter()
            .map(|u| (u.path.file_name().unwrap().to_string_lossy().into_owned(), u.bytes))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("nested".to_string(), 150),
                ("small".to_string(), 10),
                ("empty".to_string(), 0),
            ]
        );
    }

    #[test]
    fn test_usage_of_a_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        fs_err::write(&file, "x").unwrap();
        assert!(usage(&file).is_err());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(2048, false), "2048");
        assert!(format_bytes(2048, true).ends_with("KiB"));
    }
}
