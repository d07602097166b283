//! Private staging directories and the registry that removes them on interrupt

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tempfile::TempDir;

use crate::error::{Result, XtractError};

/// Prefix of every staging directory, so stray ones are easy to recognize
pub const STAGING_PREFIX: &str = ".xtract-";

/// How often a staging directory removal is attempted while a delegate may still be exiting
const PURGE_ATTEMPTS: usize = 5;

/// Staging directories and delegate processes that must not outlive the process.
///
/// The front end keeps a clone and calls [`CleanupRegistry::purge`] when it is
/// interrupted or terminated; normal exits clean up through [`StagingArea`]'s drop.
#[derive(Debug, Clone, Default)]
pub struct CleanupRegistry {
    paths: Arc<Mutex<Vec<PathBuf>>>,
    children: Arc<Mutex<Vec<u32>>>,
}

impl CleanupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&self, path: &Path) {
        self.paths.lock().push(path.to_path_buf());
    }

    fn unregister(&self, path: &Path) {
        self.paths.lock().retain(|p| p != path);
    }

    /// Track a running delegate so a purge can stop it before removing its output
    pub(crate) fn register_child(&self, pid: u32) {
        self.children.lock().push(pid);
    }

    /// Forget a delegate as soon as it has exited
    pub(crate) fn unregister_child(&self, pid: u32) {
        self.children.lock().retain(|p| *p != pid);
    }

    /// Stop every registered delegate, then remove every registered directory.
    ///
    /// Returns how many directories were registered.
    pub fn purge(&self) -> usize {
        let children = std::mem::take(&mut *self.children.lock());
        for pid in children {
            terminate(pid);
        }

        let paths = std::mem::take(&mut *self.paths.lock());
        for path in &paths {
            remove_staging(path);
        }
        paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.lock().is_empty() && self.children.lock().is_empty()
    }
}

#[cfg(unix)]
fn terminate(pid: u32) {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return;
    };
    // SAFETY: kill has no memory-safety preconditions
    if unsafe { libc::kill(pid, libc::SIGTERM) } == 0 {
        tracing::debug!("stopped delegate process {pid}");
    }
}

#[cfg(not(unix))]
fn terminate(pid: u32) {
    tracing::debug!("leaving delegate process {pid} to exit on its own");
}

/// A delegate that was just signalled may still be writing, so removal is retried
fn remove_staging(path: &Path) {
    for attempt in 1..=PURGE_ATTEMPTS {
        match fs_err::remove_dir_all(path) {
            Ok(()) => {
                tracing::debug!("removed staging directory {}", path.display());
                return;
            }
            Err(err) if err.kind() == ErrorKind::NotFound => return,
            Err(err) if attempt < PURGE_ATTEMPTS => {
                tracing::debug!("retrying removal of {}: {err}", path.display());
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(err) => tracing::warn!("could not remove staging directory: {err}"),
        }
    }
}

/// A top-level entry found in a staging directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEntry {
    pub name: OsString,
    pub path: PathBuf,
    pub is_dir: bool,
}

/// An exclusively owned temporary directory for one extraction
#[derive(Debug)]
pub struct StagingArea {
    dir: Option<TempDir>,
    registry: Option<CleanupRegistry>,
}

impl StagingArea {
    /// Create a fresh hidden directory inside `parent`.
    ///
    /// Staging next to the destination keeps the final moves on one filesystem.
    pub fn create_in(parent: &Path, registry: Option<&CleanupRegistry>) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(parent)
            .map_err(|err| XtractError::staging(Some(parent.to_path_buf()), err))?;

        if let Some(registry) = registry {
            registry.register(dir.path());
        }
        tracing::debug!("staging in {}", dir.path().display());

        Ok(Self {
            dir: Some(dir),
            registry: registry.cloned(),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir
            .as_ref()
            .map(TempDir::path)
            .unwrap_or_else(|| Path::new(""))
    }

    /// The immediate children of the staging directory, sorted by name
    pub fn entries(&self) -> Result<Vec<StagedEntry>> {
        let mut entries = Vec::new();
        for entry in fs_err::read_dir(self.path())? {
            let entry = entry?;
            entries.push(StagedEntry {
                name: entry.file_name(),
                path: entry.path(),
                is_dir: entry.file_type()?.is_dir(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    /// Remove the directory now, reporting failure instead of swallowing it
    pub fn close(mut self) -> Result<()> {
        match self.dir.take() {
            Some(dir) => {
                self.forget(dir.path());
                let path = dir.path().to_path_buf();
                dir.close()
                    .map_err(|err| XtractError::staging(Some(path), err))
            }
            None => Ok(()),
        }
    }

    fn forget(&self, path: &Path) {
        if let Some(registry) = &self.registry {
            registry.unregister(path);
        }
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            self.forget(dir.path());
            let path = dir.path().to_path_buf();
            match dir.close() {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => tracing::warn!(
                    "could not remove staging directory {}: {err}",
                    path.display()
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_is_removed_on_drop() {
        let parent = tempfile::tempdir().unwrap();
        let registry = CleanupRegistry::new();
        let path = {
            let staging = StagingArea::create_in(parent.path(), Some(&registry)).unwrap();
            assert!(staging.path().is_dir());
            assert!(!registry.is_empty());
            staging.path().to_path_buf()
        };
        assert!(!path.exists());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_close_removes_and_unregisters() {
        let parent = tempfile::tempdir().unwrap();
        let registry = CleanupRegistry::new();
        let staging = StagingArea::create_in(parent.path(), Some(&registry)).unwrap();
        let path = staging.path().to_path_buf();
        fs_err::write(path.join("file"), b"data").unwrap();

        staging.close().unwrap();
        assert!(!path.exists());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_purge_removes_live_staging() {
        let parent = tempfile::tempdir().unwrap();
        let registry = CleanupRegistry::new();
        let staging = StagingArea::create_in(parent.path(), Some(&registry)).unwrap();
        let path = staging.path().to_path_buf();

        assert_eq!(registry.purge(), 1);
        assert!(!path.exists());

        // The later drop must tolerate the directory being gone already
        drop(staging);
    }

    #[cfg(unix)]
    #[test]
    fn test_purge_stops_registered_delegates() {
        let parent = tempfile::tempdir().unwrap();
        let registry = CleanupRegistry::new();
        let staging = StagingArea::create_in(parent.path(), Some(&registry)).unwrap();
        let path = staging.path().to_path_buf();

        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        registry.register_child(child.id());

        assert_eq!(registry.purge(), 1);
        assert!(!child.wait().unwrap().success());
        assert!(!path.exists());
        assert!(registry.is_empty());
        drop(staging);
    }

    #[test]
    fn test_entries_distinguish_directories() {
        let parent = tempfile::tempdir().unwrap();
        let staging = StagingArea::create_in(parent.path(), None).unwrap();
        fs_err::create_dir(staging.path().join("b")).unwrap();
        fs_err::write(staging.path().join("a.txt"), b"a").unwrap();
        fs_err::write(staging.path().join(".hidden"), b"h").unwrap();

        let entries = staging.entries().unwrap();
        let summary: Vec<_> = entries
            .iter()
            .map(|e| (e.name.to_string_lossy().into_owned(), e.is_dir))
            .collect();
        assert_eq!(
            summary,
            [
                (".hidden".to_string(), false),
                ("a.txt".to_string(), false),
                ("b".to_string(), true)
            ]
        );
    }

    #[test]
    fn test_staging_dir_is_hidden() {
        let parent = tempfile::tempdir().unwrap();
        let staging = StagingArea::create_in(parent.path(), None).unwrap();
        let name = staging.path().file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(STAGING_PREFIX));
    }
}
