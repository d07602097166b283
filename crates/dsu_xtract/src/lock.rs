//! Advisory lock serializing extractions into the same destination

use std::fs::File;
use std::path::Path;

use fs4::fs_std::FileExt;

use crate::error::{Result, XtractError};

/// Exclusive lock on a destination directory, held until dropped.
///
/// The lock is taken on the directory itself, so nothing is written into it. Only
/// other `xtract` processes honour it.
#[derive(Debug)]
pub struct DestinationLock {
    file: Option<File>,
}

impl DestinationLock {
    /// Block until the destination is free
    pub fn acquire(destination: &Path) -> Result<Self> {
        let file = match File::open(destination) {
            Ok(file) => file,
            Err(err) => {
                // Some platforms cannot open directories; extraction proceeds unlocked
                tracing::debug!("not locking {}: {err}", destination.display());
                return Ok(Self { file: None });
            }
        };

        match file.try_lock_exclusive() {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(
                    "waiting for another extraction into {}",
                    destination.display()
                );
                FileExt::lock_exclusive(&file).map_err(|err| {
                    XtractError::invalid_destination(destination, format!("cannot lock: {err}"))
                })?;
            }
            Err(err) => {
                tracing::debug!("not locking {}: {err}", destination.display());
                return Ok(Self { file: None });
            }
        }

        Ok(Self { file: Some(file) })
    }

    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }
}

impl Drop for DestinationLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = FileExt::unlock(&file);
        }
    }
}
