//! Main extractor implementation

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{
    delegate::Delegate,
    error::{Result, XtractError},
    lock::DestinationLock,
    progress::{NoProgressReporter, ProgressReporter},
    request::{Confirm, ForcePolicy},
    staging::{CleanupRegistry, StagedEntry, StagingArea},
    validate::ValidatedRequest,
};

/// Builder for configuring archive extraction
pub struct ExtractorBuilder<P: ProgressReporter = NoProgressReporter> {
    progress_reporter: P,
    cleanup: Option<CleanupRegistry>,
    lock_destination: bool,
}

impl ExtractorBuilder<NoProgressReporter> {
    /// Create a new extractor builder
    pub fn new() -> Self {
        Self {
            progress_reporter: NoProgressReporter,
            cleanup: None,
            lock_destination: true,
        }
    }
}

impl<P: ProgressReporter> ExtractorBuilder<P> {
    /// Register staging directories so an interrupt handler can remove them
    pub fn with_cleanup_registry(mut self, registry: CleanupRegistry) -> Self {
        self.cleanup = Some(registry);
        self
    }

    /// Whether to hold an exclusive lock on the destination while moving content in
    pub fn with_destination_lock(mut self, lock: bool) -> Self {
        self.lock_destination = lock;
        self
    }

    /// Set a custom progress reporter
    pub fn with_progress_reporter<R: ProgressReporter>(self, reporter: R) -> ExtractorBuilder<R> {
        ExtractorBuilder {
            progress_reporter: reporter,
            cleanup: self.cleanup,
            lock_destination: self.lock_destination,
        }
    }

    /// Build the extractor
    pub fn build(self) -> Extractor<P> {
        Extractor {
            progress_reporter: self.progress_reporter,
            cleanup: self.cleanup,
            lock_destination: self.lock_destination,
        }
    }
}

impl Default for ExtractorBuilder<NoProgressReporter> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "progress")]
impl ExtractorBuilder<NoProgressReporter> {
    /// Show an indicatif spinner while the delegate runs
    pub fn with_spinner(self) -> ExtractorBuilder<crate::progress::IndicatifProgressReporter> {
        self.with_progress_reporter(
            crate::progress::IndicatifProgressReporter::with_default_style(),
        )
    }
}

/// Where the staged content ended up relative to the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// The archive had at most one top-level directory; content went straight into the destination
    Direct,
    /// The archive had several top-level directories; content went into `<destination>/<base name>`
    Wrapped,
}

impl Layout {
    /// Only directories are counted: loose top-level files never cause wrapping
    pub fn decide(entries: &[StagedEntry]) -> Self {
        if entries.iter().filter(|entry| entry.is_dir).count() > 1 {
            Self::Wrapped
        } else {
            Self::Direct
        }
    }
}

/// Outcome of a successful extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// The directory the archive's top-level entries now live in
    pub destination: PathBuf,
    /// `None` for dry runs, where nothing was unpacked
    pub layout: Option<Layout>,
    /// Number of top-level entries moved
    pub entries: usize,
}

/// Archive extractor
pub struct Extractor<P: ProgressReporter = NoProgressReporter> {
    progress_reporter: P,
    cleanup: Option<CleanupRegistry>,
    lock_destination: bool,
}

impl<P: ProgressReporter> Extractor<P> {
    /// The registry staging directories and running tools are recorded in, if any
    pub fn cleanup_registry(&self) -> Option<&CleanupRegistry> {
        self.cleanup.as_ref()
    }

    /// Unpack the validated archive through `delegate` into its destination.
    ///
    /// Content is staged in a private directory inside the destination, the layout
    /// is decided from the staged top-level entries, and the entries are then renamed
    /// into place. The staging directory is gone when this returns, whatever the outcome.
    pub fn extract(
        &self,
        validated: &ValidatedRequest,
        delegate: &dyn Delegate,
        confirm: &dyn Confirm,
    ) -> Result<ExtractionResult> {
        let request = validated.request();
        let archive = request.source();
        let destination = request.destination();

        if !delegate.is_available() {
            return Err(XtractError::delegate_missing(delegate.tool()));
        }

        if request.dry_run {
            return Ok(self.simulate(validated, delegate));
        }

        let _lock = if self.lock_destination {
            Some(DestinationLock::acquire(destination)?)
        } else {
            None
        };

        let staging = StagingArea::create_in(destination, self.cleanup.as_ref())?;

        self.progress_reporter
            .on_start(&format!("extracting {}", archive.display()));
        let outcome = delegate.extract_to(archive, staging.path());
        self.progress_reporter.on_finish(&match &outcome {
            Ok(()) => format!("unpacked {}", archive.display()),
            Err(_) => format!("failed to unpack {}", archive.display()),
        });
        outcome?;

        let entries = staging.entries()?;
        if entries.is_empty() {
            tracing::warn!("{} contained nothing to extract", archive.display());
        }

        let layout = Layout::decide(&entries);
        let target = match layout {
            Layout::Direct => destination.to_path_buf(),
            Layout::Wrapped => destination.join(validated.base_name()),
        };
        tracing::debug!("layout {layout:?}, {} top-level entries", entries.len());

        let moves: Vec<(PathBuf, PathBuf)> = entries
            .iter()
            .map(|entry| (entry.path.clone(), target.join(&entry.name)))
            .collect();

        match layout {
            Layout::Direct => {
                let targets: Vec<&Path> = moves.iter().map(|(_, to)| to.as_path()).collect();
                clear_conflicts(&targets, request.force, confirm)?;
            }
            Layout::Wrapped => {
                clear_conflicts(&[target.as_path()], request.force, confirm)?;
                fs_err::create_dir(&target)?;
            }
        }

        for (from, to) in &moves {
            fs_err::rename(from, to)?;
        }

        if let Err(err) = staging.close() {
            tracing::warn!("{err}");
        }

        tracing::info!("extracted {} into {}", archive.display(), target.display());
        Ok(ExtractionResult {
            destination: target,
            layout: Some(layout),
            entries: moves.len(),
        })
    }

    fn simulate(&self, validated: &ValidatedRequest, delegate: &dyn Delegate) -> ExtractionResult {
        let request = validated.request();
        let destination = request.destination();

        dry!(
            "would create a staging directory {}* in {}",
            crate::staging::STAGING_PREFIX,
            destination.display()
        );
        dry!(
            "would run `{}` to unpack {}",
            delegate.tool(),
            request.source().display()
        );
        dry!(
            "would move the content into {}, or into {} if it has several top-level directories",
            destination.display(),
            destination.join(validated.base_name()).display()
        );
        dry!("would remove the staging directory");

        ExtractionResult {
            destination: destination.to_path_buf(),
            layout: None,
            entries: 0,
        }
    }
}

/// Make sure none of `targets` exist, removing them if the policy allows.
///
/// Runs before anything is moved, so a refusal leaves the destination untouched.
fn clear_conflicts(targets: &[&Path], force: ForcePolicy, confirm: &dyn Confirm) -> Result<()> {
    let existing: Vec<&Path> = targets
        .iter()
        .copied()
        .filter(|path| path.symlink_metadata().is_ok())
        .collect();
    let Some(first) = existing.first() else {
        return Ok(());
    };

    let question = match existing.len() {
        1 => format!("{} already exists. Replace it?", first.display()),
        n => format!("{n} entries already exist, e.g. {}. Replace them?", first.display()),
    };
    if !force.allows(confirm, &question) {
        return Err(XtractError::invalid_destination(
            *first,
            "already exists and would be overwritten",
        ));
    }

    for path in existing {
        tracing::info!("replacing {}", path.display());
        remove_path(path)?;
    }
    Ok(())
}

fn remove_path(path: &Path) -> Result<()> {
    let metadata = match fs_err::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err.into()),
    };
    if metadata.is_dir() {
        fs_err::remove_dir_all(path)?;
    } else {
        fs_err::remove_file(path)?;
    }
    Ok(())
}
