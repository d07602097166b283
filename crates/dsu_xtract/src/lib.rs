//! Archive extraction and listing through the system's archive tools
//!
//! This crate never decodes an archive itself. Each registered extension maps to
//! an external tool (`tar`, `7z`, `unzip` or `unrar`) together with the argument
//! conventions that tool expects, and every operation is delegated to it.
//!
//! # Features
//!
//! - Longest-suffix format detection (`.tar.gz` before `.gz`)
//! - Source and destination validation with a yes/no/ask force policy
//! - Extraction staged in a private directory that never outlives the process
//! - Layout normalization: archives with several top-level directories are
//!   wrapped in a directory named after the archive
//! - Dry runs that report every step without touching the filesystem
//!
//! # Examples
//!
//! ```no_run
//! use dsu_xtract::{ExtractionRequest, ExtractorBuilder, FixedAnswer, ForcePolicy};
//!
//! let request = ExtractionRequest::new("release.tar.gz", "out").with_force(ForcePolicy::Yes);
//! let extractor = ExtractorBuilder::new().build();
//!
//! let mut stdout = std::io::stdout();
//! dsu_xtract::run(request, &extractor, &FixedAnswer(false), &mut stdout)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Log a line describing what a dry run would have done
#[macro_export]
macro_rules! dry {
    ($($arg:tt)+) => {
        ::tracing::info!(target: "dry", $($arg)+)
    };
}

pub mod delegate;
pub mod error;
pub mod extractor;
pub mod format;
pub mod list;
pub mod lock;
pub mod progress;
pub mod request;
pub mod staging;
pub mod validate;

use std::io::Write;

pub use delegate::{Delegate, SystemDelegate};
pub use error::{Result, SourceProblem, XtractError};
pub use extractor::{ExtractionResult, Extractor, ExtractorBuilder, Layout};
pub use format::{ArchiveFormat, ToolFamily};
pub use request::{Confirm, ExtractionRequest, FixedAnswer, ForcePolicy, Mode};
pub use staging::CleanupRegistry;
pub use validate::{validate, ValidatedRequest};

#[cfg(feature = "progress")]
pub use progress::IndicatifProgressReporter;
pub use progress::ProgressReporter;

/// Check if a filename has a known archive extension
pub fn is_archive(filename: &str) -> bool {
    ArchiveFormat::lookup(filename).is_some()
}

/// Validate `request` and carry it out with the system tool for its format.
///
/// Listings are written to `out`; extractions return where the content landed.
pub fn run<P: ProgressReporter>(
    request: ExtractionRequest,
    extractor: &Extractor<P>,
    confirm: &dyn Confirm,
    out: &mut dyn Write,
) -> Result<Option<ExtractionResult>> {
    let validated = validate(request, confirm)?;
    let mut delegate = SystemDelegate::new(validated.format());
    if let Some(cleanup) = extractor.cleanup_registry() {
        delegate = delegate.with_cleanup_registry(cleanup.clone());
    }

    match validated.request().mode {
        Mode::List => {
            list::list(&validated, &delegate, out)?;
            Ok(None)
        }
        Mode::Extract => extractor.extract(&validated, &delegate, confirm).map(Some),
    }
}
