//! Source and destination checks that run before any delegate is touched

use std::io::ErrorKind;
use std::path::Path;

use crate::{
    error::{Result, SourceProblem, XtractError},
    format::ArchiveFormat,
    request::{Confirm, ExtractionRequest, ForcePolicy, Mode},
};

/// A request whose source has been recognized and whose destination is usable
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    request: ExtractionRequest,
    format: &'static ArchiveFormat,
}

impl ValidatedRequest {
    pub fn request(&self) -> &ExtractionRequest {
        &self.request
    }

    pub fn format(&self) -> &'static ArchiveFormat {
        self.format
    }

    /// Name for the wrapping directory when the archive's content is flat
    pub fn base_name(&self) -> String {
        self.request
            .source
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(ArchiveFormat::base_name)
            .unwrap_or("archive")
            .to_string()
    }
}

/// Check `request` and, when extracting, make sure its destination exists.
///
/// Listing requests only have their source checked. The destination may be created
/// here, subject to the force policy; dry runs only report that they would.
pub fn validate(request: ExtractionRequest, confirm: &dyn Confirm) -> Result<ValidatedRequest> {
    let format = validate_source(&request.source)?;
    tracing::debug!(
        "{} recognized as .{} ({})",
        request.source.display(),
        format.extension(),
        format.tool()
    );

    if request.mode == Mode::Extract {
        validate_destination(&request, confirm)?;
    }

    Ok(ValidatedRequest { request, format })
}

fn validate_source(path: &Path) -> Result<&'static ArchiveFormat> {
    let invalid = |problem| XtractError::invalid_source(path, problem);

    let metadata = fs_err::metadata(path).map_err(|err| match err.kind() {
        ErrorKind::NotFound => invalid(SourceProblem::Missing),
        _ => invalid(SourceProblem::Unreadable(err)),
    })?;
    if !metadata.is_file() {
        return Err(invalid(SourceProblem::NotAFile));
    }

    fs_err::File::open(path).map_err(|err| invalid(SourceProblem::Unreadable(err)))?;

    ArchiveFormat::detect_from_path(path).ok_or_else(|| invalid(SourceProblem::UnsupportedFormat))
}

fn validate_destination(request: &ExtractionRequest, confirm: &dyn Confirm) -> Result<()> {
    let destination = &request.destination;
    match fs_err::metadata(destination) {
        Ok(metadata) if !metadata.is_dir() => Err(XtractError::invalid_destination(
            destination,
            "not a directory",
        )),
        Ok(_) if !is_writable(destination) => Err(XtractError::PermissionDenied {
            path: destination.clone(),
        }),
        Ok(_) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => create_destination(request, confirm),
        Err(err) => Err(XtractError::invalid_destination(destination, err.to_string())),
    }
}

fn create_destination(request: &ExtractionRequest, confirm: &dyn Confirm) -> Result<()> {
    let destination = &request.destination;

    if request.dry_run {
        dry!("would create directory {}", destination.display());
        return Ok(());
    }

    if request.force == ForcePolicy::No {
        return Err(XtractError::invalid_destination(
            destination,
            "does not exist and directory creation is disabled",
        ));
    }

    let question = format!(
        "Destination {} does not exist. Create it?",
        destination.display()
    );
    if !request.force.allows(confirm, &question) {
        return Err(XtractError::invalid_destination(
            destination,
            "directory creation declined",
        ));
    }

    fs_err::create_dir_all(destination).map_err(|err| match err.kind() {
        ErrorKind::PermissionDenied => XtractError::PermissionDenied {
            path: destination.clone(),
        },
        _ => XtractError::invalid_destination(destination, err.to_string()),
    })?;
    tracing::info!("created directory {}", destination.display());
    Ok(())
}

#[cfg(unix)]
pub(crate) fn is_writable(path: &Path) -> bool {
    use std::os::unix::ffi::OsStrExt;

    let Ok(c_path) = std::ffi::CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: `c_path` is a valid NUL-terminated string that outlives the call
    unsafe { libc::access(c_path.as_ptr(), libc::W_OK) == 0 }
}

#[cfg(not(unix))]
pub(crate) fn is_writable(path: &Path) -> bool {
    fs_err::metadata(path)
        .map(|metadata| !metadata.permissions().readonly())
        .unwrap_or(false)
}
