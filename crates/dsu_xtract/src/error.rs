//! Error types for the dsu_xtract crate

use std::path::PathBuf;
use std::process::ExitStatus;

/// Result type for extraction and listing operations
pub type Result<T> = std::result::Result<T, XtractError>;

/// Why a source archive was rejected
#[derive(Debug, thiserror::Error)]
pub enum SourceProblem {
    /// Nothing exists at the given path
    #[error("no such file")]
    Missing,

    /// The file exists but cannot be opened for reading
    #[error("not readable: {0}")]
    Unreadable(#[source] std::io::Error),

    /// The path points at a directory, socket, or similar
    #[error("not a regular file")]
    NotAFile,

    /// No registered extension matches the file name
    #[error("unsupported archive type")]
    UnsupportedFormat,
}

/// Error type for extraction and listing operations
#[derive(Debug, thiserror::Error)]
pub enum XtractError {
    /// The archive is missing, unreadable, or of an unknown type
    #[error("invalid source {}: {problem}", .path.display())]
    InvalidSource {
        path: PathBuf,
        #[source]
        problem: SourceProblem,
    },

    /// The destination is not a directory, could not be created, or its creation was declined
    #[error("invalid destination {}: {reason}", .path.display())]
    InvalidDestination { path: PathBuf, reason: String },

    /// The destination exists but cannot be written to
    #[error("permission denied: {} is not writable", .path.display())]
    PermissionDenied { path: PathBuf },

    /// The external tool needed for this format is not installed
    #[error("required tool `{tool}` was not found on PATH")]
    DelegateMissing { tool: String },

    /// The external tool ran but reported failure
    #[error("`{tool}` failed ({status}){}", format_stderr(.stderr))]
    DelegateFailed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The staging directory could not be created or removed
    #[error("staging directory error{}: {source}", format_path(.path))]
    StagingFailed {
        path: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while moving extracted content into place
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn format_stderr(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

fn format_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" at {}", p.display()))
        .unwrap_or_default()
}

impl XtractError {
    /// Create a new invalid source error
    pub fn invalid_source(path: impl Into<PathBuf>, problem: SourceProblem) -> Self {
        Self::InvalidSource {
            path: path.into(),
            problem,
        }
    }

    /// Create a new invalid destination error
    pub fn invalid_destination(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidDestination {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new delegate missing error
    pub fn delegate_missing(tool: impl Into<String>) -> Self {
        Self::DelegateMissing { tool: tool.into() }
    }

    /// Create a new delegate failure error
    pub fn delegate_failed(
        tool: impl Into<String>,
        status: ExitStatus,
        stderr: impl Into<String>,
    ) -> Self {
        Self::DelegateFailed {
            tool: tool.into(),
            status,
            stderr: stderr.into(),
        }
    }

    /// Create a new staging error
    pub fn staging(path: Option<PathBuf>, source: std::io::Error) -> Self {
        Self::StagingFailed { path, source }
    }

    /// Whether the error was caused by an unknown archive extension
    pub fn is_unsupported_format(&self) -> bool {
        matches!(
            self,
            Self::InvalidSource {
                problem: SourceProblem::UnsupportedFormat,
                ..
            }
        )
    }
}
