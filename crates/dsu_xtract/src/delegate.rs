//! Adapters around the external tools that do the actual decoding

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use crate::{
    error::{Result, XtractError},
    format::ArchiveFormat,
    staging::CleanupRegistry,
};

/// One external decoder, seen from the orchestrator.
///
/// The argument shape of each tool family lives entirely behind this trait.
pub trait Delegate {
    /// Name of the tool, used in messages
    fn tool(&self) -> &str;

    /// Whether the tool can be run at all
    fn is_available(&self) -> bool;

    /// Run the tool's list command and return its stdout untouched
    fn list(&self, archive: &Path) -> Result<Vec<u8>>;

    /// Unpack `archive` into the (empty) directory `staging`
    fn extract_to(&self, archive: &Path, staging: &Path) -> Result<()>;
}

/// A [`Delegate`] that spawns the system binary registered for a format
#[derive(Debug, Clone)]
pub struct SystemDelegate {
    format: &'static ArchiveFormat,
    program: Option<PathBuf>,
    cleanup: Option<CleanupRegistry>,
}

impl SystemDelegate {
    /// Resolve the format's tool on `PATH`
    pub fn new(format: &'static ArchiveFormat) -> Self {
        let program = format
            .family()
            .candidates()
            .iter()
            .find_map(|name| which::which(name).ok());
        if let Some(program) = &program {
            tracing::debug!("using {} for .{}", program.display(), format.extension());
        }
        Self {
            format,
            program,
            cleanup: None,
        }
    }

    /// Use an explicit binary instead of searching `PATH`
    pub fn with_program(format: &'static ArchiveFormat, program: impl Into<PathBuf>) -> Self {
        Self {
            format,
            program: Some(program.into()),
            cleanup: None,
        }
    }

    /// Register running tools so an interrupt handler can stop them
    pub fn with_cleanup_registry(mut self, registry: CleanupRegistry) -> Self {
        self.cleanup = Some(registry);
        self
    }

    pub fn program(&self) -> Option<&Path> {
        self.program.as_deref()
    }

    fn run(&self, args: Vec<OsString>, capture_stdout: bool) -> Result<Output> {
        let program = self
            .program
            .as_ref()
            .ok_or_else(|| XtractError::delegate_missing(self.tool()))?;

        tracing::debug!(
            "running {} {}",
            program.display(),
            args.iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(if capture_stdout {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => XtractError::delegate_missing(self.tool()),
                _ => XtractError::Io(err),
            })?;

        let pid = child.id();
        if let Some(cleanup) = &self.cleanup {
            cleanup.register_child(pid);
        }
        let output = child.wait_with_output();
        if let Some(cleanup) = &self.cleanup {
            cleanup.unregister_child(pid);
        }
        let output = output?;

        if !output.status.success() {
            return Err(XtractError::delegate_failed(
                self.tool(),
                output.status,
                String::from_utf8_lossy(&output.stderr),
            ));
        }
        Ok(output)
    }
}

impl Delegate for SystemDelegate {
    fn tool(&self) -> &str {
        self.format.tool()
    }

    fn is_available(&self) -> bool {
        self.program.is_some()
    }

    fn list(&self, archive: &Path) -> Result<Vec<u8>> {
        let output = self.run(self.format.list_args(archive), true)?;
        Ok(output.stdout)
    }

    fn extract_to(&self, archive: &Path, staging: &Path) -> Result<()> {
        self.run(self.format.extract_args(archive, staging), false)?;
        Ok(())
    }
}
