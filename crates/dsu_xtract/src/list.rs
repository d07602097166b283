//! Listing an archive's contents through its delegate

use std::io::Write;

use crate::{
    delegate::Delegate,
    error::{Result, XtractError},
    validate::ValidatedRequest,
};

/// Write the delegate's native listing of the archive to `out`, unmodified.
///
/// Nothing is staged and the filesystem is never touched, so dry runs list too.
pub fn list(
    validated: &ValidatedRequest,
    delegate: &dyn Delegate,
    out: &mut dyn Write,
) -> Result<()> {
    if !delegate.is_available() {
        return Err(XtractError::delegate_missing(delegate.tool()));
    }

    let listing = delegate.list(validated.request().source())?;
    out.write_all(&listing)?;
    out.flush()?;
    Ok(())
}
