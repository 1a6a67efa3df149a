//! Output stage: stdout rendering or atomic in-place rewrite.

use std::path::PathBuf;

use crate::error::VpnRoutesError;
use crate::fs_abstraction::FileSystem;

/// Where the merged document goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Hand the rendered document back for printing to standard output.
    Stdout,
    /// Rewrite the source file in place.
    InPlace(PathBuf),
}

/// Emit the rendered document.
///
/// Stdout mode returns the text untouched; in-place mode writes it
/// atomically and returns nothing. In-place mode refuses an empty
/// rendering.
pub fn emit(
    fs: &dyn FileSystem,
    mode: &OutputMode,
    rendered: String,
) -> Result<Option<String>, VpnRoutesError> {
    match mode {
        OutputMode::Stdout => Ok(Some(rendered)),
        OutputMode::InPlace(path) => {
            if rendered.is_empty() {
                return Err(VpnRoutesError::EmptyOutput { path: path.clone() });
            }
            fs.write_atomic(path, rendered.as_bytes())
                .map_err(|source| VpnRoutesError::Io {
                    path: path.clone(),
                    source,
                })?;
            Ok(None)
        }
    }
}
