//! Input resolution against the configured search paths.

use std::path::{Path, PathBuf};

use crate::error::DriverError;

/// Find the first existing file among `candidates`.
///
/// Each candidate is tried as given (relative to the working directory),
/// then under every search path in order. Absolute candidates are only
/// tried as given.
pub(crate) fn resolve(
    identifier: &str,
    candidates: &[PathBuf],
    search_paths: &[PathBuf],
) -> Result<PathBuf, DriverError> {
    for candidate in candidates {
        if candidate.is_file() {
            return Ok(candidate.clone());
        }
        if candidate.is_absolute() {
            continue;
        }
        for base in search_paths {
            let path = base.join(candidate);
            if path.is_file() {
                return Ok(path);
            }
        }
    }
    tracing::debug!(identifier = %identifier, tried = candidates.len(), "Input not resolved");
    Err(DriverError::NotFound {
        identifier: identifier.to_owned(),
    })
}

/// Read a resolved input fully.
pub(crate) fn read_source(path: &Path) -> Result<String, DriverError> {
    std::fs::read_to_string(path).map_err(|e| DriverError::io(path, e))
}

/// File stem of `path` as a string, if it has one.
pub(crate) fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_owned)
}
