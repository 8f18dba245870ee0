//! Temporary output buffers
//!
//! A task writes each result to a temp buffer first; the buffer is owned by
//! the [`MultipleOutputWriter`](crate::output::MultipleOutputWriter) once
//! registered and deleted at flush time.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{OutputError, Result};

const BUFFER_PREFIX: &str = "docmill-";
const BUFFER_SUFFIX: &str = ".tmp";

/// Create a uniquely named temp file in the system temp directory
pub fn create_temporary_buffer() -> Result<PathBuf> {
    create_temporary_buffer_in(&std::env::temp_dir())
}

/// Create a uniquely named temp file in the given directory
///
/// The file persists until the writer deletes it at flush time.
pub fn create_temporary_buffer_in(dir: &Path) -> Result<PathBuf> {
    let temp = tempfile::Builder::new()
        .prefix(BUFFER_PREFIX)
        .suffix(BUFFER_SUFFIX)
        .tempfile_in(dir)
        .map_err(|e| OutputError::TempBuffer {
            reason: e.to_string(),
        })?;
    let (_, path) = temp.keep().map_err(|e| OutputError::TempBuffer {
        reason: e.to_string(),
    })?;
    debug!(path = %path.display(), "created temporary buffer");
    Ok(path)
}
