//! Error types for docmill
//!
//! This module provides the error taxonomy for the library:
//! - Validation errors (parameters rejected before any resource is touched)
//! - Output errors (destination and flush failures)
//! - Execution errors (a per-source transformation failed, with the failing
//!   source identified)
//! - Cancellation (a distinct control outcome, not a bug report)

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for docmill operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for docmill
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Task parameters were rejected before execution started
    #[error("invalid parameters: {reason}")]
    InvalidParameters {
        /// Human-readable description of the rejected parameter
        reason: String,
    },

    /// Output materialization failed (destination or flush problem)
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// A per-source transformation failed
    #[error("execution failed for source '{source_name}': {cause}")]
    Execution {
        /// Display name of the source that failed
        source_name: String,
        /// The underlying failure
        #[source]
        cause: Box<Error>,
    },

    /// The task was cancelled via its cancellation token
    ///
    /// Distinct from a failure: the caller asked the run to stop and it did.
    #[error("task cancelled")]
    Cancelled,

    /// I/O error from an external collaborator
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True when this error (or the root of an [`Error::Execution`] chain)
    /// is a cancellation signal rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Error::Cancelled => true,
            Error::Execution { cause, .. } => cause.is_cancelled(),
            _ => false,
        }
    }
}

/// Output materialization errors (destination checks, copy, archive)
#[derive(Debug, Error)]
pub enum OutputError {
    /// Flush was reached without a configured destination
    #[error("destination for the output writer has not been set")]
    DestinationNotSet,

    /// A file destination requires exactly one accumulated output
    #[error("wrong number of outputs {count}, must be 1 to copy to the file destination {path}")]
    SingleOutputExpected {
        /// Number of outputs that were accumulated
        count: usize,
        /// The file destination that was requested
        path: PathBuf,
    },

    /// The file destination exists but is not a regular file
    #[error("wrong output destination {path}, must be a file")]
    NotAFile {
        /// The offending target path
        path: PathBuf,
    },

    /// The directory destination exists but is not a directory
    #[error("wrong output destination {path}, must be a directory")]
    NotADirectory {
        /// The offending target path
        path: PathBuf,
    },

    /// The destination directory tree could not be created
    #[error("unable to create destination directory tree {path}: {reason}")]
    CreateDirectory {
        /// The directory that could not be created
        path: PathBuf,
        /// The reason creation failed
        reason: String,
    },

    /// An accumulated output has a blank generated name
    #[error("unable to copy {temp}, no output name specified")]
    MissingName {
        /// The temp file whose entry is missing a name
        temp: PathBuf,
    },

    /// A generated name would escape the destination
    #[error("unsafe output name '{name}'")]
    UnsafeName {
        /// The offending generated name
        name: String,
    },

    /// Two accumulated outputs carry the same generated name in one archive
    #[error("duplicate archive entry name '{name}'")]
    DuplicateEntryName {
        /// The colliding generated name
        name: String,
    },

    /// The target exists and overwrite is disabled
    #[error("output {path} already exists and overwrite is disabled")]
    AlreadyExists {
        /// The existing target that was not overwritten
        path: PathBuf,
    },

    /// Copying a temp file to its target failed
    #[error("unable to copy {from} to {to}: {reason}")]
    Copy {
        /// The temp file being copied
        from: PathBuf,
        /// The target it was being copied to
        to: PathBuf,
        /// The reason the copy failed
        reason: String,
    },

    /// Writing an entry to the output archive failed
    #[error("unable to write archive entry '{name}': {reason}")]
    Archive {
        /// The archive entry name
        name: String,
        /// The reason the write failed
        reason: String,
    },

    /// Delivering the finished archive to the stream sink failed
    #[error("unable to write to the output stream: {reason}")]
    Stream {
        /// The reason the stream write failed
        reason: String,
    },

    /// A temporary output buffer could not be created
    #[error("unable to create temporary buffer: {reason}")]
    TempBuffer {
        /// The reason buffer creation failed
        reason: String,
    },
}
