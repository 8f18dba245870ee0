//! Destination model for task outputs
//!
//! A [`Destination`] pairs a [`TaskOutput`] target with an overwrite policy
//! and is immutable for the duration of a run.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Where the accumulated outputs of a task are materialized
///
/// A closed variant: the writer branches on kind with a single exhaustive
/// `match`.
#[derive(Clone, Debug)]
pub enum TaskOutput {
    /// A single output file; requires exactly one accumulated output
    File(PathBuf),
    /// A directory receiving one file per accumulated output
    Directory(PathBuf),
    /// A writable sink receiving one zip archive with one entry per output
    Stream(StreamSink),
}

/// Shared handle to a writable byte sink used by [`TaskOutput::Stream`]
///
/// Cheap to clone; the caller keeps one handle to inspect the written bytes
/// while the run holds the destination immutably.
#[derive(Clone)]
pub struct StreamSink {
    inner: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl StreamSink {
    /// Wrap a writable sink
    pub fn new<W: Write + Send + 'static>(sink: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    /// Run `f` with exclusive access to the underlying writer
    pub(crate) fn with_writer<R>(&self, f: impl FnOnce(&mut dyn Write) -> R) -> R {
        // A poisoned lock still holds a usable writer; the panic that poisoned
        // it happened on another handle.
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(guard.as_mut())
    }
}

impl fmt::Debug for StreamSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSink").finish_non_exhaustive()
    }
}

/// The user-specified final location of a run plus its overwrite policy
#[derive(Clone, Debug)]
pub struct Destination {
    output: TaskOutput,
    overwrite: bool,
}

impl Destination {
    /// Single-file destination, `overwrite` disabled
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            output: TaskOutput::File(path.into()),
            overwrite: false,
        }
    }

    /// Directory destination, `overwrite` disabled
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            output: TaskOutput::Directory(path.into()),
            overwrite: false,
        }
    }

    /// Compressed-stream destination, `overwrite` disabled (overwrite has no
    /// effect on a stream)
    pub fn stream(sink: StreamSink) -> Self {
        Self {
            output: TaskOutput::Stream(sink),
            overwrite: false,
        }
    }

    /// Set the overwrite policy
    #[must_use]
    pub fn overwriting(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// The output target
    pub fn output(&self) -> &TaskOutput {
        &self.output
    }

    /// True when existing targets may be replaced
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.output {
            TaskOutput::File(path) => write!(f, "file {}", path.display()),
            TaskOutput::Directory(path) => write!(f, "directory {}", path.display()),
            TaskOutput::Stream(_) => write!(f, "stream"),
        }
    }
}
