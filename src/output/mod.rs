//! Output materialization
//!
//! A task accumulates its results as (temp file, generated name) pairs in a
//! [`MultipleOutputWriter`] and flushes them once, at the end of the run, to
//! a [`Destination`]: a single file, a directory tree, or a zip archive
//! written to a byte sink. Flush deletes every temp file before it returns,
//! on the error path too.

/// Temporary output buffer creation
pub mod buffers;
/// Destination value types
pub mod destination;
/// Final copy/archive step
mod transfer;
/// Output accumulation and flush
pub mod writer;

pub use buffers::{create_temporary_buffer, create_temporary_buffer_in};
pub use destination::{Destination, StreamSink, TaskOutput};
pub use writer::{file, FileOutputBuilder, MultipleOutputWriter, PopulatedFileOutput};
