//! Accumulation of task outputs and the one-shot flush
//!
//! A task produces its results progressively as temp files, registering each
//! one with a generated name:
//!
//! ```no_run
//! use docmill::output::{file, Destination, MultipleOutputWriter};
//!
//! # fn main() -> docmill::Result<()> {
//! let mut writer = MultipleOutputWriter::new();
//! writer.add_output(file("/tmp/docmill-1234.tmp").name("report_1.pdf"));
//!
//! let destination = Destination::directory("/data/out");
//! writer.flush_outputs(Some(&destination))?;
//! # Ok(())
//! # }
//! ```
//!
//! Flush is a commit operation: called at most once per invocation, after all
//! sources are processed, never interleaved with [`MultipleOutputWriter::add_output`].

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Result;
use crate::output::destination::Destination;
use crate::output::transfer;

/// One accumulated task output: an owned temp file plus its generated name
///
/// The writer exclusively owns the temp file until flush; flush transfers the
/// bytes to the destination and deletes the temp file regardless of per-file
/// outcome.
#[derive(Clone, Debug)]
pub struct PopulatedFileOutput {
    temp: PathBuf,
    name: String,
}

impl PopulatedFileOutput {
    /// The temp file holding the output bytes
    pub fn temp_path(&self) -> &Path {
        &self.temp
    }

    /// The generated output name
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Start building a [`PopulatedFileOutput`] from its temp file
pub fn file(temp: impl Into<PathBuf>) -> FileOutputBuilder {
    FileOutputBuilder { temp: temp.into() }
}

/// Intermediate builder produced by [`file`]
#[derive(Debug)]
pub struct FileOutputBuilder {
    temp: PathBuf,
}

impl FileOutputBuilder {
    /// Attach the generated name, completing the output
    pub fn name(self, name: impl Into<String>) -> PopulatedFileOutput {
        PopulatedFileOutput {
            temp: self.temp,
            name: name.into(),
        }
    }
}

/// Ordered collection of outputs produced by one task run
///
/// Owned by the task for the duration of `execute`; emptied and its temp
/// files deleted once flush completes, success or failure.
#[derive(Debug, Default)]
pub struct MultipleOutputWriter {
    outputs: Vec<PopulatedFileOutput>,
}

impl MultipleOutputWriter {
    /// Empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an output; no other side effect
    pub fn add_output(&mut self, output: PopulatedFileOutput) {
        debug!(temp = %output.temp_path().display(), name = %output.name(), "output registered");
        self.outputs.push(output);
    }

    /// Number of accumulated outputs
    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    /// True when no output has been accumulated
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Materialize every accumulated output into the destination
    ///
    /// The collection is emptied and every temp file deleted no matter the
    /// outcome; an unset destination fails with
    /// [`OutputError::DestinationNotSet`](crate::error::OutputError::DestinationNotSet).
    pub fn flush_outputs(&mut self, destination: Option<&Destination>) -> Result<()> {
        let entries = std::mem::take(&mut self.outputs);
        transfer::execute_copy_and_delete(entries, destination)
    }
}
