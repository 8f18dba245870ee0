//! # docmill
//!
//! Task-execution and output-delivery core for document processing pipelines.
//!
//! ## Design Philosophy
//!
//! docmill is designed to be:
//! - **Operation-agnostic** - Every concrete operation (rotate, repair, merge,
//!   ...) is a thin strategy plugged into one shared lifecycle
//! - **Predictable cleanup** - Temp outputs are owned by the writer and never
//!   leak, whatever the outcome of a run
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding;
//!   subscriber installation is the embedder's job
//! - **Event-driven** - Consumers subscribe to progress and outcome events,
//!   no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use docmill::{
//!     create_temporary_buffer, file, for_each_source, BatchParameters, Destination,
//!     ExecutionContext, ExecutionService, FailurePolicy, MultipleOutputWriter, NameGenerator,
//!     NameRequest, Result, Source, Task,
//! };
//!
//! /// Copies every source unchanged; a real task transforms the bytes.
//! #[derive(Default)]
//! struct PassthroughTask {
//!     writer: MultipleOutputWriter,
//! }
//!
//! impl Task<BatchParameters> for PassthroughTask {
//!     fn before(&mut self, _p: &BatchParameters, _c: &ExecutionContext) -> Result<()> {
//!         self.writer = MultipleOutputWriter::new();
//!         Ok(())
//!     }
//!
//!     fn execute(&mut self, p: &BatchParameters, c: &ExecutionContext) -> Result<()> {
//!         let generator = NameGenerator::new(&p.name_template);
//!         for_each_source(c, &p.sources, |step, source| {
//!             let buffer = create_temporary_buffer()?;
//!             std::fs::copy(source.path(), &buffer)?;
//!             let name = generator.generate(
//!                 &NameRequest::with_extension(&p.output_extension)
//!                     .original_name(source.name())
//!                     .file_number(step),
//!             );
//!             self.writer.add_output(file(buffer).name(name));
//!             Ok(())
//!         })?;
//!         self.writer.flush_outputs(p.destination.as_ref())
//!     }
//!
//!     fn after(&mut self) {}
//! }
//!
//! fn main() -> Result<()> {
//!     let mut parameters = BatchParameters::new(Destination::directory("./out"));
//!     parameters.sources.push(Source::new("./in/report.pdf"));
//!
//!     let (context, events) = ExecutionContext::new(FailurePolicy::Strict);
//!     std::thread::spawn(move || {
//!         for event in events {
//!             println!("event: {event:?}");
//!         }
//!     });
//!
//!     ExecutionService::new().execute(&mut PassthroughTask::default(), &parameters, &context)
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Task lifecycle and execution service
pub mod executor;
/// Filename templating engine
pub mod naming;
/// Output accumulation and materialization
pub mod output;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::FailurePolicy;
pub use error::{Error, OutputError, Result};
pub use executor::{
    for_each_source, BatchParameters, CancellationToken, ExecutionContext, ExecutionService, Task,
    TaskParameters,
};
pub use naming::{NameGenerator, NameRequest};
pub use output::{
    create_temporary_buffer, create_temporary_buffer_in, file, Destination, MultipleOutputWriter,
    PopulatedFileOutput, StreamSink, TaskOutput,
};
pub use types::{Event, Source};
