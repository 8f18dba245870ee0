//! Task lifecycle and execution service
//!
//! Every document-processing operation is a [`Task`] driven through a bounded
//! lifecycle by the [`ExecutionService`]: parameters are validated first,
//! `before` acquires per-run resources, `execute` performs the cancellable
//! per-source loop and flushes the outputs, and `after` always runs for
//! cleanup once `before` was invoked. Internal failures are converted into
//! reported outcomes on the notification channel and returned unchanged, so
//! the caller can tell "stopped as requested" from "failed".

/// Per-invocation execution context
pub mod context;

pub use context::{CancellationToken, ExecutionContext};

use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::output::Destination;
use crate::types::{Event, Source};

/// Parameters of one task invocation
pub trait TaskParameters {
    /// Reject invalid parameters before any task method runs
    fn validate(&self) -> Result<()>;
}

/// One document-processing operation with a before/execute/after lifecycle
///
/// The context is passed explicitly through the call chain; implementations
/// must not stash it as ambient state.
pub trait Task<P: TaskParameters> {
    /// Acquire per-run resources (construct the writer, resolve loaders)
    fn before(&mut self, parameters: &P, context: &ExecutionContext) -> Result<()>;

    /// Process every source and flush the accumulated outputs as the last step
    fn execute(&mut self, parameters: &P, context: &ExecutionContext) -> Result<()>;

    /// Release any still-open handle; must not fail
    fn after(&mut self);
}

/// Drives a task through its lifecycle, converting failures into reported
/// outcomes
#[derive(Clone, Copy, Debug, Default)]
pub struct ExecutionService;

impl ExecutionService {
    /// New service
    pub fn new() -> Self {
        Self
    }

    /// Run `task` against `parameters` under `context`
    ///
    /// Invalid parameters short-circuit without invoking any task method.
    /// `after` runs exactly once whenever `before` was invoked. The outcome
    /// is published as [`Event::Completed`], [`Event::Cancelled`] or
    /// [`Event::Failed`] and returned unchanged.
    pub fn execute<P, T>(&self, task: &mut T, parameters: &P, context: &ExecutionContext) -> Result<()>
    where
        P: TaskParameters,
        T: Task<P>,
    {
        if let Err(e) = parameters.validate() {
            warn!(error = %e, "parameters rejected");
            context.notify(Event::Failed {
                error: e.to_string(),
            });
            return Err(e);
        }

        info!("task started");
        context.notify(Event::Started);
        let started = Instant::now();

        let result = run_lifecycle(task, parameters, context);

        match &result {
            Ok(()) => {
                let elapsed_ms = started.elapsed().as_millis() as u64;
                info!(elapsed_ms, "task completed");
                context.notify(Event::Completed { elapsed_ms });
            }
            Err(e) if e.is_cancelled() => {
                info!("task cancelled");
                context.notify(Event::Cancelled);
            }
            Err(e) => {
                warn!(error = %e, "task failed");
                context.notify(Event::Failed {
                    error: e.to_string(),
                });
            }
        }
        result
    }
}

/// before → execute, with `after` guaranteed once `before` was invoked
fn run_lifecycle<P, T>(task: &mut T, parameters: &P, context: &ExecutionContext) -> Result<()>
where
    P: TaskParameters,
    T: Task<P>,
{
    let result = match task.before(parameters, context) {
        Ok(()) => task.execute(parameters, context),
        Err(e) => Err(e),
    };
    task.after();
    result
}

/// Canonical cancellable per-source loop
///
/// For each source in declared order: poll the cancellation flag (a
/// cancellation aborts remaining sources without starting them), invoke
/// `work` with the 1-based step number, then publish
/// [`Event::StepsCompleted`]. A per-source failure is wrapped as
/// [`Error::Execution`] and escalated under
/// [`FailurePolicy::Strict`](crate::config::FailurePolicy::Strict), or
/// downgraded to an [`Event::Warning`] under
/// [`FailurePolicy::Lenient`](crate::config::FailurePolicy::Lenient).
/// A nested cancellation is never downgraded or wrapped.
pub fn for_each_source<F>(context: &ExecutionContext, sources: &[Source], mut work: F) -> Result<()>
where
    F: FnMut(usize, &Source) -> Result<()>,
{
    let total = sources.len();
    for (index, source) in sources.iter().enumerate() {
        context.assert_not_cancelled()?;
        let step = index + 1;
        debug!(step, total, source = %source.name(), "processing source");
        match work(step, source) {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                let failure = Error::Execution {
                    source_name: source.name().to_string(),
                    cause: Box::new(e),
                };
                if context.policy().is_lenient() {
                    warn!(source = %source.name(), error = %failure, "source failed, continuing");
                    context.notify(Event::Warning {
                        message: failure.to_string(),
                    });
                } else {
                    return Err(failure);
                }
            }
        }
        context.notify(Event::StepsCompleted {
            completed: step,
            total,
        });
    }
    Ok(())
}

/// Ready-made parameter core for multi-source tasks
///
/// Task-specific parameter structs embed it and delegate their validation.
#[derive(Clone, Debug)]
pub struct BatchParameters {
    /// Input items, processed in declared order
    pub sources: Vec<Source>,
    /// Final location of the run; flush fails when left unset
    pub destination: Option<Destination>,
    /// Filename template fed to the [`NameGenerator`](crate::naming::NameGenerator)
    pub name_template: String,
    /// Extension of generated output names (no leading dot)
    pub output_extension: String,
}

impl BatchParameters {
    /// Parameters targeting `destination`, with the plain `[BASENAME]`
    /// template and `pdf` outputs
    pub fn new(destination: Destination) -> Self {
        Self {
            sources: Vec::new(),
            destination: Some(destination),
            name_template: "[BASENAME]".to_string(),
            output_extension: "pdf".to_string(),
        }
    }
}

impl TaskParameters for BatchParameters {
    fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(Error::InvalidParameters {
                reason: "no input source specified".to_string(),
            });
        }
        if self.destination.is_none() {
            return Err(Error::InvalidParameters {
                reason: "destination has not been set".to_string(),
            });
        }
        Ok(())
    }
}
