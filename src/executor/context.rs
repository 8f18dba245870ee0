//! Per-invocation execution context
//!
//! Holds the cooperatively polled cancellation flag, the failure policy, and
//! the notification channel of one task run. Created once per invocation,
//! passed by reference through the call chain, discarded after.

use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::FailurePolicy;
use crate::error::{Error, Result};
use crate::types::Event;

/// Cheap-clone handle requesting cooperative cancellation of a run
///
/// `cancel` may be called from any thread; the run polls the flag at
/// well-defined points (minimally once per source at loop-top), so work
/// already started on the current source runs to completion first.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Fresh, non-cancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// True once cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Mutable per-invocation state of one task run
#[derive(Debug)]
pub struct ExecutionContext {
    cancellation: CancellationToken,
    policy: FailurePolicy,
    events: Sender<Event>,
}

impl ExecutionContext {
    /// Context with a fresh cancellation token and an unbounded notification
    /// channel; returns the receiving end for the caller to consume
    pub fn new(policy: FailurePolicy) -> (Self, Receiver<Event>) {
        let (events, receiver) = crossbeam_channel::unbounded();
        (
            Self {
                cancellation: CancellationToken::new(),
                policy,
                events,
            },
            receiver,
        )
    }

    /// Handle for requesting cancellation from another thread
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// The per-source failure policy of this run
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// True once cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Fail with [`Error::Cancelled`] once cancellation has been requested
    pub fn assert_not_cancelled(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    /// Publish an event; a disconnected receiver is ignored
    pub fn notify(&self, event: Event) {
        self.events.send(event).ok();
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_cancels_across_clones() {
        let (context, _events) = ExecutionContext::new(FailurePolicy::Strict);
        assert!(context.assert_not_cancelled().is_ok());

        let token = context.cancellation_token();
        token.cancel();

        assert!(context.is_cancelled());
        assert!(matches!(
            context.assert_not_cancelled(),
            Err(Error::Cancelled)
        ));
    }

    #[test]
    fn notify_ignores_a_dropped_receiver() {
        let (context, events) = ExecutionContext::new(FailurePolicy::Lenient);
        drop(events);
        context.notify(Event::Started);
    }

    #[test]
    fn events_arrive_in_order() {
        let (context, events) = ExecutionContext::new(FailurePolicy::Strict);
        context.notify(Event::Started);
        context.notify(Event::StepsCompleted {
            completed: 1,
            total: 1,
        });
        assert_eq!(events.try_recv().unwrap(), Event::Started);
        assert_eq!(
            events.try_recv().unwrap(),
            Event::StepsCompleted {
                completed: 1,
                total: 1
            }
        );
    }
}
