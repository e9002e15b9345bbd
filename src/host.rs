//! Capabilities supplied by the host test framework
//!
//! The benchmark policy never executes a test body itself. It calls an
//! [`Invoker`] (or [`AsyncInvoker`]) once per pass and hands it an
//! [`InvocationContext`] carrying the host's message bus, a per-invocation
//! [`ErrorAggregator`] and the cancellation token.

use async_trait::async_trait;
use std::fmt;
use std::sync::{Mutex, PoisonError};
pub use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::outcome::InvocationResult;

/// Which pass of a benchmark an invocation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The single untimed pass
    WarmUp,
    /// Timed iteration, zero-based
    Timed(u32),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::WarmUp => write!(f, "warm-up"),
            Phase::Timed(index) => write!(f, "iteration {}", index + 1),
        }
    }
}

/// Messages an invocation may publish to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BenchmarkMessage {
    /// Output captured from the test body
    Output { test: String, output: String },
    /// Free-form diagnostic
    Diagnostic { test: String, message: String },
}

/// Host reporting channel
pub trait MessageBus: Send + Sync {
    /// Queue a message; `false` asks the sender to stop producing messages
    fn queue(&self, message: BenchmarkMessage) -> bool;
}

/// Bus that forwards every message to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMessageBus;

impl MessageBus for TracingMessageBus {
    fn queue(&self, message: BenchmarkMessage) -> bool {
        match message {
            BenchmarkMessage::Output { test, output } => {
                tracing::info!(test = %test, "{}", output.trim_end());
            }
            BenchmarkMessage::Diagnostic { test, message } => {
                tracing::debug!(test = %test, "{message}");
            }
        }
        true
    }
}

/// Bus that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMessageBus;

impl MessageBus for NullMessageBus {
    fn queue(&self, _message: BenchmarkMessage) -> bool {
        true
    }
}

/// Collects errors raised while running a test body
///
/// Each invocation gets a [`child`](ErrorAggregator::child) seeded with the
/// parent's errors. Errors added to the child never flow back to the parent.
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    errors: Mutex<Vec<String>>,
}

impl ErrorAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// New aggregator starting with a copy of this one's errors
    pub fn child(&self) -> Self {
        Self {
            errors: Mutex::new(self.errors()),
        }
    }

    pub fn add(&self, error: impl fmt::Display) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error.to_string());
    }

    pub fn len(&self) -> usize {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of collected errors, oldest first
    pub fn errors(&self) -> Vec<String> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fold collected errors into one [`Error::Invocation`]
    pub fn to_error(&self) -> Option<Error> {
        let errors = self.errors();
        match errors.len() {
            0 => None,
            1 => errors.into_iter().next().map(Error::Invocation),
            _ => Some(Error::Invocation(
                errors
                    .iter()
                    .enumerate()
                    .map(|(i, err)| format!("Error {}: {}", i + 1, err))
                    .collect::<Vec<_>>()
                    .join("; "),
            )),
        }
    }
}

/// Everything an invocation needs from its host
pub struct InvocationContext<'a> {
    pub display_name: &'a str,
    pub phase: Phase,
    pub bus: &'a dyn MessageBus,
    pub aggregator: &'a ErrorAggregator,
    pub cancellation: &'a CancellationToken,
}

/// Executes a test body once
pub trait Invoker {
    fn invoke(&mut self, ctx: &InvocationContext<'_>) -> InvocationResult;
}

impl<F> Invoker for F
where
    F: FnMut(&InvocationContext<'_>) -> InvocationResult,
{
    fn invoke(&mut self, ctx: &InvocationContext<'_>) -> InvocationResult {
        self(ctx)
    }
}

/// Executes a test body once, possibly suspending
#[async_trait]
pub trait AsyncInvoker: Send {
    async fn invoke(&mut self, ctx: &InvocationContext<'_>) -> InvocationResult;
}

/// Host-side handles shared by every invocation of one benchmark
#[derive(Clone, Copy)]
pub struct Host<'a> {
    pub bus: &'a dyn MessageBus,
    pub aggregator: &'a ErrorAggregator,
    pub cancellation: &'a CancellationToken,
}

impl<'a> Host<'a> {
    pub fn new(
        bus: &'a dyn MessageBus,
        aggregator: &'a ErrorAggregator,
        cancellation: &'a CancellationToken,
    ) -> Self {
        Self {
            bus,
            aggregator,
            cancellation,
        }
    }
}
