//! benchmark-case library
//!
//! Runs a test body as a benchmark: one untimed warm-up pass, then a configured
//! number of timed iterations, optionally preceded by a full garbage-collection
//! cycle each, all collapsed into one pass/fail/skip outcome with the summed
//! iteration time.
//!
//! # Examples
//!
//! ```rust
//! use benchmark_case::{
//!     BenchmarkCase, CancellationToken, ErrorAggregator, InvocationContext, InvocationResult,
//!     NullMessageBus, StaticMetadata, TestMethod,
//! };
//! use std::time::Duration;
//!
//! let metadata = StaticMetadata::new().with("iterations", 3);
//! let case = BenchmarkCase::new(TestMethod::new("Vec", "push"), &metadata)?;
//!
//! let mut body = |_: &InvocationContext<'_>| {
//!     let v: Vec<u32> = (0..1_000).collect();
//!     assert_eq!(v.len(), 1_000);
//!     InvocationResult::passed(Duration::ZERO)
//! };
//!
//! let outcome = case.run(
//!     &mut body,
//!     &NullMessageBus,
//!     &ErrorAggregator::new(),
//!     &CancellationToken::new(),
//! );
//! assert!(outcome.passed());
//! assert_eq!(outcome.reported_count(), 1);
//! # Ok::<(), benchmark_case::ConfigError>(())
//! ```

pub mod case;
pub mod collector;
pub mod config;
pub mod error;
pub mod host;
pub mod outcome;
pub mod process;
pub mod runner;
pub mod timing;

pub use case::{BenchmarkCase, TestMethod};
pub use collector::{FnCollector, GarbageCollector, NoopCollector};
pub use config::{AppConfig, BenchmarkConfig, ConfigError, MetadataSource, StaticMetadata};
pub use error::{Error, Result};
pub use host::{
    AsyncInvoker, BenchmarkMessage, CancellationToken, ErrorAggregator, Host, InvocationContext,
    Invoker, MessageBus, NullMessageBus, Phase, TracingMessageBus,
};
pub use outcome::{BenchmarkOutcome, InvocationResult, InvocationStatus, RunSummary};
pub use process::ProcessInvoker;
pub use runner::BenchmarkRunner;
pub use timing::{Clock, ManualClock, MonotonicClock, Stopwatch};

use tracing_subscriber::EnvFilter;

/// Install a stderr `tracing` subscriber filtered by `RUST_LOG`, `warn` by default
///
/// Calling it more than once is harmless; only the first call installs.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
