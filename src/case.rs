//! Benchmark test cases
//!
//! A [`BenchmarkCase`] pairs a test method with the settings read from its
//! metadata. Settings are read exactly once, at construction.

use std::fmt;

use tokio_util::sync::CancellationToken;

use crate::collector::GarbageCollector;
use crate::config::{BenchmarkConfig, ConfigError, MetadataSource};
use crate::host::{AsyncInvoker, ErrorAggregator, Host, Invoker, MessageBus};
use crate::outcome::BenchmarkOutcome;
use crate::runner::BenchmarkRunner;
use crate::timing::Clock;

/// Identifies the test method a benchmark runs
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestMethod {
    class: String,
    method: String,
}

impl TestMethod {
    pub fn new(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Split `Class.method`; a name without a dot has no class
    pub fn from_display_name(name: &str) -> Self {
        match name.rsplit_once('.') {
            Some((class, method)) if !class.is_empty() && !method.is_empty() => {
                Self::new(class, method)
            }
            _ => Self::new("", name),
        }
    }

    /// `Class.method`, or just `method` when there is no class
    pub fn display_name(&self) -> String {
        if self.class.is_empty() {
            self.method.clone()
        } else {
            format!("{}.{}", self.class, self.method)
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn method(&self) -> &str {
        &self.method
    }
}

/// A test method run as a benchmark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkCase {
    method: TestMethod,
    display_name: String,
    config: BenchmarkConfig,
}

impl BenchmarkCase {
    /// Create a case, reading its settings from `metadata`
    pub fn new<S: MetadataSource + ?Sized>(
        method: TestMethod,
        metadata: &S,
    ) -> Result<Self, ConfigError> {
        let config = BenchmarkConfig::from_metadata(metadata)?;
        Ok(Self::with_config(method, config))
    }

    /// Create a case from settings that are already resolved
    pub fn with_config(method: TestMethod, config: BenchmarkConfig) -> Self {
        let display_name = method.display_name();
        Self {
            method,
            display_name,
            config,
        }
    }

    pub fn method(&self) -> &TestMethod {
        &self.method
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn config(&self) -> BenchmarkConfig {
        self.config
    }

    pub fn iterations(&self) -> u32 {
        self.config.iterations()
    }

    pub fn collect_garbage(&self) -> bool {
        self.config.collect_garbage()
    }

    /// Runner preconfigured for this case
    pub fn runner(&self) -> BenchmarkRunner {
        BenchmarkRunner::new(self.config)
    }

    /// Run with the default clock and no collector
    pub fn run<I: Invoker + ?Sized>(
        &self,
        invoker: &mut I,
        bus: &dyn MessageBus,
        aggregator: &ErrorAggregator,
        cancellation: &CancellationToken,
    ) -> BenchmarkOutcome {
        self.runner().run(
            invoker,
            &self.display_name,
            Host::new(bus, aggregator, cancellation),
        )
    }

    /// Run with a custom clock and collector
    pub fn run_with<C, G, I>(
        &self,
        runner: BenchmarkRunner<C, G>,
        invoker: &mut I,
        host: Host<'_>,
    ) -> BenchmarkOutcome
    where
        C: Clock,
        G: GarbageCollector,
        I: Invoker + ?Sized,
    {
        let mut runner = runner;
        runner.run(invoker, &self.display_name, host)
    }

    /// Run with an invoker that may suspend
    pub async fn run_async<I: AsyncInvoker + ?Sized>(
        &self,
        invoker: &mut I,
        bus: &dyn MessageBus,
        aggregator: &ErrorAggregator,
        cancellation: &CancellationToken,
    ) -> BenchmarkOutcome {
        self.runner()
            .run_async(
                invoker,
                &self.display_name,
                Host::new(bus, aggregator, cancellation),
            )
            .await
    }
}

impl fmt::Display for BenchmarkCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ class = {}, method = {}, display = {}, iterations = {}, collect_garbage = {} }}",
            self.method.class,
            self.method.method,
            self.display_name,
            self.config.iterations(),
            self.config.collect_garbage()
        )
    }
}
