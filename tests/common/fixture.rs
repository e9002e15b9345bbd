//! Benchmark fixture
//!
//! `BenchFixture::builder()` describes a benchmark (iterations, collection,
//! scripted invocation results), runs it against a [`ManualClock`] and returns
//! a [`BenchReport`] with everything the runner did.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use benchmark_case::{
    AsyncInvoker, BenchmarkCase, BenchmarkConfig, BenchmarkOutcome, BenchmarkRunner,
    CancellationToken, ErrorAggregator, GarbageCollector, Host, InvocationContext,
    InvocationResult, InvocationStatus, Invoker, ManualClock, NullMessageBus, Phase, TestMethod,
};

/// Everything observable about one call into the test body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub phase: Phase,
    pub cancelled: bool,
    /// Clock reading when the call started
    pub started_at: Duration,
}

/// Event log shared by the invoker and the collector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Call(Phase),
    Collect,
    Finalize,
}

/// Invoker replaying scripted results and advancing a shared clock
pub struct ScriptedInvoker {
    clock: Arc<ManualClock>,
    steps: Vec<(InvocationStatus, Duration)>,
    pub calls: Vec<CallRecord>,
    events: Arc<Mutex<Vec<Event>>>,
}

impl ScriptedInvoker {
    #[allow(dead_code)]
    pub fn new(clock: Arc<ManualClock>, steps: Vec<(InvocationStatus, Duration)>) -> Self {
        Self {
            clock,
            steps,
            calls: Vec::new(),
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn next(&mut self, ctx: &InvocationContext<'_>) -> InvocationResult {
        let (status, duration) = self
            .steps
            .get(self.calls.len())
            .copied()
            .unwrap_or((InvocationStatus::Passed, Duration::ZERO));

        self.calls.push(CallRecord {
            phase: ctx.phase,
            cancelled: ctx.cancellation.is_cancelled(),
            started_at: self.clock_now(),
        });
        self.events.lock().unwrap().push(Event::Call(ctx.phase));
        self.clock.advance(duration);

        InvocationResult::new(status, duration)
    }

    fn clock_now(&self) -> Duration {
        use benchmark_case::Clock;
        self.clock.now()
    }
}

impl Invoker for ScriptedInvoker {
    fn invoke(&mut self, ctx: &InvocationContext<'_>) -> InvocationResult {
        self.next(ctx)
    }
}

#[async_trait]
impl AsyncInvoker for ScriptedInvoker {
    async fn invoke(&mut self, ctx: &InvocationContext<'_>) -> InvocationResult {
        tokio::task::yield_now().await;
        self.next(ctx)
    }
}

/// Collector logging its calls and charging time to the shared clock
pub struct RecordingCollector {
    clock: Arc<ManualClock>,
    cost: Duration,
    events: Arc<Mutex<Vec<Event>>>,
}

impl GarbageCollector for RecordingCollector {
    fn collect(&mut self) {
        self.events.lock().unwrap().push(Event::Collect);
        self.clock.advance(self.cost);
    }

    fn wait_for_pending_finalizers(&mut self) {
        self.events.lock().unwrap().push(Event::Finalize);
        self.clock.advance(self.cost);
    }
}

/// Result of running a fixture
#[derive(Debug)]
pub struct BenchReport {
    pub outcome: BenchmarkOutcome,
    pub calls: Vec<CallRecord>,
    pub events: Vec<Event>,
}

impl BenchReport {
    #[allow(dead_code)]
    pub fn invocation_count(&self) -> usize {
        self.calls.len()
    }

    #[allow(dead_code)]
    pub fn collect_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| **event == Event::Collect)
            .count()
    }
}

/// Benchmark description used by integration tests
#[derive(Debug, Clone)]
pub struct BenchFixture {
    config: BenchmarkConfig,
    steps: Vec<(InvocationStatus, Duration)>,
    collection_cost: Duration,
    cancelled: bool,
}

impl BenchFixture {
    #[allow(dead_code)]
    pub fn builder() -> BenchFixtureBuilder {
        BenchFixtureBuilder::default()
    }

    fn parts(
        &self,
    ) -> (
        Arc<ManualClock>,
        ScriptedInvoker,
        RecordingCollector,
        BenchmarkCase,
    ) {
        let clock = Arc::new(ManualClock::new());
        let events = Arc::new(Mutex::new(Vec::new()));
        let invoker = ScriptedInvoker {
            clock: Arc::clone(&clock),
            steps: self.steps.clone(),
            calls: Vec::new(),
            events: Arc::clone(&events),
        };
        let collector = RecordingCollector {
            clock: Arc::clone(&clock),
            cost: self.collection_cost,
            events,
        };
        let case = BenchmarkCase::with_config(TestMethod::new("Fixture", "bench"), self.config);
        (clock, invoker, collector, case)
    }

    fn token(&self) -> CancellationToken {
        let token = CancellationToken::new();
        if self.cancelled {
            token.cancel();
        }
        token
    }

    /// Run through the blocking entry point
    #[allow(dead_code)]
    pub fn run(&self) -> BenchReport {
        let (clock, mut invoker, collector, case) = self.parts();
        let events = Arc::clone(&collector.events);
        let runner = BenchmarkRunner::new(self.config)
            .with_clock(clock)
            .with_collector(collector);

        let aggregator = ErrorAggregator::new();
        let token = self.token();
        let outcome = case.run_with(
            runner,
            &mut invoker,
            Host::new(&NullMessageBus, &aggregator, &token),
        );

        let events = events.lock().unwrap().clone();
        BenchReport {
            outcome,
            calls: invoker.calls,
            events,
        }
    }

    /// Run through the async entry point
    #[allow(dead_code)]
    pub async fn run_async(&self) -> BenchReport {
        let (clock, mut invoker, collector, case) = self.parts();
        let events = Arc::clone(&collector.events);
        let mut runner = BenchmarkRunner::new(self.config)
            .with_clock(clock)
            .with_collector(collector);

        let aggregator = ErrorAggregator::new();
        let token = self.token();
        let outcome = runner
            .run_async(
                &mut invoker,
                case.display_name(),
                Host::new(&NullMessageBus, &aggregator, &token),
            )
            .await;

        let events = events.lock().unwrap().clone();
        BenchReport {
            outcome,
            calls: invoker.calls,
            events,
        }
    }
}

/// Builder for [`BenchFixture`]
#[derive(Debug, Clone, Default)]
pub struct BenchFixtureBuilder {
    iterations: i64,
    collect_garbage: bool,
    steps: Vec<(InvocationStatus, Duration)>,
    collection_cost: Duration,
    cancelled: bool,
}

#[allow(dead_code)]
impl BenchFixtureBuilder {
    /// Configured iteration count; 0 or less means the default
    pub fn iterations(mut self, iterations: i64) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn collect_garbage(mut self, enabled: bool) -> Self {
        self.collect_garbage = enabled;
        self
    }

    /// Time each collector call charges to the clock
    pub fn collection_cost(mut self, cost: Duration) -> Self {
        self.collection_cost = cost;
        self
    }

    /// Result of the next invocation, warm-up first
    pub fn step(mut self, status: InvocationStatus, millis: u64) -> Self {
        self.steps.push((status, Duration::from_millis(millis)));
        self
    }

    /// Passing invocations with the given durations
    pub fn passing<I: IntoIterator<Item = u64>>(mut self, millis: I) -> Self {
        self.steps.extend(
            millis
                .into_iter()
                .map(|ms| (InvocationStatus::Passed, Duration::from_millis(ms))),
        );
        self
    }

    /// Start with the cancellation token already cancelled
    pub fn cancelled(mut self) -> Self {
        self.cancelled = true;
        self
    }

    pub fn build(self) -> BenchFixture {
        BenchFixture {
            config: BenchmarkConfig::new(self.iterations, self.collect_garbage),
            steps: self.steps,
            collection_cost: self.collection_cost,
            cancelled: self.cancelled,
        }
    }
}
