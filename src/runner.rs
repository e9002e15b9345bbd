//! Benchmark runner
//!
//! Runs a test body once untimed, then `iterations` timed passes, and folds all
//! results into a single [`BenchmarkOutcome`]:
//!
//! 1. Warm-up: one invocation. Its result seeds the aggregate; its time is
//!    never counted.
//! 2. Timed iterations: optional full collection cycle, then stopwatch around
//!    exactly one invocation. Collection happens before the stopwatch starts.
//! 3. Finalize: failed if anything failed or the timed passes did not execute
//!    exactly `iterations` tests; skipped if anything skipped.
//!
//! Errors an invocation leaves in its aggregator are logged at `warn` and
//! queued on the bus as a diagnostic.
//!
//! Iterations are strictly sequential. The cancellation token travels to every
//! invocation untouched; the loop itself never checks it.

use std::time::Duration;

use crate::collector::{GarbageCollector, NoopCollector};
use crate::config::BenchmarkConfig;
use crate::host::{
    AsyncInvoker, BenchmarkMessage, ErrorAggregator, Host, InvocationContext, Invoker, MessageBus,
    Phase,
};
use crate::outcome::{BenchmarkOutcome, InvocationResult, RunSummary};
use crate::timing::{Clock, MonotonicClock, Stopwatch};

/// Applies the warm-up and iteration policy to an invoker
#[derive(Debug, Clone)]
pub struct BenchmarkRunner<C = MonotonicClock, G = NoopCollector> {
    config: BenchmarkConfig,
    clock: C,
    collector: G,
}

impl BenchmarkRunner {
    pub fn new(config: BenchmarkConfig) -> Self {
        Self {
            config,
            clock: MonotonicClock::new(),
            collector: NoopCollector,
        }
    }
}

impl<C: Clock, G: GarbageCollector> BenchmarkRunner<C, G> {
    /// Replace the time source
    pub fn with_clock<C2: Clock>(self, clock: C2) -> BenchmarkRunner<C2, G> {
        BenchmarkRunner {
            config: self.config,
            clock,
            collector: self.collector,
        }
    }

    /// Replace the collector used when collection is enabled
    pub fn with_collector<G2: GarbageCollector>(self, collector: G2) -> BenchmarkRunner<C, G2> {
        BenchmarkRunner {
            config: self.config,
            clock: self.clock,
            collector,
        }
    }

    pub fn config(&self) -> BenchmarkConfig {
        self.config
    }

    /// Run the benchmark with a blocking invoker
    pub fn run<I: Invoker + ?Sized>(
        &mut self,
        invoker: &mut I,
        display_name: &str,
        host: Host<'_>,
    ) -> BenchmarkOutcome {
        let mut tally = Tally::default();

        let aggregator = host.aggregator.child();
        let result = invoker.invoke(&context(display_name, Phase::WarmUp, host, &aggregator));
        tally.warm_up(display_name, &result, &aggregator, host.bus);

        for index in 0..self.config.iterations() {
            self.prepare_iteration();

            let phase = Phase::Timed(index);
            let aggregator = host.aggregator.child();
            let ctx = context(display_name, phase, host, &aggregator);

            let stopwatch = Stopwatch::start(&self.clock);
            let result = invoker.invoke(&ctx);
            let elapsed = stopwatch.stop();

            tally.timed(display_name, index, &result, elapsed, &aggregator, host.bus);
        }

        tally.finish(display_name, self.config.iterations())
    }

    /// Run the benchmark with an invoker that may suspend
    ///
    /// Each invocation is awaited to completion before the next one starts.
    pub async fn run_async<I: AsyncInvoker + ?Sized>(
        &mut self,
        invoker: &mut I,
        display_name: &str,
        host: Host<'_>,
    ) -> BenchmarkOutcome {
        let mut tally = Tally::default();

        let aggregator = host.aggregator.child();
        let result = invoker
            .invoke(&context(display_name, Phase::WarmUp, host, &aggregator))
            .await;
        tally.warm_up(display_name, &result, &aggregator, host.bus);

        for index in 0..self.config.iterations() {
            self.prepare_iteration();

            let phase = Phase::Timed(index);
            let aggregator = host.aggregator.child();
            let ctx = context(display_name, phase, host, &aggregator);

            let stopwatch = Stopwatch::start(&self.clock);
            let result = invoker.invoke(&ctx).await;
            let elapsed = stopwatch.stop();

            tally.timed(display_name, index, &result, elapsed, &aggregator, host.bus);
        }

        tally.finish(display_name, self.config.iterations())
    }

    /// Blocking pre-iteration step, completed before the stopwatch starts
    fn prepare_iteration(&mut self) {
        if self.config.collect_garbage() {
            self.collector.full_cycle();
        }
    }
}

fn context<'a>(
    display_name: &'a str,
    phase: Phase,
    host: Host<'a>,
    aggregator: &'a ErrorAggregator,
) -> InvocationContext<'a> {
    InvocationContext {
        display_name,
        phase,
        bus: host.bus,
        aggregator,
        cancellation: host.cancellation,
    }
}

/// Running aggregate of one benchmark
#[derive(Debug, Default)]
struct Tally {
    warm_up: RunSummary,
    timed: RunSummary,
    total_elapsed: Duration,
    /// The bus asked us to stop queueing diagnostics
    bus_closed: bool,
}

impl Tally {
    fn warm_up(
        &mut self,
        test: &str,
        result: &InvocationResult,
        aggregator: &ErrorAggregator,
        bus: &dyn MessageBus,
    ) {
        tracing::debug!(
            test,
            status = ?result.status(),
            elapsed = ?result.elapsed(),
            errors = aggregator.len(),
            "warm-up finished"
        );
        self.report_errors(test, Phase::WarmUp, aggregator, bus);
        self.warm_up = self.warm_up.record(result);
    }

    fn timed(
        &mut self,
        test: &str,
        index: u32,
        result: &InvocationResult,
        elapsed: Duration,
        aggregator: &ErrorAggregator,
        bus: &dyn MessageBus,
    ) {
        tracing::debug!(
            test,
            iteration = index + 1,
            status = ?result.status(),
            elapsed = ?elapsed,
            errors = aggregator.len(),
            "iteration finished"
        );
        self.report_errors(test, Phase::Timed(index), aggregator, bus);
        self.timed = self.timed.record(result);
        self.total_elapsed = self.total_elapsed.saturating_add(elapsed);
    }

    /// Surface whatever the invocation left in its aggregator
    fn report_errors(
        &mut self,
        test: &str,
        phase: Phase,
        aggregator: &ErrorAggregator,
        bus: &dyn MessageBus,
    ) {
        let Some(error) = aggregator.to_error() else {
            return;
        };

        tracing::warn!(test, %phase, %error, "invocation recorded errors");
        if !self.bus_closed {
            let accepted = bus.queue(BenchmarkMessage::Diagnostic {
                test: test.to_owned(),
                message: format!("{phase}: {error}"),
            });
            self.bus_closed = !accepted;
        }
    }

    fn finish(self, test: &str, iterations: u32) -> BenchmarkOutcome {
        let overall = self.warm_up.merge(self.timed);
        let outcome =
            BenchmarkOutcome::finalize(overall, self.timed, iterations, self.total_elapsed);

        if self.timed.total != iterations {
            tracing::warn!(
                test,
                requested = iterations,
                executed = self.timed.total,
                "benchmark executed fewer iterations than requested"
            );
        }
        tracing::info!(
            test,
            iterations,
            failed = overall.failed,
            skipped = overall.skipped,
            total_elapsed = ?outcome.total_elapsed(),
            "benchmark {}",
            outcome.verdict()
        );

        outcome
    }
}
