//! Invocation results and their aggregation
//!
//! A single invocation of a test body yields an [`InvocationResult`]. Results are
//! folded into a [`RunSummary`], and a finished benchmark is collapsed into one
//! [`BenchmarkOutcome`].

use std::fmt;
use std::iter::Sum;
use std::time::Duration;

/// Status reported by one invocation of a test body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvocationStatus {
    /// The body ran and passed
    Passed,
    /// The body ran and failed
    Failed,
    /// The body was skipped
    Skipped,
    /// The invocation was aborted before the body executed
    NotRun,
}

/// Outcome of one invocation of a test body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvocationResult {
    status: InvocationStatus,
    elapsed: Duration,
}

impl InvocationResult {
    /// Create a result with an explicit status
    pub const fn new(status: InvocationStatus, elapsed: Duration) -> Self {
        Self { status, elapsed }
    }

    /// A passing invocation
    pub const fn passed(elapsed: Duration) -> Self {
        Self::new(InvocationStatus::Passed, elapsed)
    }

    /// A failing invocation
    pub const fn failed(elapsed: Duration) -> Self {
        Self::new(InvocationStatus::Failed, elapsed)
    }

    /// A skipped invocation
    pub const fn skipped() -> Self {
        Self::new(InvocationStatus::Skipped, Duration::ZERO)
    }

    /// An invocation that never reached the test body
    pub const fn not_run() -> Self {
        Self::new(InvocationStatus::NotRun, Duration::ZERO)
    }

    pub const fn status(&self) -> InvocationStatus {
        self.status
    }

    pub const fn is_failed(&self) -> bool {
        matches!(self.status, InvocationStatus::Failed)
    }

    pub const fn is_skipped(&self) -> bool {
        matches!(self.status, InvocationStatus::Skipped)
    }

    /// Time the invocation primitive itself measured
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Running aggregate of invocation results
///
/// `RunSummary::default()` is the identity of [`RunSummary::merge`], and merge is
/// associative and commutative, so summaries may be combined in any order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of invocations that executed the test body
    pub total: u32,
    /// Number of failed invocations
    pub failed: u32,
    /// Number of skipped invocations
    pub skipped: u32,
    /// Accumulated time reported by the invocations
    pub time: Duration,
}

impl RunSummary {
    /// Combine two summaries, saturating at the counter limits
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            total: self.total.saturating_add(other.total),
            failed: self.failed.saturating_add(other.failed),
            skipped: self.skipped.saturating_add(other.skipped),
            time: self.time.saturating_add(other.time),
        }
    }

    /// Fold one invocation result into this summary
    #[must_use]
    pub fn record(self, result: &InvocationResult) -> Self {
        self.merge(Self::from(result))
    }

    pub const fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub const fn has_skips(&self) -> bool {
        self.skipped > 0
    }
}

impl From<&InvocationResult> for RunSummary {
    fn from(result: &InvocationResult) -> Self {
        let (total, failed, skipped) = match result.status() {
            InvocationStatus::Passed => (1, 0, 0),
            InvocationStatus::Failed => (1, 1, 0),
            InvocationStatus::Skipped => (1, 0, 1),
            InvocationStatus::NotRun => (0, 0, 0),
        };

        Self {
            total,
            failed,
            skipped,
            time: result.elapsed(),
        }
    }
}

impl From<InvocationResult> for RunSummary {
    fn from(result: InvocationResult) -> Self {
        Self::from(&result)
    }
}

impl Sum for RunSummary {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Self::merge)
    }
}

impl<'a> FromIterator<&'a InvocationResult> for RunSummary {
    fn from_iter<I: IntoIterator<Item = &'a InvocationResult>>(iter: I) -> Self {
        iter.into_iter().map(RunSummary::from).sum()
    }
}

impl FromIterator<InvocationResult> for RunSummary {
    fn from_iter<I: IntoIterator<Item = InvocationResult>>(iter: I) -> Self {
        iter.into_iter().map(RunSummary::from).sum()
    }
}

/// Final result of a benchmark, reported upward as one logical test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkOutcome {
    failed: bool,
    skipped: bool,
    total_elapsed: Duration,
}

impl BenchmarkOutcome {
    /// A benchmark always counts as exactly one reported test
    pub const REPORTED_COUNT: u32 = 1;

    /// Collapse an aggregate into an outcome
    ///
    /// `timed` must hold only the timed iterations: its test count is compared
    /// against the requested iteration count to detect incomplete runs.
    pub fn finalize(
        overall: RunSummary,
        timed: RunSummary,
        iterations: u32,
        total_elapsed: Duration,
    ) -> Self {
        Self {
            failed: overall.has_failures() || timed.total != iterations,
            skipped: overall.has_skips(),
            total_elapsed,
        }
    }

    pub const fn failed(&self) -> bool {
        self.failed
    }

    pub const fn skipped(&self) -> bool {
        self.skipped
    }

    pub const fn passed(&self) -> bool {
        !self.failed && !self.skipped
    }

    /// Sum of the timed iterations, warm-up and collection excluded
    pub const fn total_elapsed(&self) -> Duration {
        self.total_elapsed
    }

    pub const fn reported_count(&self) -> u32 {
        Self::REPORTED_COUNT
    }

    /// Render the outcome as a one-word verdict
    pub const fn verdict(&self) -> &'static str {
        if self.failed {
            "failed"
        } else if self.skipped {
            "skipped"
        } else {
            "passed"
        }
    }
}

impl fmt::Display for BenchmarkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} in {:.3} ms",
            self.verdict(),
            self.total_elapsed.as_secs_f64() * 1000.0
        )
    }
}
