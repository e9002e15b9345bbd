//! External commands as test bodies
//!
//! [`ProcessInvoker`] runs a program once per invocation and maps its exit
//! status onto an [`InvocationResult`]. Anything that goes wrong while spawning
//! is captured in the invocation's error aggregator, never returned.

use std::io::{Read, Seek, SeekFrom};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::host::{BenchmarkMessage, InvocationContext, Invoker};
use crate::outcome::{InvocationResult, InvocationStatus};

/// Exit code reporting a skipped test, as used by automake and friends
pub const SKIP_EXIT_CODE: i32 = 77;

/// Runs a program as the test body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInvoker {
    program: String,
    args: Vec<String>,
    /// Set once the bus refuses output; failures still reach the aggregator
    bus_closed: bool,
}

impl ProcessInvoker {
    /// Create from a program followed by its arguments
    pub fn new(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| Error::invocation_error("No command to run"))?;

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            bus_closed: false,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Spawn once, wait for exit and classify
    fn execute(&mut self, ctx: &InvocationContext<'_>) -> Result<InvocationResult> {
        let mut stderr = tempfile::tempfile()?;

        let started = Instant::now();
        let status = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::from(stderr.try_clone()?))
            .status()
            .map_err(|e| {
                Error::invocation_error(format!("Failed to spawn '{}': {e}", self.program))
            })?;
        let elapsed = started.elapsed();

        let result = Self::classify(status, elapsed);
        if result.is_failed() {
            stderr.seek(SeekFrom::Start(0))?;
            let mut output = String::new();
            stderr.read_to_string(&mut output)?;
            self.report_failure(ctx, status, output);
        }

        Ok(result)
    }

    fn classify(status: ExitStatus, elapsed: Duration) -> InvocationResult {
        match status.code() {
            Some(0) => InvocationResult::passed(elapsed),
            Some(SKIP_EXIT_CODE) => InvocationResult::new(InvocationStatus::Skipped, elapsed),
            _ => InvocationResult::failed(elapsed),
        }
    }

    fn report_failure(&mut self, ctx: &InvocationContext<'_>, status: ExitStatus, output: String) {
        ctx.aggregator
            .add(format!("{} ({}) {status}", ctx.display_name, ctx.phase));

        let output = output.trim_end();
        if !output.is_empty() {
            ctx.aggregator.add(output);
            if !self.bus_closed {
                self.bus_closed = !ctx.bus.queue(BenchmarkMessage::Output {
                    test: ctx.display_name.to_owned(),
                    output: output.to_owned(),
                });
            }
        }
    }
}

impl Invoker for ProcessInvoker {
    fn invoke(&mut self, ctx: &InvocationContext<'_>) -> InvocationResult {
        if ctx.cancellation.is_cancelled() {
            return InvocationResult::not_run();
        }

        self.execute(ctx).unwrap_or_else(|error| {
            tracing::debug!(test = ctx.display_name, %error, "invocation could not run");
            ctx.aggregator.add(&error);
            InvocationResult::failed(Duration::ZERO)
        })
    }
}
