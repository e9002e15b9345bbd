//! Benchmark configuration
//!
//! The iteration count and collection flag of one benchmark. Built once from
//! metadata when a case is created and never changed afterwards.

use super::metadata::{parse_bool, parse_integer, ConfigError, MetadataSource};

/// Iteration count used when none, zero or a negative count is configured
pub const DEFAULT_ITERATIONS: u32 = 50;

/// Metadata key holding the iteration count
pub const ITERATIONS_KEY: &str = "iterations";

/// Metadata key holding the garbage-collection flag
pub const COLLECT_GARBAGE_KEY: &str = "collect-garbage";

/// Immutable benchmark settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BenchmarkConfig {
    iterations: u32,
    collect_garbage: bool,
}

impl BenchmarkConfig {
    /// Create a config, replacing a non-positive iteration count with the default
    pub fn new(iterations: i64, collect_garbage: bool) -> Self {
        Self {
            iterations: normalize_iterations(Some(iterations)),
            collect_garbage,
        }
    }

    /// Read the settings from a metadata source
    ///
    /// Missing keys fall back to defaults; values that do not parse are errors.
    pub fn from_metadata<S: MetadataSource + ?Sized>(source: &S) -> Result<Self, ConfigError> {
        let iterations = source
            .lookup(ITERATIONS_KEY)?
            .map(|value| parse_integer(&value, ITERATIONS_KEY))
            .transpose()?;

        let collect_garbage = source
            .lookup(COLLECT_GARBAGE_KEY)?
            .map(|value| parse_bool(&value, COLLECT_GARBAGE_KEY))
            .transpose()?
            .unwrap_or(false);

        Ok(Self {
            iterations: normalize_iterations(iterations),
            collect_garbage,
        })
    }

    /// Number of timed iterations, always at least one
    pub const fn iterations(&self) -> u32 {
        self.iterations
    }

    pub const fn collect_garbage(&self) -> bool {
        self.collect_garbage
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            collect_garbage: false,
        }
    }
}

/// Map a configured count to the effective one
pub fn normalize_iterations(configured: Option<i64>) -> u32 {
    match configured {
        Some(count) if count > 0 => u32::try_from(count).unwrap_or(u32::MAX),
        _ => DEFAULT_ITERATIONS,
    }
}
