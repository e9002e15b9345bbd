//! Application configuration module
//!
//! Combines CLI arguments with metadata from git configuration. Priority:
//!
//! 1. CLI parameters (highest priority)
//! 2. Git configuration values
//! 3. Hardcoded defaults (when git config is not set or git is unavailable)

use std::path::Path;

use super::benchmark_config::{
    normalize_iterations, BenchmarkConfig, COLLECT_GARBAGE_KEY, ITERATIONS_KEY,
};
use super::metadata::{
    parse_bool, parse_integer, ConfigError, GitMetadataSource, MetadataSource,
};

/// CLI arguments structure
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliArgs {
    /// Timed iterations; non-positive values mean the default
    pub iterations: Option<i64>,
    /// Force collection before each timed iteration
    pub collect_garbage: bool,
    /// Never force collection
    pub no_collect_garbage: bool,
    /// Name reported for the benchmark
    pub name: Option<String>,
    /// Program and arguments forming the test body
    pub command: Vec<String>,
}

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    benchmark: BenchmarkConfig,
    name: String,
    command: Vec<String>,
}

impl AppConfig {
    /// Create AppConfig from CLI arguments, reading git config for unset values
    pub fn from_cli(cli_args: CliArgs) -> Result<Self, ConfigError> {
        Self::from_cli_with_source(cli_args, &GitMetadataSource::default())
    }

    /// Create AppConfig with a custom metadata source
    pub fn from_cli_with_source<S: MetadataSource + ?Sized>(
        cli_args: CliArgs,
        source: &S,
    ) -> Result<Self, ConfigError> {
        let program = cli_args
            .command
            .first()
            .filter(|program| !program.trim().is_empty())
            .ok_or_else(|| ConfigError::InvalidCliArgument {
                argument: "COMMAND".to_owned(),
                value: cli_args.command.join(" "),
                expected: "a program to benchmark".to_owned(),
            })?;

        let name = cli_args
            .name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| Self::default_name(program));

        let iterations = Self::resolve_iterations(&cli_args, source)?;
        let collect_garbage = Self::resolve_collect_garbage(&cli_args, source)?;

        Ok(Self {
            benchmark: BenchmarkConfig::new(i64::from(iterations), collect_garbage),
            name,
            command: cli_args.command,
        })
    }

    fn resolve_iterations<S: MetadataSource + ?Sized>(
        cli_args: &CliArgs,
        source: &S,
    ) -> Result<u32, ConfigError> {
        if let Some(count) = cli_args.iterations {
            return Ok(normalize_iterations(Some(count)));
        }

        Self::lookup_available(source, ITERATIONS_KEY)?
            .map(|value| parse_integer(&value, ITERATIONS_KEY))
            .transpose()
            .map(normalize_iterations)
    }

    fn resolve_collect_garbage<S: MetadataSource + ?Sized>(
        cli_args: &CliArgs,
        source: &S,
    ) -> Result<bool, ConfigError> {
        let from_cli = [
            cli_args.collect_garbage.then_some(true),
            cli_args.no_collect_garbage.then_some(false),
        ]
        .into_iter()
        .flatten()
        .next();

        match from_cli {
            Some(flag) => Ok(flag),
            None => Self::lookup_available(source, COLLECT_GARBAGE_KEY)?
                .map(|value| parse_bool(&value, COLLECT_GARBAGE_KEY))
                .transpose()
                .map(|flag| flag.unwrap_or(false)),
        }
    }

    /// Look up a key, treating an unreachable source as "not set"
    fn lookup_available<S: MetadataSource + ?Sized>(
        source: &S,
        key: &str,
    ) -> Result<Option<String>, ConfigError> {
        match source.lookup(key) {
            Err(error) if error.is_unavailable() => {
                tracing::debug!(key, %error, "metadata source unavailable, using default");
                Ok(None)
            }
            other => other,
        }
    }

    fn default_name(program: &str) -> String {
        Path::new(program)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.to_owned())
    }

    pub fn benchmark(&self) -> BenchmarkConfig {
        self.benchmark
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Program followed by its arguments
    pub fn command(&self) -> &[String] {
        &self.command
    }
}
