//! CLI entry point for benchmark-case
//!
//! Runs a command as a benchmark: once to warm up, then N timed iterations,
//! and prints one aggregated verdict.

use anyhow::Context;
use clap::{ArgAction, Parser};
use std::process::ExitCode;

use benchmark_case::config::CliArgs;
use benchmark_case::{
    AppConfig, BenchmarkCase, CancellationToken, ConfigError, ErrorAggregator, ProcessInvoker,
    TestMethod, TracingMessageBus,
};

/// Run a command as a benchmark: one warm-up pass, then N timed iterations
#[derive(Parser)]
#[command(name = "benchmark-case")]
#[command(version, about, long_about = None)]
struct Args {
    /// Timed iterations (overrides git config; 0 or less means 50)
    #[arg(short = 'n', long, value_name = "N", allow_negative_numbers = true)]
    iterations: Option<i64>,

    /// Force a full collection cycle before each timed iteration (overrides git config)
    #[arg(long, overrides_with = "no_collect_garbage", action = ArgAction::SetTrue)]
    collect_garbage: bool,

    /// Never force collection (overrides git config)
    #[arg(long, overrides_with = "collect_garbage", action = ArgAction::SetTrue)]
    no_collect_garbage: bool,

    /// Name to report (defaults to the program's file name)
    #[arg(long, value_name = "NAME")]
    name: Option<String>,

    /// Program and arguments to benchmark; exit 0 passes, 77 skips, anything else fails
    #[arg(
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    command: Vec<String>,
}

/// Convert CLI args to CliArgs struct for AppConfig
impl From<Args> for CliArgs {
    fn from(args: Args) -> Self {
        Self {
            iterations: args.iterations,
            collect_garbage: args.collect_garbage,
            no_collect_garbage: args.no_collect_garbage,
            name: args.name,
            command: args.command,
        }
    }
}

/// Exit status for configuration problems
const CONFIG_ERROR_EXIT: u8 = 2;

fn main() -> ExitCode {
    benchmark_case::init_logging();

    let config = match AppConfig::from_cli(CliArgs::from(Args::parse())) {
        Ok(config) => config,
        Err(error) => return handle_config_error(error),
    };

    match run(&config) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

/// Run the configured benchmark and print its verdict
fn run(config: &AppConfig) -> anyhow::Result<ExitCode> {
    let mut invoker =
        ProcessInvoker::new(config.command()).context("Failed to prepare benchmark command")?;

    let case = BenchmarkCase::with_config(
        TestMethod::from_display_name(config.name()),
        config.benchmark(),
    );
    tracing::debug!(%case, "running benchmark");

    let aggregator = ErrorAggregator::new();
    let outcome = case.run(
        &mut invoker,
        &TracingMessageBus,
        &aggregator,
        &CancellationToken::new(),
    );

    println!(
        "{}: {} ({} iterations)",
        config.name(),
        outcome,
        case.iterations()
    );

    Ok(if outcome.failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Handle configuration errors with user-friendly messages
fn handle_config_error(error: ConfigError) -> ExitCode {
    eprintln!("{}", config_error_message(&error));
    ExitCode::from(CONFIG_ERROR_EXIT)
}

fn config_error_message(error: &ConfigError) -> String {
    let prefix = match error {
        ConfigError::InvalidValue { .. } => "Invalid git config",
        ConfigError::GitCommandFailed { .. } => "Git command failed",
        ConfigError::Io { .. } => "Configuration error",
        ConfigError::InvalidCliArgument { .. } => "Invalid CLI argument",
    };

    format!("{prefix}: {error}")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **What is tested:** Conversion from CLI Args struct to CliArgs struct
    /// **Why it is tested:** Ensures parsed flags reach the configuration layer unchanged
    /// **Test conditions:** Parses a full argument vector with clap
    /// **Expectations:** All fields are mapped, trailing command keeps its own flags
    #[test]
    fn test_cli_args_conversion() {
        let args = Args::parse_from([
            "benchmark-case",
            "-n",
            "5",
            "--collect-garbage",
            "--name",
            "Sort.large",
            "--",
            "sort",
            "-r",
            "data.txt",
        ]);

        let cli_args = CliArgs::from(args);
        assert_eq!(cli_args.iterations, Some(5));
        assert!(cli_args.collect_garbage);
        assert!(!cli_args.no_collect_garbage);
        assert_eq!(cli_args.name.as_deref(), Some("Sort.large"));
        assert_eq!(cli_args.command, vec!["sort", "-r", "data.txt"]);
    }

    /// **What is tested:** Later collection flag overrides the earlier one
    /// **Why it is tested:** Aliases and wrappers often append flags
    /// **Test conditions:** --collect-garbage followed by --no-collect-garbage
    /// **Expectations:** Only the last flag is set
    #[test]
    fn test_collect_flags_override() {
        let args = Args::parse_from([
            "benchmark-case",
            "--collect-garbage",
            "--no-collect-garbage",
            "true",
        ]);

        assert!(!args.collect_garbage);
        assert!(args.no_collect_garbage);
    }

    /// **What is tested:** Negative iteration counts are accepted by the parser
    /// **Why it is tested:** Non-positive counts are normalized later rather than rejected
    /// **Test conditions:** --iterations -1
    /// **Expectations:** Parsed as Some(-1)
    #[test]
    fn test_negative_iterations_parsed() {
        let args = Args::parse_from(["benchmark-case", "--iterations", "-1", "true"]);
        assert_eq!(args.iterations, Some(-1));
    }

    /// **What is tested:** Configuration error messages
    /// **Why it is tested:** Users must be told which layer produced the bad value
    /// **Test conditions:** InvalidValue error for the iteration count
    /// **Expectations:** Prefix names git config and the message names the key
    #[test]
    fn test_config_error_message() {
        let message = config_error_message(&ConfigError::InvalidValue {
            key: "iterations".to_owned(),
            value: "x".to_owned(),
            expected: "an integer".to_owned(),
        });
        assert!(message.starts_with("Invalid git config: "));
        assert!(message.contains("'iterations'"));
    }
}
