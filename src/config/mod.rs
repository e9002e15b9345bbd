//! Configuration module for benchmark-case
//!
//! # Architecture
//!
//! - [`metadata`] - Named-value sources: in-memory metadata and git config
//! - [`benchmark_config`] - The immutable per-benchmark settings read from metadata
//! - [`app_config`] - CLI-facing configuration with priority resolution
//!
//! # Error Handling
//!
//! Missing values fall back to defaults and a non-positive iteration count is
//! normalized to 50. A value that is present but does not parse is a
//! [`ConfigError`]. For the CLI, an unreachable git is treated as "not set".
//!
//! # Usage
//!
//! ```rust
//! use benchmark_case::config::{BenchmarkConfig, StaticMetadata};
//!
//! let metadata = StaticMetadata::new()
//!     .with("iterations", 10)
//!     .with("collect-garbage", true);
//!
//! let config = BenchmarkConfig::from_metadata(&metadata)?;
//! assert_eq!(config.iterations(), 10);
//! assert!(config.collect_garbage());
//! # Ok::<(), benchmark_case::ConfigError>(())
//! ```

pub mod app_config;
pub mod benchmark_config;
pub mod metadata;

pub use app_config::{AppConfig, CliArgs};
pub use benchmark_config::{
    BenchmarkConfig, COLLECT_GARBAGE_KEY, DEFAULT_ITERATIONS, ITERATIONS_KEY,
};
pub use metadata::{ConfigError, GitMetadataSource, MetadataSource, StaticMetadata};
