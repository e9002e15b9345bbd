//! Metadata sources
//!
//! A benchmark reads its named settings once, when the case is created. The
//! values come from a [`MetadataSource`]: an in-memory map attached to a test
//! ([`StaticMetadata`]) or the user's git configuration ([`GitMetadataSource`]).

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Output};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A metadata value could not be parsed
    #[error("Invalid value for '{key}': '{value}' (expected: {expected})")]
    InvalidValue {
        key: String,
        value: String,
        expected: String,
    },
    /// Git command exited with an unexpected status
    #[error("Git command '{command}' failed with exit code {exit_code}: {stderr}")]
    GitCommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },
    /// IO error while reading configuration
    #[error("IO error during configuration: {message}")]
    Io { message: String },
    /// Invalid CLI argument value
    #[error("Invalid CLI argument: {argument}='{value}' (expected: {expected})")]
    InvalidCliArgument {
        argument: String,
        value: String,
        expected: String,
    },
}

impl ConfigError {
    /// Whether the error means the source was unreachable, as opposed to holding a bad value
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            ConfigError::GitCommandFailed { .. } | ConfigError::Io { .. }
        )
    }
}

/// Read-only lookup of named settings
pub trait MetadataSource {
    /// Raw value for `key`, `None` if not set
    fn lookup(&self, key: &str) -> Result<Option<String>, ConfigError>;
}

impl<S: MetadataSource + ?Sized> MetadataSource for &S {
    fn lookup(&self, key: &str) -> Result<Option<String>, ConfigError> {
        (**self).lookup(key)
    }
}

/// In-memory metadata, the equivalent of named arguments on a test attribute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticMetadata {
    values: HashMap<String, String>,
}

impl StaticMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value
    #[must_use]
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.values.insert(key.to_owned(), value.to_string());
        self
    }
}

impl MetadataSource for StaticMetadata {
    fn lookup(&self, key: &str) -> Result<Option<String>, ConfigError> {
        Ok(self.values.get(key).cloned())
    }
}

/// Reads `<section>.<key>` through `git config --get`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitMetadataSource {
    section: String,
    dir: Option<PathBuf>,
}

impl GitMetadataSource {
    /// Section used when none is given
    pub const DEFAULT_SECTION: &'static str = "benchmark-case";

    pub fn new(section: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            dir: None,
        }
    }

    /// Run git in `dir` instead of the current directory
    #[must_use]
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}.{key}", self.section)
    }

    fn run_git(&self, full_key: &str) -> Result<Output, ConfigError> {
        let mut command = Command::new("git");
        command.args(["config", "--get", full_key]);
        if let Some(dir) = &self.dir {
            command.current_dir(dir);
        }

        command.output().map_err(|e| ConfigError::Io {
            message: format!("Git command 'git config --get {full_key}' failed: {e}"),
        })
    }

    fn parse_output(output: Output, full_key: &str) -> Result<Option<String>, ConfigError> {
        match output.status.code() {
            Some(0) => {
                let value = String::from_utf8_lossy(&output.stdout);
                let value = value.trim();
                Ok((!value.is_empty()).then(|| value.to_owned()))
            }
            // Key is not set
            Some(1) => Ok(None),
            exit_code => Err(ConfigError::GitCommandFailed {
                command: format!("git config --get {full_key}"),
                exit_code: exit_code.unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            }),
        }
    }
}

impl Default for GitMetadataSource {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SECTION)
    }
}

impl MetadataSource for GitMetadataSource {
    fn lookup(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let full_key = self.full_key(key);
        let output = self.run_git(&full_key)?;
        Self::parse_output(output, &full_key)
    }
}

/// Parse a git-style boolean
pub fn parse_bool(value: &str, key: &str) -> Result<bool, ConfigError> {
    let normalized = value.trim().to_lowercase();

    ["true", "1", "yes", "on"]
        .contains(&normalized.as_str())
        .then_some(true)
        .or_else(|| {
            ["false", "0", "no", "off"]
                .contains(&normalized.as_str())
                .then_some(false)
        })
        .ok_or_else(|| ConfigError::InvalidValue {
            key: key.to_owned(),
            value: value.to_owned(),
            expected: "true, false, 1, 0, yes, no, on, or off".to_owned(),
        })
}

/// Parse an integer setting; range checks are left to the caller
pub fn parse_integer(value: &str, key: &str) -> Result<i64, ConfigError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_owned(),
            value: value.to_owned(),
            expected: "an integer".to_owned(),
        })
}
