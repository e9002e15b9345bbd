//! Error handling module
//!
//! Benchmark runs themselves never fail with an error: iteration failures are
//! folded into the outcome. Errors only come from configuration and from the
//! plumbing around invocations.

use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Errors captured while invoking a test body
    #[error("Invocation error: {0}")]
    Invocation(String),
}

impl Error {
    /// Create an invocation error with a custom message
    pub fn invocation_error(message: impl Into<String>) -> Self {
        Error::Invocation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    /// **What is tested:** Error display formatting for each variant
    /// **Why it is tested:** Messages reach users through the CLI
    /// **Test conditions:** One error of every variant
    /// **Expectations:** Each message carries its prefix and the original detail
    #[test]
    fn test_error_display() {
        let io_error = Error::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        assert!(io_error.to_string().contains("IO error"));
        assert!(io_error.to_string().contains("file not found"));

        let config_error = Error::from(ConfigError::Io {
            message: "git missing".to_string(),
        });
        assert!(config_error.to_string().contains("Configuration error"));

        let invocation_error = Error::invocation_error("boom");
        assert_eq!(invocation_error.to_string(), "Invocation error: boom");
    }

    /// **What is tested:** Error source chaining
    /// **Why it is tested:** Wrapped errors must stay reachable for anyhow reports
    /// **Test conditions:** IO error wrapped in Error
    /// **Expectations:** source() returns the IO error
    #[test]
    fn test_error_source() {
        let error = Error::from(std::io::Error::other("inner"));
        assert!(error.source().is_some());
        assert!(Error::invocation_error("x").source().is_none());
    }
}
