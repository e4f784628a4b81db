use std::path::PathBuf;

use crate::assert::AssertionError;

/// Monolithic error type for registration, configuration and loading.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The supplied configuration cannot be used.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A suite pattern could not be parsed.
    #[error("invalid suite pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Details from the pattern matcher.
        message: String,
    },

    /// A path matched by a suite pattern could not be read.
    #[error("failed to enumerate {0}: {1}")]
    PatternMatch(PathBuf, std::io::Error),

    /// A file could not be read.
    #[error("failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),

    /// A file could not be parsed as JSON.
    #[error("failed to parse {0} as JSON: {1}")]
    Json(PathBuf, serde_json::Error),

    /// A file could not be parsed as YAML.
    #[error("failed to parse {0} as YAML: {1}")]
    Yaml(PathBuf, serde_yaml::Error),

    /// Loaded content does not have the shape of a suite.
    #[error("{0} is not a valid suite: {1}")]
    InvalidSuite(PathBuf, serde_json::Error),
}

/// Error ending a single leaf test.
#[derive(thiserror::Error, Debug)]
pub enum TestError {
    /// An assertion failed; the validator disagreed with the expectation.
    #[error(transparent)]
    Assertion(#[from] AssertionError),

    /// The test's data file could not be loaded.
    #[error("failed to load test data: {0}")]
    Load(#[from] Error),
}

impl TestError {
    /// Returns whether this error is an assertion failure (as opposed to an error
    /// preventing the test from running).
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::Assertion(_))
    }
}
