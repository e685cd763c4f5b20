//! Unified error types for sitesearch.
//!
//! A superseded search is not an error: it is reported through
//! [`SearchOutcome::Superseded`](crate::index::SearchOutcome). Everything in
//! this module is a genuine fault that propagates to the host.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for sitesearch operations.
#[derive(Error, Debug)]
pub enum SiteSearchError {
    /// I/O errors from reading config or result files.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failures raised by the search index capability.
    #[error("index error: {message}")]
    Index { message: String },

    /// Missing or unusable DOM elements.
    #[error("dom error: {message}")]
    Dom { message: String },

    /// JSON or TOML parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },
}

/// A specialized Result type for sitesearch operations.
pub type Result<T> = std::result::Result<T, SiteSearchError>;

impl SiteSearchError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create an index error.
    pub fn index(message: impl Into<String>) -> Self {
        Self::Index {
            message: message.into(),
        }
    }

    /// Create a DOM error.
    pub fn dom(message: impl Into<String>) -> Self {
        Self::Dom {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<io::Error> for SiteSearchError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for SiteSearchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Degrade an error to a fallback value, logging a warning.
///
/// Only used on the configuration path: a broken config file should never
/// stop the search box from working with defaults.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the provided fallback.
    fn fail_open_with(self, context: &str, fallback: T) -> T;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_with(self, context: &str, fallback: T) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using fallback)", context, err);
                fallback
            }
        }
    }
}

/// Exit codes for the sitesearch CLI.
pub mod exit_codes {
    /// The command did what was asked.
    pub const SUCCESS: i32 = 0;

    /// The command failed; details were printed.
    pub const FAILURE: i32 = 1;
}
