//! This module defines all error types used throughout the application.

use std::io;
use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    /// IO errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Flow document parsing errors (malformed YAML, wrong document shape)
    #[error("Parse error: {0}")]
    Parse(String),

    /// The same state name is declared twice
    #[error("Duplicate state declaration: {0}")]
    DuplicateState(String),

    /// The same event name is declared twice
    #[error("Duplicate event declaration: {0}")]
    DuplicateEvent(String),

    /// A transition rule references an undeclared state or event
    #[error("Transition rule '{rule}' references undeclared {kind} '{reference}'")]
    UnknownReference {
        rule: String,
        kind: &'static str,
        reference: String,
    },

    /// Two rules map the same (state, event) pair to different destinations
    #[error(
        "Conflicting transitions: event '{event}' from state '{state}' \
         targets both '{first}' and '{second}'"
    )]
    ConflictingTransition {
        state: String,
        event: String,
        first: String,
        second: String,
    },

    /// A state name does not resolve in the state table
    #[error("Unknown state: {0}")]
    UnknownState(String),

    /// Runtime attempt to fire an event not legal from the current state
    #[error("Event '{event}' is not available from state '{state}'")]
    IllegalTransition { state: String, event: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),

    /// Wrapped anyhow errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a custom error with a message
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if error is a rejected transition (recoverable; the caller is
    /// expected to re-inspect the available transitions and retry)
    pub fn is_illegal_transition(&self) -> bool {
        matches!(self, Error::IllegalTransition { .. })
    }
}

// Implement From traits for common external error types

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Custom(format!("JSON error: {}", err))
    }
}

// Helper macros for creating errors

/// Create a custom error with formatting
#[macro_export]
macro_rules! custom_error {
    ($($arg:tt)*) => {
        $crate::error::Error::Custom(format!($($arg)*))
    };
}

/// Bail with a custom error message
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::custom_error!($($arg)*))
    };
}

/// Ensure a condition is true or return error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($($arg)*);
        }
    };
}
