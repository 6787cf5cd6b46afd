// src/error.rs

//! Unified error handling for the monitor.
//!
//! Errors fall into three groups:
//! - per-cycle failures (`Fetch`, `Timeout`, `EmptyPage`): the cycle is
//!   skipped and the last good state keeps being served;
//! - fatal resource failures (`Resource`): the monitor loop stops;
//! - setup failures (config, selectors, I/O): surfaced before the loop starts.

use std::fmt;

use thiserror::Error;

/// Result type alias for monitor operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The listing page could not be fetched
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// The fetch did not finish in time
    #[error("Fetch of {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    /// The page was fetched but contained no product blocks
    #[error("No product blocks found on page")]
    EmptyPage,

    /// The fetch resource failed to start or is permanently broken
    #[error("Fetch resource error: {0}")]
    Resource(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error with the URL as context.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(url: impl Into<String>, secs: u64) -> Self {
        Self::Timeout {
            url: url.into(),
            secs,
        }
    }

    /// Create a fatal resource error.
    pub fn resource(message: impl fmt::Display) -> Self {
        Self::Resource(message.to_string())
    }

    /// Whether this error must stop the monitor loop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Resource(_))
    }

    /// Whether this error is a recoverable failure of a single cycle.
    pub fn is_cycle_error(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. } | Self::Timeout { .. } | Self::EmptyPage
        )
    }
}
