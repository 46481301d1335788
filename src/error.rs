//! Error types for Story Weaver
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Story Weaver operations
///
/// Covers configuration loading, provider calls, slot persistence and
/// story export. Malformed story blocks are never errors; the parser
/// simply drops them.
#[derive(Error, Debug)]
pub enum StoryWeaverError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors (API calls, response decoding, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Missing credentials for provider
    #[error("Missing credentials for provider: {0}")]
    MissingCredentials(String),

    /// Unknown search mode, theme or view mode name
    #[error("Invalid mode: {0}")]
    InvalidMode(String),

    /// Slot storage errors (database operations)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Story number outside the library's parsed stories
    #[error("No story number {number}; the library holds {available} stories")]
    StoryNotFound { number: usize, available: usize },

    /// Story export errors
    #[error("Export error: {0}")]
    Export(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Story Weaver operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
