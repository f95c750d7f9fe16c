//! Error types for Sofi Chat
//!
//! This module defines the error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Sofi Chat operations
///
/// Session operations never surface these to the user as failures; they are
/// logged and turned into a chat message or an indicator change. Only
/// startup (configuration, terminal setup) lets them reach `main`.
#[derive(Error, Debug)]
pub enum SofiError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request never completed (connection refused, DNS, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered but the answer was unusable
    #[error("Backend error: {0}")]
    Backend(String),

    /// Local key-value store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for Sofi Chat operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
