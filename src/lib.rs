//! Sumi-Robots: an extended robots.txt policy engine
//!
//! This crate compiles robots.txt documents (including the `Crawl-delay`,
//! `Request-rate`, `Visit-time`, `Clean-param`, `Noindex` and `Indexpage`
//! extensions) into a [`PolicyDocument`] and answers crawler questions
//! against it.

pub mod config;
pub mod robots;
pub mod url;

use thiserror::Error;

/// Main error type for policy operations
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Malformed rule pattern '{pattern}': {message}")]
    MalformedRule { pattern: String, message: String },

    #[error("Malformed {directive} value: '{value}'")]
    MalformedDirective { directive: String, value: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for policy operations
pub type Result<T> = std::result::Result<T, PolicyError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use robots::{
    parse_lines, parse_str, Entry, FetchOutcome, PolicyDocument, RateSpec, RateWindow, RuleLine,
    SharedPolicy, TimeWindow, WindowScan,
};
