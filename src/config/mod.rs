//! Configuration module for Sumi-Robots
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sumi_robots::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("robots.toml")).unwrap();
//! println!("Regex mode: {}", config.resolver.regex_mode);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, ResolverConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
