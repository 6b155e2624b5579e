//! URL handling module for Sumi-Robots
//!
//! This module provides the percent-encoding rules shared by rule paths and
//! request paths, request-path extraction for `can_fetch`, and query
//! parameter removal for `Clean-param`.

mod normalize;

// Re-export main functions
pub use normalize::{quote_path, remove_query_params, request_path, unquote};
