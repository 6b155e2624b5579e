//! Robots.txt policy module
//!
//! This module parses robots.txt documents into [`PolicyDocument`]s and
//! answers access, crawl-delay, request-rate, visit-time and URL cleanup
//! queries against them.
//!
//! # Example
//!
//! ```
//! use sumi_robots::robots::parse_str;
//!
//! let doc = parse_str("User-agent: SumiBot\nCrawl-delay: 5\nDisallow: /tmp\n");
//! assert_eq!(doc.crawl_delay("SumiBot/1.0"), Some(5));
//! assert!(!doc.can_fetch("SumiBot/1.0", "https://example.com/tmp/a").unwrap());
//! ```

mod entry;
mod parser;
mod policy;
mod rate;
mod rule;
mod shared;

pub use entry::{CleanParam, Entry};
pub use parser::{parse_lines, parse_lines_at, parse_str};
pub use policy::{FetchOutcome, PolicyDocument, WindowScan};
pub use rate::{time_decode, RateSpec, RateUnit, RateWindow, TimeWindow};
pub use rule::RuleLine;
pub use shared::SharedPolicy;

use crate::PolicyError;
use std::path::Path;

/// Reads and parses a robots.txt file from disk
///
/// # Arguments
///
/// * `path` - Path to the robots.txt file
///
/// # Returns
///
/// * `Ok(PolicyDocument)` - The parsed policy
/// * `Err(PolicyError::Io)` - The file could not be read
pub fn load_file(path: &Path) -> Result<PolicyDocument, PolicyError> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_str(&content))
}
