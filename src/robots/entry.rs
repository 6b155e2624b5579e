//! Rule groups bound to user-agent tokens

use crate::robots::rate::{RateSpec, RateWindow, TimeWindow};
use crate::robots::rule::RuleLine;
use crate::PolicyError;
use std::fmt;

/// A `Clean-param` rule: drop `name` from URLs whose path lies within `path_scope`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanParam {
    pub name: String,
    pub path_scope: String,
}

/// A group of directives that applies to one or more user agents
///
/// Rule lines are kept in declaration order; the first matching line decides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub user_agents: Vec<String>,
    pub rule_lines: Vec<RuleLine>,
    pub clean_params: Vec<CleanParam>,
    pub request_rate_windows: Vec<RateWindow>,
    pub default_request_rate: Option<RateSpec>,
    pub visit_times: Vec<TimeWindow>,
    pub crawl_delay: Option<u64>,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether this is a catch-all (`*`) group
    pub fn is_default(&self) -> bool {
        self.user_agents.iter().any(|agent| agent == "*")
    }

    /// Checks if this entry applies to the specified agent
    ///
    /// Only the product token (the part before the first `/`) of `agent` is
    /// considered, and a stored token matches when it is a case-insensitive
    /// substring of that product token.
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_robots::Entry;
    ///
    /// let mut entry = Entry::new();
    /// entry.user_agents.push("SumiBot".to_string());
    /// assert!(entry.applies_to("sumibot/2.1 (+https://example.com)"));
    /// assert!(!entry.applies_to("OtherBot/1.0"));
    /// ```
    pub fn applies_to(&self, agent: &str) -> bool {
        let product = agent.split('/').next().unwrap_or_default().to_lowercase();

        self.user_agents
            .iter()
            .any(|token| token == "*" || product.contains(&token.to_lowercase()))
    }

    /// Decides access for a normalized request path
    ///
    /// Returns the verdict of the first matching rule line, or `true` when no
    /// line matches.
    pub fn allowance(&self, url_path: &str, regex_mode: bool) -> Result<bool, PolicyError> {
        for line in &self.rule_lines {
            if line.matches(url_path, regex_mode)? {
                return Ok(line.is_allow());
            }
        }
        Ok(true)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Vec::new();

        for agent in &self.user_agents {
            lines.push(format!("User-agent: {}", agent));
        }
        if let Some(delay) = self.crawl_delay {
            lines.push(format!("Crawl-delay: {}", delay));
        }
        if let Some(rate) = &self.default_request_rate {
            lines.push(format!("Request-rate: {}", rate));
        }
        for window in &self.request_rate_windows {
            lines.push(format!("Request-rate: {}", window));
        }
        for window in &self.visit_times {
            lines.push(format!("Visit-time: {}", window));
        }
        for param in &self.clean_params {
            lines.push(format!("Clean-param: {} {}", param.name, param.path_scope));
        }
        for line in &self.rule_lines {
            lines.push(line.to_string());
        }

        write!(f, "{}", lines.join("\n"))
    }
}
