//! Parsed robots.txt policy and its query operations

use crate::config::ResolverConfig;
use crate::robots::entry::Entry;
use crate::robots::parser::parse_str;
use crate::robots::rate::RateSpec;
use crate::url::{remove_query_params, request_path};
use crate::PolicyError;
use chrono::{DateTime, NaiveTime, Timelike, Utc};
use serde::Deserialize;
use std::fmt;

/// How many `Visit-time` windows of a group are consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowScan {
    /// Only the first window of the selected group is checked
    #[default]
    SourceCompatible,
    /// A time inside any window of the selected group is accepted
    AllWindows,
}

/// Result of fetching a robots.txt file, as reported by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The file was retrieved; the body is its decoded text
    Body(String),
    /// The server answered with a non-success HTTP status
    Status(u16),
}

/// A compiled robots.txt policy
///
/// Documents are immutable once built. To refresh a policy, parse a new
/// document and publish it whole (see [`crate::SharedPolicy`]).
#[derive(Debug, Clone, Default)]
pub struct PolicyDocument {
    pub(crate) entries: Vec<Entry>,
    pub(crate) default_entry: Option<Entry>,
    pub(crate) sitemaps: Vec<String>,
    pub(crate) index_pages: Vec<String>,
    pub(crate) last_fetched_at: Option<DateTime<Utc>>,
    pub(crate) disallow_all: bool,
    pub(crate) allow_all: bool,
    pub(crate) regex_mode: bool,
    pub(crate) window_scan: WindowScan,
    pub(crate) fingerprint: Option<String>,
}

impl PolicyDocument {
    /// A document that was never loaded; every query fails closed
    pub fn unloaded() -> Self {
        Self::default()
    }

    /// Builds a document from the outcome of a robots.txt fetch
    ///
    /// * 401 and 403 deny everything
    /// * any other 4xx allows everything
    /// * other statuses leave the document unloaded
    /// * a body is parsed
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_robots::{FetchOutcome, PolicyDocument};
    ///
    /// let doc = PolicyDocument::from_fetch(FetchOutcome::Status(404));
    /// assert!(doc.can_fetch("SumiBot", "https://example.com/").unwrap());
    ///
    /// let doc = PolicyDocument::from_fetch(FetchOutcome::Status(403));
    /// assert!(!doc.can_fetch("SumiBot", "https://example.com/").unwrap());
    /// ```
    pub fn from_fetch(outcome: FetchOutcome) -> Self {
        match outcome {
            FetchOutcome::Body(text) => parse_str(&text),
            FetchOutcome::Status(401) | FetchOutcome::Status(403) => {
                tracing::info!("robots.txt access denied; disallowing all");
                Self {
                    disallow_all: true,
                    ..Self::default()
                }
            }
            FetchOutcome::Status(status) if (400..500).contains(&status) => {
                tracing::info!("robots.txt unavailable (HTTP {}); allowing all", status);
                Self {
                    allow_all: true,
                    ..Self::default()
                }
            }
            FetchOutcome::Status(status) => {
                tracing::warn!("robots.txt fetch failed (HTTP {}); policy unloaded", status);
                Self::default()
            }
        }
    }

    /// Enables or disables regular-expression matching of rule paths
    pub fn with_regex_mode(mut self, regex_mode: bool) -> Self {
        self.regex_mode = regex_mode;
        self
    }

    /// Selects how visit-time windows are consulted
    pub fn with_window_scan(mut self, window_scan: WindowScan) -> Self {
        self.window_scan = window_scan;
        self
    }

    /// Applies resolver options from configuration
    pub fn configured(self, config: &ResolverConfig) -> Self {
        self.with_regex_mode(config.regex_mode)
            .with_window_scan(config.window_scan)
    }

    /// Explicit (non-`*`) groups in file order
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The first `*` group, if any
    pub fn default_entry(&self) -> Option<&Entry> {
        self.default_entry.as_ref()
    }

    /// When the document was parsed, or `None` if it never was
    pub fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.last_fetched_at
    }

    pub fn is_loaded(&self) -> bool {
        self.last_fetched_at.is_some()
    }

    /// Hex SHA-256 of the parsed source lines
    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref()
    }

    pub fn is_disallow_all(&self) -> bool {
        self.disallow_all
    }

    pub fn is_allow_all(&self) -> bool {
        self.allow_all
    }

    pub fn regex_mode(&self) -> bool {
        self.regex_mode
    }

    pub fn window_scan(&self) -> WindowScan {
        self.window_scan
    }

    /// `Sitemap` URLs, or `None` when the file lists none
    pub fn sitemaps(&self) -> Option<&[String]> {
        non_empty(&self.sitemaps)
    }

    /// `Indexpage` URLs, or `None` when the file lists none
    pub fn index_pages(&self) -> Option<&[String]> {
        non_empty(&self.index_pages)
    }

    /// The first explicit group that applies to `agent`
    fn explicit_entry(&self, agent: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.applies_to(agent))
    }

    /// The explicit group for `agent`, falling back to the default group
    fn select_entry(&self, agent: &str) -> Option<&Entry> {
        self.explicit_entry(agent).or(self.default_entry.as_ref())
    }

    /// Checks if `agent` may fetch `url`
    ///
    /// # Returns
    ///
    /// * `Ok(false)` - The URL is disallowed, or the document was never loaded
    /// * `Ok(true)` - The URL is allowed, including when no group applies
    /// * `Err(PolicyError::MalformedRule)` - Regex mode hit an invalid pattern
    pub fn can_fetch(&self, agent: &str, url: &str) -> Result<bool, PolicyError> {
        if self.disallow_all {
            return Ok(false);
        }
        if self.allow_all {
            return Ok(true);
        }
        if !self.is_loaded() {
            return Ok(false);
        }

        let path = request_path(url);
        match self.select_entry(agent) {
            Some(entry) => entry.allowance(&path, self.regex_mode),
            None => Ok(true),
        }
    }

    /// The crawl delay in seconds for `agent`
    ///
    /// A matching explicit group answers even when it has no delay; the
    /// default group is only consulted when no explicit group applies.
    pub fn crawl_delay(&self, agent: &str) -> Option<u64> {
        if !self.is_loaded() {
            return None;
        }
        self.select_entry(agent).and_then(|entry| entry.crawl_delay)
    }

    /// The request rate in force for `agent` at `time`
    ///
    /// The selected group's windows are scanned first, then its plain rate;
    /// the default group is searched the same way afterwards.
    pub fn request_rate(&self, agent: &str, time: NaiveTime) -> Option<RateSpec> {
        if !self.is_loaded() {
            return None;
        }
        let seconds = time.num_seconds_from_midnight();

        let lookup = |entry: &Entry| {
            entry
                .request_rate_windows
                .iter()
                .find(|window| window.is_active(seconds))
                .map(|window| window.rate)
                .or(entry.default_request_rate)
        };

        self.explicit_entry(agent)
            .and_then(lookup)
            .or_else(|| self.default_entry.as_ref().and_then(lookup))
    }

    /// Whether `time` is inside the visit window for `agent`
    ///
    /// Returns `None` when neither the selected group nor the default group
    /// declares a `Visit-time`.
    pub fn check_visit_time(&self, agent: &str, time: NaiveTime) -> Option<bool> {
        if !self.is_loaded() {
            return None;
        }
        let seconds = time.num_seconds_from_midnight();

        let entry = self
            .explicit_entry(agent)
            .filter(|entry| !entry.visit_times.is_empty())
            .or_else(|| {
                self.default_entry
                    .as_ref()
                    .filter(|entry| !entry.visit_times.is_empty())
            })?;

        let allowed = match self.window_scan {
            WindowScan::SourceCompatible => entry.visit_times[0].contains(seconds),
            WindowScan::AllWindows => entry.visit_times.iter().any(|w| w.contains(seconds)),
        };
        Some(allowed)
    }

    /// Removes `Clean-param` parameters from `url`
    ///
    /// Rules of the matching explicit group apply first, then those of the
    /// default group. A rule applies when the URL path is contained in its
    /// path scope.
    pub fn url_cleanup(&self, agent: &str, url: &str) -> Option<String> {
        if !self.is_loaded() {
            return None;
        }

        let rules: Vec<_> = self
            .explicit_entry(agent)
            .into_iter()
            .chain(self.default_entry.as_ref())
            .flat_map(|entry| entry.clean_params.iter())
            .collect();

        Some(remove_query_params(url, |path, name| {
            rules
                .iter()
                .any(|rule| rule.name == name && rule.path_scope.contains(path))
        }))
    }
}

impl fmt::Display for PolicyDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .entries
            .iter()
            .chain(self.default_entry.as_ref())
            .map(|entry| entry.to_string())
            .collect();
        write!(f, "{}", rendered.join("\n\n"))
    }
}

fn non_empty(items: &[String]) -> Option<&[String]> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}
