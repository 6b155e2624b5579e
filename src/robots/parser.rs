//! Robots.txt parser implementation
//!
//! The parser is a fold over input lines. All state (the current group, the
//! state machine position, collected entries) lives in a [`DocumentBuilder`]
//! that is threaded through the fold and turned into an immutable
//! [`PolicyDocument`] at the end.

use crate::robots::entry::{CleanParam, Entry};
use crate::robots::policy::PolicyDocument;
use crate::robots::rate::{RateSpec, RateWindow, TimeWindow};
use crate::robots::rule::RuleLine;
use crate::url::unquote;
use crate::PolicyError;
use chrono::{DateTime, Utc};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

/// Parser state machine positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ParseState {
    /// Outside any group
    #[default]
    Start,
    /// Saw a `User-agent` line but no rule yet
    InAgentGroup,
    /// Saw at least one rule line for the current group
    InRuleGroup,
}

/// Accumulated parser state
#[derive(Default)]
struct DocumentBuilder {
    state: ParseState,
    current: Entry,
    entries: Vec<Entry>,
    default_entry: Option<Entry>,
    sitemaps: Vec<String>,
    index_pages: Vec<String>,
    hasher: Sha256,
}

impl DocumentBuilder {
    fn feed(mut self, raw: &str) -> Self {
        self.hasher.update(raw.as_bytes());
        self.hasher.update(b"\n");

        if raw.trim().is_empty() {
            self.end_group();
            return self;
        }

        let line = match raw.find('#') {
            Some(idx) => &raw[..idx],
            None => raw,
        }
        .trim();
        if line.is_empty() {
            return self;
        }

        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim().to_lowercase();
            let value = unquote(value.trim());
            self.directive(&key, &value);
        }
        self
    }

    fn end_group(&mut self) {
        match self.state {
            ParseState::InAgentGroup => {
                tracing::trace!("Discarding group without rules: {:?}", self.current.user_agents);
                self.current = Entry::new();
            }
            ParseState::InRuleGroup => self.commit(),
            ParseState::Start => {}
        }
        self.state = ParseState::Start;
    }

    /// Moves the current group into the document
    ///
    /// The first `*` group becomes the default entry; later ones are dropped.
    fn commit(&mut self) {
        let entry = std::mem::take(&mut self.current);

        if entry.is_default() {
            if self.default_entry.is_none() {
                tracing::debug!("Committing default entry ({} rules)", entry.rule_lines.len());
                self.default_entry = Some(entry);
            } else {
                tracing::debug!("Ignoring additional default entry");
            }
        } else {
            tracing::debug!(
                "Committing entry for {:?} ({} rules)",
                entry.user_agents,
                entry.rule_lines.len()
            );
            self.entries.push(entry);
        }
    }

    fn directive(&mut self, key: &str, value: &str) {
        let in_group = self.state != ParseState::Start;

        match key {
            "user-agent" => {
                if self.state == ParseState::InRuleGroup {
                    self.commit();
                }
                self.current.user_agents.push(value.to_string());
                self.state = ParseState::InAgentGroup;
            }
            "disallow" | "allow" | "noindex" if in_group => {
                let rule = match key {
                    "allow" => RuleLine::new(value, true),
                    "disallow" => RuleLine::new(value, false),
                    _ => RuleLine::noindex(value),
                };
                self.current.rule_lines.push(rule);
                self.state = ParseState::InRuleGroup;
            }
            "crawl-delay" if in_group => {
                match parse_crawl_delay(value) {
                    Ok(delay) => self.current.crawl_delay = Some(delay),
                    Err(e) => skip(e),
                }
                self.state = ParseState::InRuleGroup;
            }
            "request-rate" if in_group => {
                if let Ok(window) = RateWindow::parse(value) {
                    self.current.request_rate_windows.push(window);
                } else {
                    match RateSpec::parse(value) {
                        Ok(rate) => self.current.default_request_rate = Some(rate),
                        Err(e) => skip(e),
                    }
                }
                self.state = ParseState::InRuleGroup;
            }
            "clean-param" => match parse_clean_param(value) {
                Ok(params) => self.current.clean_params.extend(params),
                Err(e) => skip(e),
            },
            "visit-time" => match TimeWindow::parse(value) {
                Ok(window) => self.current.visit_times.push(window),
                Err(e) => skip(e),
            },
            // Sitemap lines are independent of user-agent groups
            "sitemap" => self.sitemaps.push(value.to_string()),
            "indexpage" => self.index_pages.push(value.to_string()),
            "robot-version" => log_robot_version(value),
            "disallow" | "allow" | "noindex" | "crawl-delay" | "request-rate" => {
                tracing::trace!("Ignoring '{}' outside of a user-agent group", key);
            }
            _ => tracing::trace!("Ignoring unknown directive '{}'", key),
        }
    }

    fn finish(mut self, fetched_at: DateTime<Utc>) -> PolicyDocument {
        if self.state == ParseState::InRuleGroup {
            self.commit();
        }

        PolicyDocument {
            entries: self.entries,
            default_entry: self.default_entry,
            sitemaps: self.sitemaps,
            index_pages: self.index_pages,
            last_fetched_at: Some(fetched_at),
            fingerprint: Some(hex::encode(self.hasher.finalize())),
            ..PolicyDocument::default()
        }
    }
}

fn skip(error: PolicyError) {
    tracing::debug!("Skipping directive: {}", error);
}

fn parse_crawl_delay(value: &str) -> Result<u64, PolicyError> {
    let malformed = || PolicyError::MalformedDirective {
        directive: "crawl-delay".to_string(),
        value: value.to_string(),
    };

    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(malformed());
    }
    value.parse().map_err(|_| malformed())
}

/// Parses `name[&name...] path`
fn parse_clean_param(value: &str) -> Result<Vec<CleanParam>, PolicyError> {
    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(names), Some(path_scope)) => Ok(names
            .split('&')
            .filter(|name| !name.is_empty())
            .map(|name| CleanParam {
                name: name.to_string(),
                path_scope: path_scope.to_string(),
            })
            .collect()),
        _ => Err(PolicyError::MalformedDirective {
            directive: "clean-param".to_string(),
            value: value.to_string(),
        }),
    }
}

fn log_robot_version(value: &str) {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^([0-9]+)\.([0-9]+)(?:\.([0-9]+))?").expect("version pattern is valid")
    });

    match re.captures(value) {
        Some(caps) => tracing::debug!(
            "Robot-version {}.{}.{}",
            &caps[1],
            &caps[2],
            caps.get(3).map_or("0", |m| m.as_str())
        ),
        None => tracing::debug!("Unrecognized robot-version '{}'", value),
    }
}

/// Parses robots.txt lines, stamping the document with `fetched_at`
///
/// # Arguments
///
/// * `lines` - Raw lines of the robots.txt file, without line terminators
/// * `fetched_at` - Timestamp recorded as the document's last fetch time
pub fn parse_lines_at<I, S>(lines: I, fetched_at: DateTime<Utc>) -> PolicyDocument
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .fold(DocumentBuilder::default(), |builder, line| {
            builder.feed(line.as_ref())
        })
        .finish(fetched_at)
}

/// Parses robots.txt lines, stamping the document with the current time
///
/// # Examples
///
/// ```
/// use sumi_robots::parse_lines;
///
/// let doc = parse_lines(["User-agent: *", "Disallow: /admin"]);
/// assert!(!doc.can_fetch("SumiBot/1.0", "https://example.com/admin").unwrap());
/// assert!(doc.can_fetch("SumiBot/1.0", "https://example.com/").unwrap());
/// ```
pub fn parse_lines<I, S>(lines: I) -> PolicyDocument
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    parse_lines_at(lines, Utc::now())
}

/// Parses the full text of a robots.txt file
pub fn parse_str(content: &str) -> PolicyDocument {
    parse_lines(content.lines())
}
