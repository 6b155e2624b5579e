//! Request-rate and visit-time value objects
//!
//! Both directives describe daily intervals as seconds from midnight. The
//! interval checks are naive: a window whose start is after its end (one that
//! would cross midnight) never matches.

use crate::PolicyError;
use regex::{Captures, Regex};
use std::fmt;
use std::sync::OnceLock;

const RATE_PATTERN: &str = r"^([0-9]+)/([0-9]+)([wdhms])?";
const RATE_WINDOW_PATTERN: &str =
    r"^([0-9]+)/([0-9]+)([wdhms])?\s+([0-9]{2}):([0-9]{2})[ -]([0-9]{2}):([0-9]{2})";
const VISIT_TIME_PATTERN: &str = r"([0-9]{2}):([0-9]{2})[- ]([0-9]{2}):([0-9]{2})";

fn rate_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(RATE_PATTERN).expect("rate pattern is valid"))
}

fn rate_window_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(RATE_WINDOW_PATTERN).expect("rate window pattern is valid"))
}

fn visit_time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VISIT_TIME_PATTERN).expect("visit-time pattern is valid"))
}

/// Converts an hour/minute pair into seconds from midnight
pub fn time_decode(hours: u32, minutes: u32) -> u32 {
    hours * 3600 + minutes * 60
}

/// Period unit suffix of a `Request-rate` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateUnit {
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl RateUnit {
    fn from_suffix(suffix: Option<&str>) -> Self {
        match suffix {
            Some("w") => Self::Weeks,
            Some("d") => Self::Days,
            Some("h") => Self::Hours,
            Some("m") => Self::Minutes,
            _ => Self::Seconds,
        }
    }

    /// Number of seconds in one unit
    pub fn seconds(&self) -> u64 {
        match self {
            Self::Weeks => 7 * 24 * 3600,
            Self::Days => 24 * 3600,
            Self::Hours => 3600,
            Self::Minutes => 60,
            Self::Seconds => 1,
        }
    }
}

/// A request budget: `count` requests per `period_seconds`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateSpec {
    pub count: u32,
    pub period_seconds: u64,
}

impl RateSpec {
    /// Creates a rate from a count and a period expressed in `unit`
    pub fn new(count: u32, period: u64, unit: RateUnit) -> Self {
        Self {
            count,
            period_seconds: period.saturating_mul(unit.seconds()),
        }
    }

    /// Parses the rate portion of a `Request-rate` value (`D/T[unit]`)
    pub fn parse(value: &str) -> Result<Self, PolicyError> {
        let caps = rate_regex()
            .captures(value)
            .ok_or_else(|| malformed(value))?;
        rate_from_captures(&caps, value)
    }
}

impl fmt::Display for RateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}s", self.count, self.period_seconds)
    }
}

/// A request rate that only applies during a daily interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    pub rate: RateSpec,
    pub start_seconds: u32,
    pub end_seconds: u32,
}

impl RateWindow {
    /// Parses a windowed `Request-rate` value (`D/T[unit] HH:MM-HH:MM`)
    pub fn parse(value: &str) -> Result<Self, PolicyError> {
        let caps = rate_window_regex()
            .captures(value)
            .ok_or_else(|| malformed(value))?;
        let field = |i| number::<u32>(&caps, i).ok_or_else(|| malformed(value));
        Ok(Self {
            rate: rate_from_captures(&caps, value)?,
            start_seconds: time_decode(field(4)?, field(5)?),
            end_seconds: time_decode(field(6)?, field(7)?),
        })
    }

    /// Whether `seconds` (from midnight) falls inside the window
    pub fn is_active(&self, seconds: u32) -> bool {
        self.start_seconds <= seconds && seconds < self.end_seconds
    }
}

impl fmt::Display for RateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-{}",
            self.rate,
            clock(self.start_seconds),
            clock(self.end_seconds)
        )
    }
}

/// A `Visit-time` interval; both ends are inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_seconds: u32,
    pub end_seconds: u32,
}

impl TimeWindow {
    pub fn new(start_seconds: u32, end_seconds: u32) -> Self {
        Self {
            start_seconds,
            end_seconds,
        }
    }

    /// Parses a `Visit-time` value (`HH:MM-HH:MM` or `HH:MM HH:MM`)
    pub fn parse(value: &str) -> Result<Self, PolicyError> {
        let malformed = || PolicyError::MalformedDirective {
            directive: "visit-time".to_string(),
            value: value.to_string(),
        };
        let caps = visit_time_regex().captures(value).ok_or_else(malformed)?;
        let field = |i| number::<u32>(&caps, i).ok_or_else(malformed);
        Ok(Self::new(
            time_decode(field(1)?, field(2)?),
            time_decode(field(3)?, field(4)?),
        ))
    }

    pub fn contains(&self, seconds: u32) -> bool {
        self.start_seconds <= seconds && seconds <= self.end_seconds
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", clock(self.start_seconds), clock(self.end_seconds))
    }
}

fn clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 3600, (seconds % 3600) / 60)
}

fn malformed(value: &str) -> PolicyError {
    PolicyError::MalformedDirective {
        directive: "request-rate".to_string(),
        value: value.to_string(),
    }
}

fn number<T: std::str::FromStr>(caps: &Captures<'_>, index: usize) -> Option<T> {
    caps.get(index).and_then(|m| m.as_str().parse().ok())
}

fn rate_from_captures(caps: &Captures<'_>, value: &str) -> Result<RateSpec, PolicyError> {
    let count = number(caps, 1).ok_or_else(|| malformed(value))?;
    let period = number(caps, 2).ok_or_else(|| malformed(value))?;
    let unit = RateUnit::from_suffix(caps.get(3).map(|m| m.as_str()));
    Ok(RateSpec::new(count, period, unit))
}
