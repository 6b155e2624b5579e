//! Path rule lines (`Allow`, `Disallow`, `Noindex`)

use crate::url::quote_path;
use crate::PolicyError;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// A single path rule
///
/// Paths are stored quoted so they compare directly against the output of
/// [`crate::url::request_path`]. The regex-mode pattern is compiled on
/// first use and kept with the rule.
#[derive(Debug, Clone)]
pub struct RuleLine {
    path: String,
    allow: bool,
    noindex: bool,
    compiled: OnceLock<Result<Regex, String>>,
}

impl PartialEq for RuleLine {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.allow == other.allow && self.noindex == other.noindex
    }
}

impl Eq for RuleLine {}

impl RuleLine {
    /// Creates an `Allow` (`allow == true`) or `Disallow` rule from a decoded path
    ///
    /// An empty `Disallow` path means "allow everything".
    pub fn new(path: &str, allow: bool) -> Self {
        Self::build(path, allow, false)
    }

    /// Creates a `Noindex` rule; it denies fetching like `Disallow`
    pub fn noindex(path: &str) -> Self {
        Self::build(path, false, true)
    }

    fn build(path: &str, allow: bool, noindex: bool) -> Self {
        Self {
            path: quote_path(path),
            allow: allow || path.is_empty(),
            noindex,
            compiled: OnceLock::new(),
        }
    }

    /// The quoted path pattern
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether a match grants access
    pub fn is_allow(&self) -> bool {
        self.allow
    }

    /// Whether this rule came from a `Noindex` directive
    pub fn is_noindex(&self) -> bool {
        self.noindex
    }

    /// Checks whether this rule applies to a normalized request path
    ///
    /// # Arguments
    ///
    /// * `url_path` - Output of [`crate::url::request_path`]
    /// * `regex_mode` - When the prefix test fails, retry with the path
    ///   compiled as a regular expression anchored at the start
    ///
    /// # Returns
    ///
    /// * `Ok(bool)` - Whether the rule matches
    /// * `Err(PolicyError::MalformedRule)` - Regex mode and the path is not a valid pattern
    pub fn matches(&self, url_path: &str, regex_mode: bool) -> Result<bool, PolicyError> {
        if self.path == "*" || url_path.starts_with(&self.path) {
            return Ok(true);
        }
        if !regex_mode {
            return Ok(false);
        }

        let pattern = self
            .compiled
            .get_or_init(|| Regex::new(&format!("^(?:{})", self.path)).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|message| PolicyError::MalformedRule {
                pattern: self.path.clone(),
                message: message.clone(),
            })?;
        Ok(pattern.is_match(url_path))
    }
}

impl fmt::Display for RuleLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let directive = if self.noindex && !self.allow {
            "Noindex"
        } else if self.allow {
            "Allow"
        } else {
            "Disallow"
        };
        write!(f, "{}: {}", directive, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_match() {
        let rule = RuleLine::new("/private", false);
        assert!(rule.matches("/private", false).unwrap());
        assert!(rule.matches("/private/page", false).unwrap());
        assert!(!rule.matches("/public", false).unwrap());
    }

    #[test]
    fn test_star_matches_everything() {
        let rule = RuleLine::new("*", false);
        assert!(rule.matches("/", false).unwrap());
        assert!(rule.matches("/anything", false).unwrap());
    }

    #[test]
    fn test_empty_disallow_becomes_allow_all() {
        let rule = RuleLine::new("", false);
        assert!(rule.is_allow());
        assert_eq!(rule.path(), "");
        assert!(rule.matches("/any", false).unwrap());
    }

    #[test]
    fn test_path_is_quoted() {
        let rule = RuleLine::new("/a b", false);
        assert_eq!(rule.path(), "/a%20b");
        assert!(rule.matches("/a%20b/c", false).unwrap());
    }

    #[test]
    fn test_regex_mode_falls_back_to_pattern() {
        let rule = RuleLine::new("/.*/comments", false);
        assert!(!rule.matches("/post/comments", false).unwrap());
        assert!(rule.matches("/post/comments", true).unwrap());
        assert!(!rule.matches("/post/likes", true).unwrap());
    }

    #[test]
    fn test_regex_mode_is_anchored() {
        let rule = RuleLine::new("/a.c", false);
        assert!(rule.matches("/abc", true).unwrap());
        assert!(!rule.matches("/x/abc", true).unwrap());
    }

    #[test]
    fn test_regex_mode_malformed_pattern() {
        let rule = RuleLine::new("*x", false);
        let result = rule.matches("/other", true);
        assert!(matches!(result, Err(PolicyError::MalformedRule { .. })));
    }

    #[test]
    fn test_regex_compiled_once_per_rule() {
        let rule = RuleLine::new("/.*/comments", false);
        assert!(rule.compiled.get().is_none());
        assert!(!rule.matches("/post/comments", false).unwrap());
        assert!(rule.compiled.get().is_none());

        assert!(rule.matches("/post/comments", true).unwrap());
        assert!(matches!(rule.compiled.get(), Some(Ok(_))));
        assert!(!rule.matches("/post/likes", true).unwrap());
        assert_eq!(rule, RuleLine::new("/.*/comments", false));
    }

    #[test]
    fn test_malformed_pattern_error_repeats() {
        let rule = RuleLine::new("*x", false);
        assert!(rule.matches("/other", true).is_err());
        assert!(matches!(rule.compiled.get(), Some(Err(_))));
        assert!(matches!(
            rule.matches("/other", true),
            Err(PolicyError::MalformedRule { .. })
        ));
    }

    #[test]
    fn test_malformed_pattern_ignored_without_regex_mode() {
        let rule = RuleLine::new("*x", false);
        assert!(!rule.matches("/other", false).unwrap());
    }

    #[test]
    fn test_noindex_denies() {
        let rule = RuleLine::noindex("/drafts");
        assert!(!rule.is_allow());
        assert!(rule.is_noindex());
        assert_eq!(rule.to_string(), "Noindex: /drafts");
    }

    #[test]
    fn test_display() {
        assert_eq!(RuleLine::new("/a", true).to_string(), "Allow: /a");
        assert_eq!(RuleLine::new("/a", false).to_string(), "Disallow: /a");
        assert_eq!(RuleLine::new("", false).to_string(), "Allow: ");
    }
}
