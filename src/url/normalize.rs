use ::url::form_urlencoded;
use ::url::{ParseError, Url};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left literal when quoting a path.
///
/// Unreserved marks, the path separator and `*` (the match-everything rule)
/// pass through; everything else is percent-encoded.
const PATH_QUOTE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/')
    .remove(b'*');

/// Decodes percent-escapes, replacing invalid UTF-8 sequences
///
/// # Examples
///
/// ```
/// use sumi_robots::url::unquote;
///
/// assert_eq!(unquote("/caf%C3%A9%20menu"), "/café menu");
/// ```
pub fn unquote(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

/// Percent-encodes a decoded path
///
/// Rule paths and request paths both go through this function so that
/// prefix comparison happens between identically encoded strings.
///
/// # Examples
///
/// ```
/// use sumi_robots::url::quote_path;
///
/// assert_eq!(quote_path("/a b?c=d"), "/a%20b%3Fc%3Dd");
/// assert_eq!(quote_path("*"), "*");
/// ```
pub fn quote_path(value: &str) -> String {
    utf8_percent_encode(value, PATH_QUOTE).to_string()
}

/// Builds the normalized request path that rule lines are matched against
///
/// # Normalization Steps
///
/// 1. Decode percent-escapes
/// 2. Drop scheme and authority, keeping path, params, query and fragment
/// 3. Re-quote the result
/// 4. An empty result becomes `/`
///
/// # Examples
///
/// ```
/// use sumi_robots::url::request_path;
///
/// assert_eq!(request_path("https://example.com/private/page"), "/private/page");
/// assert_eq!(request_path("https://example.com"), "/");
/// assert_eq!(request_path("/search?q=1"), "/search%3Fq%3D1");
/// ```
pub fn request_path(url_str: &str) -> String {
    let decoded = unquote(url_str);
    let quoted = quote_path(strip_authority(&decoded));

    if quoted.is_empty() {
        "/".to_string()
    } else {
        quoted
    }
}

/// Returns the part of a URL after its scheme and network location
fn strip_authority(url: &str) -> &str {
    let rest = match url.find("://") {
        Some(idx) if is_scheme(&url[..idx]) => &url[idx + 3..],
        _ => match url.strip_prefix("//") {
            Some(rest) => rest,
            None => return url,
        },
    };

    match rest.find(['/', '?', '#']) {
        Some(idx) => &rest[idx..],
        None => "",
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Base used to resolve relative references before reading their path.
const RELATIVE_BASE: &str = "http://relative.invalid/";

/// Removes query parameters from a URL
///
/// `should_remove` is called with the URL path and each parameter name.
/// Only the query changes: the remaining parameters keep their original
/// order and spelling, and a query left empty is dropped entirely. Relative
/// references are cleaned the same way as absolute URLs. A URL with nothing
/// to remove, or one that does not parse, is returned unchanged.
///
/// # Examples
///
/// ```
/// use sumi_robots::url::remove_query_params;
///
/// let cleaned = remove_query_params("https://example.com/search?q=x&sid=1", |_, name| name == "sid");
/// assert_eq!(cleaned, "https://example.com/search?q=x");
///
/// let cleaned = remove_query_params("/search?q=x&sid=1", |_, name| name == "sid");
/// assert_eq!(cleaned, "/search?q=x");
/// ```
pub fn remove_query_params<F>(url_str: &str, mut should_remove: F) -> String
where
    F: FnMut(&str, &str) -> bool,
{
    let parsed = match Url::parse(url_str) {
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(RELATIVE_BASE)
            .and_then(|base| Url::options().base_url(Some(&base)).parse(url_str)),
        other => other,
    };
    let url = match parsed {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Leaving unparsable URL '{}' unchanged: {}", url_str, e);
            return url_str.to_string();
        }
    };

    // A '?' after the '#' belongs to the fragment
    let Some((head, rest)) = url_str.split_once('?') else {
        return url_str.to_string();
    };
    if head.contains('#') {
        return url_str.to_string();
    }
    let (query, fragment) = match rest.split_once('#') {
        Some((query, fragment)) => (query, Some(fragment)),
        None => (rest, None),
    };

    let path = url.path();
    let mut removed = false;
    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let remove = form_urlencoded::parse(pair.as_bytes())
                .next()
                .is_some_and(|(name, _)| should_remove(path, &name));
            removed |= remove;
            !remove
        })
        .collect();

    if !removed {
        return url_str.to_string();
    }

    let mut cleaned = head.to_string();
    if !kept.is_empty() {
        cleaned.push('?');
        cleaned.push_str(&kept.join("&"));
    }
    if let Some(fragment) = fragment {
        cleaned.push('#');
        cleaned.push_str(fragment);
    }
    cleaned
}
