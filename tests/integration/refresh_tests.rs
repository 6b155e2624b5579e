//! Fetch-outcome mapping and whole-document refresh

use std::io::Write;
use std::sync::Arc;
use sumi_robots::robots::load_file;
use sumi_robots::{FetchOutcome, PolicyDocument, SharedPolicy};
use tempfile::NamedTempFile;

#[test]
fn test_fetch_outcomes() {
    let denied = PolicyDocument::from_fetch(FetchOutcome::Status(403));
    assert!(!denied.can_fetch("SumiBot", "https://example.com/").unwrap());

    let missing = PolicyDocument::from_fetch(FetchOutcome::Status(404));
    assert!(missing.can_fetch("SumiBot", "https://example.com/admin").unwrap());

    let unavailable = PolicyDocument::from_fetch(FetchOutcome::Status(500));
    assert!(!unavailable.can_fetch("SumiBot", "https://example.com/").unwrap());
    assert_eq!(unavailable.crawl_delay("SumiBot"), None);
}

#[test]
fn test_refresh_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"User-agent: *\nDisallow: /v1\n").unwrap();
    file.flush().unwrap();

    let shared = SharedPolicy::new(PolicyDocument::unloaded());
    assert!(!shared.snapshot().can_fetch("SumiBot", "https://example.com/").unwrap());

    shared.replace(load_file(file.path()).unwrap());
    let first = shared.snapshot();
    assert!(!first.can_fetch("SumiBot", "https://example.com/v1/a").unwrap());

    // Re-parsing identical content yields the same fingerprint
    let again = load_file(file.path()).unwrap();
    assert_eq!(again.fingerprint(), first.fingerprint());

    let mut updated = NamedTempFile::new().unwrap();
    updated.write_all(b"User-agent: *\nDisallow: /v2\n").unwrap();
    updated.flush().unwrap();

    let previous = shared.replace(load_file(updated.path()).unwrap());
    assert!(Arc::ptr_eq(&previous, &first));
    assert!(shared.snapshot().can_fetch("SumiBot", "https://example.com/v1/a").unwrap());
    assert_ne!(shared.snapshot().fingerprint(), first.fingerprint());
}
