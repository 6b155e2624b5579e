//! End-to-end policy resolution over realistic robots.txt files

use chrono::NaiveTime;
use sumi_robots::config::parse_config;
use sumi_robots::{parse_str, PolicyDocument, WindowScan};

const EXTENDED_ROBOTS: &str = "\
# Example extended robots.txt
Robot-version: 2.0.0
Sitemap: https://example.com/sitemap.xml

User-agent: SumiBot
User-agent: RippleBot
Disallow: /private
Allow: /private/press
Noindex: /drafts
Crawl-delay: 2
Request-rate: 20/1h 08:00-12:00
Request-rate: 1/10s
Visit-time: 06:00-20:00
Clean-param: ref&utm_source /shop

User-agent: *
Disallow: /admin
Disallow:
Crawl-delay: 10
Request-rate: 1/1m
Clean-param: sid /search

User-agent: *
Disallow: /

Indexpage: https://example.com/index.html
";

fn at(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn document() -> PolicyDocument {
    parse_str(EXTENDED_ROBOTS)
}

#[test]
fn test_structure() {
    let doc = document();
    assert_eq!(doc.entries().len(), 1);
    assert_eq!(doc.entries()[0].user_agents, vec!["SumiBot", "RippleBot"]);
    assert_eq!(doc.default_entry().unwrap().rule_lines.len(), 2);
    assert_eq!(
        doc.sitemaps().unwrap(),
        ["https://example.com/sitemap.xml".to_string()]
    );
    assert_eq!(
        doc.index_pages().unwrap(),
        ["https://example.com/index.html".to_string()]
    );
}

#[test]
fn test_named_agent_rules() {
    let doc = document();
    let agent = "SumiBot/1.0 (+https://sumi.example/bot)";

    assert!(doc.can_fetch(agent, "https://example.com/").unwrap());
    assert!(!doc.can_fetch(agent, "https://example.com/private").unwrap());
    // First match wins: the broader Disallow comes first
    assert!(!doc.can_fetch(agent, "https://example.com/private/press").unwrap());
    assert!(!doc.can_fetch(agent, "https://example.com/drafts/1").unwrap());
    // The default group's rules never apply to a named agent
    assert!(doc.can_fetch(agent, "https://example.com/admin").unwrap());
}

#[test]
fn test_agent_matching_is_case_insensitive() {
    let doc = document();
    assert!(!doc.can_fetch("ripplebot", "https://example.com/private").unwrap());
}

#[test]
fn test_default_group_for_other_agents() {
    let doc = document();
    assert!(!doc.can_fetch("OtherBot/3.0", "https://example.com/admin/users").unwrap());
    // Empty Disallow is allow-all, and the second `*` group is ignored
    assert!(doc.can_fetch("OtherBot/3.0", "https://example.com/page").unwrap());
}

#[test]
fn test_crawl_delay() {
    let doc = document();
    assert_eq!(doc.crawl_delay("SumiBot"), Some(2));
    assert_eq!(doc.crawl_delay("OtherBot"), Some(10));
}

#[test]
fn test_request_rate() {
    let doc = document();

    let morning = doc.request_rate("SumiBot", at(8, 0)).unwrap();
    assert_eq!((morning.count, morning.period_seconds), (20, 3600));

    let evening = doc.request_rate("SumiBot", at(18, 0)).unwrap();
    assert_eq!((evening.count, evening.period_seconds), (1, 10));

    let other = doc.request_rate("OtherBot", at(9, 0)).unwrap();
    assert_eq!((other.count, other.period_seconds), (1, 60));
}

#[test]
fn test_visit_time() {
    let doc = document();
    assert_eq!(doc.check_visit_time("SumiBot", at(12, 0)), Some(true));
    assert_eq!(doc.check_visit_time("SumiBot", at(21, 0)), Some(false));
    assert_eq!(doc.check_visit_time("OtherBot", at(21, 0)), None);
}

#[test]
fn test_url_cleanup() {
    let doc = document();

    assert_eq!(
        doc.url_cleanup("SumiBot", "https://example.com/shop?item=7&ref=mail&utm_source=x")
            .unwrap(),
        "https://example.com/shop?item=7"
    );
    // The default group's clean-params also apply to named agents
    assert_eq!(
        doc.url_cleanup("SumiBot", "https://example.com/search?q=x&sid=1")
            .unwrap(),
        "https://example.com/search?q=x"
    );
    assert_eq!(
        doc.url_cleanup("OtherBot", "https://example.com/shop?ref=mail")
            .unwrap(),
        "https://example.com/shop?ref=mail"
    );
}

#[test]
fn test_round_trip_rendering() {
    let doc = document();
    let reparsed = parse_str(&doc.to_string());

    assert_eq!(reparsed.entries(), doc.entries());
    assert_eq!(reparsed.default_entry(), doc.default_entry());
}

#[test]
fn test_config_driven_resolution() {
    let config = parse_config("[resolver]\nregex-mode = true\nwindow-scan = \"all-windows\"\n").unwrap();
    let doc = parse_str(
        "User-agent: *\nDisallow: /.*/print\nVisit-time: 01:00-02:00\nVisit-time: 20:00-22:00\n",
    )
    .configured(&config.resolver);

    assert_eq!(doc.window_scan(), WindowScan::AllWindows);
    assert!(!doc.can_fetch("SumiBot", "https://example.com/article/print").unwrap());
    assert_eq!(doc.check_visit_time("SumiBot", at(21, 0)), Some(true));
}
