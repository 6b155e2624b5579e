//! Sumi-Robots main entry point
//!
//! This is the command-line interface for inspecting robots.txt policies.

use anyhow::Context;
use chrono::NaiveTime;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use sumi_robots::config::{load_config_with_hash, Config};
use sumi_robots::robots::load_file;
use sumi_robots::PolicyDocument;
use tracing_subscriber::EnvFilter;

/// Sumi-Robots: an extended robots.txt policy engine
///
/// Parses a robots.txt file (including Crawl-delay, Request-rate,
/// Visit-time and Clean-param extensions) and answers one query against it.
#[derive(Parser, Debug)]
#[command(name = "sumi-robots")]
#[command(version = "1.0.0")]
#[command(about = "Query an extended robots.txt policy", long_about = None)]
struct Cli {
    /// Path to the robots.txt file
    #[arg(value_name = "ROBOTS_FILE")]
    robots: PathBuf,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether an agent may fetch a URL
    Check {
        url: String,
        /// User agent (defaults to the configured name)
        #[arg(short, long)]
        agent: Option<String>,
    },
    /// Show the crawl delay for an agent
    Delay {
        #[arg(short, long)]
        agent: Option<String>,
    },
    /// Show the request rate in force at a time of day (HH:MM)
    Rate {
        #[arg(value_parser = parse_time)]
        time: NaiveTime,
        #[arg(short, long)]
        agent: Option<String>,
    },
    /// Check a time of day (HH:MM) against the visit-time window
    Visit {
        #[arg(value_parser = parse_time)]
        time: NaiveTime,
        #[arg(short, long)]
        agent: Option<String>,
    },
    /// Strip clean-param parameters from a URL
    Clean {
        url: String,
        #[arg(short, long)]
        agent: Option<String>,
    },
    /// List sitemaps and index pages
    Sitemaps,
    /// Print the parsed groups
    Dump,
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|e| format!("expected HH:MM, got '{}': {}", value, e))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let document = load_file(&cli.robots)
        .with_context(|| format!("Failed to read {}", cli.robots.display()))?
        .configured(&config.resolver);
    tracing::debug!(
        "Parsed {} groups (fingerprint: {})",
        document.entries().len(),
        document.fingerprint().unwrap_or("-")
    );

    run_command(&cli.command, &document, &config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_robots=warn"),
            1 => EnvFilter::new("sumi_robots=info"),
            2 => EnvFilter::new("sumi_robots=debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_command(command: &Command, document: &PolicyDocument, config: &Config) -> anyhow::Result<()> {
    let agent_or_default =
        |agent: &Option<String>| agent.clone().unwrap_or_else(|| config.user_agent.name.clone());

    match command {
        Command::Check { url, agent } => {
            let agent = agent_or_default(agent);
            let allowed = document.can_fetch(&agent, url)?;
            println!("{}", if allowed { "allowed" } else { "disallowed" });
        }
        Command::Delay { agent } => match document.crawl_delay(&agent_or_default(agent)) {
            Some(delay) => println!("{}", delay),
            None => println!("none"),
        },
        Command::Rate { time, agent } => {
            match document.request_rate(&agent_or_default(agent), *time) {
                Some(rate) => println!("{} requests per {} seconds", rate.count, rate.period_seconds),
                None => println!("none"),
            }
        }
        Command::Visit { time, agent } => {
            match document.check_visit_time(&agent_or_default(agent), *time) {
                Some(true) => println!("inside visit window"),
                Some(false) => println!("outside visit window"),
                None => println!("no visit window"),
            }
        }
        Command::Clean { url, agent } => {
            if let Some(cleaned) = document.url_cleanup(&agent_or_default(agent), url) {
                println!("{}", cleaned);
            }
        }
        Command::Sitemaps => {
            for sitemap in document.sitemaps().unwrap_or_default() {
                println!("Sitemap: {}", sitemap);
            }
            for page in document.index_pages().unwrap_or_default() {
                println!("Indexpage: {}", page);
            }
        }
        Command::Dump => println!("{}", document),
    }

    Ok(())
}
