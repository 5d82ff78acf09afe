//! Sumi-Audit main entry point
//!
//! This is the command-line interface for the Sumi-Audit SEO auditor.

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use std::path::{Path, PathBuf};
use sumi_audit::config::{load_config_with_hash, Config};
use sumi_audit::crawler::{run_crawl, CrawlRequest};
use sumi_audit::output::{
    generate_markdown_summary, print_statistics, write_json_report, AuditStatistics, RunInfo,
};
use tracing_subscriber::EnvFilter;

/// Sumi-Audit: a polite single-site SEO auditor
///
/// Sumi-Audit crawls one website (or every page listed in a sitemap) while
/// respecting robots.txt, loads each page over HTTP with a headless-browser
/// fallback, and reports critical, warning and notice level SEO issues.
#[derive(Parser, Debug)]
#[command(name = "sumi-audit")]
#[command(version = "1.0.0")]
#[command(about = "A polite single-site SEO auditor", long_about = None)]
struct Cli {
    /// Page or sitemap URL to start from
    #[arg(value_name = "START_URL")]
    start_url: String,

    /// Maximum link depth from the start URL (defaults to the config value)
    #[arg(long)]
    max_depth: Option<u32>,

    /// Maximum number of pages to process (defaults to the config value)
    #[arg(long)]
    max_pages: Option<usize>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the JSON report here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Also write a markdown summary to this file
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Print audit statistics after the crawl
    #[arg(long)]
    stats: bool,

    /// Validate config and request, then exit without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load_configuration(cli.config.as_deref())?;

    let request = CrawlRequest::new(
        cli.start_url.clone(),
        cli.max_depth.unwrap_or(config.crawl.max_depth),
        cli.max_pages.unwrap_or(config.crawl.max_pages),
    )
    .context("Invalid crawl request")?;

    if cli.dry_run {
        handle_dry_run(&config, &request);
        return Ok(());
    }

    handle_audit(&cli, &config, request, config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_audit=info,warn"),
            1 => EnvFilter::new("sumi_audit=debug,info"),
            2 => EnvFilter::new("sumi_audit=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so a JSON report on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file if one was given, otherwise uses defaults
fn load_configuration(path: Option<&Path>) -> anyhow::Result<(Config, Option<String>)> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok((Config::default(), None));
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok((config, Some(hash)))
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, request: &CrawlRequest) {
    println!("=== Sumi-Audit Dry Run ===\n");

    println!("Request:");
    println!("  Start URL: {}", request.start_url);
    println!(
        "  Mode: {}",
        if request.is_sitemap() { "sitemap" } else { "link crawl" }
    );
    println!("  Max depth: {}", request.max_depth);
    println!("  Max pages: {}", request.max_pages);

    println!("\nFetching:");
    println!("  Fast path timeout: {}s", config.fetch.fast_timeout_secs);
    println!("  Render timeout: {}s", config.fetch.render_timeout_secs);
    println!("  Retries: {}", config.fetch.retries);
    println!("  User agents: {}", config.fetch.user_agents.len());
    println!("  Proxies: {}", config.proxies.len());

    println!("\nRenderer:");
    println!("  WebDriver: {}", config.renderer.webdriver_url);

    println!("\nRobots:");
    println!("  User agent: {}", config.robots.user_agent);

    println!("\n✓ Configuration is valid");
}

/// Handles the main audit operation
async fn handle_audit(
    cli: &Cli,
    config: &Config,
    request: CrawlRequest,
    config_hash: Option<String>,
) -> anyhow::Result<()> {
    let start_url = request.start_url.clone();
    let started_at = Utc::now();

    let pages = match run_crawl(config, request).await {
        Ok(pages) => {
            tracing::info!("Audit completed: {} pages", pages.len());
            pages
        }
        Err(e) => {
            tracing::error!("Audit failed: {}", e);
            return Err(e.into());
        }
    };

    write_json_report(&pages, cli.output.as_deref()).context("Failed to write JSON report")?;

    if let Some(summary_path) = &cli.summary {
        let run = RunInfo {
            start_url,
            started_at,
            finished_at: Utc::now(),
            config_hash,
        };
        generate_markdown_summary(&run, &pages, summary_path)
            .with_context(|| format!("Failed to write summary to {}", summary_path.display()))?;
        tracing::info!("Summary written to: {}", summary_path.display());
    }

    if cli.stats {
        print_statistics(&AuditStatistics::from_pages(&pages));
    }

    Ok(())
}
