// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing, filtered by RUST_LOG)
// 2. Parse command-line arguments using clap
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 2 = error)
//
// Diagnostics go to stderr through tracing; the results themselves are
// printed to stdout so `--json` output can be piped.
// =============================================================================

mod cli;
mod crawl;
mod error;
mod records;
mod report;
mod search;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use url::Url;

use cli::{Cli, Commands, CrawlArgs};
use crawl::{CrawlSession, CrawlSettings, SiteCrawler};
use records::JsonDirStore;
use search::{SearchClient, SearchSettings};

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sponsor_scout=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let store = JsonDirStore::new(&cli.records_dir);

    match cli.command {
        Commands::FindWebsites {
            workers,
            endpoint,
            max_attempts,
            delay_unit_ms,
        } => {
            let settings = SearchSettings {
                endpoint: Url::parse(&endpoint)
                    .with_context(|| format!("invalid search endpoint '{}'", endpoint))?,
                max_attempts,
                delay_unit: Duration::from_millis(delay_unit_ms),
                ..SearchSettings::default()
            };
            let workers = workers.unwrap_or_else(default_workers);
            handle_find_websites(&store, settings, workers).await
        }
        Commands::Crawl {
            force,
            confirm_delay_secs,
            limits,
        } => handle_crawl(&store, force, confirm_delay_secs, &limits).await,
        Commands::CrawlSite {
            website_url,
            json,
            limits,
        } => handle_crawl_site(&website_url, json, &limits).await,
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn crawl_settings(limits: &CrawlArgs) -> CrawlSettings {
    CrawlSettings {
        timeout: Duration::from_secs(limits.timeout_secs),
        max_pages: limits.max_pages,
        max_depth: limits.max_depth,
        ..CrawlSettings::default()
    }
}

// Handles the 'find-websites' subcommand
async fn handle_find_websites(
    store: &JsonDirStore,
    settings: SearchSettings,
    workers: usize,
) -> Result<i32> {
    println!("🔍 Looking up websites in {}", store.dir().display());
    println!("🧵 Workers: {}", workers);

    let client = SearchClient::new(settings)?;
    let summary = search::find_websites(&client, store, workers).await?;

    for (name, website) in &summary.resolved {
        println!("{}: {}", name, website);
    }
    for (name, error) in &summary.failed {
        println!("{}: ⚠️  {}", name, error);
    }

    println!();
    println!("📊 Summary:");
    println!("   ✅ Resolved: {}", summary.resolved.len());
    println!("   ❌ Failed: {}", summary.failed.len());
    println!("   ⏭️  Already known: {}", summary.skipped);
    Ok(0)
}

// Handles the 'crawl' subcommand
async fn handle_crawl(
    store: &JsonDirStore,
    force: bool,
    confirm_delay_secs: u64,
    limits: &CrawlArgs,
) -> Result<i32> {
    if force {
        warn!("forcing a re-crawl of all companies");
        println!("⚠️  Forcing re-crawl of all companies, starting in {}s...", confirm_delay_secs);
        tokio::time::sleep(Duration::from_secs(confirm_delay_secs)).await;
    }

    let crawler = SiteCrawler::new(crawl_settings(limits))?;
    let summary = crawl::crawl_companies(&crawler, store, force).await?;

    for (name, links) in &summary.career_links {
        println!("{}:", name);
        for link in links {
            println!("   {}", link);
        }
    }

    println!();
    println!("📊 Summary:");
    println!("   🕸️  Crawled: {}", summary.crawled);
    println!("   ⏭️  Skipped: {}", summary.skipped);
    println!("   💼 With career links: {}", summary.career_links.len());
    Ok(0)
}

// Handles the 'crawl-site' subcommand
async fn handle_crawl_site(website_url: &str, json: bool, limits: &CrawlArgs) -> Result<i32> {
    Url::parse(website_url).with_context(|| format!("invalid URL '{}'", website_url))?;

    let crawler = SiteCrawler::new(crawl_settings(limits))?;
    let mut session = CrawlSession::new(website_url);
    let stats = crawler.crawl(&mut session).await;

    report::print_report(&report::CrawlReport::new(&session, &stats), json)?;
    Ok(0)
}
