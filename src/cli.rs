// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Three subcommands:
// - find-websites: search for a website for every company that lacks one
// - crawl: crawl every company's website for careers pages and emails
// - crawl-site: crawl a single URL without touching the records
//
// Rust concepts:
// - Derive macros: clap generates the parser from these types
// - Option<T>: flags without a default value
// =============================================================================

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "sponsor-scout",
    version = "0.1.0",
    about = "Finds websites, careers pages and contact emails for visa-sponsoring companies",
    long_about = "sponsor-scout works through a directory of company records: it looks up a website \
                  for companies that have none, then crawls each website for careers pages, \
                  contact emails and outbound links."
)]
pub struct Cli {
    /// Directory holding one JSON record per company
    #[arg(long, global = true, default_value = "companies")]
    pub records_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up a website for every company that doesn't have one yet
    ///
    /// Example: sponsor-scout find-websites --workers 4
    FindWebsites {
        /// Number of concurrent search workers (default: number of CPU cores)
        #[arg(long)]
        workers: Option<usize>,

        /// Search endpoint, queried as <endpoint>?q=<company name>
        #[arg(long, default_value = "https://www.google.com/search")]
        endpoint: String,

        /// Give up on a company after this many rate-limited attempts
        #[arg(long, default_value_t = 50)]
        max_attempts: u32,

        /// Length of one backoff unit in milliseconds
        #[arg(long, default_value_t = 1000)]
        delay_unit_ms: u64,
    },

    /// Crawl every company's website for careers pages and emails
    ///
    /// Example: sponsor-scout crawl --max-pages 500
    Crawl {
        /// Re-crawl companies that already have a careers page, from scratch
        #[arg(long)]
        force: bool,

        /// Seconds to wait before a forced run starts (Ctrl-C to back out)
        #[arg(long, default_value_t = 3)]
        confirm_delay_secs: u64,

        #[command(flatten)]
        limits: CrawlArgs,
    },

    /// Crawl a single website and print what was found
    ///
    /// Example: sponsor-scout crawl-site https://example.com --json
    CrawlSite {
        /// Website URL to crawl (e.g., https://example.com)
        website_url: String,

        /// Output results in JSON format instead of a listing
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        limits: CrawlArgs,
    },
}

// Crawl knobs shared by `crawl` and `crawl-site`
#[derive(clap::Args, Debug, Clone)]
pub struct CrawlArgs {
    /// Stop a site after fetching this many pages
    #[arg(long, default_value_t = 2000)]
    pub max_pages: usize,

    /// Maximum link hops from the start page (default: unlimited)
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,
}
