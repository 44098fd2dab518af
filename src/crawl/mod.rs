// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Crawling from a company's homepage, driven by an explicit worklist
//   (depth-first, or breadth-first under a depth ceiling)
// - Same-site restriction (www-insensitive host comparison)
// - Collects career/contact links, mailto addresses and external links
// - Optional page and depth ceilings
//
// Submodules:
// - classify: pure link classification rules
// - frontier: per-site crawl state
// - queue: the fetch loop
// - batch: crawling every stored company
// =============================================================================

mod batch;
mod classify;
mod frontier;
mod queue;

pub use batch::crawl_companies;
pub use frontier::CrawlSession;
pub use queue::{CrawlSettings, CrawlStats, SiteCrawler};
