// src/crawl/batch.rs
// =============================================================================
// Crawls every stored company that has a website, one after another.
//
// A company is skipped when it has no http(s) website yet (a failed search
// leaves a marker text there), or when a careers page was already recorded
// (unless forced). Records are only written back when
// the crawl found at least one career link.
// =============================================================================

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::frontier::CrawlSession;
use super::queue::SiteCrawler;
use crate::records::RecordStore;

// Outcome of a batch crawl
#[derive(Debug, Default)]
pub struct CrawlBatchSummary {
    pub crawled: usize,
    pub skipped: usize,
    /// Company name -> career links, for companies where any were found
    pub career_links: BTreeMap<String, Vec<String>>,
}

pub async fn crawl_companies(
    crawler: &SiteCrawler,
    store: &dyn RecordStore,
    force: bool,
) -> Result<CrawlBatchSummary> {
    let records = store.load_all().context("could not load company records")?;
    let mut summary = CrawlBatchSummary::default();

    for mut record in records {
        if !force && record.has_careers_page() {
            info!(company = %record.name, "skipping, careers page already found");
            summary.skipped += 1;
            continue;
        }

        let mut session = match CrawlSession::from_record(&record, force) {
            Some(session) => session,
            None => {
                debug!(company = %record.name, website = ?record.website, "skipping, no crawlable website");
                summary.skipped += 1;
                continue;
            }
        };

        info!(company = %record.name, website = %session.base_url(), "crawling");
        let stats = crawler.crawl(&mut session).await;
        summary.crawled += 1;
        info!(
            company = %record.name,
            pages = stats.pages_fetched,
            failures = stats.failures,
            hit_page_ceiling = stats.hit_page_ceiling,
            career_links = session.career_links.len(),
            "crawl finished"
        );

        if session.career_links.is_empty() {
            continue;
        }

        session.write_back(&mut record);
        if let Err(e) = store.save(&record) {
            warn!(company = %record.name, error = %e, "could not save record");
        }
        summary.career_links.insert(
            record.name.clone(),
            record.careers_page.clone().unwrap_or_default(),
        );
    }

    Ok(summary)
}
