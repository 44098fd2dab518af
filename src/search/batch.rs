// src/search/batch.rs
// =============================================================================
// Finds a website for every stored company that doesn't have one yet.
//
// The pending companies are dealt round-robin over a fixed number of workers.
// Each worker walks its own share sequentially; the workers run concurrently
// and share one SearchClient, one record store and one BackoffState.
// =============================================================================

use anyhow::{Context, Result};
use futures::future::join_all;
use tracing::{info, warn};

use super::backoff::{BackoffState, WorkerId};
use super::client::SearchClient;
use crate::records::{RecordStore, SiteRecord};

#[derive(Debug, Default)]
pub struct SearchBatchSummary {
    pub workers: usize,
    /// Companies that already had a website
    pub skipped: usize,
    /// (company name, stored website value) in completion order per worker
    pub resolved: Vec<(String, String)>,
    /// Companies whose search failed at the transport level
    pub failed: Vec<(String, String)>,
}

pub async fn find_websites(
    client: &SearchClient,
    store: &dyn RecordStore,
    workers: usize,
) -> Result<SearchBatchSummary> {
    let records = store.load_all().context("could not load company records")?;
    let total = records.len();
    let pending: Vec<SiteRecord> = records.into_iter().filter(|r| !r.has_website()).collect();

    let workers = workers.max(1);
    let mut shares: Vec<Vec<SiteRecord>> = (0..workers).map(|_| Vec::new()).collect();
    for (i, record) in pending.into_iter().enumerate() {
        shares[i % workers].push(record);
    }

    let backoff = BackoffState::new();
    let backoff = &backoff;

    let runs = shares.into_iter().enumerate().map(move |(index, share)| async move {
        let worker = WorkerId::from_index(index);
        let mut resolved = Vec::new();
        let mut failed = Vec::new();

        for mut record in share {
            let resolution = client.first_result(&record.name, worker, backoff).await;
            let value = resolution.outcome.website_value();
            info!(%worker, company = %record.name, result = %value, requests = resolution.requests, "search finished");
            if let Some(e) = resolution.outcome.clone().into_error() {
                warn!(%worker, company = %record.name, error = %e, "giving up on company");
            }

            if !resolution.outcome.should_persist() {
                failed.push((record.name, value));
                continue;
            }

            record.website = Some(value.clone());
            match store.save(&record) {
                Ok(()) => resolved.push((record.name, value)),
                Err(e) => {
                    warn!(company = %record.name, error = %e, "could not save record");
                    failed.push((record.name, e.to_string()));
                }
            }
        }

        (resolved, failed)
    });

    let mut summary = SearchBatchSummary {
        workers,
        ..SearchBatchSummary::default()
    };
    for (resolved, failed) in join_all(runs).await {
        summary.resolved.extend(resolved);
        summary.failed.extend(failed);
    }
    summary.skipped = total - summary.resolved.len() - summary.failed.len();

    Ok(summary)
}
