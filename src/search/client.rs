// src/search/client.rs
// =============================================================================
// Looks a company up on a search engine and takes the first link.
//
// Per query:
// - while another worker owns the backoff, wait one delay unit and look again
//   (this does not count as an attempt and sends no request)
// - 429: claim the backoff, sleep `delay` units, grow the delay, try again
// - any other answer: release the backoff and return the page's first <a href>
// - transport error: give up on this query straight away
// - after max_attempts 429s: give up with SEARCH_FAILED
//
// There is no structured API behind this, only an HTML page, so a page
// without a link is a normal outcome rather than an error.
// =============================================================================

use std::time::Duration;

use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use super::backoff::{next_delay, BackoffState, WorkerId};
use crate::error::ScoutError;

/// Stored as the website when a search gave nothing usable
pub const SEARCH_FAILED: &str = "Failed to get result after several attempts.";

// Polls never spin faster than this, even with a zero delay unit
const MIN_POLL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Queried as `<endpoint>?q=<company name>`
    pub endpoint: Url,
    pub user_agent: String,
    pub timeout: Duration,
    pub max_attempts: u32,
    /// Length of one backoff unit
    pub delay_unit: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: Url::parse("https://www.google.com/search").expect("valid default endpoint"),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_11_5) \
                         AppleWebKit/537.36 (KHTML, like Gecko) Safari/537.36"
                .to_string(),
            timeout: Duration::from_secs(30),
            max_attempts: 50,
            delay_unit: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(String),
    /// The result page had no link in it
    NoResult,
    /// Transport failure; holds the error description
    RequestFailed(String),
    /// Still rate limited after this many attempts
    Exhausted { attempts: u32 },
}

impl SearchOutcome {
    // What goes into the record's website field
    pub fn website_value(&self) -> String {
        match self {
            SearchOutcome::Found(url) => url.clone(),
            SearchOutcome::RequestFailed(message) => message.clone(),
            SearchOutcome::NoResult | SearchOutcome::Exhausted { .. } => SEARCH_FAILED.to_string(),
        }
    }

    // Transport failures are not saved so the next run tries again
    pub fn should_persist(&self) -> bool {
        !matches!(self, SearchOutcome::RequestFailed(_))
    }

    pub fn into_error(self) -> Option<ScoutError> {
        match self {
            SearchOutcome::Exhausted { attempts } => Some(ScoutError::RateLimited { attempts }),
            _ => None,
        }
    }
}

// One query's outcome plus what it cost
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: SearchOutcome,
    /// Requests actually sent
    pub requests: u32,
    /// Sum of the 429 backoff sleeps, in delay units
    pub backoff_units: u64,
}

#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    settings: SearchSettings,
}

impl SearchClient {
    pub fn new(settings: SearchSettings) -> Result<Self, ScoutError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ScoutError::Network {
                url: settings.endpoint.to_string(),
                message: format!("could not build HTTP client: {}", e),
            })?;

        Ok(Self { client, settings })
    }

    // Resolves `query` to the first result link
    //
    // Whatever happens, `worker` no longer owns the backoff when this returns,
    // so an exhausted worker can't leave the others waiting forever.
    pub async fn first_result(
        &self,
        query: &str,
        worker: WorkerId,
        backoff: &BackoffState,
    ) -> Resolution {
        let resolution = self.resolve(query, worker, backoff).await;
        if backoff.release(worker) {
            debug!(%worker, "released backoff on exit");
        }
        resolution
    }

    async fn resolve(&self, query: &str, worker: WorkerId, backoff: &BackoffState) -> Resolution {
        let mut attempts = 0u32;
        let mut delay = 1u64;
        let mut requests = 0u32;
        let mut backoff_units = 0u64;

        while attempts < self.settings.max_attempts {
            if backoff.blocks(worker) {
                tokio::time::sleep(self.units(delay).max(MIN_POLL)).await;
                continue;
            }

            requests += 1;
            let sent = self
                .client
                .get(self.settings.endpoint.clone())
                .query(&[("q", query)])
                .header(USER_AGENT, &self.settings.user_agent)
                .send()
                .await;

            let response = match sent {
                Ok(response) => response,
                Err(e) => {
                    let error = ScoutError::from_reqwest(self.settings.endpoint.as_str(), e);
                    warn!(%worker, query = %query, error = %error, "search request failed");
                    return Resolution {
                        outcome: SearchOutcome::RequestFailed(error.to_string()),
                        requests,
                        backoff_units,
                    };
                }
            };

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                backoff.claim(worker);
                warn!(%worker, delay, "429 Too Many Requests, backing off");
                tokio::time::sleep(self.units(delay)).await;
                backoff_units += delay;
                attempts += 1;
                delay = next_delay(delay);
                continue;
            }

            if backoff.release(worker) {
                info!(%worker, "rate limit cleared, releasing other workers");
            }

            let outcome = match response.text().await {
                Ok(body) => match first_link(&body) {
                    Some(url) => SearchOutcome::Found(url),
                    None => SearchOutcome::NoResult,
                },
                Err(e) => SearchOutcome::RequestFailed(
                    ScoutError::from_reqwest(self.settings.endpoint.as_str(), e).to_string(),
                ),
            };

            return Resolution {
                outcome,
                requests,
                backoff_units,
            };
        }

        Resolution {
            outcome: SearchOutcome::Exhausted { attempts },
            requests,
            backoff_units,
        }
    }

    fn units(&self, delay: u64) -> Duration {
        let delay = u32::try_from(delay).unwrap_or(u32::MAX);
        self.settings.delay_unit.saturating_mul(delay)
    }
}

// The href of the first anchor on the page, if it has one
pub fn first_link(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a").ok()?;
    let first = document.select(&selector).next()?;
    first
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
}
