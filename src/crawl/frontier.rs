// src/crawl/frontier.rs
// =============================================================================
// Per-site crawl state: what has been visited, what is still pending, and
// everything collected along the way.
//
// One CrawlSession exists per company per run. It owns all four result sets
// exclusively, so nothing here needs locking. The pending pages live in an
// explicit worklist instead of the call stack, which keeps deep sites from
// blowing up recursion. A URL sits in the worklist at most once.
//
// Without a depth ceiling the worklist is a stack (depth-first). With one it
// is a queue, so every page is first reached along its shortest path and the
// ceiling counts real link hops from the start URL.
//
// Rust concepts:
// - HashSet: membership checks for URLs and addresses
// - VecDeque: pop_back gives depth-first order, pop_front breadth-first
// =============================================================================

use std::collections::{HashSet, VecDeque};

use tracing::info;
use url::Url;

use super::classify::{self, Link};
use crate::records::SiteRecord;

// A page waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierItem {
    pub url: String,
    /// Link hops from the start URL
    pub depth: usize,
}

#[derive(Debug, Clone)]
pub struct CrawlSession {
    base_url: String,
    base_key: String,
    pub visited: HashSet<String>,
    pub career_links: HashSet<String>,
    pub emails: HashSet<String>,
    pub external_links: HashSet<String>,
    frontier: VecDeque<FrontierItem>,
    /// URLs currently in `frontier`
    queued: HashSet<String>,
    max_depth: Option<usize>,
}

impl CrawlSession {
    // Starts an empty session for a site
    //
    // The start URL is stored the way Url serializes it, so
    // "https://acme.nl" and a link back to "/" are the same page.
    pub fn new(base_url: &str) -> Self {
        let base_url = Url::parse(base_url)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| base_url.to_string());
        let base_url = base_url.as_str();

        let mut session = Self {
            base_url: base_url.to_string(),
            base_key: classify::normalize(base_url),
            visited: HashSet::new(),
            career_links: HashSet::new(),
            emails: HashSet::new(),
            external_links: HashSet::new(),
            frontier: VecDeque::new(),
            queued: HashSet::new(),
            max_depth: None,
        };
        session.enqueue(base_url.to_string(), 0);
        session
    }

    // Starts a session for a stored company
    //
    // Returns None when the record has no http(s) website to start from,
    // which includes the search failure sentinel. Unless `force` is set the
    // session picks up where the last saved crawl left off.
    pub fn from_record(record: &SiteRecord, force: bool) -> Option<Self> {
        if !record.has_website() {
            return None;
        }
        let website = record.website.as_deref()?.trim();
        let start = Url::parse(website).ok()?;
        if !matches!(start.scheme(), "http" | "https") {
            return None;
        }
        let mut session = Self::new(start.as_str());

        if !force {
            session.visited = record.visited.clone();
            session.external_links = record.external_links.clone();
            session.emails = record.emails.clone();
            if let Some(pages) = &record.careers_page {
                session.career_links.extend(pages.iter().cloned());
            }
        }

        Some(session)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn pending(&self) -> usize {
        self.frontier.len()
    }

    // Sets the depth ceiling; pages at `max_depth` are fetched but their
    // links are not followed
    //
    // Only call this before the crawl starts: it also picks the worklist order.
    pub fn limit_depth(&mut self, max_depth: Option<usize>) {
        self.max_depth = max_depth;
    }

    // Pops the next unvisited page and marks it visited
    //
    // Marking happens before the fetch so a page linked twice is only ever
    // fetched once, even when the fetch fails.
    pub fn next_page(&mut self) -> Option<FrontierItem> {
        loop {
            let item = match self.max_depth {
                Some(_) => self.frontier.pop_front(),
                None => self.frontier.pop_back(),
            }?;
            self.queued.remove(&item.url);
            if self.visited.insert(item.url.clone()) {
                return Some(item);
            }
        }
    }

    // No-op when the URL is already visited or waiting
    fn enqueue(&mut self, url: String, depth: usize) {
        if self.visited.contains(&url) || !self.queued.insert(url.clone()) {
            return;
        }
        self.frontier.push_back(FrontierItem { url, depth });
    }

    // Classifies every anchor found on `page` and queues same-site links
    //
    // Parameters:
    //   page: URL of the page the anchors came from
    //   depth: depth of that page
    //   anchors: (href, anchor text) pairs in document order
    //
    // On a page at the depth ceiling links are still classified and
    // recorded, just not queued.
    pub fn absorb_links<I>(&mut self, page: &Url, depth: usize, anchors: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let descend = self.max_depth.map_or(true, |max| depth < max);
        let mut children = Vec::new();

        for (href, text) in anchors {
            if self.visited.contains(&href) {
                continue;
            }

            match classify::classify(&href, &text, page, &self.base_key) {
                Link::Asset | Link::PseudoLink | Link::Noise | Link::Unresolvable => {}
                Link::Mail(address) => {
                    self.record_email(address);
                }
                Link::External { url, career } => {
                    if career {
                        self.record_career_link(url);
                    }
                    self.external_links.insert(href);
                }
                Link::SameSite { url, career } => {
                    if career {
                        self.record_career_link(url.clone());
                    }
                    if descend {
                        children.push(url);
                    }
                }
            }
        }

        // A stack pops from the back, so push in reverse to visit the first
        // link on the page first
        if self.max_depth.is_none() {
            children.reverse();
        }
        for url in children {
            self.enqueue(url, depth + 1);
        }
    }

    // Returns true the first time an address is seen
    pub fn record_email(&mut self, address: String) -> bool {
        if self.emails.contains(&address) {
            return false;
        }
        info!(email = %address, site = %self.base_url, "found email");
        self.emails.insert(address)
    }

    pub fn record_career_link(&mut self, url: String) -> bool {
        if self.career_links.contains(&url) {
            return false;
        }
        info!(url = %url, site = %self.base_url, "found career link");
        self.career_links.insert(url)
    }

    // Drops whatever is still queued; used when a ceiling stops the crawl
    pub fn abandon_frontier(&mut self) -> usize {
        let dropped = self.frontier.len();
        self.frontier.clear();
        self.queued.clear();
        dropped
    }

    // Copies the accumulated sets onto the record
    pub fn write_back(&self, record: &mut SiteRecord) {
        let mut careers: Vec<String> = self.career_links.iter().cloned().collect();
        careers.sort();
        record.careers_page = Some(careers);
        record.visited = self.visited.clone();
        record.external_links = self.external_links.clone();
        record.emails = self.emails.clone();
    }
}
