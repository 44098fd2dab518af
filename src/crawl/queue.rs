// src/crawl/queue.rs
// =============================================================================
// This module drains a CrawlSession's frontier, one page at a time.
//
// How it works:
// 1. Take the next unvisited page from the session's worklist (marks it visited)
// 2. Fetch the page HTML
// 3. Extract every <a href> together with its text
// 4. Hand them to the session, which classifies them and queues same-site links
// 5. Repeat until the worklist is empty or a ceiling is reached
//
// A failed fetch only ends that branch: it is logged and the loop moves on
// to the next queued page.
//
// Rust concepts:
// - &mut borrowing: the crawler mutates the session it is given
// - async/await: fetches are awaited one after another (no parallelism)
// =============================================================================

use std::time::Duration;

use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use super::frontier::CrawlSession;
use crate::error::ScoutError;

// Knobs for a site crawl
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub timeout: Duration,
    pub user_agent: String,
    /// Pages fetched per run before the crawl gives up
    pub max_pages: usize,
    /// Link hops from the start URL; None means unlimited
    pub max_depth: Option<usize>,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: "Mozilla/5.0".to_string(),
            max_pages: 2000,
            max_depth: None,
        }
    }
}

// What happened during one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub pages_fetched: usize,
    pub failures: usize,
    /// True when max_pages stopped the crawl with pages still queued
    pub hit_page_ceiling: bool,
}

#[derive(Debug, Clone)]
pub struct SiteCrawler {
    client: Client,
    settings: CrawlSettings,
}

impl SiteCrawler {
    pub fn new(settings: CrawlSettings) -> Result<Self, ScoutError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ScoutError::Network {
                url: String::new(),
                message: format!("could not build HTTP client: {}", e),
            })?;

        Ok(Self { client, settings })
    }

    // Crawls until the session's frontier is empty
    //
    // Never fails: per-page errors are logged and counted in the stats.
    pub async fn crawl(&self, session: &mut CrawlSession) -> CrawlStats {
        let mut stats = CrawlStats::default();
        session.limit_depth(self.settings.max_depth);

        while let Some(item) = session.next_page() {
            if stats.pages_fetched >= self.settings.max_pages {
                let dropped = session.abandon_frontier() + 1;
                // The popped page was marked visited but never fetched
                session.visited.remove(&item.url);
                warn!(
                    site = %session.base_url(),
                    max_pages = self.settings.max_pages,
                    dropped,
                    "page ceiling reached, stopping crawl"
                );
                stats.hit_page_ceiling = true;
                break;
            }

            debug!(url = %item.url, depth = item.depth, pending = session.pending(), "visiting");
            stats.pages_fetched += 1;

            let html = match self.fetch_page(&item.url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(error = %e, "skipping page");
                    stats.failures += 1;
                    continue;
                }
            };

            let page = match Url::parse(&item.url) {
                Ok(url) => url,
                Err(e) => {
                    warn!(url = %item.url, error = %e, "page URL does not parse");
                    stats.failures += 1;
                    continue;
                }
            };

            session.absorb_links(&page, item.depth, extract_anchors(&html));
        }

        stats
    }

    // Fetches a web page and returns its HTML content
    //
    // Anything but 200 OK counts as a failure. reqwest decodes the body
    // using the charset from the Content-Type header.
    async fn fetch_page(&self, url: &str) -> Result<String, ScoutError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.settings.user_agent)
            .send()
            .await
            .map_err(|e| ScoutError::from_reqwest(url, e))?;

        if response.status() != StatusCode::OK {
            return Err(ScoutError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| ScoutError::Parse {
                url: url.to_string(),
                message: e.to_string(),
            })
    }
}

// Returns (href, anchor text) for every <a href> in document order
//
// html5ever never rejects markup, so broken pages just yield fewer anchors.
pub fn extract_anchors(html: &str) -> Vec<(String, String)> {
    let document = Html::parse_document(html);

    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?.trim();
            let text = element.text().collect::<String>();
            Some((href.to_string(), text.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::SiteRecord;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn html(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(
            format!("<html><body>{}</body></html>", body),
            "text/html; charset=utf-8",
        )
    }

    async fn page(server: &MockServer, at: &str, body: &str, hits: u64) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(html(body))
            .expect(hits)
            .mount(server)
            .await;
    }

    fn crawler() -> SiteCrawler {
        SiteCrawler::new(CrawlSettings {
            timeout: Duration::from_secs(2),
            ..CrawlSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn test_extract_anchors_keeps_order_and_text() {
        let anchors = extract_anchors(
            r#"<a href="/a"> First </a><a>no href</a><a href="/b"><span>Sec</span>ond</a>"#,
        );
        assert_eq!(
            anchors,
            vec![
                ("/a".to_string(), "First".to_string()),
                ("/b".to_string(), "Second".to_string())
            ]
        );
    }

    #[test]
    fn test_extract_anchors_survives_broken_markup() {
        let anchors = extract_anchors(r#"<div><a href="/x">x</a><p><<<</div></table>"#);
        assert_eq!(anchors.len(), 1);
    }

    #[tokio::test]
    async fn test_cycle_visits_each_page_once() {
        let server = MockServer::start().await;
        page(&server, "/", r#"<a href="/b">B</a>"#, 1).await;
        page(&server, "/b", r#"<a href="/">A</a><a href="/b">B</a>"#, 1).await;

        let start = format!("{}/", server.uri());
        let mut session = CrawlSession::new(&start);
        let stats = crawler().crawl(&mut session).await;

        assert_eq!(stats.pages_fetched, 2);
        assert_eq!(session.visited.len(), 2);
        assert!(session.visited.contains(&format!("{}/b", server.uri())));
    }

    #[tokio::test]
    async fn test_sends_browser_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("user-agent", "Mozilla/5.0"))
            .respond_with(html(""))
            .expect(1)
            .mount(&server)
            .await;

        let mut session = CrawlSession::new(&format!("{}/", server.uri()));
        let stats = crawler().crawl(&mut session).await;
        assert_eq!(stats.failures, 0);
    }

    #[tokio::test]
    async fn test_assets_are_never_fetched_or_visited() {
        let server = MockServer::start().await;
        page(
            &server,
            "/",
            r#"<a href="/report.pdf">Report</a><a href="/logo.png">Logo</a>"#,
            1,
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/report.pdf"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut session = CrawlSession::new(&format!("{}/", server.uri()));
        crawler().crawl(&mut session).await;

        assert_eq!(session.visited.len(), 1);
        assert!(session.external_links.is_empty());
    }

    #[tokio::test]
    async fn test_collects_emails_careers_and_external_links() {
        let server = MockServer::start().await;
        page(
            &server,
            "/",
            r#"
            <a href="mailto:info@acme.nl">Mail</a>
            <a href="mailto:info@acme.nl">Mail</a>
            <a href="/werken-bij">Werken bij</a>
            <a href="https://www.linkedin.com/company/acme">LinkedIn</a>
            <a href="/blog/post">Blog</a>
            <a href="javascript:void(0)">Menu</a>
            "#,
            1,
        )
        .await;
        page(&server, "/werken-bij", r#"<a href="mailto:jobs@acme.nl">Apply</a>"#, 1).await;

        let mut session = CrawlSession::new(&format!("{}/", server.uri()));
        crawler().crawl(&mut session).await;

        assert_eq!(session.emails.len(), 2);
        assert!(session.emails.contains("jobs@acme.nl"));
        assert!(session
            .career_links
            .contains(&format!("{}/werken-bij", server.uri())));
        assert!(session
            .external_links
            .contains("https://www.linkedin.com/company/acme"));
        assert_eq!(session.visited.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_page_does_not_stop_crawl() {
        let server = MockServer::start().await;
        page(&server, "/", r#"<a href="/broken">x</a><a href="/ok">y</a>"#, 1).await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        page(&server, "/ok", r#"<a href="mailto:ok@acme.nl">m</a>"#, 1).await;

        let mut session = CrawlSession::new(&format!("{}/", server.uri()));
        let stats = crawler().crawl(&mut session).await;

        assert_eq!(stats.failures, 1);
        assert_eq!(stats.pages_fetched, 3);
        assert!(session.emails.contains("ok@acme.nl"));
        // Failed pages stay visited so they are not retried
        assert!(session.visited.contains(&format!("{}/broken", server.uri())));
    }

    #[tokio::test]
    async fn test_unreachable_site_is_not_an_error() {
        let mut session = CrawlSession::new("http://127.0.0.1:9/");
        let stats = crawler().crawl(&mut session).await;
        assert_eq!(stats.failures, 1);
        assert_eq!(session.visited.len(), 1);
    }

    #[tokio::test]
    async fn test_page_ceiling_stops_crawl() {
        let server = MockServer::start().await;
        page(&server, "/", r#"<a href="/a">a</a><a href="/b">b</a>"#, 1).await;
        page(&server, "/a", "", 1).await;
        page(&server, "/b", "", 0).await;

        let crawler = SiteCrawler::new(CrawlSettings {
            max_pages: 2,
            ..CrawlSettings::default()
        })
        .unwrap();
        let mut session = CrawlSession::new(&format!("{}/", server.uri()));
        let stats = crawler.crawl(&mut session).await;

        assert!(stats.hit_page_ceiling);
        assert_eq!(stats.pages_fetched, 2);
        assert_eq!(session.visited.len(), 2);
        assert_eq!(session.pending(), 0);
    }

    #[tokio::test]
    async fn test_depth_ceiling_limits_descent() {
        let server = MockServer::start().await;
        page(&server, "/", r#"<a href="/one">1</a>"#, 1).await;
        page(&server, "/one", r#"<a href="/two">2</a><a href="/jobs">Jobs</a>"#, 1).await;
        page(&server, "/two", "", 0).await;

        let crawler = SiteCrawler::new(CrawlSettings {
            max_depth: Some(1),
            ..CrawlSettings::default()
        })
        .unwrap();
        let mut session = CrawlSession::new(&format!("{}/", server.uri()));
        crawler.crawl(&mut session).await;

        assert_eq!(session.visited.len(), 2);
        // Links on the deepest page are still classified
        assert!(session
            .career_links
            .contains(&format!("{}/jobs", server.uri())));
    }

    #[tokio::test]
    async fn test_depth_ceiling_counts_shortest_path() {
        let server = MockServer::start().await;
        page(&server, "/", r#"<a href="/a">a</a><a href="/b">b</a>"#, 1).await;
        page(&server, "/a", r#"<a href="/b">b</a>"#, 1).await;
        page(&server, "/b", r#"<a href="/c">c</a>"#, 1).await;
        page(&server, "/c", r#"<a href="/d">d</a>"#, 1).await;
        page(&server, "/d", "", 0).await;

        let crawler = SiteCrawler::new(CrawlSettings {
            max_depth: Some(2),
            ..CrawlSettings::default()
        })
        .unwrap();
        let mut session = CrawlSession::new(&format!("{}/", server.uri()));
        let stats = crawler.crawl(&mut session).await;

        assert_eq!(stats.pages_fetched, 4);
        assert!(session.visited.contains(&format!("{}/c", server.uri())));
        assert!(!session.visited.contains(&format!("{}/d", server.uri())));
    }

    #[tokio::test]
    async fn test_recrawl_without_new_links_changes_nothing() {
        let server = MockServer::start().await;
        page(
            &server,
            "/",
            r#"<a href="/jobs">Jobs</a><a href="mailto:a@acme.nl">a</a><a href="https://x.org">x</a>"#,
            2,
        )
        .await;
        page(&server, "/jobs", r#"<a href="/">Home</a>"#, 2).await;

        let start = format!("{}/", server.uri());
        let crawler = crawler();

        let mut first = CrawlSession::new(&start);
        crawler.crawl(&mut first).await;
        let mut record = SiteRecord::new("Acme", "1").with_website(&start);
        first.write_back(&mut record);

        // Resumed session: everything already visited, nothing fetched
        let mut resumed = CrawlSession::from_record(&record, false).unwrap();
        let stats = crawler.crawl(&mut resumed).await;
        assert_eq!(stats.pages_fetched, 0);

        // Forced session: everything fetched again, same result
        let mut forced = CrawlSession::from_record(&record, true).unwrap();
        crawler.crawl(&mut forced).await;

        for session in [&resumed, &forced] {
            assert_eq!(session.visited, first.visited);
            assert_eq!(session.career_links, first.career_links);
            assert_eq!(session.emails, first.emails);
            assert_eq!(session.external_links, first.external_links);
        }
    }
}
