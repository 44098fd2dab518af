// src/report.rs
// =============================================================================
// Prints what a crawl found, either as plain text or as JSON.
//
// Sets have no order, so everything is sorted before printing to keep the
// output stable between runs.
// =============================================================================

use anyhow::Result;
use serde::Serialize;

use crate::crawl::{CrawlSession, CrawlStats};

// Serializable snapshot of a finished session
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CrawlReport {
    pub site: String,
    pub pages_fetched: usize,
    pub failures: usize,
    pub career_links: Vec<String>,
    pub emails: Vec<String>,
    pub external_links: Vec<String>,
    pub visited: Vec<String>,
}

impl CrawlReport {
    pub fn new(session: &CrawlSession, stats: &CrawlStats) -> Self {
        Self {
            site: session.base_url().to_string(),
            pages_fetched: stats.pages_fetched,
            failures: stats.failures,
            career_links: sorted(&session.career_links),
            emails: sorted(&session.emails),
            external_links: sorted(&session.external_links),
            visited: sorted(&session.visited),
        }
    }
}

fn sorted<'a>(set: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut items: Vec<String> = set.into_iter().cloned().collect();
    items.sort();
    items
}

// Prints the report either as JSON or as a text listing
pub fn print_report(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", render_text(report));
    }
    Ok(())
}

pub fn render_text(report: &CrawlReport) -> String {
    let mut out = String::new();
    let sections: [(&str, &[String]); 4] = [
        ("External links", &report.external_links),
        ("Visited links", &report.visited),
        ("Career links", &report.career_links),
        ("Emails", &report.emails),
    ];

    for (title, items) in sections {
        out.push_str(&format!("{} for {}:\n", title, report.site));
        for item in items {
            out.push_str(&format!("  {}\n", item));
        }
    }

    out.push_str(&format!(
        "\n📊 Summary: {} page(s) fetched, {} failed, {} career link(s), {} email(s)\n",
        report.pages_fetched,
        report.failures,
        report.career_links.len(),
        report.emails.len()
    ));
    out
}
