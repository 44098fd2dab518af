// src/crawl/classify.rs
// =============================================================================
// Decides what to do with every <a href> the crawler finds.
//
// All functions here are pure: they look at the href, the anchor text and the
// site's base URL and never touch the network or the crawl state. The session
// applies the rules in this order:
//
//   asset -> pseudo link -> mailto -> news/blog noise -> resolve ->
//   career candidate (recorded, keeps going) -> domain boundary
//
// Rust concepts:
// - Enums with data: Link carries the resolved URL only where it exists
// - &str slicing: strip_prefix / split_once return borrowed pieces
// =============================================================================

use url::Url;

// File suffixes we never fetch
const ASSET_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".png", ".jpeg", ".gif", ".svg", ".webp", ".bmp", ".tiff", ".ico",
    ".mp4", ".avi", ".mov", ".mp3", ".wav", ".flac", ".ogg",
    ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".odt", ".ods", ".odp",
    ".zip", ".rar", ".tar", ".gz", ".bz2", ".7z",
    ".dmg", ".exe", ".msi", ".apk", ".iso", ".img",
    ".csv", ".json", ".xml", ".sql", ".db", ".dbf",
];

// English and Dutch words that point at jobs or a way to get in touch
const CAREER_KEYWORDS: &[&str] = &[
    "career",
    "werken bij",
    "werken-bij",
    "vacature",
    "contact",
    "contact us",
    "contact form",
    "sollicitatie",
    "solliciteren",
    "job",
    "jobs",
    "baan",
];

const NOISE_MARKERS: &[&str] = &["news", "blog"];

const MAILTO: &str = "mailto:";

/// What the crawler should do with one link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Link {
    Asset,
    PseudoLink,
    /// The address after `mailto:`
    Mail(String),
    Noise,
    /// The href could not be joined onto the page URL
    Unresolvable,
    /// Leaves the site; recorded under its raw href, never fetched
    External { url: String, career: bool },
    /// Same site; a candidate for the frontier
    SameSite { url: String, career: bool },
}

// Classifies a single anchor
//
// Parameters:
//   href: the raw attribute value
//   text: the anchor's visible text
//   page: the page the link was found on (for relative links)
//   base: normalize() of the site's start URL
pub fn classify(href: &str, text: &str, page: &Url, base: &str) -> Link {
    if is_asset(href) {
        return Link::Asset;
    }
    if is_pseudo_link(href) {
        return Link::PseudoLink;
    }
    if is_mail_link(href) {
        return Link::Mail(href[MAILTO.len()..].to_string());
    }
    if is_noise(href) {
        return Link::Noise;
    }

    let url = match page.join(href) {
        Ok(url) => url.to_string(),
        Err(_) => return Link::Unresolvable,
    };
    let career = is_career_candidate(href, text);

    if normalize(&url) != base {
        Link::External { url, career }
    } else {
        Link::SameSite { url, career }
    }
}

/// Reduces a URL to `scheme://host[:port]` for same-site comparison
///
/// The host is lowercased and loses a leading `www.`, so
/// `https://www.example.com/` and `https://example.com` compare equal.
/// This is only a comparison key, never the stored form of a URL.
pub fn normalize(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().unwrap_or("").to_ascii_lowercase();
            let host = host.strip_prefix("www.").unwrap_or(&host);
            match parsed.port() {
                Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
                None => format!("{}://{}", parsed.scheme(), host),
            }
        }
        Err(_) => url.trim().trim_end_matches('/').to_ascii_lowercase(),
    }
}

pub fn is_asset(href: &str) -> bool {
    let path = href
        .split_once(['?', '#'])
        .map_or(href, |(path, _)| path)
        .to_ascii_lowercase();
    ASSET_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

pub fn is_pseudo_link(href: &str) -> bool {
    href.starts_with('#') || starts_with_ignore_case(href, "javascript:")
}

pub fn is_mail_link(href: &str) -> bool {
    href.starts_with(MAILTO)
}

pub fn is_noise(href: &str) -> bool {
    NOISE_MARKERS.iter().any(|marker| href.contains(marker))
}

pub fn is_career_candidate(href: &str, text: &str) -> bool {
    let href = href.to_lowercase();
    let text = text.to_lowercase();
    CAREER_KEYWORDS
        .iter()
        .any(|keyword| text.contains(keyword) || href.contains(keyword))
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://www.acme.nl/about/").unwrap()
    }

    fn base() -> String {
        normalize("https://www.acme.nl")
    }

    #[test]
    fn test_normalize_ignores_www_and_trailing_slash() {
        assert_eq!(normalize("https://www.example.com/"), normalize("https://example.com"));
        assert_eq!(normalize("https://example.com/a/b?c=d"), "https://example.com");
    }

    #[test]
    fn test_normalize_is_case_insensitive_on_host() {
        assert_eq!(normalize("https://WWW.Example.COM"), "https://example.com");
    }

    #[test]
    fn test_normalize_keeps_scheme_and_port() {
        assert_ne!(normalize("http://example.com"), normalize("https://example.com"));
        assert_eq!(normalize("http://127.0.0.1:8080/x"), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_assets_are_detected() {
        for href in ["/brochure.pdf", "logo.PNG", "/files/data.csv?v=2", "archive.tar.gz", "x.docx#p1"] {
            assert!(is_asset(href), "{href} should be an asset");
            assert_eq!(classify(href, "", &page(), &base()), Link::Asset);
        }
        assert!(!is_asset("/careers"));
        assert!(!is_asset("/pdf-viewer"));
    }

    #[test]
    fn test_pseudo_links() {
        assert!(is_pseudo_link("#top"));
        assert!(is_pseudo_link("javascript:void(0)"));
        assert!(is_pseudo_link("JavaScript:openMenu()"));
        assert!(!is_pseudo_link("/page#section"));
    }

    #[test]
    fn test_mail_address_is_href_without_prefix() {
        assert!(is_mail_link("mailto:jobs@acme.nl"));
        assert!(!is_mail_link("/contact"));
        for href in ["mailto:hr@acme.nl", "mailto:jobs@acme.nl?subject=Hi"] {
            assert_eq!(
                classify(href, "Mail us", &page(), &base()),
                Link::Mail(href.strip_prefix("mailto:").unwrap().to_string())
            );
        }
    }

    #[test]
    fn test_news_and_blog_are_noise() {
        assert!(is_noise("/news/2024/launch"));
        assert!(is_noise("https://blog.acme.nl"));
        assert_eq!(classify("/newsroom", "", &page(), &base()), Link::Noise);
        assert!(!is_noise("/products"));
    }

    #[test]
    fn test_career_keywords_match_text_or_href() {
        assert!(is_career_candidate("/werken-bij", ""));
        assert!(is_career_candidate("/p/123", "Werken bij Acme"));
        assert!(is_career_candidate("/Careers", ""));
        assert!(is_career_candidate("/x", "Vacatures"));
        assert!(is_career_candidate("/contact", ""));
        assert!(is_career_candidate("/solliciteren", ""));
        assert!(!is_career_candidate("/products", "Our products"));
    }

    #[test]
    fn test_same_site_link_is_resolved() {
        let link = classify("team", "Team", &page(), &base());
        assert_eq!(
            link,
            Link::SameSite {
                url: "https://www.acme.nl/about/team".to_string(),
                career: false
            }
        );
    }

    #[test]
    fn test_www_variant_is_same_site() {
        let link = classify("https://acme.nl/vacatures", "", &page(), &base());
        assert_eq!(
            link,
            Link::SameSite {
                url: "https://acme.nl/vacatures".to_string(),
                career: true
            }
        );
    }

    #[test]
    fn test_external_career_link_is_still_a_career_link() {
        let link = classify(
            "https://acme.wd3.myworkdayjobs.com/External",
            "Jobs",
            &page(),
            &base(),
        );
        assert!(matches!(link, Link::External { career: true, .. }));
    }

    #[test]
    fn test_tel_links_are_external() {
        let link = classify("tel:+31151234567", "Call", &page(), &base());
        assert!(matches!(link, Link::External { career: false, .. }));
    }
}
