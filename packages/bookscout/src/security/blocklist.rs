//! Noise blocklist for search results.
//!
//! Social and video platforms rarely contain crawlable book lists and tend to
//! return login walls, so their URLs are skipped before crawling.

use url::Url;

/// Hosts skipped by default. Subdomains match too.
pub const DEFAULT_BLOCKED_HOSTS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "facebook.com",
    "instagram.com",
    "tiktok.com",
    "twitter.com",
    "x.com",
    "linkedin.com",
    "pinterest.com",
    "reddit.com",
];

/// Host-based URL blocklist.
#[derive(Debug, Clone)]
pub struct UrlBlocklist {
    hosts: Vec<String>,
}

impl Default for UrlBlocklist {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlBlocklist {
    /// Create a blocklist with the default noise hosts.
    pub fn new() -> Self {
        Self::with_hosts(DEFAULT_BLOCKED_HOSTS.iter().copied())
    }

    /// Create an empty blocklist (blocks nothing).
    pub fn empty() -> Self {
        Self { hosts: Vec::new() }
    }

    /// Create a blocklist from explicit hosts.
    pub fn with_hosts(hosts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            hosts: hosts
                .into_iter()
                .filter_map(|h| normalize_host(&h.into()))
                .collect(),
        }
    }

    /// Block an additional host.
    pub fn block(mut self, host: impl Into<String>) -> Self {
        if let Some(host) = normalize_host(&host.into()) {
            self.hosts.push(host);
        }
        self
    }

    /// Whether the URL points at a blocked host.
    ///
    /// Unparseable URLs are treated as blocked since they cannot be crawled.
    pub fn is_blocked(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return true;
        };
        let Some(host) = parsed.host_str() else {
            return true;
        };
        let host = host.to_lowercase();

        self.hosts
            .iter()
            .any(|blocked| host == *blocked || host.ends_with(&format!(".{}", blocked)))
    }
}

/// Lower-cased host without surrounding whitespace or a `www.` prefix.
fn normalize_host(host: &str) -> Option<String> {
    let host = host.trim().to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    (!host.is_empty()).then(|| host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_social_and_video_hosts() {
        let blocklist = UrlBlocklist::new();

        assert!(blocklist.is_blocked("https://www.youtube.com/watch?v=abc"));
        assert!(blocklist.is_blocked("https://m.facebook.com/groups/books"));
        assert!(blocklist.is_blocked("https://x.com/someone/status/1"));
        assert!(blocklist.is_blocked("https://old.reddit.com/r/programming"));
    }

    #[test]
    fn test_allows_regular_sites() {
        let blocklist = UrlBlocklist::new();

        assert!(!blocklist.is_blocked("https://www.oreilly.com/library/"));
        assert!(!blocklist.is_blocked("https://github.com/topics/books"));
        // Suffix match must respect label boundaries.
        assert!(!blocklist.is_blocked("https://netflix.com/"));
    }

    #[test]
    fn test_invalid_urls_are_blocked() {
        let blocklist = UrlBlocklist::empty();
        assert!(blocklist.is_blocked("not a url"));
        assert!(blocklist.is_blocked("mailto:someone@example.com"));
    }

    #[test]
    fn test_custom_hosts() {
        let blocklist = UrlBlocklist::empty().block("medium.com");
        assert!(blocklist.is_blocked("https://medium.com/@author/post"));
        assert!(!blocklist.is_blocked("https://youtube.com/"));
    }

    #[test]
    fn test_added_hosts_are_normalized() {
        let blocklist = UrlBlocklist::empty()
            .block(" www.Medium.com ")
            .block("   ");
        let listed = UrlBlocklist::with_hosts(["WWW.Quora.com"]);

        assert!(blocklist.is_blocked("https://medium.com/@author/post"));
        assert!(blocklist.is_blocked("https://www.medium.com/tag/books"));
        assert!(!blocklist.is_blocked("https://example.com/"));
        assert!(listed.is_blocked("https://www.quora.com/What-books"));
    }
}
