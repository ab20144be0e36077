//! Plain HTTP page fetching.
//!
//! One GET per URL, no link following. The HTML is reduced to
//! markdown-ish text the model can read.

use async_trait::async_trait;
use regex::{Captures, Regex};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

use crate::error::{CrawlError, CrawlResult};
use crate::traits::ingestor::{Ingestor, RawPage};

static NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|noscript)\b[^>]*>.*?</(script|style|noscript)>|<!--.*?-->")
        .expect("valid regex")
});
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h([1-6])\b[^>]*>(.*?)</h[1-6]>").expect("valid regex"));
static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*href=["']([^"']+)["'][^>]*>(.*?)</a>"#).expect("valid regex")
});
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<li\b[^>]*>").expect("valid regex"));
static BLOCK_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</(p|div|li|ul|ol|tr|table|section|article)>|<br\s*/?>").expect("valid regex")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").expect("valid regex"));
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*(\n[ \t]*)+").expect("valid regex"));
static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title>").expect("valid regex"));

const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
    ("&#x27;", "'"),
    ("&rsquo;", "'"),
    ("&ndash;", "-"),
    ("&amp;", "&"),
];

/// Fetches pages with `reqwest`, one at a time.
pub struct HttpIngestor {
    client: reqwest::Client,
    user_agent: String,
    delay: Duration,
}

impl HttpIngestor {
    /// 30 second request timeout, 100 ms between pages.
    pub fn new() -> CrawlResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CrawlError::Http(Box::new(e)))?;

        Ok(Self {
            client,
            user_agent: format!("bookscout/{}", env!("CARGO_PKG_VERSION")),
            delay: Duration::from_millis(100),
        })
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Delay between consecutive pages, in milliseconds.
    pub fn with_rate_limit(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }
}

#[async_trait]
impl Ingestor for HttpIngestor {
    async fn fetch(&self, url: &str) -> CrawlResult<RawPage> {
        reqwest::Url::parse(url).map_err(|_| CrawlError::InvalidUrl {
            url: url.to_string(),
        })?;

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CrawlError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    CrawlError::Http(Box::new(e))
                }
            })?;

        if !response.status().is_success() {
            return Err(CrawlError::Http(
                format!("{} returned {}", url, response.status()).into(),
            ));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        if let Some(ct) = content_type.as_deref().filter(|ct| !is_textual(ct)) {
            return Err(CrawlError::Http(
                format!("{} is {}, not text", url, ct).into(),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CrawlError::Http(Box::new(e)))?;

        let text = html_to_markdown(&body);
        if text.is_empty() {
            return Err(CrawlError::EmptyContent {
                url: url.to_string(),
            });
        }

        debug!(url = %url, chars = text.len(), "Fetched page");

        let mut page = RawPage::new(url, text);
        page.title = extract_title(&body);
        page.content_type = content_type;
        Ok(page)
    }

    fn politeness_delay(&self) -> Duration {
        self.delay
    }

    fn name(&self) -> &str {
        "http"
    }
}

fn is_textual(content_type: &str) -> bool {
    let ct = content_type.to_ascii_lowercase();
    ct.starts_with("text/") || ct.contains("html") || ct.contains("xml")
}

/// Reduce HTML to readable text.
///
/// Headings become `#` lines, links become `[text](href)`, list items get a
/// `- ` prefix. Scripts, styles and comments are dropped.
pub fn html_to_markdown(html: &str) -> String {
    let text = NOISE.replace_all(html, "");
    let text = HEADING.replace_all(&text, |caps: &Captures| {
        let level: usize = caps[1].parse().unwrap_or(1);
        format!("\n{} {}\n", "#".repeat(level), caps[2].trim())
    });
    let text = LINK.replace_all(&text, "[$2]($1)");
    let text = LIST_ITEM.replace_all(&text, "\n- ");
    let text = BLOCK_END.replace_all(&text, "\n");
    let text = TAG.replace_all(&text, "");

    let mut text = text.into_owned();
    for (entity, replacement) in ENTITIES {
        text = text.replace(entity, replacement);
    }

    let text = SPACES.replace_all(&text, " ");
    let text = BLANK_LINES.replace_all(&text, "\n\n");

    text.lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Text of the first `<title>` element, if non-empty.
pub fn extract_title(html: &str) -> Option<String> {
    let raw = TITLE.captures(html)?.get(1)?.as_str();
    let title = SPACES.replace_all(raw.trim(), " ").into_owned();
    (!title.is_empty()).then_some(title)
}
