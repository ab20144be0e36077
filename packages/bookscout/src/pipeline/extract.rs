//! Extraction client: prompt in, normalized book records out.
//!
//! Wraps an [`AI`] backend and converts every `ExtractedBook` into a complete
//! [`BookRecord`]. The client holds no state between calls.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::Result;
use crate::traits::ai::AI;
use crate::types::book::{
    amazon_search_url, BookRecord, Category, ExtractedBook, NO_DESCRIPTION, PLACEHOLDER_IMAGE_URL,
    UNKNOWN_AUTHOR, UNKNOWN_DATE, UNKNOWN_PUBLISHER, UNKNOWN_TITLE,
};

/// Extraction client over an AI backend.
pub struct ExtractionClient<A: AI> {
    ai: A,
}

impl<A: AI> ExtractionClient<A> {
    pub fn new(ai: A) -> Self {
        Self { ai }
    }

    /// The wrapped backend.
    pub fn ai(&self) -> &A {
        &self.ai
    }

    /// Extract books, surfacing backend failures.
    pub async fn try_extract(&self, prompt: &str) -> Result<Vec<BookRecord>> {
        let raw = self.ai.extract_books(prompt).await?;
        let books: Vec<BookRecord> = raw.into_iter().map(normalize_book).collect();
        debug!(records = books.len(), "Normalized extracted records");
        Ok(books)
    }

    /// Extract books. A backend failure yields an empty list.
    pub async fn extract(&self, prompt: &str) -> Vec<BookRecord> {
        match self.try_extract(prompt).await {
            Ok(books) => books,
            Err(e) => {
                warn!(error = %e, "Extraction call failed, treating as no books");
                Vec::new()
            }
        }
    }
}

/// Turn a raw model record into a complete one. Every missing field gets
/// its placeholder, the title included.
pub fn normalize_book(raw: ExtractedBook) -> BookRecord {
    let title = non_blank(raw.title).unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    let url = non_blank(raw.url)
        .filter(|u| is_http_url(u))
        .unwrap_or_else(|| amazon_search_url(&title));

    let image_url = non_blank(raw.image_url)
        .filter(|u| is_http_url(u))
        .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string());

    BookRecord {
        author: non_blank(raw.author).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        category: raw
            .category
            .as_deref()
            .map(Category::from_loose)
            .unwrap_or(Category::FALLBACK),
        url,
        price: normalize_price(raw.price),
        description: non_blank(raw.description).unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        image_url,
        publisher: non_blank(raw.publisher).unwrap_or_else(|| UNKNOWN_PUBLISHER.to_string()),
        publication_date: normalize_date(raw.publication_date.as_deref()),
        title,
    }
}

/// Normalize a publication date to `YYYY-MM-DD` where the input allows it.
///
/// Year-only and year-month dates are padded to the first day. Month-name
/// forms ("March 2018", "March 5, 2018") are parsed. Anything else is kept
/// as trimmed text.
pub fn normalize_date(raw: Option<&str>) -> String {
    let text = match raw.map(str::trim) {
        Some(t) if !t.is_empty() => t,
        _ => return UNKNOWN_DATE.to_string(),
    };

    let candidates = [
        (text.to_string(), "%Y-%m-%d"),
        (format!("{}-01", text), "%Y-%m-%d"),
        (format!("{}-01-01", text), "%Y-%m-%d"),
        (text.to_string(), "%B %d, %Y"),
        (text.to_string(), "%b %d, %Y"),
        (format!("1 {}", text), "%d %B %Y"),
        (format!("1 {}", text), "%d %b %Y"),
    ];

    // Bare years are exactly four digits; "%Y" alone would accept "12"
    let looks_like_year =
        |s: &str| s.chars().take(4).filter(|c| c.is_ascii_digit()).count() == 4;

    for (candidate, format) in candidates.iter() {
        if format.starts_with("%Y") && !looks_like_year(candidate) {
            continue;
        }
        if let Ok(date) = NaiveDate::parse_from_str(candidate, format) {
            return date.format("%Y-%m-%d").to_string();
        }
    }

    text.to_string()
}

/// Clamp to a finite, non-negative price rounded to cents.
pub fn normalize_price(raw: Option<f64>) -> f64 {
    match raw {
        Some(p) if p.is_finite() && p > 0.0 => (p * 100.0).round() / 100.0,
        _ => 0.0,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_http_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockAI;

    #[test]
    fn test_normalize_fills_placeholders() {
        let book = normalize_book(ExtractedBook {
            title: Some("  Clean Code ".to_string()),
            ..Default::default()
        });

        assert_eq!(book.title, "Clean Code");
        assert_eq!(book.author, UNKNOWN_AUTHOR);
        assert_eq!(book.category, Category::FALLBACK);
        assert_eq!(book.url, amazon_search_url("Clean Code"));
        assert_eq!(book.price, 0.0);
        assert_eq!(book.description, NO_DESCRIPTION);
        assert_eq!(book.image_url, PLACEHOLDER_IMAGE_URL);
        assert_eq!(book.publisher, UNKNOWN_PUBLISHER);
        assert_eq!(book.publication_date, UNKNOWN_DATE);
    }

    #[test]
    fn test_normalize_keeps_model_values() {
        let book = normalize_book(ExtractedBook {
            title: Some("Designing Data-Intensive Applications".to_string()),
            author: Some("Martin Kleppmann".to_string()),
            category: Some("Distributed Systems".to_string()),
            url: Some("https://dataintensive.net/".to_string()),
            price: Some(45.999),
            description: Some("Data systems from the ground up".to_string()),
            image_url: Some("https://example.com/ddia.jpg".to_string()),
            publisher: Some("O'Reilly Media".to_string()),
            publication_date: Some("2017-03-16".to_string()),
        });

        assert_eq!(book.category, Category::SystemDesign);
        assert_eq!(book.url, "https://dataintensive.net/");
        assert_eq!(book.price, 46.0);
        assert_eq!(book.image_url, "https://example.com/ddia.jpg");
        assert_eq!(book.publication_date, "2017-03-16");
    }

    #[test]
    fn test_normalize_fills_missing_title() {
        let book = normalize_book(ExtractedBook::default());
        assert_eq!(book.title, UNKNOWN_TITLE);
        assert_eq!(book.author, UNKNOWN_AUTHOR);

        let book = normalize_book(ExtractedBook {
            title: Some("   ".to_string()),
            author: Some("Martin Kleppmann".to_string()),
            publisher: Some("O'Reilly".to_string()),
            publication_date: Some("2017".to_string()),
            ..Default::default()
        });
        assert_eq!(book.title, UNKNOWN_TITLE);
        assert_eq!(book.author, "Martin Kleppmann");
        assert_eq!(book.publisher, "O'Reilly");
        assert_eq!(book.publication_date, "2017-01-01");
        assert_eq!(book.url, amazon_search_url(UNKNOWN_TITLE));
    }

    #[tokio::test]
    async fn test_extract_keeps_untitled_records() {
        let ai = MockAI::new().with_books(vec![ExtractedBook {
            author: Some("Martin Kleppmann".to_string()),
            publisher: Some("O'Reilly".to_string()),
            ..Default::default()
        }]);
        let client = ExtractionClient::new(ai);

        let books = client.extract("prompt").await;

        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, UNKNOWN_TITLE);
        assert_eq!(books[0].author, "Martin Kleppmann");
    }

    #[test]
    fn test_normalize_replaces_non_http_urls() {
        let book = normalize_book(ExtractedBook {
            title: Some("SICP".to_string()),
            url: Some("not a url".to_string()),
            image_url: Some("placeholder".to_string()),
            ..Default::default()
        });

        assert!(book.url.starts_with("https://www.amazon.com/s?k="));
        assert_eq!(book.image_url, PLACEHOLDER_IMAGE_URL);
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date(Some("2019-09-13")), "2019-09-13");
        assert_eq!(normalize_date(Some("2019-09")), "2019-09-01");
        assert_eq!(normalize_date(Some("2019")), "2019-01-01");
        assert_eq!(normalize_date(Some("March 2018")), "2018-03-01");
        assert_eq!(normalize_date(Some("March 5, 2018")), "2018-03-05");
        assert_eq!(normalize_date(Some(" 2nd edition ")), "2nd edition");
        assert_eq!(normalize_date(Some("")), UNKNOWN_DATE);
        assert_eq!(normalize_date(None), UNKNOWN_DATE);
    }

    #[test]
    fn test_normalize_price() {
        assert_eq!(normalize_price(Some(39.994)), 39.99);
        assert_eq!(normalize_price(Some(-5.0)), 0.0);
        assert_eq!(normalize_price(Some(f64::NAN)), 0.0);
        assert_eq!(normalize_price(Some(f64::INFINITY)), 0.0);
        assert_eq!(normalize_price(None), 0.0);
    }

    #[tokio::test]
    async fn test_extract_swallows_failures() {
        let ai = MockAI::new().with_extraction_failure("timeout");
        let client = ExtractionClient::new(ai.clone());

        assert!(client.extract("prompt").await.is_empty());
        assert_eq!(ai.extraction_call_count(), 1);
    }

    #[tokio::test]
    async fn test_try_extract_surfaces_failures() {
        let ai = MockAI::new()
            .with_extraction_failure("timeout")
            .with_books(vec![
                ExtractedBook::new("Refactoring", "Martin Fowler"),
                ExtractedBook::default(),
            ]);
        let client = ExtractionClient::new(ai);

        assert!(client.try_extract("first").await.is_err());

        let books = client.try_extract("second").await.unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].title, "Refactoring");
        assert_eq!(books[1].title, UNKNOWN_TITLE);
    }
}
