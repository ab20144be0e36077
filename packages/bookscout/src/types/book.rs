//! Book records and the closed category set.

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::LazyLock;

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";
pub const UNKNOWN_PUBLISHER: &str = "Unknown Publisher";
pub const UNKNOWN_DATE: &str = "unknown";
pub const NO_DESCRIPTION: &str = "No description available";
pub const PLACEHOLDER_IMAGE_URL: &str = "https://placehold.co/300x450?text=No+Cover";
pub const AMAZON_SEARCH_URL: &str = "https://www.amazon.com/s";

static PRICE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:,\d+)*(?:\.\d+)?").expect("valid regex"));

/// Technical book categories.
///
/// Serialized as their snake_case tag (`"machine_learning"`), never as the
/// Rust variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Programming,
    SoftwareEngineering,
    Algorithms,
    SystemDesign,
    Ai,
    MachineLearning,
    SoftwareArchitecture,
    Devops,
    DatabaseDesign,
    ComputerScience,
    CloudComputing,
    DataStructures,
}

/// Keyword phrases checked in order; the first category with a matching
/// phrase wins, so more specific phrases come first.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::MachineLearning,
        &[
            "machine learning",
            "deep learning",
            "ml",
            "neural network",
            "neural networks",
            "data science",
            "reinforcement learning",
        ],
    ),
    (
        Category::Ai,
        &[
            "artificial intelligence",
            "ai",
            "llm",
            "llms",
            "nlp",
            "natural language processing",
            "computer vision",
        ],
    ),
    (Category::DataStructures, &["data structures", "data structure"]),
    (Category::Algorithms, &["algorithms", "algorithm", "algorithmic"]),
    (
        Category::SystemDesign,
        &[
            "system design",
            "systems design",
            "distributed systems",
            "distributed system",
            "scalability",
        ],
    ),
    (
        Category::DatabaseDesign,
        &[
            "database",
            "databases",
            "sql",
            "nosql",
            "data modeling",
            "data modelling",
            "data engineering",
        ],
    ),
    (
        Category::CloudComputing,
        &["cloud", "aws", "azure", "gcp", "serverless"],
    ),
    (
        Category::Devops,
        &[
            "devops",
            "dev ops",
            "kubernetes",
            "docker",
            "sre",
            "site reliability engineering",
            "continuous delivery",
            "continuous integration",
            "infrastructure as code",
        ],
    ),
    (
        Category::SoftwareArchitecture,
        &[
            "software architecture",
            "architecture",
            "microservices",
            "domain driven design",
            "design patterns",
        ],
    ),
    (
        Category::SoftwareEngineering,
        &[
            "software engineering",
            "software development",
            "testing",
            "agile",
            "refactoring",
            "clean code",
            "craftsmanship",
        ],
    ),
    (
        Category::Programming,
        &[
            "programming",
            "coding",
            "rust",
            "python",
            "java",
            "javascript",
            "typescript",
            "golang",
            "cpp",
        ],
    ),
    (
        Category::ComputerScience,
        &[
            "computer science",
            "cs",
            "operating systems",
            "networking",
            "compilers",
            "theory of computation",
        ],
    ),
];

impl Category {
    pub const ALL: [Category; 12] = [
        Category::Programming,
        Category::SoftwareEngineering,
        Category::Algorithms,
        Category::SystemDesign,
        Category::Ai,
        Category::MachineLearning,
        Category::SoftwareArchitecture,
        Category::Devops,
        Category::DatabaseDesign,
        Category::ComputerScience,
        Category::CloudComputing,
        Category::DataStructures,
    ];

    /// Category used when free-form text matches nothing.
    pub const FALLBACK: Category = Category::ComputerScience;

    /// The serialized tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Programming => "programming",
            Category::SoftwareEngineering => "software_engineering",
            Category::Algorithms => "algorithms",
            Category::SystemDesign => "system_design",
            Category::Ai => "ai",
            Category::MachineLearning => "machine_learning",
            Category::SoftwareArchitecture => "software_architecture",
            Category::Devops => "devops",
            Category::DatabaseDesign => "database_design",
            Category::ComputerScience => "computer_science",
            Category::CloudComputing => "cloud_computing",
            Category::DataStructures => "data_structures",
        }
    }

    /// Human-readable name, as used in prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Programming => "Programming",
            Category::SoftwareEngineering => "Software Engineering",
            Category::Algorithms => "Algorithms",
            Category::SystemDesign => "System Design",
            Category::Ai => "Artificial Intelligence",
            Category::MachineLearning => "Machine Learning",
            Category::SoftwareArchitecture => "Software Architecture",
            Category::Devops => "DevOps",
            Category::DatabaseDesign => "Database Design",
            Category::ComputerScience => "Computer Science",
            Category::CloudComputing => "Cloud Computing",
            Category::DataStructures => "Data Structures",
        }
    }

    /// Parse an exact tag or display name (case-insensitive).
    pub fn from_tag(text: &str) -> Option<Category> {
        let normalized = normalize_category_text(text);
        let as_tag = normalized.replace(' ', "_");

        Category::ALL.into_iter().find(|c| {
            c.as_str() == as_tag || normalize_category_text(c.display_name()) == normalized
        })
    }

    /// Map free-form category text onto the closed set.
    ///
    /// Tries exact tags and display names, then keyword phrases, and falls
    /// back to [`Category::FALLBACK`].
    pub fn from_loose(text: &str) -> Category {
        if let Some(category) = Category::from_tag(text) {
            return category;
        }

        let padded = format!(" {} ", normalize_category_text(text));
        for (category, phrases) in CATEGORY_KEYWORDS {
            if phrases
                .iter()
                .any(|phrase| padded.contains(&format!(" {} ", phrase)))
            {
                return *category;
            }
        }

        tracing::debug!(category = %text, fallback = %Category::FALLBACK, "Unmapped category");
        Category::FALLBACK
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-case, `&` to "and", everything non-alphanumeric collapsed to single
/// spaces.
fn normalize_category_text(text: &str) -> String {
    let lowered = text.to_lowercase().replace('&', " and ");
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A fully-populated book record, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    pub category: Category,
    pub url: String,
    pub price: f64,
    pub description: String,
    pub image_url: String,
    pub publisher: String,
    pub publication_date: String,
}

impl BookRecord {
    /// Create a record with placeholders for everything but title and author.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            url: amazon_search_url(&title),
            title,
            author: author.into(),
            category: Category::FALLBACK,
            price: 0.0,
            description: NO_DESCRIPTION.to_string(),
            image_url: PLACEHOLDER_IMAGE_URL.to_string(),
            publisher: UNKNOWN_PUBLISHER.to_string(),
            publication_date: UNKNOWN_DATE.to_string(),
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = publisher.into();
        self
    }
}

/// Amazon search URL for a title, used when no purchase link was found.
pub fn amazon_search_url(title: &str) -> String {
    url::Url::parse_with_params(AMAZON_SEARCH_URL, &[("k", title)])
        .map(|u| u.to_string())
        .unwrap_or_else(|_| AMAZON_SEARCH_URL.to_string())
}

/// A book as returned by the model, before normalization.
///
/// Every field is optional and the category is free text so a partially
/// filled response still parses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedBook {
    /// Exact book title
    #[serde(default)]
    pub title: Option<String>,

    /// Book author(s)
    #[serde(default)]
    pub author: Option<String>,

    /// One of: programming, software_engineering, algorithms, system_design,
    /// ai, machine_learning, software_architecture, devops, database_design,
    /// computer_science, cloud_computing, data_structures
    #[serde(default)]
    pub category: Option<String>,

    /// Purchase or info URL
    #[serde(default)]
    pub url: Option<String>,

    /// Estimated price in USD
    #[serde(default, deserialize_with = "deserialize_lenient_price")]
    #[schemars(with = "Option<f64>")]
    pub price: Option<f64>,

    /// Brief description of the book
    #[serde(default)]
    pub description: Option<String>,

    /// Book cover URL
    #[serde(default)]
    pub image_url: Option<String>,

    /// Publisher name
    #[serde(default)]
    pub publisher: Option<String>,

    /// Publication date, YYYY-MM-DD
    #[serde(default)]
    pub publication_date: Option<String>,
}

impl ExtractedBook {
    /// Create an extracted book with just a title and author.
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            author: Some(author.into()),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }
}

/// Structured-output envelope for book extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct BookList {
    #[serde(default)]
    pub books: Vec<ExtractedBook>,
}

/// Structured-output envelope for search query generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct QueryList {
    #[serde(default)]
    pub queries: Vec<String>,
}

/// Accepts `39.99`, `"39.99"`, `"$39.99"`, `"USD 1,299.00"` or null.
fn deserialize_lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => parse_price_text(&s),
        _ => None,
    })
}

/// Price from free text, read from the first number only.
///
/// Commas followed by three-digit groups are thousands separators. A single
/// comma followed by one or two digits is a decimal comma (`"29,99 €"`).
/// Any other comma layout is ambiguous and yields `None`.
pub fn parse_price_text(text: &str) -> Option<f64> {
    let token = PRICE_TOKEN.find(text)?.as_str();
    let (whole, fraction) = match token.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (token, None),
    };

    let groups: Vec<&str> = whole.split(',').collect();
    let number = match (groups.as_slice(), fraction) {
        ([_], _) => token.to_string(),
        ([units, cents], None) if (1..=2).contains(&cents.len()) => {
            format!("{}.{}", units, cents)
        }
        ([head, rest @ ..], _) if head.len() <= 3 && rest.iter().all(|g| g.len() == 3) => {
            token.replace(',', "")
        }
        _ => return None,
    };

    number.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serializes_as_tag() {
        let json = serde_json::to_string(&Category::MachineLearning).unwrap();
        assert_eq!(json, "\"machine_learning\"");

        let parsed: Category = serde_json::from_str("\"devops\"").unwrap();
        assert_eq!(parsed, Category::Devops);
    }

    #[test]
    fn test_as_str_matches_serde_tag() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }

    #[test]
    fn test_from_tag_exact_and_display() {
        assert_eq!(Category::from_tag("system_design"), Some(Category::SystemDesign));
        assert_eq!(Category::from_tag("System Design"), Some(Category::SystemDesign));
        assert_eq!(Category::from_tag("DEVOPS"), Some(Category::Devops));
        assert_eq!(
            Category::from_tag("Artificial Intelligence"),
            Some(Category::Ai)
        );
        assert_eq!(Category::from_tag("cooking"), None);
    }

    #[test]
    fn test_from_loose_keywords() {
        assert_eq!(
            Category::from_loose("Deep Learning"),
            Category::MachineLearning
        );
        assert_eq!(Category::from_loose("LLMs"), Category::Ai);
        assert_eq!(
            Category::from_loose("Data Structures & Algorithms"),
            Category::DataStructures
        );
        assert_eq!(
            Category::from_loose("Distributed Systems"),
            Category::SystemDesign
        );
        assert_eq!(Category::from_loose("SQL"), Category::DatabaseDesign);
        assert_eq!(Category::from_loose("Kubernetes"), Category::Devops);
        assert_eq!(Category::from_loose("AWS"), Category::CloudComputing);
        assert_eq!(
            Category::from_loose("Microservices"),
            Category::SoftwareArchitecture
        );
        assert_eq!(
            Category::from_loose("Software Testing"),
            Category::SoftwareEngineering
        );
        assert_eq!(Category::from_loose("Rust"), Category::Programming);
    }

    #[test]
    fn test_from_loose_word_boundaries() {
        // "ai" inside another word must not match
        assert_eq!(Category::from_loose("email marketing"), Category::FALLBACK);
    }

    #[test]
    fn test_from_loose_fallback() {
        assert_eq!(Category::from_loose(""), Category::ComputerScience);
        assert_eq!(Category::from_loose("Gardening"), Category::ComputerScience);
    }

    #[test]
    fn test_lenient_price() {
        let book: ExtractedBook =
            serde_json::from_str(r#"{"title": "SICP", "price": "$39.99"}"#).unwrap();
        assert_eq!(book.price, Some(39.99));

        let book: ExtractedBook =
            serde_json::from_str(r#"{"title": "SICP", "price": 12}"#).unwrap();
        assert_eq!(book.price, Some(12.0));

        let book: ExtractedBook =
            serde_json::from_str(r#"{"title": "SICP", "price": "unknown"}"#).unwrap();
        assert_eq!(book.price, None);

        let book: ExtractedBook = serde_json::from_str(r#"{"title": "SICP"}"#).unwrap();
        assert_eq!(book.price, None);

        let book: ExtractedBook =
            serde_json::from_str(r#"{"title": "SICP", "price": "$25 paperback, $15 kindle"}"#)
                .unwrap();
        assert_eq!(book.price, Some(25.0));
    }

    #[test]
    fn test_parse_price_text() {
        assert_eq!(parse_price_text("USD 1,299.00"), Some(1299.0));
        assert_eq!(parse_price_text("$1,299"), Some(1299.0));
        assert_eq!(parse_price_text("29,99 €"), Some(29.99));
        assert_eq!(parse_price_text("$25, $15"), Some(25.0));
        assert_eq!(parse_price_text("$25 paperback, $15 kindle"), Some(25.0));
        assert_eq!(parse_price_text("12,3456"), None);
        assert_eq!(parse_price_text("1,23,456"), None);
        assert_eq!(parse_price_text("free"), None);
    }

    #[test]
    fn test_book_record_serializes_all_fields() {
        let record = BookRecord::new("Designing Data-Intensive Applications", "Martin Kleppmann")
            .with_category(Category::SystemDesign);

        let value = serde_json::to_value(&record).unwrap();
        let obj = value.as_object().unwrap();

        for field in [
            "title",
            "author",
            "category",
            "url",
            "price",
            "description",
            "image_url",
            "publisher",
            "publication_date",
        ] {
            assert!(obj.contains_key(field), "missing {}", field);
            assert!(!obj[field].is_null(), "null {}", field);
        }
        assert_eq!(obj.len(), 9);
        assert_eq!(obj["category"], "system_design");
    }

    #[test]
    fn test_amazon_search_url_encodes_title() {
        let url = amazon_search_url("Clean Code & More");
        assert!(url.starts_with("https://www.amazon.com/s?k="));
        assert!(url.contains("Clean+Code"));
        assert!(!url.contains(' '));
    }
}
