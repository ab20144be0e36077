//! LLM prompts for query generation, batch extraction and enrichment.
//!
//! Crawled content is untrusted, so `{content}` is always substituted last
//! and never re-scanned for placeholders.

use crate::types::book::Category;

/// Prompt for generating web search queries.
pub const QUERY_GENERATION_PROMPT: &str = r#"You need to find the best books for software engineering, AI, and related technical topics.

Generate {count} diverse search queries that will help find the best books across these categories:
- Software Engineering
- Artificial Intelligence
- Machine Learning
- System Design
- Software Architecture
- Algorithms and Data Structures
- Programming Languages
- DevOps and Cloud
- Database Design
- Computer Science Fundamentals

Focus the searches on pages that list many books ("best books", "reading lists",
"must-read"), so each crawled page yields as many books as possible.

Return only the query text without quotes or extra formatting."#;

/// Prompt for extracting books from one batch of crawled pages.
pub const EXTRACTION_PROMPT: &str = r#"You are a book finding assistant.
Extract ALL books mentioned in the crawled content below.

Look for books about software engineering, AI, programming, system design, etc.

For each book found, provide complete details:
- title: exact book title
- author: book author
- category: one of {categories}
- url: book purchase/info URL (use Amazon if not available)
- price: estimated price in USD (use reasonable estimate)
- description: brief description of the book
- image_url: book cover URL (use null if not available)
- publisher: publisher name
- publication_date: publication date (YYYY-MM-DD format)

Previous books found: {previous_count} books
{known_titles}
Crawled content:
{content}

Extract ALL books mentioned in this content. Return a list of books."#;

/// Prompt for the single post-loop enrichment call.
pub const ENRICHMENT_PROMPT: &str = r#"You are a book finding assistant reviewing a catalog of technical books.

The catalog currently holds {previous_count} books.

Books per category:
{category_counts}
{known_titles}
Suggest well-known, widely recommended books for the categories with the
fewest entries. Only suggest real, published books that are not already in
the catalog.

For each book, provide complete details:
- title: exact book title
- author: book author
- category: one of {categories}
- url: book purchase/info URL (use Amazon if not available)
- price: estimated price in USD (use reasonable estimate)
- description: brief description of the book
- image_url: book cover URL (use null if not available)
- publisher: publisher name
- publication_date: publication date (YYYY-MM-DD format)

Return a list of books."#;

fn category_tags() -> String {
    Category::ALL
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn known_titles_section(known_titles: &[String]) -> String {
    if known_titles.is_empty() {
        return String::new();
    }

    let list = known_titles
        .iter()
        .map(|t| format!("- {}", t))
        .collect::<Vec<_>>()
        .join("\n");

    format!("\nAlready found (do not repeat these):\n{}\n", list)
}

/// Format the query generation prompt.
pub fn format_query_prompt(count: usize) -> String {
    QUERY_GENERATION_PROMPT.replace("{count}", &count.to_string())
}

/// Format the extraction prompt for a rendered batch.
pub fn format_extraction_prompt(
    previous_count: usize,
    known_titles: &[String],
    content: &str,
) -> String {
    EXTRACTION_PROMPT
        .replace("{categories}", &category_tags())
        .replace("{previous_count}", &previous_count.to_string())
        .replace("{known_titles}", &known_titles_section(known_titles))
        .replace("{content}", content)
}

/// Format the enrichment prompt.
///
/// Every category appears in the tally, including those with no books.
pub fn format_enrichment_prompt(
    previous_count: usize,
    category_counts: &[(Category, usize)],
    known_titles: &[String],
) -> String {
    let counts = category_counts
        .iter()
        .map(|(category, count)| format!("- {}: {}", category.as_str(), count))
        .collect::<Vec<_>>()
        .join("\n");

    ENRICHMENT_PROMPT
        .replace("{categories}", &category_tags())
        .replace("{previous_count}", &previous_count.to_string())
        .replace("{category_counts}", &counts)
        .replace("{known_titles}", &known_titles_section(known_titles))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_query_prompt() {
        let formatted = format_query_prompt(10);
        assert!(formatted.contains("Generate 10 diverse search queries"));
        assert!(!formatted.contains("{count}"));
    }

    #[test]
    fn test_format_extraction_prompt() {
        let titles = vec!["Clean Code".to_string(), "Refactoring".to_string()];
        let formatted = format_extraction_prompt(12, &titles, "Title: Page\nContent: SICP");

        assert!(formatted.contains("Previous books found: 12 books"));
        assert!(formatted.contains("- Clean Code\n- Refactoring"));
        assert!(formatted.contains("Content: SICP"));
        assert!(formatted.contains("machine_learning"));
    }

    #[test]
    fn test_extraction_prompt_without_known_titles() {
        let formatted = format_extraction_prompt(0, &[], "stuff");
        assert!(formatted.contains("Previous books found: 0 books"));
        assert!(!formatted.contains("Already found"));
    }

    #[test]
    fn test_content_placeholders_are_not_expanded() {
        let formatted = format_extraction_prompt(0, &[], "literal {previous_count} text");
        assert!(formatted.contains("literal {previous_count} text"));
    }

    #[test]
    fn test_format_enrichment_prompt() {
        let counts: Vec<(Category, usize)> = Category::ALL
            .iter()
            .map(|c| (*c, if *c == Category::Devops { 4 } else { 0 }))
            .collect();
        let formatted = format_enrichment_prompt(4, &counts, &["The Phoenix Project".to_string()]);

        assert!(formatted.contains("The catalog currently holds 4 books"));
        assert!(formatted.contains("- devops: 4"));
        assert!(formatted.contains("- data_structures: 0"));
        assert!(formatted.contains("- The Phoenix Project"));
    }
}
