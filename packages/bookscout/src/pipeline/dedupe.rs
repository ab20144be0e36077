//! Deduplication of accumulated book records.

use std::collections::HashSet;

use crate::types::book::BookRecord;

/// Identity key of a record: normalized title and author joined by `|`.
pub fn dedupe_key(record: &BookRecord) -> String {
    format!("{}|{}", normalize(&record.title), normalize(&record.author))
}

fn normalize(field: &str) -> String {
    field
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Remove repeats, keeping the first occurrence of each key in input order.
///
/// Returns the surviving records and how many were removed.
pub fn dedupe(records: Vec<BookRecord>) -> (Vec<BookRecord>, usize) {
    let before = records.len();
    let mut seen = HashSet::with_capacity(before);

    let kept: Vec<BookRecord> = records
        .into_iter()
        .filter(|record| seen.insert(dedupe_key(record)))
        .collect();

    let removed = before - kept.len();
    (kept, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::book::Category;

    #[test]
    fn test_case_insensitive_duplicates() {
        let a = BookRecord::new("X", "Y").with_price(10.0);
        let b = BookRecord::new("x", "y").with_price(20.0);
        let c = BookRecord::new("Z", "W");

        let (kept, removed) = dedupe(vec![a.clone(), b, c.clone()]);

        assert_eq!(kept, vec![a, c]);
        assert_eq!(removed, 1);
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        // Wider than trim + lower-case: inner whitespace runs also collapse,
        // so records differing only in spacing count as duplicates.
        let a = BookRecord::new("Clean  Code ", " Robert C. Martin");
        let b = BookRecord::new("clean code", "robert   c. martin");
        assert_eq!(dedupe_key(&a), dedupe_key(&b));
        assert_eq!(dedupe_key(&a), "clean code|robert c. martin");

        let (kept, removed) = dedupe(vec![a.clone(), b]);
        assert_eq!(kept, vec![a]);
        assert_eq!(removed, 1);
    }

    #[test]
    fn test_same_title_different_author_kept() {
        let a = BookRecord::new("Algorithms", "Robert Sedgewick");
        let b = BookRecord::new("Algorithms", "Jeff Erickson").with_category(Category::Algorithms);

        let (kept, removed) = dedupe(vec![a, b]);
        assert_eq!(kept.len(), 2);
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_idempotent() {
        let records = vec![
            BookRecord::new("SICP", "Abelson"),
            BookRecord::new("sicp", "ABELSON"),
            BookRecord::new("The Mythical Man-Month", "Fred Brooks"),
            BookRecord::new("SICP", "Abelson"),
        ];

        let (once, _) = dedupe(records);
        let (twice, removed) = dedupe(once.clone());

        assert_eq!(once, twice);
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_empty_input() {
        let (kept, removed) = dedupe(Vec::new());
        assert!(kept.is_empty());
        assert_eq!(removed, 0);
    }
}
