//! Content batching.
//!
//! Pure functions over an ordered document slice. Batch `i` covers
//! `documents[i*B .. min((i+1)*B, len)]`; concatenating every batch in order
//! reproduces the input.

use crate::types::document::CrawledDocument;

/// Documents in batch `batch_index`. Empty past the end or when `batch_size`
/// is zero.
pub fn slice_batch<T>(documents: &[T], batch_index: usize, batch_size: usize) -> &[T] {
    if batch_size == 0 {
        return &[];
    }

    let start = match batch_index.checked_mul(batch_size) {
        Some(start) if start < documents.len() => start,
        _ => return &[],
    };
    let end = start.saturating_add(batch_size).min(documents.len());

    &documents[start..end]
}

/// Number of batches needed to cover `documents`, `ceil(len / batch_size)`.
pub fn total_batches<T>(documents: &[T], batch_size: usize) -> usize {
    if batch_size == 0 {
        return 0;
    }
    documents.len().div_ceil(batch_size)
}

/// Whether another batch follows `batch_index`.
pub fn has_more_batches<T>(batch_index: usize, documents: &[T], batch_size: usize) -> bool {
    batch_index.saturating_add(1) < total_batches(documents, batch_size)
}

/// Render a batch for the extraction prompt.
///
/// Each document's content is cut to `max_content_chars` characters.
pub fn format_batch(documents: &[CrawledDocument], max_content_chars: usize) -> String {
    documents
        .iter()
        .map(|doc| {
            format!(
                "Title: {}\nURL: {}\nContent: {}\n---\n",
                doc.title,
                doc.url,
                truncate_chars(&doc.content, max_content_chars)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
