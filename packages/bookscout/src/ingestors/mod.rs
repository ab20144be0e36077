//! Ingestor implementations.
//!
//! - `HttpIngestor` - Plain HTTP fetch with HTML-to-text conversion
//! - `MockIngestor` - For testing

mod http;
mod mock;

pub use http::{extract_title, html_to_markdown, HttpIngestor};
pub use mock::MockIngestor;

pub use crate::traits::ingestor::{Ingestor, RawPage};
