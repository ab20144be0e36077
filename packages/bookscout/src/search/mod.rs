//! Web searcher implementations.
//!
//! - `TavilyWebSearcher` - Tavily search API
//! - `MockWebSearcher` - For testing

mod mock;
mod tavily;

pub use mock::MockWebSearcher;
pub use tavily::TavilyWebSearcher;

pub use crate::traits::searcher::{SearchResult, WebSearcher};
