//! Sink implementations.
//!
//! - `JsonFileSink` - Pretty-printed JSON file, replaced atomically
//! - `MemorySink` - Keeps the last catalog in memory (tests, dry runs)

mod json;
mod memory;

pub use json::JsonFileSink;
pub use memory::MemorySink;

// Re-export from traits for convenience
pub use crate::traits::sink::{BookSink, SaveReport};
