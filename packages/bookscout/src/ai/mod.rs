//! AI implementations.
//!
//! Reference implementation of the `AI` trait backed by OpenAI.

mod openai;

pub use openai::{parse_structured, strict_schema, OpenAI};
