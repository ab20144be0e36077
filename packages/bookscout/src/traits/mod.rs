//! Core trait abstractions.
//!
//! These traits define the collaborators the harvester drives: the language
//! model, web search, page fetching and catalog persistence.

pub mod ai;
pub mod ingestor;
pub mod searcher;
pub mod sink;
