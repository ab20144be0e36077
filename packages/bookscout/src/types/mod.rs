//! Data types shared across the pipeline.

pub mod book;
pub mod config;
pub mod document;
