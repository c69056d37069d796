//! Bilingual dictionary ingestion and word-by-word translation.

pub mod codec;
pub mod config;
pub mod format;
pub mod graph;
pub mod import;
pub mod iter;
pub mod lang;
pub mod lookup;
pub mod reader;
pub mod rules;
pub mod types;

pub use types::error::{LexiconError, Result};
