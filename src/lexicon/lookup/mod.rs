//! Token resolution against binary dictionaries and the lexical graph.
//!
//! # Module Organization
//!
//! - [`tokens`]: letter-run tokenizer
//! - [`catalog`]: where dictionaries for a pair live
//! - [`session`]: per-pair in-memory index over one binary dictionary
//! - [`engine`]: session cache, fallback chain and sentence translation

pub mod catalog;
pub mod engine;
pub mod session;
pub mod tokens;

pub use catalog::{DictionarySource, DirectoryCatalog};
pub use engine::{LookupEngine, LookupOptions, PairResolver};
pub use session::DictSession;
pub use tokens::{tokenize, Token};
