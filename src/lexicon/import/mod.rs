//! Structured lexicon (TEI) import into the lexical graph.
//!
//! - [`tei`]: streaming extraction of entries
//! - [`importer`]: batched, restartable persistence of extracted entries

pub mod importer;
pub mod tei;

pub use importer::{import_tei, ImportOutcome, ImportRequest, TeiImporter, DEFAULT_BATCH_SIZE};
pub use tei::{TeiEntries, TeiEntry};
