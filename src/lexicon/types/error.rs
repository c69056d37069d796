//! Custom error types for the lexigraph crate.

use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for all operations in this crate.
///
/// Only conditions that make an operation meaningless are errors. Corrupt
/// index tails, out-of-bounds slices, Latin-1 payloads, entries without a
/// headword and untranslatable tokens degrade into partial results instead.
#[derive(Debug, Error)]
pub enum LexiconError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A required companion file of a binary dictionary is absent.
    #[error("Missing {kind} file in {}", dir.display())]
    MissingFile { kind: &'static str, dir: PathBuf },

    /// An index record could not be decoded. Returned only by callers that
    /// want to escalate; the decoder itself stops early and keeps what it has.
    #[error("Corrupt index at record {record}: {reason}")]
    CorruptIndex { record: usize, reason: String },

    /// A gzip/dictzip stream could not be inflated.
    #[error("Decompression failed for {}: {reason}", path.display())]
    Decompression { path: PathBuf, reason: String },

    /// The structured lexicon document is not well-formed enough to stream.
    #[error("XML error: {0}")]
    Xml(String),

    /// A pair slug does not have the `src-dst` shape.
    #[error("Invalid language pair '{0}', expected '<src>-<dst>'")]
    InvalidPair(String),

    /// Neither a binary dictionary nor the lexical graph knows the pair.
    #[error("No dictionary available for '{0}'")]
    UnknownPair(String),

    /// A translation edge violated the `(src_lemma, dst_lemma)` uniqueness
    /// constraint at commit time.
    #[error("Duplicate translation edge(s) on commit: {count}")]
    DuplicateEdge { count: usize },

    /// The graph store rejected an operation.
    #[error("Graph store error: {0}")]
    Store(String),

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A graph snapshot could not be (de)serialized.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// A mutex lock was poisoned, indicating a panic in another thread holding the lock.
    #[error("A mutex lock was poisoned, indicating a panic in another thread holding the lock.")]
    LockPoisoned,
}

impl From<quick_xml::Error> for LexiconError {
    fn from(e: quick_xml::Error) -> Self {
        LexiconError::Xml(e.to_string())
    }
}

/// A convenience `Result` type alias using the crate's `LexiconError` type.
pub type Result<T> = std::result::Result<T, LexiconError>;
