//! # lexigraph
//!
//! Reads StarDict-style binary dictionaries and TEI lexicons, stores them as a
//! bilingual lexical graph and translates text word by word.
//!
//! Binary dictionaries are read as-is: compressed companion files are inflated
//! transparently and index records of either byte order are accepted. TEI
//! documents are streamed into a [`LexicalGraphStore`] in restartable batches.
pub mod lexicon;

// Re-export the main types for convenience
pub use lexicon::{
    config::LexiconConfig,
    graph::{LexicalGraphStore, MemoryGraphStore},
    import::{import_tei, ImportOutcome, ImportRequest, TeiImporter},
    lookup::{DictionarySource, DirectoryCatalog, LookupEngine, LookupOptions},
    reader::BinaryDict,
    rules::{RuleLayer, TranslateMode},
    types::{
        error::{LexiconError, Result},
        models::{DictionaryMetadata, Endian, EndianChoice, IndexRecord, OffsetBits, PayloadSlice},
    },
};
