//! File format parsing layer for binary dictionaries.
//!
//! This module bridges raw file I/O and the high-level
//! [`BinaryDict`](crate::lexicon::reader::BinaryDict).
//!
//! # Module Organization
//!
//! - [`files`]: Locates the companion files and their plain variants
//! - [`metadata`]: Parses the `key=value` metadata file
//! - [`index`]: Decodes index records and resolves their byte order
//!
//! # Architecture
//!
//! ```text
//! Dictionary directory:
//! ┌──────────────────┐
//! │  name.ifo        │ ← metadata::parse()
//! ├──────────────────┤
//! │  name.idx[.gz]   │ ← index::decode_index()
//! │  headword\0 +    │
//! │  offset + size   │
//! ├──────────────────┤
//! │  name.dict[.dz]  │ ← reader::read_slice()
//! │  payload bytes   │
//! └──────────────────┘
//! ```

pub mod files;
pub mod index;
pub mod metadata;
