//! `.ifo` metadata parsing.
//!
//! The file is line oriented:
//! ```text
//! StarDict's dict ifo file
//! version=3.0.0
//! bookname=English-Spanish FreeDict Dictionary
//! wordcount=5913
//! idxoffsetbits=64
//! sametypesequence=h
//! ```
//! Lines without `=` (including the magic first line) are ignored and the
//! last occurrence of a key wins.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::lexicon::types::error::Result;
use crate::lexicon::types::models::{DictionaryMetadata, OffsetBits};

/// Parses metadata text into raw key/value pairs.
pub fn parse_pairs(text: &str) -> HashMap<String, String> {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

/// Builds [`DictionaryMetadata`] from metadata text.
pub fn parse_str(text: &str) -> DictionaryMetadata {
    let extra = parse_pairs(text);

    let idx_offset_bits = match extra.get("idxoffsetbits") {
        Some(raw) => match raw.parse::<u32>() {
            Ok(bits) => OffsetBits::from(bits),
            Err(_) => {
                warn!("Unparseable idxoffsetbits '{}', assuming 32", raw);
                OffsetBits::Bits32
            }
        },
        None => OffsetBits::Bits32,
    };

    let metadata = DictionaryMetadata {
        bookname: extra.get("bookname").cloned(),
        version: extra.get("version").cloned().unwrap_or_default(),
        word_count: extra.get("wordcount").and_then(|s| s.parse().ok()),
        idx_offset_bits,
        same_type_sequence: extra.get("sametypesequence").cloned(),
        extra,
    };
    debug!(
        "Metadata: version={}, idxoffsetbits={}, wordcount={:?}",
        metadata.version,
        metadata.idx_offset_bits.bits(),
        metadata.word_count
    );
    metadata
}

/// Reads and parses a metadata file. Invalid UTF-8 is replaced, not fatal.
pub fn parse(path: &Path) -> Result<DictionaryMetadata> {
    let bytes = fs::read(path)?;
    Ok(parse_str(&String::from_utf8_lossy(&bytes)))
}
