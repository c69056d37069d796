//! Core data structures for the binary dictionary file set.
//!
//! This module defines the types shared by the format parsers and the reader:
//! - Metadata parsed from the `.ifo` file
//! - Index records with both byte-order interpretations
//! - Payload slices and endianness choices

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Width of the offset field in each index record.
///
/// Declared by the `idxoffsetbits` metadata key. Anything other than `64`
/// is treated as the classic 32-bit layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetBits {
    #[default]
    Bits32,
    Bits64,
}

impl OffsetBits {
    /// Returns the byte width of the offset field.
    pub fn width(&self) -> usize {
        match self {
            OffsetBits::Bits32 => 4,
            OffsetBits::Bits64 => 8,
        }
    }

    pub fn bits(&self) -> u32 {
        match self {
            OffsetBits::Bits32 => 32,
            OffsetBits::Bits64 => 64,
        }
    }
}

impl From<u32> for OffsetBits {
    fn from(bits: u32) -> Self {
        if bits == 64 {
            OffsetBits::Bits64
        } else {
            OffsetBits::Bits32
        }
    }
}

/// Parsed `.ifo` metadata. Immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct DictionaryMetadata {
    pub bookname: Option<String>,
    pub version: String,
    pub word_count: Option<u64>,
    pub idx_offset_bits: OffsetBits,
    pub same_type_sequence: Option<String>,
    /// Every `key=value` pair as read (last occurrence wins).
    pub extra: HashMap<String, String>,
}

impl DictionaryMetadata {
    /// Classic 2.4.2 dictionaries with 32-bit offsets are guaranteed to have a
    /// collation-sorted index, which enables binary search.
    pub fn is_classic(&self) -> bool {
        self.version == "2.4.2" && self.idx_offset_bits == OffsetBits::Bits32
    }
}

/// Paths of the three companion files making up one binary dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryFiles {
    pub metadata: PathBuf,
    pub index: PathBuf,
    pub payload: PathBuf,
}

/// A single decoded index record.
///
/// The on-disk byte order is not reliably announced, so both interpretations
/// of the offset and size fields are kept and one is picked per record via
/// [`resolve_endianness`](crate::lexicon::format::index::resolve_endianness).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    pub headword: String,
    pub offset_be: u64,
    pub size_be: u64,
    pub offset_le: u64,
    pub size_le: u64,
    /// Raw offset bytes exactly as stored, for diagnostics.
    pub raw_offset: Vec<u8>,
    /// Raw size bytes exactly as stored, for diagnostics.
    pub raw_size: Vec<u8>,
}

/// Byte order a record was interpreted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Endian::Big => write!(f, "BE"),
            Endian::Little => write!(f, "LE"),
        }
    }
}

/// Result of endianness disambiguation for one record.
///
/// `in_bounds == false` means neither candidate fit the payload; the values
/// are then the raw big-endian ones and must not be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndianChoice {
    pub offset: u64,
    pub size: u64,
    pub endian: Endian,
    pub in_bounds: bool,
}

impl EndianChoice {
    pub fn slice(&self) -> PayloadSlice {
        PayloadSlice {
            offset: self.offset,
            size: self.size,
        }
    }
}

/// An offset + length into the payload blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadSlice {
    pub offset: u64,
    pub size: u64,
}

impl PayloadSlice {
    /// True if the slice lies entirely within a payload of `payload_len` bytes.
    pub fn fits(&self, payload_len: u64) -> bool {
        self.offset
            .checked_add(self.size)
            .is_some_and(|end| end <= payload_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_bits_defaults_to_32_for_unknown_values() {
        assert_eq!(OffsetBits::from(64), OffsetBits::Bits64);
        assert_eq!(OffsetBits::from(32), OffsetBits::Bits32);
        assert_eq!(OffsetBits::from(48), OffsetBits::Bits32);
        assert_eq!(OffsetBits::Bits64.width(), 8);
    }

    #[test]
    fn slice_fit_rejects_overflow() {
        let slice = PayloadSlice { offset: u64::MAX, size: 2 };
        assert!(!slice.fits(u64::MAX));
        assert!(PayloadSlice { offset: 10, size: 5 }.fits(15));
        assert!(!PayloadSlice { offset: 10, size: 6 }.fits(15));
    }
}
