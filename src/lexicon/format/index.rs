//! Index decoding and byte-order disambiguation.
//!
//! The format documents big-endian fields, but real-world dictionaries exist
//! whose tooling wrote little-endian ones. Every record is therefore decoded
//! both ways and [`resolve_endianness`] picks the interpretation that fits
//! inside the payload.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info};

use crate::lexicon::iter::IndexRecords;
use crate::lexicon::types::error::Result;
use crate::lexicon::types::models::{Endian, EndianChoice, IndexRecord, OffsetBits, PayloadSlice};

/// Decodes up to `limit` records (`0` = all) from an index source.
///
/// Corruption ends decoding early and the records read so far are returned.
/// I/O failures are propagated.
pub fn decode_index_from<R: BufRead>(
    reader: R,
    offset_bits: OffsetBits,
    limit: usize,
) -> Result<Vec<IndexRecord>> {
    let mut iter = IndexRecords::new(reader, offset_bits);
    let mut records = Vec::new();
    for record in iter.by_ref() {
        records.push(record?);
        if limit > 0 && records.len() >= limit {
            break;
        }
    }
    if let Some(reason) = iter.corruption() {
        debug!("Index decode returned partial result: {}", reason);
    }
    Ok(records)
}

/// Decodes up to `limit` records (`0` = all) from a plain index file.
pub fn decode_index(path: &Path, offset_bits: OffsetBits, limit: usize) -> Result<Vec<IndexRecord>> {
    info!(
        "Decoding index {} ({}-bit offsets, limit={})",
        path.display(),
        offset_bits.bits(),
        limit
    );
    let file = File::open(path)?;
    let records = decode_index_from(BufReader::new(file), offset_bits, limit)?;
    info!("Decoded {} index records", records.len());
    Ok(records)
}

/// Picks the byte order whose offset/size pair fits in the payload.
///
/// - only BE fits → BE
/// - only LE fits → LE
/// - both fit → BE (the documented default)
/// - neither fits → BE raw values with `in_bounds = false`
pub fn resolve_endianness(
    payload_len: u64,
    offset_be: u64,
    size_be: u64,
    offset_le: u64,
    size_le: u64,
) -> EndianChoice {
    let be = PayloadSlice { offset: offset_be, size: size_be };
    let le = PayloadSlice { offset: offset_le, size: size_le };

    let (slice, endian, in_bounds) = match (be.fits(payload_len), le.fits(payload_len)) {
        (true, _) => (be, Endian::Big, true),
        (false, true) => (le, Endian::Little, true),
        (false, false) => (be, Endian::Big, false),
    };
    EndianChoice {
        offset: slice.offset,
        size: slice.size,
        endian,
        in_bounds,
    }
}

/// [`resolve_endianness`] applied to a decoded record.
pub fn resolve_record(record: &IndexRecord, payload_len: u64) -> EndianChoice {
    resolve_endianness(
        payload_len,
        record.offset_be,
        record.size_be,
        record.offset_le,
        record.size_le,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn big_endian_preferred_when_only_it_fits() {
        let garbage = u32::from_le_bytes(100u32.to_be_bytes()) as u64;
        let choice = resolve_endianness(500, 100, 12, garbage, garbage);
        assert_eq!(choice.endian, Endian::Big);
        assert!(choice.in_bounds);
        assert_eq!((choice.offset, choice.size), (100, 12));
    }

    #[test]
    fn little_endian_chosen_when_only_it_fits() {
        let choice = resolve_endianness(500, 1 << 30, 12, 40, 8);
        assert_eq!(choice.endian, Endian::Little);
        assert_eq!((choice.offset, choice.size), (40, 8));
        assert!(choice.in_bounds);
    }

    #[test]
    fn ties_always_go_big_endian() {
        for _ in 0..10 {
            let choice = resolve_endianness(1000, 10, 10, 20, 20);
            assert_eq!(choice.endian, Endian::Big);
            assert_eq!(choice.offset, 10);
        }
    }

    #[test]
    fn nothing_fits_flags_out_of_bounds() {
        let choice = resolve_endianness(10, 50, 5, 60, 5);
        assert_eq!(choice.endian, Endian::Big);
        assert!(!choice.in_bounds);
        assert_eq!((choice.offset, choice.size), (50, 5));
    }

    #[test]
    fn exact_end_is_in_bounds() {
        assert!(resolve_endianness(112, 100, 12, u64::MAX, 1).in_bounds);
        assert!(!resolve_endianness(111, 100, 12, u64::MAX, 1).in_bounds);
    }

    #[test]
    fn limit_caps_decoded_records() {
        let mut data = Vec::new();
        for (i, w) in ["a", "b", "c"].iter().enumerate() {
            data.extend_from_slice(w.as_bytes());
            data.push(0);
            data.extend_from_slice(&(i as u32).to_be_bytes());
            data.extend_from_slice(&1u32.to_be_bytes());
        }
        let two = decode_index_from(data.as_slice(), OffsetBits::Bits32, 2).unwrap();
        assert_eq!(two.len(), 2);
        let all = decode_index_from(data.as_slice(), OffsetBits::Bits32, 0).unwrap();
        assert_eq!(all.len(), 3);
    }
}
