//! Streaming iterator over index records.
//!
//! The index is a plain concatenation of records:
//!
//! ```text
//! [N bytes] headword, UTF-8
//! [1 byte ] 0x00 terminator
//! [4|8 B  ] payload offset (width from `idxoffsetbits`)
//! [4 bytes] payload size
//! ```
//!
//! [`IndexRecords`] decodes one record per `next()` call without loading the
//! whole file. A truncated or corrupt tail ends the iteration early; the
//! reason can be inspected afterwards through [`IndexRecords::corruption`].

use std::io::{BufRead, ErrorKind, Read};

use log::{trace, warn};

use super::codec::bytes;
use super::types::error::{LexiconError, Result};
use super::types::models::{IndexRecord, OffsetBits};

/// Upper bound on a single headword. Real headwords are far shorter; hitting
/// the cap means the file is not an index or the stream lost alignment.
pub const MAX_HEADWORD_BYTES: usize = 10_000;

/// Iterator over `IndexRecord`s read from any buffered source.
///
/// Yields `Err` only for genuine I/O failures; after the first `Err` or
/// corruption the iterator is fused.
pub struct IndexRecords<R: BufRead> {
    reader: R,
    offset_bits: OffsetBits,
    decoded: usize,
    done: bool,
    corruption: Option<LexiconError>,
}

impl<R: BufRead> IndexRecords<R> {
    pub fn new(reader: R, offset_bits: OffsetBits) -> Self {
        Self {
            reader,
            offset_bits,
            decoded: 0,
            done: false,
            corruption: None,
        }
    }

    /// Number of records yielded so far.
    pub fn decoded(&self) -> usize {
        self.decoded
    }

    /// Why decoding stopped early, if it did.
    pub fn corruption(&self) -> Option<&LexiconError> {
        self.corruption.as_ref()
    }

    fn stop_corrupt(&mut self, reason: impl Into<String>) -> Option<Result<IndexRecord>> {
        let err = LexiconError::CorruptIndex {
            record: self.decoded,
            reason: reason.into(),
        };
        warn!("Stopping index decode after {} records: {}", self.decoded, err);
        self.corruption = Some(err);
        self.done = true;
        None
    }

    fn read_field(&mut self, width: usize) -> std::io::Result<Option<Vec<u8>>> {
        let mut buf = vec![0u8; width];
        match self.reader.read_exact(&mut buf) {
            Ok(()) => Ok(Some(buf)),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl<R: BufRead> Iterator for IndexRecords<R> {
    type Item = Result<IndexRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        // Headword: read up to the NUL, never more than the cap (+1 to detect breach).
        let mut head = Vec::new();
        let limit = (MAX_HEADWORD_BYTES + 1) as u64;
        let read = match (&mut self.reader).take(limit).read_until(0, &mut head) {
            Ok(n) => n,
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };
        if read == 0 {
            self.done = true;
            return None;
        }
        if head.last() != Some(&0) {
            return if head.len() > MAX_HEADWORD_BYTES {
                self.stop_corrupt(format!("headword exceeds {} bytes", MAX_HEADWORD_BYTES))
            } else {
                self.stop_corrupt("end of file inside headword")
            };
        }
        head.pop();
        if head.is_empty() {
            return self.stop_corrupt("empty headword");
        }

        let raw_offset = match self.read_field(self.offset_bits.width()) {
            Ok(Some(b)) => b,
            Ok(None) => return self.stop_corrupt("end of file inside offset field"),
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };
        let raw_size = match self.read_field(4) {
            Ok(Some(b)) => b,
            Ok(None) => return self.stop_corrupt("end of file inside size field"),
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };

        let headword = match String::from_utf8(head) {
            Ok(s) => s,
            Err(e) => {
                trace!("Headword is not valid UTF-8, decoding lossily");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        let (offset_be, offset_le) = bytes::read_offset_pair(&raw_offset);
        let record = IndexRecord {
            headword,
            offset_be,
            size_be: bytes::read_u32_be(&raw_size) as u64,
            offset_le,
            size_le: bytes::read_u32_le(&raw_size) as u64,
            raw_offset,
            raw_size,
        };
        trace!(
            "Index record {}: '{}' BE=({}, {}) LE=({}, {})",
            self.decoded,
            record.headword,
            record.offset_be,
            record.size_be,
            record.offset_le,
            record.size_le
        );
        self.decoded += 1;
        Some(Ok(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(head: &str, off: &[u8], size: &[u8]) -> Vec<u8> {
        let mut out = head.as_bytes().to_vec();
        out.push(0);
        out.extend_from_slice(off);
        out.extend_from_slice(size);
        out
    }

    #[test]
    fn decodes_32_bit_records() {
        let mut data = record("apple", &100u32.to_be_bytes(), &12u32.to_be_bytes());
        data.extend(record("pear", &112u32.to_be_bytes(), &5u32.to_be_bytes()));
        let records: Vec<_> = IndexRecords::new(data.as_slice(), OffsetBits::Bits32)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].headword, "apple");
        assert_eq!(records[0].offset_be, 100);
        assert_eq!(records[0].size_be, 12);
        assert_eq!(records[0].offset_le, u32::from_le_bytes(100u32.to_be_bytes()) as u64);
        assert_eq!(records[1].size_le, u32::from_le_bytes(5u32.to_be_bytes()) as u64);
    }

    #[test]
    fn decodes_64_bit_offsets() {
        let data = record("wide", &(1u64 << 33).to_be_bytes(), &7u32.to_be_bytes());
        let records: Vec<_> = IndexRecords::new(data.as_slice(), OffsetBits::Bits64)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records[0].offset_be, 1u64 << 33);
        assert_eq!(records[0].raw_offset.len(), 8);
    }

    #[test]
    fn truncated_tail_keeps_earlier_records() {
        let mut data = record("one", &0u32.to_be_bytes(), &1u32.to_be_bytes());
        data.extend_from_slice(b"two\0\x00\x00");
        let mut iter = IndexRecords::new(data.as_slice(), OffsetBits::Bits32);
        let records: Vec<_> = iter.by_ref().collect::<Result<_>>().unwrap();
        assert_eq!(records.len(), 1);
        assert!(matches!(iter.corruption(), Some(LexiconError::CorruptIndex { record: 1, .. })));
        assert!(iter.next().is_none());
    }

    #[test]
    fn oversized_headword_stops_decoding() {
        let mut data = vec![b'x'; MAX_HEADWORD_BYTES + 50];
        data.push(0);
        data.extend_from_slice(&[0u8; 8]);
        let mut iter = IndexRecords::new(data.as_slice(), OffsetBits::Bits32);
        assert!(iter.next().is_none());
        assert!(iter.corruption().is_some());
    }

    #[test]
    fn headword_at_cap_is_accepted() {
        let head = "y".repeat(MAX_HEADWORD_BYTES);
        let data = record(&head, &0u32.to_be_bytes(), &0u32.to_be_bytes());
        let records: Vec<_> = IndexRecords::new(data.as_slice(), OffsetBits::Bits32)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records[0].headword.len(), MAX_HEADWORD_BYTES);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let mut iter = IndexRecords::new(&b""[..], OffsetBits::Bits32);
        assert!(iter.next().is_none());
        assert!(iter.corruption().is_none());
    }
}
