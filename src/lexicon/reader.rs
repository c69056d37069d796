use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::{info, warn};

use super::codec::{bytes, text};
use super::format::{files, index, metadata};
use super::types::error::Result;
use super::types::models::*;

/// Reads `min(size, max_len)` bytes at `offset`.
///
/// A zero size yields an empty buffer without touching the file. A read that
/// hits end of file early returns the bytes that were available, so a corrupt
/// index entry can never make this allocate more than `max_len` bytes.
pub fn read_slice(path: &Path, offset: u64, size: u64, max_len: u64) -> Result<Vec<u8>> {
    let n = size.min(max_len);
    if n == 0 {
        return Ok(Vec::new());
    }
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = Vec::with_capacity(n as usize);
    file.take(n).read_to_end(&mut buf)?;
    Ok(buf)
}

/// An opened binary dictionary with plain index and payload files.
///
/// Opening inflates compressed companions once (see
/// [`decompress_if_needed`](crate::lexicon::codec::compression::decompress_if_needed))
/// and records the payload length used for bounds checks.
#[derive(Debug, Clone)]
pub struct BinaryDict {
    pub dir: PathBuf,
    pub files: DictionaryFiles,
    pub metadata: DictionaryMetadata,
    pub index_path: PathBuf,
    pub payload_path: PathBuf,
    pub payload_len: u64,
}

/// Diagnostic view of one index record.
#[derive(Debug, Clone)]
pub struct RecordReport {
    pub record: IndexRecord,
    pub choice: EndianChoice,
    pub utf8: bool,
    pub preview: String,
    pub hex_dump: String,
}

impl RecordReport {
    pub fn offset_be_hex(&self) -> String {
        bytes::hex_upper(&self.record.raw_offset)
    }

    pub fn size_be_hex(&self) -> String {
        bytes::hex_upper(&self.record.raw_size)
    }

    pub fn offset_le_hex(&self) -> String {
        bytes::hex_upper_reversed(&self.record.raw_offset)
    }

    pub fn size_le_hex(&self) -> String {
        bytes::hex_upper_reversed(&self.record.raw_size)
    }
}

/// First headword of a dictionary with a short value preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstRecord {
    pub bookname: String,
    pub headword: String,
    pub value_snippet: String,
    pub endian: Endian,
}

impl BinaryDict {
    /// Opens the dictionary stored under `dir`.
    ///
    /// # Errors
    /// Returns an error if:
    /// - Any companion file is missing
    /// - A compressed companion cannot be inflated
    /// - The metadata or payload cannot be read
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        info!("Opening binary dictionary in {}", dir.display());

        let located = files::locate(dir)?;
        let metadata = metadata::parse(&located.metadata)?;
        let index_path = files::ensure_index_path(dir)?;
        let payload_path = files::ensure_payload_path(dir, true)?;
        let payload_len = fs::metadata(&payload_path)?.len();

        info!(
            "Dictionary '{}' opened: version={}, {}-bit offsets, payload={} bytes",
            metadata.bookname.as_deref().unwrap_or("?"),
            metadata.version,
            metadata.idx_offset_bits.bits(),
            payload_len
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            files: located,
            metadata,
            index_path,
            payload_path,
            payload_len,
        })
    }

    /// Overrides the declared offset width, for dictionaries whose metadata
    /// gets `idxoffsetbits` wrong.
    pub fn with_offset_bits(mut self, bits: OffsetBits) -> Self {
        if bits != self.metadata.idx_offset_bits {
            warn!(
                "Overriding declared {}-bit offsets with {}-bit",
                self.metadata.idx_offset_bits.bits(),
                bits.bits()
            );
            self.metadata.idx_offset_bits = bits;
        }
        self
    }

    pub fn bookname(&self) -> String {
        self.metadata
            .bookname
            .clone()
            .unwrap_or_else(|| self.dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default())
    }

    /// Decodes up to `limit` records (`0` = all).
    pub fn records(&self, limit: usize) -> Result<Vec<IndexRecord>> {
        index::decode_index(&self.index_path, self.metadata.idx_offset_bits, limit)
    }

    /// Resolves the byte order of `record` against this payload.
    pub fn resolve(&self, record: &IndexRecord) -> EndianChoice {
        index::resolve_record(record, self.payload_len)
    }

    /// Reads a payload slice, capped at `max_len` bytes.
    pub fn read(&self, slice: PayloadSlice, max_len: u64) -> Result<Vec<u8>> {
        read_slice(&self.payload_path, slice.offset, slice.size, max_len)
    }

    /// Reads and cleans the value of `record`.
    ///
    /// Returns `None` when neither byte order fits the payload.
    pub fn read_text(&self, record: &IndexRecord, max_len: u64, max_chars: usize) -> Result<Option<String>> {
        let choice = self.resolve(record);
        if !choice.in_bounds {
            warn!(
                "Record '{}' points outside the payload (BE {}+{}, LE {}+{}, payload {})",
                record.headword, record.offset_be, record.size_be, record.offset_le, record.size_le, self.payload_len
            );
            return Ok(None);
        }
        let raw = self.read(choice.slice(), max_len)?;
        Ok(Some(text::clean_text(&raw, max_chars)))
    }

    /// Builds diagnostic reports for the first `limit` records.
    pub fn inspect(&self, limit: usize, max_len: u64, preview_chars: usize) -> Result<Vec<RecordReport>> {
        self.records(limit.max(1))?
            .into_iter()
            .map(|record| {
                let choice = self.resolve(&record);
                let payload = self.read(choice.slice(), max_len)?;
                Ok(RecordReport {
                    utf8: std::str::from_utf8(&payload).is_ok(),
                    preview: text::preview_text(&payload, preview_chars),
                    hex_dump: bytes::hex_dump(&payload, 64),
                    record,
                    choice,
                })
            })
            .collect()
    }

    /// Returns the first record with a 400-character preview, or `None` for
    /// an empty index.
    pub fn first_record(&self) -> Result<Option<FirstRecord>> {
        let Some(record) = self.records(1)?.into_iter().next() else {
            return Ok(None);
        };
        let choice = self.resolve(&record);
        let payload = self.read(choice.slice(), 2048)?;
        Ok(Some(FirstRecord {
            bookname: self.bookname(),
            headword: record.headword,
            value_snippet: text::preview_text(&payload, 400),
            endian: choice.endian,
        }))
    }
}
