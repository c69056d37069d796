//! Per-pair lookup state built from one binary dictionary.

use std::collections::HashMap;
use std::path::Path;

use log::{debug, info, warn};

use crate::lexicon::codec::text;
use crate::lexicon::reader::BinaryDict;
use crate::lexicon::types::error::Result;
use crate::lexicon::types::models::PayloadSlice;

/// A dictionary ready for headword lookups.
///
/// Both variants hold every in-bounds record of the index; records pointing
/// outside the payload are dropped while building. For duplicate headwords
/// the first record in index order wins.
#[derive(Debug)]
pub enum DictSession {
    /// Classic dictionaries (`version=2.4.2`, 32-bit offsets): records sorted
    /// by headword and searched by bisection.
    Indexed {
        dict: BinaryDict,
        entries: Vec<(String, PayloadSlice)>,
    },
    /// Everything else: a hash map from headword to slice.
    Mapped {
        dict: BinaryDict,
        map: HashMap<String, PayloadSlice>,
    },
}

impl DictSession {
    /// Opens the dictionary in `dir` and indexes all of its records.
    pub fn build(dir: &Path) -> Result<Self> {
        let dict = BinaryDict::open(dir)?;
        let records = dict.records(0)?;
        let total = records.len();

        let mut out_of_bounds = 0usize;
        let slices = records.into_iter().filter_map(|record| {
            let choice = dict.resolve(&record);
            if choice.in_bounds {
                Some((record.headword, choice.slice()))
            } else {
                out_of_bounds += 1;
                debug!("Dropping out-of-bounds record '{}'", record.headword);
                None
            }
        });

        let session = if dict.metadata.is_classic() {
            let mut entries: Vec<(String, PayloadSlice)> = slices.collect();
            if !entries.windows(2).all(|w| w[0].0 <= w[1].0) {
                debug!("Index of {} is not byte-sorted, sorting", dict.bookname());
                entries.sort_by(|a, b| a.0.cmp(&b.0));
            }
            DictSession::Indexed { dict, entries }
        } else {
            let mut map = HashMap::with_capacity(total);
            for (headword, slice) in slices {
                map.entry(headword).or_insert(slice);
            }
            DictSession::Mapped { dict, map }
        };

        if out_of_bounds > 0 {
            warn!(
                "{}: {} of {} records point outside the payload",
                session.dict().bookname(),
                out_of_bounds,
                total
            );
        }
        info!(
            "Session for '{}' ready: {} headwords ({})",
            session.dict().bookname(),
            session.len(),
            session.kind()
        );
        Ok(session)
    }

    pub fn dict(&self) -> &BinaryDict {
        match self {
            DictSession::Indexed { dict, .. } | DictSession::Mapped { dict, .. } => dict,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DictSession::Indexed { .. } => "indexed",
            DictSession::Mapped { .. } => "mapped",
        }
    }

    /// Number of distinct headwords reachable through this session.
    pub fn len(&self) -> usize {
        match self {
            DictSession::Indexed { entries, .. } => entries.len(),
            DictSession::Mapped { map, .. } => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Payload slice of `headword`, matched exactly.
    pub fn slice(&self, headword: &str) -> Option<PayloadSlice> {
        match self {
            DictSession::Indexed { entries, .. } => {
                // Stable sort kept duplicates in index order; take the first.
                let i = entries.partition_point(|(h, _)| h.as_str() < headword);
                entries.get(i).filter(|(h, _)| h == headword).map(|(_, s)| *s)
            }
            DictSession::Mapped { map, .. } => map.get(headword).copied(),
        }
    }

    /// Cleaned value of `headword`, reading at most `max_len` payload bytes.
    pub fn lookup(&self, headword: &str, max_len: u64) -> Result<Option<String>> {
        let Some(slice) = self.slice(headword) else {
            return Ok(None);
        };
        let raw = self.dict().read(slice, max_len)?;
        Ok(Some(text::clean_text(&raw, max_len as usize)))
    }
}
