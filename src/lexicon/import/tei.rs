//! Pull-parser extraction of lexical entries from TEI documents.
//!
//! Only the parts of an `entry` the importer needs are collected. Elements
//! are matched on local names, so any namespace prefix (or none) works:
//!
//! ```text
//! <entry>
//!   <form><orth>house</orth></form>              → headword (first only)
//!   <gramGrp><pos>n</pos><gen>f</gen></gramGrp>  → pos, gender (first only)
//!   <sense>
//!     <def>a building</def>                      → sense gloss
//!     <cit type="translation">
//!       <quote>casa</quote>                      → translation token
//!     </cit>
//!   </sense>
//! </entry>
//! ```
//!
//! The document is never held in memory; one entry's fields are buffered at a
//! time.

use std::io::BufRead;

use log::{trace, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::lexicon::codec::text::collapse_whitespace;
use crate::lexicon::graph::Gender;
use crate::lexicon::types::error::{LexiconError, Result};

/// Fields extracted from one `entry` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeiEntry {
    /// Trimmed text of the first `form/orth`; empty if the entry has none.
    pub headword: String,
    pub pos: Option<String>,
    pub gender: Gender,
    /// `sense/def` and `sense/gloss` texts in document order, whitespace
    /// collapsed. Empty glosses are dropped.
    pub senses: Vec<String>,
    /// Trimmed, non-empty `quote` texts under translation citations.
    pub translations: Vec<String>,
}

impl TeiEntry {
    pub fn has_headword(&self) -> bool {
        !self.headword.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Orth,
    Pos,
    Gen,
    Gloss,
    Quote,
}

#[derive(Debug)]
struct Frame {
    name: String,
    translation_cit: bool,
}

#[derive(Debug)]
struct Capture {
    field: Field,
    depth: usize,
    text: String,
}

#[derive(Debug, Default)]
struct EntryState {
    entry: TeiEntry,
    orth_seen: bool,
    pos_seen: bool,
    gen_seen: bool,
    gen_raw: Option<String>,
}

/// Iterator over the entries of a TEI document.
///
/// Yields `Err` for malformed XML and stops afterwards.
pub struct TeiEntries<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    stack: Vec<Frame>,
    entry_depth: Option<usize>,
    state: EntryState,
    captures: Vec<Capture>,
    done: bool,
}

impl<R: BufRead> TeiEntries<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: Reader::from_reader(source),
            buf: Vec::new(),
            stack: Vec::new(),
            entry_depth: None,
            state: EntryState::default(),
            captures: Vec::new(),
            done: false,
        }
    }

    /// Byte position of the parser in the input.
    pub fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    fn parent_is(&self, name: &str) -> bool {
        self.stack.last().map(|f| f.name == name).unwrap_or(false)
    }

    fn inside(&self, name: &str) -> bool {
        self.stack.iter().any(|f| f.name == name)
    }

    fn inside_translation(&self) -> bool {
        self.stack.iter().any(|f| f.translation_cit)
    }

    /// Decides whether the element being opened starts a field capture.
    fn field_for(&mut self, local: &str) -> Option<Field> {
        match local {
            "orth" if self.parent_is("form") && !self.state.orth_seen => {
                self.state.orth_seen = true;
                Some(Field::Orth)
            }
            "pos" if self.parent_is("gramGrp") && !self.state.pos_seen => {
                self.state.pos_seen = true;
                Some(Field::Pos)
            }
            "gen" if self.parent_is("gramGrp") && !self.state.gen_seen => {
                self.state.gen_seen = true;
                Some(Field::Gen)
            }
            "def" | "gloss" if self.parent_is("sense") => Some(Field::Gloss),
            "quote" if self.inside_translation() => Some(Field::Quote),
            _ => None,
        }
    }

    fn open(&mut self, e: &BytesStart, empty: bool) -> Result<()> {
        let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();

        if self.entry_depth.is_none() {
            if local == "entry" && !empty {
                self.entry_depth = Some(self.stack.len());
                self.state = EntryState::default();
                self.captures.clear();
            } else if local == "entry" {
                trace!("Skipping empty <entry/>");
                return Ok(());
            }
            if !empty {
                self.stack.push(Frame { name: local, translation_cit: false });
            }
            return Ok(());
        }

        let field = self.field_for(&local);
        if empty {
            if let Some(field) = field {
                self.finish(field, String::new());
            }
            return Ok(());
        }

        let translation_cit = local == "cit" && self.inside("sense") && attr_equals(e, "type", "translation")?;
        self.stack.push(Frame { name: local, translation_cit });
        if let Some(field) = field {
            self.captures.push(Capture {
                field,
                depth: self.stack.len(),
                text: String::new(),
            });
        }
        Ok(())
    }

    /// Pops one element. Returns the finished entry when the element closed
    /// an `entry`.
    fn close(&mut self) -> Option<TeiEntry> {
        let depth = self.stack.len();
        while self.captures.last().map(|c| c.depth == depth).unwrap_or(false) {
            if let Some(capture) = self.captures.pop() {
                self.finish(capture.field, capture.text);
            }
        }
        self.stack.pop();

        if self.entry_depth == Some(self.stack.len()) {
            self.entry_depth = None;
            self.captures.clear();
            let mut state = std::mem::take(&mut self.state);
            state.entry.gender = Gender::from_tag(state.gen_raw.as_deref());
            return Some(state.entry);
        }
        None
    }

    fn finish(&mut self, field: Field, text: String) {
        let entry = &mut self.state.entry;
        match field {
            Field::Orth => entry.headword = text.trim().to_string(),
            Field::Pos => {
                let pos = text.trim();
                entry.pos = (!pos.is_empty()).then(|| pos.to_string());
            }
            Field::Gen => self.state.gen_raw = Some(text),
            Field::Gloss => {
                let gloss = collapse_whitespace(&text);
                if !gloss.is_empty() {
                    entry.senses.push(gloss);
                }
            }
            Field::Quote => {
                let quote = text.trim();
                if !quote.is_empty() {
                    entry.translations.push(quote.to_string());
                }
            }
        }
    }

    fn append_text(&mut self, text: &str) {
        for capture in &mut self.captures {
            capture.text.push_str(text);
        }
    }

    fn next_entry(&mut self) -> Result<Option<TeiEntry>> {
        loop {
            self.buf.clear();
            let event = self.reader.read_event_into(&mut self.buf)?.into_owned();
            match event {
                Event::Start(e) => self.open(&e, false)?,
                Event::Empty(e) => self.open(&e, true)?,
                Event::End(_) => {
                    if let Some(entry) = self.close() {
                        return Ok(Some(entry));
                    }
                }
                Event::Text(e) if !self.captures.is_empty() => {
                    let text = match e.unescape() {
                        Ok(text) => text.into_owned(),
                        Err(err) => {
                            warn!("Keeping raw text at byte {}: {}", TeiEntries::position(self), err);
                            String::from_utf8_lossy(&e).into_owned()
                        }
                    };
                    self.append_text(&text);
                }
                Event::CData(e) if !self.captures.is_empty() => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    self.append_text(&text);
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for TeiEntries<R> {
    type Item = Result<TeiEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

fn attr_equals(e: &BytesStart, key: &str, expected: &str) -> Result<bool> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| LexiconError::Xml(err.to_string()))?;
        if attr.key.local_name().as_ref() == key.as_bytes() {
            return Ok(match attr.unescape_value() {
                Ok(value) => value.as_ref() == expected,
                Err(_) => attr.value.as_ref() == expected.as_bytes(),
            });
        }
    }
    Ok(false)
}
