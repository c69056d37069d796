//! Fixture builders shared by the integration tests.
#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Big,
    Little,
}

/// How a dictionary fixture is laid out on disk.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub version: &'static str,
    pub offset_bits: u32,
    pub order: Order,
    pub gzip_index: bool,
    pub gzip_payload: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            version: "2.4.2",
            offset_bits: 32,
            order: Order::Big,
            gzip_index: false,
            gzip_payload: false,
        }
    }
}

fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

fn push_number(out: &mut Vec<u8>, value: u64, width: usize, order: Order) {
    let be = value.to_be_bytes();
    let field = &be[8 - width..];
    match order {
        Order::Big => out.extend_from_slice(field),
        Order::Little => out.extend(field.iter().rev()),
    }
}

/// Writes `<dir>/<name>.{ifo,idx,dict}` with `entries` in the given order.
///
/// Values are stored back to back in the payload; the index records point at
/// them in the requested byte order.
pub fn write_dictionary(dir: &Path, name: &str, entries: &[(&str, &str)], layout: Layout) -> PathBuf {
    fs::create_dir_all(dir).unwrap();

    let mut payload = Vec::new();
    let mut index = Vec::new();
    let width = if layout.offset_bits == 64 { 8 } else { 4 };
    for (headword, value) in entries {
        index.extend_from_slice(headword.as_bytes());
        index.push(0);
        push_number(&mut index, payload.len() as u64, width, layout.order);
        push_number(&mut index, value.len() as u64, 4, layout.order);
        payload.extend_from_slice(value.as_bytes());
    }

    fs::write(
        dir.join(format!("{name}.ifo")),
        format!(
            "StarDict's dict ifo file\nversion={}\nbookname={}\nwordcount={}\nidxoffsetbits={}\nsametypesequence=m\n",
            layout.version,
            name,
            entries.len(),
            layout.offset_bits
        ),
    )
    .unwrap();

    if layout.gzip_index {
        fs::write(dir.join(format!("{name}.idx.gz")), gzip(&index)).unwrap();
    } else {
        fs::write(dir.join(format!("{name}.idx")), &index).unwrap();
    }
    if layout.gzip_payload {
        fs::write(dir.join(format!("{name}.dict.dz")), gzip(&payload)).unwrap();
    } else {
        fs::write(dir.join(format!("{name}.dict")), &payload).unwrap();
    }
    dir.to_path_buf()
}

/// A small English to Spanish TEI document.
pub const ENG_SPA_TEI: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<TEI xmlns="http://www.tei-c.org/ns/1.0">
  <text><body>
    <entry>
      <form><orth>cat</orth></form>
      <gramGrp><pos>n</pos></gramGrp>
      <sense>
        <def>small domesticated feline</def>
        <cit type="translation" xml:lang="es"><quote>gato</quote></cit>
        <cit type="translation" xml:lang="es"><quote>gata</quote></cit>
      </sense>
    </entry>
    <entry>
      <form><orth>house</orth></form>
      <gramGrp><pos>n</pos></gramGrp>
      <sense>
        <cit type="translation" xml:lang="es"><quote>casa</quote></cit>
      </sense>
    </entry>
    <entry>
      <form><orth>café</orth></form>
      <gramGrp><pos>n</pos></gramGrp>
      <sense>
        <cit type="translation" xml:lang="es"><quote>cafetería</quote></cit>
      </sense>
    </entry>
    <entry>
      <form><orth></orth></form>
      <sense><cit type="translation"><quote>nada</quote></cit></sense>
    </entry>
  </body></text>
</TEI>
"#;

/// An English to French TEI document.
pub const ENG_FRA_TEI: &str = r#"<TEI>
  <text><body>
    <entry>
      <form><orth>cat</orth></form>
      <gramGrp><pos>n</pos><gen>m</gen></gramGrp>
      <sense><cit type="translation"><quote>chat</quote></cit></sense>
    </entry>
  </body></text>
</TEI>
"#;
