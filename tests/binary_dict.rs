mod common;

use std::fs;

use common::{write_dictionary, Layout, Order};
use lexigraph::lexicon::lookup::DictSession;
use lexigraph::{BinaryDict, Endian, LexiconError, OffsetBits};

const ENTRIES: &[(&str, &str)] = &[
    ("apple", "<b>manzana</b> nf"),
    ("book", "libro nm"),
    ("cat", "gato nm"),
];

#[test]
fn opens_plain_dictionary() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = write_dictionary(&tmp.path().join("eng-spa"), "eng-spa", ENTRIES, Layout::default());

    let dict = BinaryDict::open(&dir).unwrap();
    assert_eq!(dict.bookname(), "eng-spa");
    assert!(dict.metadata.is_classic());
    assert_eq!(dict.metadata.word_count, Some(3));

    let records = dict.records(0).unwrap();
    let headwords: Vec<&str> = records.iter().map(|r| r.headword.as_str()).collect();
    assert_eq!(headwords, ["apple", "book", "cat"]);

    let value = dict.read_text(&records[0], 4096, 200).unwrap();
    assert_eq!(value.as_deref(), Some("manzana nf"));
}

#[test]
fn big_endian_record_resolves_to_big_endian() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = write_dictionary(tmp.path(), "be", ENTRIES, Layout::default());
    let dict = BinaryDict::open(&dir).unwrap();

    let book = &dict.records(0).unwrap()[1];
    let choice = dict.resolve(book);
    assert_eq!(choice.endian, Endian::Big);
    assert!(choice.in_bounds);
    assert_eq!(choice.offset, "<b>manzana</b> nf".len() as u64);
    assert_eq!(choice.size, "libro nm".len() as u64);
}

#[test]
fn little_endian_index_is_detected_per_record() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = Layout {
        order: Order::Little,
        ..Layout::default()
    };
    let dir = write_dictionary(tmp.path(), "le", ENTRIES, layout);
    let dict = BinaryDict::open(&dir).unwrap();

    let records = dict.records(0).unwrap();
    let cat = &records[2];
    assert_eq!(dict.resolve(cat).endian, Endian::Little);
    assert_eq!(dict.read_text(cat, 4096, 200).unwrap().as_deref(), Some("gato nm"));
}

#[test]
fn sixty_four_bit_offsets() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = Layout {
        version: "3.0.0",
        offset_bits: 64,
        ..Layout::default()
    };
    let dir = write_dictionary(tmp.path(), "wide", ENTRIES, layout);
    let dict = BinaryDict::open(&dir).unwrap();

    assert!(!dict.metadata.is_classic());
    let records = dict.records(0).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(dict.read_text(&records[1], 4096, 200).unwrap().as_deref(), Some("libro nm"));
}

#[test]
fn offset_width_override_fixes_wrong_metadata() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = Layout {
        version: "3.0.0",
        offset_bits: 64,
        ..Layout::default()
    };
    let dir = write_dictionary(tmp.path(), "mislabeled", ENTRIES, layout);
    let ifo = dir.join("mislabeled.ifo");
    let declared = fs::read_to_string(&ifo).unwrap().replace("idxoffsetbits=64", "idxoffsetbits=32");
    fs::write(&ifo, declared).unwrap();

    let dict = BinaryDict::open(&dir).unwrap();
    assert_eq!(dict.metadata.idx_offset_bits, OffsetBits::Bits32);
    assert_ne!(dict.records(0).unwrap().len(), 3);

    let dict = dict.with_offset_bits(OffsetBits::Bits64);
    let records = dict.records(0).unwrap();
    let headwords: Vec<&str> = records.iter().map(|r| r.headword.as_str()).collect();
    assert_eq!(headwords, ["apple", "book", "cat"]);
    assert_eq!(dict.read_text(&records[2], 4096, 200).unwrap().as_deref(), Some("gato nm"));
}

#[test]
fn compressed_companions_are_inflated_once() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = Layout {
        gzip_index: true,
        gzip_payload: true,
        ..Layout::default()
    };
    let dir = write_dictionary(tmp.path(), "gz", ENTRIES, layout);

    let first = BinaryDict::open(&dir).unwrap();
    assert_eq!(first.index_path, dir.join("gz.idx"));
    assert_eq!(first.payload_path, dir.join("gz.dict"));
    let inflated = fs::read(&first.payload_path).unwrap();

    let second = BinaryDict::open(&dir).unwrap();
    assert_eq!(second.index_path, first.index_path);
    assert_eq!(second.payload_path, first.payload_path);
    assert_eq!(fs::read(&second.payload_path).unwrap(), inflated);
    assert_eq!(second.payload_len, inflated.len() as u64);

    let records = second.records(0).unwrap();
    assert_eq!(second.read_text(&records[2], 4096, 200).unwrap().as_deref(), Some("gato nm"));
}

#[test]
fn empty_index_yields_no_records() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = write_dictionary(tmp.path(), "empty", &[], Layout::default());
    let dict = BinaryDict::open(&dir).unwrap();

    assert!(dict.records(0).unwrap().is_empty());
    assert!(dict.first_record().unwrap().is_none());
}

#[test]
fn first_record_previews_value() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = write_dictionary(tmp.path(), "first", ENTRIES, Layout::default());
    let dict = BinaryDict::open(&dir).unwrap();

    let first = dict.first_record().unwrap().unwrap();
    assert_eq!(first.bookname, "first");
    assert_eq!(first.headword, "apple");
    assert_eq!(first.endian, Endian::Big);
    assert!(first.value_snippet.contains("manzana"));

    let reports = dict.inspect(2, 512, 160).unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports[0].utf8);
    assert_eq!(reports[0].offset_be_hex(), "0x00000000");
}

#[test]
fn missing_payload_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = write_dictionary(tmp.path(), "broken", ENTRIES, Layout::default());
    fs::remove_file(dir.join("broken.dict")).unwrap();

    assert!(matches!(BinaryDict::open(&dir), Err(LexiconError::MissingFile { .. })));
}

#[test]
fn session_finds_exact_headwords() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = write_dictionary(tmp.path(), "session", ENTRIES, Layout::default());
    let session = DictSession::build(&dir).unwrap();

    assert_eq!(session.len(), 3);
    assert_eq!(session.lookup("book", 4096).unwrap().as_deref(), Some("libro nm"));
    assert_eq!(session.lookup("Book", 4096).unwrap(), None);
    assert_eq!(session.lookup("zebra", 4096).unwrap(), None);
}

#[test]
fn session_over_unsorted_index() {
    let tmp = tempfile::tempdir().unwrap();
    let entries = [("pear", "pera nf"), ("apple", "manzana nf"), ("pear", "second pear")];
    let dir = write_dictionary(tmp.path(), "unsorted", &entries, Layout::default());
    let session = DictSession::build(&dir).unwrap();

    assert_eq!(session.lookup("apple", 4096).unwrap().as_deref(), Some("manzana nf"));
    assert_eq!(session.lookup("pear", 4096).unwrap().as_deref(), Some("pera nf"));
}
