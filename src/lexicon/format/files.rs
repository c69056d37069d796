//! Companion file discovery for a binary dictionary directory.
//!
//! A dictionary is a directory (possibly nested inside an extracted archive)
//! holding one `.ifo`, one `.idx` or `.idx.gz` and one `.dict` or `.dict.dz`.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::lexicon::codec::compression;
use crate::lexicon::types::error::{LexiconError, Result};
use crate::lexicon::types::models::DictionaryFiles;

const METADATA_SUFFIXES: &[&str] = &[".ifo"];
const INDEX_SUFFIXES: &[&str] = &[".idx", ".idx.gz"];
const PAYLOAD_SUFFIXES: &[&str] = &[".dict", ".dict.dz"];

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_ascii_lowercase().ends_with(suffix))
        .unwrap_or(false)
}

/// Finds the first regular file below `base` whose name ends with one of
/// `suffixes` (case-insensitive). Traversal is sorted by file name, so the
/// result is stable across runs.
pub fn find_first(base: &Path, suffixes: &[&str]) -> Option<PathBuf> {
    WalkDir::new(base)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("Error accessing entry: {}", e);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .find(|p| suffixes.iter().any(|s| has_suffix(p, s)))
}

fn require(dir: &Path, suffixes: &[&str], kind: &'static str) -> Result<PathBuf> {
    find_first(dir, suffixes).ok_or_else(|| LexiconError::MissingFile {
        kind,
        dir: dir.to_path_buf(),
    })
}

/// Locates the metadata, index and payload files of a dictionary.
///
/// Paths may point at compressed files; see [`ensure_index_path`] and
/// [`ensure_payload_path`] for plain variants.
pub fn locate(dir: &Path) -> Result<DictionaryFiles> {
    let files = DictionaryFiles {
        metadata: require(dir, METADATA_SUFFIXES, "metadata (.ifo)")?,
        index: require(dir, INDEX_SUFFIXES, "index (.idx/.idx.gz)")?,
        payload: require(dir, PAYLOAD_SUFFIXES, "payload (.dict/.dict.dz)")?,
    };
    debug!("Located dictionary files: {:?}", files);
    Ok(files)
}

/// Returns a plain index file, inflating `.idx.gz` next to it if needed.
///
/// An empty plain `.idx` only wins when there is no `.idx.gz` to rebuild it
/// from.
pub fn ensure_index_path(dir: &Path) -> Result<PathBuf> {
    let plain = find_first(dir, &[".idx"]);
    let gz = find_first(dir, &[".idx.gz"]);
    match (plain, gz) {
        (Some(idx), Some(gz)) if is_empty_file(&idx) => {
            debug!("Ignoring empty {}, inflating {}", idx.display(), gz.display());
            compression::decompress_if_needed(&gz, true)
        }
        (Some(idx), _) => compression::decompress_if_needed(&idx, true),
        (None, Some(gz)) => compression::decompress_if_needed(&gz, true),
        (None, None) => Err(LexiconError::MissingFile {
            kind: "index (.idx/.idx.gz)",
            dir: dir.to_path_buf(),
        }),
    }
}

fn is_empty_file(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(false)
}

/// Returns the payload file.
///
/// With `need_plain` the result is guaranteed to be uncompressed: a `.dict.dz`
/// (or a `.dict` that turns out to be gzipped) is inflated to a sibling.
/// Without it, a `.dict.dz` may be returned as-is.
pub fn ensure_payload_path(dir: &Path, need_plain: bool) -> Result<PathBuf> {
    if let Some(dict) = find_first(dir, &[".dict"]) {
        return compression::decompress_if_needed(&dict, need_plain);
    }
    let dz = require(dir, &[".dict.dz"], "payload (.dict/.dict.dz)")?;
    compression::decompress_if_needed(&dz, need_plain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn locate_finds_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("eng-spa");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("eng-spa.ifo"), "bookname=x\n").unwrap();
        fs::write(nested.join("eng-spa.IDX"), b"").unwrap();
        fs::write(nested.join("eng-spa.dict.dz"), b"").unwrap();

        let files = locate(dir.path()).unwrap();
        assert!(files.metadata.ends_with("eng-spa.ifo"));
        assert!(files.index.ends_with("eng-spa.IDX"));
        assert!(files.payload.ends_with("eng-spa.dict.dz"));
    }

    #[test]
    fn missing_payload_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.ifo"), "").unwrap();
        fs::write(dir.path().join("a.idx"), b"").unwrap();

        match locate(dir.path()) {
            Err(LexiconError::MissingFile { kind, .. }) => assert!(kind.starts_with("payload")),
            other => panic!("expected MissingFile, got {:?}", other),
        }
    }

    #[test]
    fn empty_plain_index_is_rebuilt_from_gzip() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"word\0\0\0\0\0\0\0\0\x03").unwrap();
        fs::write(dir.path().join("a.idx.gz"), encoder.finish().unwrap()).unwrap();
        fs::write(dir.path().join("a.idx"), b"").unwrap();

        let idx = ensure_index_path(dir.path()).unwrap();
        assert_eq!(idx, dir.path().join("a.idx"));
        assert_eq!(fs::read(&idx).unwrap().len(), 13);
    }

    #[test]
    fn empty_plain_index_without_gzip_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.idx"), b"").unwrap();
        assert_eq!(ensure_index_path(dir.path()).unwrap(), dir.path().join("a.idx"));
    }

    #[test]
    fn work_files_do_not_match_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.dict.unz"), b"x").unwrap();
        fs::write(dir.path().join("a.idx.part"), b"x").unwrap();
        assert!(find_first(dir.path(), PAYLOAD_SUFFIXES).is_none());
        assert!(find_first(dir.path(), INDEX_SUFFIXES).is_none());
    }
}
