//! Transparent gzip/dictzip handling for index and payload files.
//!
//! Dictzip is a gzip stream with a random-access table in the FEXTRA header,
//! so a plain gzip decoder inflates it. Compression is detected by magic
//! bytes, never by file extension.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use log::{debug, info, trace};

use crate::lexicon::types::error::{LexiconError, Result};

/// gzip member header: ID1, ID2, CM=deflate.
pub const GZIP_MAGIC: [u8; 3] = [0x1F, 0x8B, 0x08];

/// Returns true if the file starts with the gzip magic bytes.
///
/// Unreadable or too-short files are reported as not compressed.
pub fn is_gzip_file(path: &Path) -> bool {
    let mut sig = [0u8; 3];
    match File::open(path).and_then(|mut f| f.read_exact(&mut sig)) {
        Ok(()) => sig == GZIP_MAGIC,
        Err(_) => false,
    }
}

/// Sibling path a compressed file decompresses to.
///
/// `foo.idx.gz` → `foo.idx`, `foo.dict.dz` → `foo.dict`; any other name
/// (e.g. a `.dict` that is secretly gzipped) gets an `.unz` suffix.
pub fn plain_sibling(path: &Path) -> PathBuf {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("gz") | Some("dz") => path.with_extension(""),
        _ => {
            let mut name = path.as_os_str().to_owned();
            name.push(".unz");
            PathBuf::from(name)
        }
    }
}

/// Returns a path that can be read as plain bytes when `force_plain` is set.
///
/// - Plain files are returned unchanged.
/// - Compressed files are returned unchanged when `force_plain` is false.
/// - Otherwise the file is inflated to its [`plain_sibling`]; an existing
///   non-empty sibling is reused, so repeated calls do no work.
pub fn decompress_if_needed(path: &Path, force_plain: bool) -> Result<PathBuf> {
    if !is_gzip_file(path) {
        trace!("{} is not gzip-compressed", path.display());
        return Ok(path.to_path_buf());
    }
    if !force_plain {
        return Ok(path.to_path_buf());
    }
    let dest = plain_sibling(path);
    gunzip_to(path, &dest)?;
    Ok(dest)
}

/// Inflates `src` into `dest` unless `dest` already exists and is non-empty.
///
/// Output goes to a `.part` file first and is renamed into place, so an
/// interrupted run never leaves a truncated file that would later be reused.
pub fn gunzip_to(src: &Path, dest: &Path) -> Result<()> {
    if fs::metadata(dest).map(|m| m.is_file() && m.len() > 0).unwrap_or(false) {
        debug!("Reusing decompressed sibling {}", dest.display());
        return Ok(());
    }
    info!("Decompressing {} -> {}", src.display(), dest.display());

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut part = dest.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    let mut decoder = MultiGzDecoder::new(BufReader::new(File::open(src)?));
    let written = {
        let mut out = BufWriter::new(File::create(&part)?);
        let n = io::copy(&mut decoder, &mut out).map_err(|e| {
            let _ = fs::remove_file(&part);
            LexiconError::Decompression {
                path: src.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        out.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        n
    };
    fs::rename(&part, dest)?;
    debug!("Inflated {} bytes into {}", written, dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn write_gz(path: &Path, data: &[u8]) {
        let mut enc = GzEncoder::new(File::create(path).unwrap(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap();
    }

    #[test]
    fn sibling_names() {
        assert_eq!(plain_sibling(Path::new("/d/x.idx.gz")), PathBuf::from("/d/x.idx"));
        assert_eq!(plain_sibling(Path::new("/d/x.dict.DZ")), PathBuf::from("/d/x.dict"));
        assert_eq!(plain_sibling(Path::new("/d/x.dict")), PathBuf::from("/d/x.dict.unz"));
    }

    #[test]
    fn detects_magic_regardless_of_extension() {
        let dir = tempfile::tempdir().unwrap();
        let disguised = dir.path().join("words.dict");
        write_gz(&disguised, b"payload");
        assert!(is_gzip_file(&disguised));

        let plain = dir.path().join("words.dict.dz");
        fs::write(&plain, b"plain bytes").unwrap();
        assert!(!is_gzip_file(&plain));
        assert_eq!(decompress_if_needed(&plain, true).unwrap(), plain);
    }

    #[test]
    fn compressed_file_kept_when_plain_not_required() {
        let dir = tempfile::tempdir().unwrap();
        let gz = dir.path().join("a.dict.dz");
        write_gz(&gz, b"abc");
        assert_eq!(decompress_if_needed(&gz, false).unwrap(), gz);
        assert!(!dir.path().join("a.dict").exists());
    }

    #[test]
    fn decompression_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let gz = dir.path().join("a.idx.gz");
        write_gz(&gz, b"hello index");

        let first = decompress_if_needed(&gz, true).unwrap();
        assert_eq!(fs::read(&first).unwrap(), b"hello index");

        // Overwrite the sibling with a sentinel: a second call must reuse it.
        fs::write(&first, b"sentinel").unwrap();
        let second = decompress_if_needed(&gz, true).unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::read(&second).unwrap(), b"sentinel");
    }

    #[test]
    fn empty_sibling_is_regenerated() {
        let dir = tempfile::tempdir().unwrap();
        let gz = dir.path().join("b.idx.gz");
        write_gz(&gz, b"data");
        fs::write(dir.path().join("b.idx"), b"").unwrap();
        let out = decompress_if_needed(&gz, true).unwrap();
        assert_eq!(fs::read(out).unwrap(), b"data");
    }
}
