//! Where binary dictionaries for a language pair live on disk.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::lexicon::format::files;
use crate::lexicon::lang;
use crate::lexicon::types::error::Result;

/// Maps language pairs to dictionary directories.
///
/// Fetching and unpacking dictionaries is the source's business; the lookup
/// engine only needs a directory holding the companion files.
pub trait DictionarySource: Send + Sync {
    /// Directory of the dictionary for `pair` (`src-dst`), if one exists.
    fn dictionary_dir(&self, pair: &str) -> Result<Option<PathBuf>>;

    /// Pair slugs this source can serve.
    fn pairs(&self) -> Result<Vec<String>>;
}

/// Dictionaries unpacked under `<root>/<src>-<dst>/`.
///
/// Pairs are matched with either code length, so `en-es` finds
/// `<root>/eng-spa/`.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn holds_dictionary(dir: &Path) -> bool {
        files::find_first(dir, &[".ifo"]).is_some()
    }
}

impl DictionarySource for DirectoryCatalog {
    fn dictionary_dir(&self, pair: &str) -> Result<Option<PathBuf>> {
        let (src, dst) = lang::split_pair(pair)?;
        for s in lang::candidates(&src) {
            for d in lang::candidates(&dst) {
                let dir = self.root.join(lang::pair_key(&s, &d));
                if dir.is_dir() && Self::holds_dictionary(&dir) {
                    debug!("Pair {} served from {}", pair, dir.display());
                    return Ok(Some(dir));
                }
            }
        }
        Ok(None)
    }

    fn pairs(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let pairs = WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!("Error accessing entry: {}", e);
                    None
                }
            })
            .filter(|e| e.file_type().is_dir())
            .filter_map(|e| {
                let name = e.file_name().to_str()?.to_ascii_lowercase();
                (lang::split_pair(&name).is_ok() && Self::holds_dictionary(e.path())).then_some(name)
            })
            .collect();
        Ok(pairs)
    }
}
