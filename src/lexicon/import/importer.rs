use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info, warn};
use serde_json::json;

use super::tei::{TeiEntries, TeiEntry};
use crate::lexicon::graph::{DictionaryRecord, Gender, Language, LexicalGraphStore, Provenance};
use crate::lexicon::lang;
use crate::lexicon::types::error::{LexiconError, Result};

/// Entries processed between two commits.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// What to import and how.
#[derive(Debug, Clone, Default)]
pub struct ImportRequest {
    /// Pair slug, e.g. `eng-spa`.
    pub pair: String,
    pub provenance: Provenance,
    /// Delete existing edges of this pair before streaming.
    pub truncate: bool,
    /// Stop after this many processed entries.
    pub limit: Option<usize>,
}

impl ImportRequest {
    pub fn new(pair: impl Into<String>) -> Self {
        Self {
            pair: pair.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub dictionary: DictionaryRecord,
    /// Entries imported (entries without a headword are not counted).
    pub processed: usize,
    /// Entries skipped for lacking a headword.
    pub skipped: usize,
    /// Edges dropped at commit because another writer created them first.
    pub duplicates: usize,
}

/// Streams TEI entries into a [`LexicalGraphStore`].
///
/// Re-running the same import converges: lemmas and senses are upserted on
/// their natural keys and edges are only added when absent.
pub struct TeiImporter<'a, S: LexicalGraphStore + ?Sized> {
    store: &'a S,
    batch_size: usize,
}

impl<'a, S: LexicalGraphStore + ?Sized> TeiImporter<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Imports the TEI document at `path`.
    pub fn import_path(
        &self,
        request: &ImportRequest,
        path: impl AsRef<Path>,
        progress: Option<&mut dyn FnMut(usize)>,
    ) -> Result<ImportOutcome> {
        let path = path.as_ref();
        info!("Importing {} from {}", request.pair, path.display());
        let file = File::open(path)?;
        self.import_reader(request, BufReader::new(file), progress)
    }

    /// Imports a TEI document from any buffered source.
    ///
    /// # Errors
    /// - [`LexiconError::InvalidPair`] for a malformed pair slug
    /// - [`LexiconError::Xml`] when the document is not well-formed; batches
    ///   committed before the error are kept
    /// - store errors other than duplicate edges
    pub fn import_reader<R: BufRead>(
        &self,
        request: &ImportRequest,
        source: R,
        mut progress: Option<&mut dyn FnMut(usize)>,
    ) -> Result<ImportOutcome> {
        let (src_code, dst_code) = lang::split_pair(&request.pair)?;
        let mut src = self.language(&src_code)?;
        let mut dst = self.language(&dst_code)?;

        let dictionary =
            self.store
                .find_or_create_dictionary_record(&request.pair, src.id, dst.id, &request.provenance)?;
        let mut duplicates = self.commit()?;

        if request.truncate {
            let deleted = self.store.delete_edges_for_language_pair(src.id, dst.id)?;
            info!("Truncated {} existing edges for {}", deleted, request.pair);
        }

        let limit = request.limit.filter(|&l| l > 0);
        let mut processed = 0usize;
        let mut skipped = 0usize;

        for entry in TeiEntries::new(source) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Import of {} aborted after {} entries: {}", request.pair, processed, e);
                    self.commit()?;
                    return Err(e);
                }
            };

            if !entry.has_headword() {
                skipped += 1;
                debug!("Skipping entry without headword");
                continue;
            }

            self.import_entry(&src, &dst, &entry)?;
            processed += 1;

            if processed % self.batch_size == 0 {
                duplicates += self.commit()?;
                self.store.release_working_set()?;
                src = self.refresh(src)?;
                dst = self.refresh(dst)?;
                info!("{}: committed {} entries", request.pair, processed);
            }

            if let Some(progress) = progress.as_mut() {
                progress(processed);
            }
            if limit.map(|l| processed >= l).unwrap_or(false) {
                debug!("Entry limit {} reached", processed);
                break;
            }
        }

        duplicates += self.commit()?;
        info!(
            "Imported {} entries into {} ({} skipped, {} duplicate edges)",
            processed, dictionary.name, skipped, duplicates
        );

        Ok(ImportOutcome {
            dictionary,
            processed,
            skipped,
            duplicates,
        })
    }

    fn language(&self, code: &str) -> Result<Language> {
        self.store.get_or_create_language(code, lang::display_name(code))
    }

    /// Re-resolves a language after the working set was released.
    fn refresh(&self, language: Language) -> Result<Language> {
        Ok(self.store.find_language(&language.code)?.unwrap_or(language))
    }

    /// Commits, treating duplicate edges as benign. Returns how many were
    /// dropped.
    fn commit(&self) -> Result<usize> {
        match self.store.commit_batch() {
            Ok(()) => Ok(0),
            Err(LexiconError::DuplicateEdge { count }) => {
                warn!("Ignored {} duplicate translation edges on commit", count);
                Ok(count)
            }
            Err(e) => Err(e),
        }
    }

    fn import_entry(&self, src: &Language, dst: &Language, entry: &TeiEntry) -> Result<()> {
        let lemma = self.store.get_or_create_lemma(
            src.id,
            &entry.headword,
            entry.pos.as_deref(),
            entry.gender,
            None,
        )?;

        for (rank, gloss) in (1u32..).zip(&entry.senses) {
            self.store.add_sense(lemma.id, gloss, rank, None)?;
        }

        let meta = entry.pos.as_ref().map(|pos| json!({ "pos": pos }));
        for (rank, token) in (1u32..).zip(&entry.translations) {
            let target = self.store.get_or_create_lemma(dst.id, token, None, Gender::Unknown, None)?;
            self.store
                .add_translation_edge_if_absent(lemma.id, target.id, rank, meta.clone())?;
        }
        Ok(())
    }
}

/// Imports the TEI document at `path` with default settings.
pub fn import_tei<S: LexicalGraphStore + ?Sized>(
    store: &S,
    request: &ImportRequest,
    path: impl AsRef<Path>,
) -> Result<ImportOutcome> {
    TeiImporter::new(store).import_path(request, path, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::graph::MemoryGraphStore;

    const DOC: &str = r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><text><body>
        <entry><form><orth>cat</orth></form><gramGrp><pos>n</pos></gramGrp>
          <sense><def>small feline</def><cit type="translation"><quote>gato</quote><quote>gata</quote></cit></sense>
        </entry>
        <entry><sense><cit type="translation"><quote>huérfano</quote></cit></sense></entry>
        <entry><form><orth>dog</orth></form>
          <sense><cit type="translation"><quote>perro</quote></cit></sense>
        </entry>
    </body></text></TEI>"#;

    #[test]
    fn counts_processed_and_skipped() {
        let store = MemoryGraphStore::new();
        let outcome = TeiImporter::new(&store)
            .import_reader(&ImportRequest::new("eng-spa"), DOC.as_bytes(), None)
            .unwrap();
        assert_eq!(outcome.processed, 2);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.dictionary.name, "eng-spa");
        assert_eq!(store.edge_count().unwrap(), 3);
    }

    #[test]
    fn edge_meta_and_rank_follow_entry() {
        let store = MemoryGraphStore::new();
        TeiImporter::new(&store)
            .import_reader(&ImportRequest::new("eng-spa"), DOC.as_bytes(), None)
            .unwrap();
        let en = store.find_language("eng").unwrap().unwrap();
        let es = store.find_language("spa").unwrap().unwrap();
        assert_eq!(en.name, "English");

        let cat = store.find_lemmas(en.id, "cat", "cat", 5).unwrap().remove(0);
        let edges = store.translations_from(cat.id, es.id, 10).unwrap();
        let ranked: Vec<(u32, &str)> = edges.iter().map(|(t, l)| (t.rank, l.headword.as_str())).collect();
        assert_eq!(ranked, [(1, "gato"), (2, "gata")]);
        assert_eq!(edges[0].0.meta, Some(json!({ "pos": "n" })));
        assert_eq!(store.senses_of(cat.id).unwrap()[0].gloss, "small feline");
    }

    #[test]
    fn limit_and_progress() {
        let store = MemoryGraphStore::new();
        let mut seen = Vec::new();
        let mut record = |n: usize| seen.push(n);
        let request = ImportRequest {
            limit: Some(1),
            ..ImportRequest::new("eng-spa")
        };
        let outcome = TeiImporter::new(&store)
            .import_reader(&request, DOC.as_bytes(), Some(&mut record as &mut dyn FnMut(usize)))
            .unwrap();
        assert_eq!(outcome.processed, 1);
        assert_eq!(seen, [1]);
    }

    #[test]
    fn small_batches_commit_along_the_way() {
        let store = MemoryGraphStore::new();
        let outcome = TeiImporter::new(&store)
            .with_batch_size(1)
            .import_reader(&ImportRequest::new("eng-spa"), DOC.as_bytes(), None)
            .unwrap();
        assert_eq!(outcome.processed, 2);
        assert_eq!(store.pending_edges().unwrap(), 0);
        assert_eq!(store.edge_count().unwrap(), 3);
    }

    #[test]
    fn rejects_pair_without_dash() {
        let store = MemoryGraphStore::new();
        let err = TeiImporter::new(&store)
            .import_reader(&ImportRequest::new("engspa"), DOC.as_bytes(), None)
            .unwrap_err();
        assert!(matches!(err, LexiconError::InvalidPair(_)));
    }

    #[test]
    fn malformed_document_keeps_earlier_batches() {
        let store = MemoryGraphStore::new();
        let doc = r#"<body><entry><form><orth>a</orth></form>
            <sense><cit type="translation"><quote>b</quote></cit></sense></entry>
            <entry><form></orth></form></entry></body>"#;
        let err = TeiImporter::new(&store)
            .import_reader(&ImportRequest::new("eng-spa"), doc.as_bytes(), None)
            .unwrap_err();
        assert!(matches!(err, LexiconError::Xml(_)));
        assert_eq!(store.edge_count().unwrap(), 1);
    }
}
