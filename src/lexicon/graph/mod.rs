//! The lexical graph: entities and the repository contract.
//!
//! [`LexicalGraphStore`] is the seam between the importer/lookup engine and
//! whatever persists the graph. The crate ships [`MemoryGraphStore`]; a
//! database-backed store implements the same trait.

pub mod memory;
pub mod models;

use serde_json::Value;

pub use memory::MemoryGraphStore;
pub use models::*;

use crate::lexicon::types::error::Result;

/// Repository for languages, lemmas, senses, translation edges and
/// dictionary records.
///
/// Writes may be buffered until [`commit_batch`](Self::commit_batch). Upserts
/// are idempotent on their natural keys so that re-running an import
/// converges to the same graph.
pub trait LexicalGraphStore: Send + Sync {
    /// Returns the language with `code`, creating it if absent. A provided
    /// `name` replaces the stored one.
    fn get_or_create_language(&self, code: &str, name: Option<&str>) -> Result<Language>;

    fn find_language(&self, code: &str) -> Result<Option<Language>>;

    fn languages(&self) -> Result<Vec<Language>>;

    /// Upserts the lemma keyed by `(language, headword, pos)`. Gender and
    /// features of an existing lemma are overwritten.
    fn get_or_create_lemma(
        &self,
        language: LanguageId,
        headword: &str,
        pos: Option<&str>,
        gender: Gender,
        features: Option<Value>,
    ) -> Result<Lemma>;

    /// Stores the sense at `rank` under `lemma`, replacing an existing sense
    /// at the same rank.
    fn add_sense(&self, lemma: LemmaId, gloss: &str, rank: u32, examples: Option<Value>) -> Result<SenseId>;

    /// Adds `src → dst` unless that edge already exists. Returns true if a new
    /// edge was staged.
    fn add_translation_edge_if_absent(
        &self,
        src: LemmaId,
        dst: LemmaId,
        rank: u32,
        meta: Option<Value>,
    ) -> Result<bool>;

    /// Upserts the dictionary record named `pair_name`, refreshing its
    /// languages and provenance.
    fn find_or_create_dictionary_record(
        &self,
        pair_name: &str,
        src: LanguageId,
        dst: LanguageId,
        provenance: &Provenance,
    ) -> Result<DictionaryRecord>;

    /// Deletes edges whose source lemma is in `src` and destination lemma is
    /// in `dst`. Returns the number of deleted edges.
    fn delete_edges_for_language_pair(&self, src: LanguageId, dst: LanguageId) -> Result<usize>;

    /// Makes buffered writes durable.
    ///
    /// # Errors
    /// [`DuplicateEdge`](crate::LexiconError::DuplicateEdge) if buffered edges
    /// collided with edges committed concurrently; all other writes of the
    /// batch are still applied.
    fn commit_batch(&self) -> Result<()>;

    /// Drops session-scoped caches after a commit. Identities obtained before
    /// must be re-resolved by the caller.
    fn release_working_set(&self) -> Result<()> {
        Ok(())
    }

    /// Up to `limit` lemmas of `language` whose headword equals `headword` or
    /// whose normalized headword equals `norm`, oldest first.
    fn find_lemmas(&self, language: LanguageId, headword: &str, norm: &str, limit: usize) -> Result<Vec<Lemma>>;

    /// Committed edges leaving `lemma` into `dst_language`, ordered by rank
    /// then destination headword.
    fn translations_from(&self, lemma: LemmaId, dst_language: LanguageId, limit: usize)
        -> Result<Vec<(Translation, Lemma)>>;

    fn senses_of(&self, lemma: LemmaId) -> Result<Vec<Sense>>;

    fn dictionaries(&self) -> Result<Vec<DictionaryRecord>>;

    fn edge_count(&self) -> Result<usize>;
}
