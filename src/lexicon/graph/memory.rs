//! In-process [`LexicalGraphStore`] with JSON snapshots.
//!
//! The committed graph lives behind an `Arc<Mutex<_>>` shared by every
//! session handle. Translation edges are staged per session and only become
//! visible at [`commit_batch`](LexicalGraphStore::commit_batch), where the
//! `(src_lemma, dst_lemma)` uniqueness is enforced against what other
//! sessions committed in the meantime.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::models::*;
use super::LexicalGraphStore;
use crate::lexicon::codec::text::normalize_headword;
use crate::lexicon::types::error::{LexiconError, Result};

type LemmaKey = (LanguageId, String, Option<String>);

#[derive(Debug, Default)]
struct Graph {
    next_id: u64,
    languages: BTreeMap<LanguageId, Language>,
    language_by_code: HashMap<String, LanguageId>,
    lemmas: BTreeMap<LemmaId, Lemma>,
    lemma_by_key: HashMap<LemmaKey, LemmaId>,
    lemmas_by_headword: HashMap<(LanguageId, String), Vec<LemmaId>>,
    lemmas_by_norm: HashMap<(LanguageId, String), Vec<LemmaId>>,
    senses: BTreeMap<SenseId, Sense>,
    sense_by_rank: HashMap<(LemmaId, u32), SenseId>,
    edges: BTreeMap<TranslationId, Translation>,
    edge_by_pair: HashMap<(LemmaId, LemmaId), TranslationId>,
    edges_by_src: HashMap<LemmaId, Vec<TranslationId>>,
    dictionaries: BTreeMap<DictionaryId, DictionaryRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    next_id: u64,
    languages: Vec<Language>,
    lemmas: Vec<Lemma>,
    senses: Vec<Sense>,
    translations: Vec<Translation>,
    dictionaries: Vec<DictionaryRecord>,
}

#[derive(Debug)]
struct StagedEdge {
    src: LemmaId,
    dst: LemmaId,
    rank: u32,
    meta: Option<Value>,
}

#[derive(Debug, Default)]
struct Session {
    staged: Vec<StagedEdge>,
    staged_pairs: HashSet<(LemmaId, LemmaId)>,
}

impl Graph {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn index_lemma(&mut self, lemma: &Lemma) {
        self.lemma_by_key
            .insert((lemma.language, lemma.headword.clone(), lemma.pos.clone()), lemma.id);
        self.lemmas_by_headword
            .entry((lemma.language, lemma.headword.clone()))
            .or_default()
            .push(lemma.id);
        self.lemmas_by_norm
            .entry((lemma.language, lemma.norm_headword.clone()))
            .or_default()
            .push(lemma.id);
    }

    fn insert_edge(&mut self, edge: Translation) {
        self.edge_by_pair.insert((edge.src_lemma, edge.dst_lemma), edge.id);
        self.edges_by_src.entry(edge.src_lemma).or_default().push(edge.id);
        self.edges.insert(edge.id, edge);
    }

    fn lemma_language(&self, id: LemmaId) -> Option<LanguageId> {
        self.lemmas.get(&id).map(|l| l.language)
    }

    fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut graph = Graph {
            next_id: snapshot.next_id,
            ..Default::default()
        };
        for language in snapshot.languages {
            graph.language_by_code.insert(language.code.clone(), language.id);
            graph.languages.insert(language.id, language);
        }
        for lemma in snapshot.lemmas {
            graph.index_lemma(&lemma);
            graph.lemmas.insert(lemma.id, lemma);
        }
        for sense in snapshot.senses {
            graph.sense_by_rank.insert((sense.lemma, sense.rank), sense.id);
            graph.senses.insert(sense.id, sense);
        }
        for edge in snapshot.translations {
            graph.insert_edge(edge);
        }
        for dictionary in snapshot.dictionaries {
            graph.dictionaries.insert(dictionary.id, dictionary);
        }
        graph
    }

    fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            next_id: self.next_id,
            languages: self.languages.values().cloned().collect(),
            lemmas: self.lemmas.values().cloned().collect(),
            senses: self.senses.values().cloned().collect(),
            translations: self.edges.values().cloned().collect(),
            dictionaries: self.dictionaries.values().cloned().collect(),
        }
    }
}

/// Shared in-memory graph plus a per-handle edge staging area.
///
/// [`new_session`](Self::new_session) returns another handle onto the same
/// graph with its own staging area, which is how concurrent importers are
/// modelled.
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    graph: Arc<Mutex<Graph>>,
    session: Mutex<Session>,
    checkpoint: Option<PathBuf>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Another handle onto the same graph with an empty staging area.
    pub fn new_session(&self) -> Self {
        Self {
            graph: Arc::clone(&self.graph),
            session: Mutex::new(Session::default()),
            checkpoint: self.checkpoint.clone(),
        }
    }

    /// Saves the committed graph to `path` at every
    /// [`commit_batch`](LexicalGraphStore::commit_batch), so a failing import
    /// loses at most the entries since its last commit.
    pub fn with_checkpoint(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint = Some(path.into());
        self
    }

    /// Loads a snapshot written by [`save`](Self::save).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let snapshot: Snapshot = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        info!(
            "Loaded graph snapshot {}: {} lemmas, {} edges",
            path.display(),
            snapshot.lemmas.len(),
            snapshot.translations.len()
        );
        Ok(Self {
            graph: Arc::new(Mutex::new(Graph::from_snapshot(snapshot))),
            session: Mutex::new(Session::default()),
            checkpoint: None,
        })
    }

    /// Loads `path` if it exists, otherwise starts empty.
    pub fn open_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No graph snapshot at {}, starting empty", path.display());
            Ok(Self::new())
        }
    }

    /// Writes the committed graph as JSON. Staged edges are not included.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let pending = self.session()?.staged.len();
        if pending > 0 {
            warn!("Saving snapshot with {} uncommitted edges left out", pending);
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let snapshot = self.graph()?.to_snapshot();
        let tmp = path.with_extension("json.part");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(&mut writer, &snapshot)?;
            writer.flush()?;
        }
        fs::rename(&tmp, path)?;
        info!("Saved graph snapshot to {}", path.display());
        Ok(())
    }

    /// Number of edges staged in this session.
    pub fn pending_edges(&self) -> Result<usize> {
        Ok(self.session()?.staged.len())
    }

    fn graph(&self) -> Result<MutexGuard<'_, Graph>> {
        self.graph.lock().map_err(|_| LexiconError::LockPoisoned)
    }

    fn session(&self) -> Result<MutexGuard<'_, Session>> {
        self.session.lock().map_err(|_| LexiconError::LockPoisoned)
    }
}

impl LexicalGraphStore for MemoryGraphStore {
    fn get_or_create_language(&self, code: &str, name: Option<&str>) -> Result<Language> {
        let code = code.trim().to_lowercase();
        if code.is_empty() {
            return Err(LexiconError::Store("empty language code".into()));
        }
        let mut graph = self.graph()?;
        if let Some(id) = graph.language_by_code.get(&code).copied() {
            let language = graph
                .languages
                .get_mut(&id)
                .ok_or_else(|| LexiconError::Store(format!("dangling language index for '{}'", code)))?;
            if let Some(name) = name.filter(|n| !n.is_empty()) {
                language.name = name.to_string();
            }
            return Ok(language.clone());
        }
        let id = LanguageId(graph.allocate());
        let language = Language {
            id,
            name: name.filter(|n| !n.is_empty()).unwrap_or(&code).to_string(),
            code: code.clone(),
        };
        graph.language_by_code.insert(code, id);
        graph.languages.insert(id, language.clone());
        debug!("Created language {} ({})", language.code, id);
        Ok(language)
    }

    fn find_language(&self, code: &str) -> Result<Option<Language>> {
        let code = code.trim().to_lowercase();
        let graph = self.graph()?;
        Ok(graph
            .language_by_code
            .get(&code)
            .and_then(|id| graph.languages.get(id))
            .cloned())
    }

    fn languages(&self) -> Result<Vec<Language>> {
        Ok(self.graph()?.languages.values().cloned().collect())
    }

    fn get_or_create_lemma(
        &self,
        language: LanguageId,
        headword: &str,
        pos: Option<&str>,
        gender: Gender,
        features: Option<Value>,
    ) -> Result<Lemma> {
        let mut graph = self.graph()?;
        if !graph.languages.contains_key(&language) {
            return Err(LexiconError::Store(format!("unknown language id {}", language)));
        }
        let pos = pos.map(str::to_string);
        let key = (language, headword.to_string(), pos.clone());

        if let Some(id) = graph.lemma_by_key.get(&key).copied() {
            let lemma = graph
                .lemmas
                .get_mut(&id)
                .ok_or_else(|| LexiconError::Store(format!("dangling lemma index for '{}'", headword)))?;
            lemma.gender = gender;
            lemma.features = features;
            return Ok(lemma.clone());
        }

        let lemma = Lemma {
            id: LemmaId(graph.allocate()),
            language,
            headword: headword.to_string(),
            norm_headword: normalize_headword(headword),
            pos,
            gender,
            features,
        };
        graph.index_lemma(&lemma);
        graph.lemmas.insert(lemma.id, lemma.clone());
        Ok(lemma)
    }

    fn add_sense(&self, lemma: LemmaId, gloss: &str, rank: u32, examples: Option<Value>) -> Result<SenseId> {
        let mut graph = self.graph()?;
        if !graph.lemmas.contains_key(&lemma) {
            return Err(LexiconError::Store(format!("unknown lemma id {}", lemma)));
        }
        if let Some(id) = graph.sense_by_rank.get(&(lemma, rank)).copied() {
            if let Some(sense) = graph.senses.get_mut(&id) {
                sense.gloss = gloss.to_string();
                sense.examples = examples;
                return Ok(id);
            }
        }
        let id = SenseId(graph.allocate());
        graph.sense_by_rank.insert((lemma, rank), id);
        graph.senses.insert(
            id,
            Sense {
                id,
                lemma,
                rank,
                gloss: gloss.to_string(),
                examples,
            },
        );
        Ok(id)
    }

    fn add_translation_edge_if_absent(
        &self,
        src: LemmaId,
        dst: LemmaId,
        rank: u32,
        meta: Option<Value>,
    ) -> Result<bool> {
        {
            let graph = self.graph()?;
            if !graph.lemmas.contains_key(&src) || !graph.lemmas.contains_key(&dst) {
                return Err(LexiconError::Store(format!("unknown lemma in edge {} -> {}", src, dst)));
            }
            if graph.edge_by_pair.contains_key(&(src, dst)) {
                return Ok(false);
            }
        }
        let mut session = self.session()?;
        if !session.staged_pairs.insert((src, dst)) {
            return Ok(false);
        }
        session.staged.push(StagedEdge { src, dst, rank, meta });
        Ok(true)
    }

    fn find_or_create_dictionary_record(
        &self,
        pair_name: &str,
        src: LanguageId,
        dst: LanguageId,
        provenance: &Provenance,
    ) -> Result<DictionaryRecord> {
        let mut graph = self.graph()?;
        if let Some(record) = graph.dictionaries.values_mut().find(|d| d.name == pair_name) {
            record.src = src;
            record.dst = dst;
            record.provenance = provenance.clone();
            return Ok(record.clone());
        }
        let record = DictionaryRecord {
            id: DictionaryId(graph.allocate()),
            name: pair_name.to_string(),
            src,
            dst,
            provenance: provenance.clone(),
        };
        graph.dictionaries.insert(record.id, record.clone());
        info!("Registered dictionary {}", pair_name);
        Ok(record)
    }

    fn delete_edges_for_language_pair(&self, src: LanguageId, dst: LanguageId) -> Result<usize> {
        let mut graph = self.graph()?;
        let doomed: Vec<TranslationId> = graph
            .edges
            .values()
            .filter(|e| {
                graph.lemma_language(e.src_lemma) == Some(src) && graph.lemma_language(e.dst_lemma) == Some(dst)
            })
            .map(|e| e.id)
            .collect();

        for id in &doomed {
            if let Some(edge) = graph.edges.remove(id) {
                graph.edge_by_pair.remove(&(edge.src_lemma, edge.dst_lemma));
                if let Some(list) = graph.edges_by_src.get_mut(&edge.src_lemma) {
                    list.retain(|e| e != id);
                }
            }
        }

        let mut session = self.session()?;
        let before = session.staged.len();
        let Session { staged, staged_pairs } = &mut *session;
        staged.retain(|e| {
            let hit = graph.lemma_language(e.src) == Some(src) && graph.lemma_language(e.dst) == Some(dst);
            if hit {
                staged_pairs.remove(&(e.src, e.dst));
            }
            !hit
        });
        let dropped = before - session.staged.len();

        info!(
            "Deleted {} edges ({} staged) for language pair {} -> {}",
            doomed.len(),
            dropped,
            src,
            dst
        );
        Ok(doomed.len() + dropped)
    }

    fn commit_batch(&self) -> Result<()> {
        let staged = {
            let mut session = self.session()?;
            session.staged_pairs.clear();
            std::mem::take(&mut session.staged)
        };

        let mut duplicates = 0;
        if !staged.is_empty() {
            let mut graph = self.graph()?;
            let mut written = 0;
            for edge in staged {
                if graph.edge_by_pair.contains_key(&(edge.src, edge.dst)) {
                    duplicates += 1;
                    continue;
                }
                let id = TranslationId(graph.allocate());
                graph.insert_edge(Translation {
                    id,
                    src_lemma: edge.src,
                    dst_lemma: edge.dst,
                    rank: edge.rank,
                    meta: edge.meta,
                });
                written += 1;
            }
            debug!("Committed {} edges ({} duplicates)", written, duplicates);
        }

        // Lemmas and senses are written eagerly, so checkpoint even without edges.
        if let Some(path) = &self.checkpoint {
            self.save(path)?;
        }

        if duplicates > 0 {
            return Err(LexiconError::DuplicateEdge { count: duplicates });
        }
        Ok(())
    }

    fn find_lemmas(&self, language: LanguageId, headword: &str, norm: &str, limit: usize) -> Result<Vec<Lemma>> {
        let graph = self.graph()?;
        let mut ids: Vec<LemmaId> = graph
            .lemmas_by_headword
            .get(&(language, headword.to_string()))
            .into_iter()
            .chain(graph.lemmas_by_norm.get(&(language, norm.to_string())))
            .flatten()
            .copied()
            .collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids
            .into_iter()
            .filter_map(|id| graph.lemmas.get(&id).cloned())
            .take(limit)
            .collect())
    }

    fn translations_from(
        &self,
        lemma: LemmaId,
        dst_language: LanguageId,
        limit: usize,
    ) -> Result<Vec<(Translation, Lemma)>> {
        let graph = self.graph()?;
        let mut out: Vec<(Translation, Lemma)> = graph
            .edges_by_src
            .get(&lemma)
            .into_iter()
            .flatten()
            .filter_map(|id| graph.edges.get(id))
            .filter_map(|edge| {
                graph
                    .lemmas
                    .get(&edge.dst_lemma)
                    .filter(|dst| dst.language == dst_language)
                    .map(|dst| (edge.clone(), dst.clone()))
            })
            .collect();
        out.sort_by(|(a, la), (b, lb)| a.rank.cmp(&b.rank).then_with(|| la.headword.cmp(&lb.headword)));
        out.truncate(limit);
        Ok(out)
    }

    fn senses_of(&self, lemma: LemmaId) -> Result<Vec<Sense>> {
        let graph = self.graph()?;
        let mut senses: Vec<Sense> = graph.senses.values().filter(|s| s.lemma == lemma).cloned().collect();
        senses.sort_by_key(|s| s.rank);
        Ok(senses)
    }

    fn dictionaries(&self) -> Result<Vec<DictionaryRecord>> {
        Ok(self.graph()?.dictionaries.values().cloned().collect())
    }

    fn edge_count(&self) -> Result<usize> {
        Ok(self.graph()?.edges.len())
    }
}
