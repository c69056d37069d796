use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use log::{debug, info, trace};

use super::catalog::DictionarySource;
use super::session::DictSession;
use super::tokens::{tokenize, Token};
use crate::lexicon::codec::text::normalize_headword;
use crate::lexicon::graph::{Gender, Language, LexicalGraphStore};
use crate::lexicon::lang;
use crate::lexicon::types::error::{LexiconError, Result};

/// Tunables of the lookup engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupOptions {
    /// Cap on payload bytes read per binary lookup.
    pub max_slice_len: u64,
    /// Graph alternates considered when translating a token.
    pub max_alternates: usize,
    /// Graph alternates joined by [`LookupEngine::lookup_one`].
    pub lookup_limit: usize,
    /// Source lemmas examined per graph lookup.
    pub candidate_lemmas: usize,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            max_slice_len: 4096,
            max_alternates: 1,
            lookup_limit: 5,
            candidate_lemmas: 5,
        }
    }
}

type SessionSlot = Mutex<Option<Arc<DictSession>>>;

/// Resolves tokens of a language pair to target-language renderings.
///
/// Binary dictionary sessions are built lazily per pair and kept for the
/// lifetime of the engine. Warm-up of one pair is single-flight: concurrent
/// callers for the same pair wait on the pair's slot while distinct pairs
/// build in parallel.
pub struct LookupEngine {
    source: Option<Box<dyn DictionarySource>>,
    graph: Option<Arc<dyn LexicalGraphStore>>,
    options: LookupOptions,
    sessions: Mutex<HashMap<String, Arc<SessionSlot>>>,
}

/// Lookup state of one pair, resolved once per request.
pub struct PairResolver<'a> {
    engine: &'a LookupEngine,
    pair: String,
    session: Option<Arc<DictSession>>,
    languages: Option<(Language, Language)>,
}

impl LookupEngine {
    pub fn new(options: LookupOptions) -> Self {
        Self {
            source: None,
            graph: None,
            options,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_source(mut self, source: impl DictionarySource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn with_graph(mut self, graph: Arc<dyn LexicalGraphStore>) -> Self {
        self.graph = Some(graph);
        self
    }

    pub fn options(&self) -> &LookupOptions {
        &self.options
    }

    fn slot(&self, key: &str) -> Result<Arc<SessionSlot>> {
        let mut sessions = self.sessions.lock().map_err(|_| LexiconError::LockPoisoned)?;
        Ok(Arc::clone(sessions.entry(key.to_string()).or_default()))
    }

    /// Returns the binary session of a pair, building it on first use.
    ///
    /// `Ok(None)` if no source serves the pair. Calling this for a pair that
    /// is already warm is a no-op.
    pub fn ensure_pair(&self, src: &str, dst: &str) -> Result<Option<Arc<DictSession>>> {
        let Some(source) = &self.source else {
            return Ok(None);
        };
        let key = lang::pair_key(src, dst);
        let slot = self.slot(&key)?;
        let mut guard = slot.lock().map_err(|_| LexiconError::LockPoisoned)?;
        if let Some(session) = guard.as_ref() {
            return Ok(Some(Arc::clone(session)));
        }

        let Some(dir) = source.dictionary_dir(&key)? else {
            debug!("No binary dictionary for {}", key);
            return Ok(None);
        };
        info!("Warming up {} from {}", key, dir.display());
        let session = Arc::new(DictSession::build(&dir)?);
        *guard = Some(Arc::clone(&session));
        Ok(Some(session))
    }

    /// Builds the binary session of a pair ahead of time. Returns whether one
    /// is available.
    pub fn warm(&self, src: &str, dst: &str) -> Result<bool> {
        Ok(self.ensure_pair(src, dst)?.is_some())
    }

    /// True if a binary session for the pair has already been built.
    pub fn is_warm(&self, src: &str, dst: &str) -> bool {
        let key = lang::pair_key(src, dst);
        let slot = match self.sessions.lock() {
            Ok(sessions) => sessions.get(&key).cloned(),
            Err(_) => return false,
        };
        let Some(slot) = slot else {
            return false;
        };
        let warm = slot.lock().map(|s| s.is_some()).unwrap_or(false);
        warm
    }

    fn find_language(&self, graph: &dyn LexicalGraphStore, code: &str) -> Result<Option<Language>> {
        for candidate in lang::candidates(code) {
            if let Some(language) = graph.find_language(&candidate)? {
                return Ok(Some(language));
            }
        }
        Ok(None)
    }

    fn graph_languages(&self, src: &str, dst: &str) -> Result<Option<(Language, Language)>> {
        let Some(graph) = &self.graph else {
            return Ok(None);
        };
        match (self.find_language(graph.as_ref(), src)?, self.find_language(graph.as_ref(), dst)?) {
            (Some(s), Some(d)) => Ok(Some((s, d))),
            _ => Ok(None),
        }
    }

    /// Resolves everything needed to translate within one pair.
    ///
    /// # Errors
    /// [`LexiconError::UnknownPair`] if neither a binary dictionary nor the
    /// graph knows both languages.
    pub fn resolver(&self, src: &str, dst: &str) -> Result<PairResolver<'_>> {
        let pair = lang::pair_key(src, dst);
        let session = self.ensure_pair(src, dst)?;
        let languages = self.graph_languages(src, dst)?;
        if session.is_none() && languages.is_none() {
            return Err(LexiconError::UnknownPair(pair));
        }
        Ok(PairResolver {
            engine: self,
            pair,
            session,
            languages,
        })
    }

    /// Translates `text` token by token, keeping every non-letter character
    /// and the word order as they are.
    pub fn translate_word_by_word(&self, src: &str, dst: &str, text: &str) -> Result<String> {
        let resolver = self.resolver(src, dst)?;
        resolver.translate_text(text)
    }

    /// Best-effort definition of a single token: the binary dictionary's
    /// cleaned value (exact, then lower-cased), else up to
    /// [`lookup_limit`](LookupOptions::lookup_limit) graph translations joined
    /// by `"; "`.
    pub fn lookup_one(&self, src: &str, dst: &str, token: &str) -> Result<Option<String>> {
        self.resolver(src, dst)?.lookup(token)
    }

    /// Pairs served by the binary source or present in the graph.
    pub fn available_language_pairs(&self) -> Result<Vec<String>> {
        let mut pairs = BTreeSet::new();
        if let Some(source) = &self.source {
            pairs.extend(source.pairs()?);
        }
        if let Some(graph) = &self.graph {
            pairs.extend(graph.dictionaries()?.into_iter().map(|d| d.name));
        }
        Ok(pairs.into_iter().collect())
    }

    /// Three-letter codes of every language that appears in a pair or in the
    /// graph.
    pub fn available_language_codes(&self) -> Result<Vec<String>> {
        let canonical = |code: &str| lang::to_alpha3(code).map(str::to_string).unwrap_or_else(|| code.to_string());
        let mut codes = BTreeSet::new();
        for pair in self.available_language_pairs()? {
            if let Ok((src, dst)) = lang::split_pair(&pair) {
                codes.insert(canonical(&src));
                codes.insert(canonical(&dst));
            }
        }
        if let Some(graph) = &self.graph {
            codes.extend(graph.languages()?.iter().map(|l| canonical(&l.code)));
        }
        Ok(codes.into_iter().collect())
    }
}

impl<'a> PairResolver<'a> {
    pub fn pair(&self) -> &str {
        &self.pair
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn has_graph(&self) -> bool {
        self.languages.is_some()
    }

    fn session_lookup(&self, key: &str) -> Result<Option<String>> {
        match &self.session {
            Some(session) => session.lookup(key, self.engine.options.max_slice_len),
            None => Ok(None),
        }
    }

    /// Up to `limit` destination headwords for `token`, ordered by rank then
    /// headword, without duplicates.
    ///
    /// Source lemmas are matched by exact or normalized headword; the first
    /// lemma that has any translation decides the result.
    pub fn lookup_alternates(&self, token: &str, limit: usize) -> Result<Vec<String>> {
        let (Some(graph), Some((src, dst))) = (&self.engine.graph, &self.languages) else {
            return Ok(Vec::new());
        };
        let norm = normalize_headword(token);
        let lemmas = graph.find_lemmas(src.id, token, &norm, self.engine.options.candidate_lemmas)?;

        let mut out: Vec<String> = Vec::new();
        for lemma in lemmas {
            for (_, target) in graph.translations_from(lemma.id, dst.id, limit)? {
                if !out.contains(&target.headword) {
                    out.push(target.headword);
                }
            }
            if !out.is_empty() {
                break;
            }
        }
        trace!("{}: '{}' → {:?}", self.pair, token, out);
        Ok(out)
    }

    /// Gender of the first graph translation of `token`, if the graph knows
    /// one.
    pub fn target_gender(&self, token: &str) -> Result<Gender> {
        let (Some(graph), Some((src, dst))) = (&self.engine.graph, &self.languages) else {
            return Ok(Gender::Unknown);
        };
        let norm = normalize_headword(token);
        for lemma in graph.find_lemmas(src.id, token, &norm, self.engine.options.candidate_lemmas)? {
            if let Some((_, target)) = graph.translations_from(lemma.id, dst.id, 1)?.into_iter().next() {
                return Ok(target.gender);
            }
        }
        Ok(Gender::Unknown)
    }

    /// See [`LookupEngine::lookup_one`].
    pub fn lookup(&self, token: &str) -> Result<Option<String>> {
        if let Some(value) = self.session_lookup(token)? {
            return Ok(Some(value));
        }
        let lower = token.to_lowercase();
        if lower != token {
            if let Some(value) = self.session_lookup(&lower)? {
                return Ok(Some(value));
            }
        }
        let alternates = self.lookup_alternates(token, self.engine.options.lookup_limit)?;
        Ok((!alternates.is_empty()).then(|| alternates.join("; ")))
    }

    /// Resolves one word: binary exact, binary lower-cased, then graph by
    /// exact, lower-cased and normalized headword. Unresolved words come
    /// back unchanged.
    pub fn translate_token(&self, word: &str) -> Result<String> {
        let lower = word.to_lowercase();

        if let Some(value) = self.session_lookup(word)? {
            return Ok(value);
        }
        if lower != word {
            if let Some(value) = self.session_lookup(&lower)? {
                return Ok(value);
            }
        }

        if self.languages.is_some() {
            let norm = normalize_headword(word);
            let mut tried: Vec<&str> = Vec::with_capacity(3);
            for key in [word, lower.as_str(), norm.as_str()] {
                if tried.contains(&key) {
                    continue;
                }
                tried.push(key);
                let alternates = self.lookup_alternates(key, self.engine.options.max_alternates)?;
                if let Some(first) = alternates.into_iter().next() {
                    return Ok(first);
                }
            }
        }

        trace!("{}: '{}' unresolved", self.pair, word);
        Ok(word.to_string())
    }

    /// Word-by-word translation of `text` within this pair.
    pub fn translate_text(&self, text: &str) -> Result<String> {
        let mut out = String::with_capacity(text.len());
        for token in tokenize(text) {
            match token {
                Token::Word(word) => out.push_str(&self.translate_token(word)?),
                Token::Separator(sep) => out.push_str(sep),
            }
        }
        Ok(out)
    }
}
