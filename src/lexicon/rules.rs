//! Article agreement on top of word-by-word translation.
//!
//! For a pair with grammatical gender on the target side, a source article
//! is not translated literally. The next word is resolved first and the
//! article form agreeing with that word's gender and number is emitted
//! instead. Everything else goes through [`PairResolver::translate_token`].

use std::sync::OnceLock;

use log::trace;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::lexicon::graph::Gender;
use crate::lexicon::lang;
use crate::lexicon::lookup::{tokenize, LookupEngine, PairResolver, Token};
use crate::lexicon::types::error::Result;

/// Target article forms by gender and number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleForms {
    pub masculine: String,
    pub feminine: String,
    pub masculine_plural: String,
    pub feminine_plural: String,
}

impl ArticleForms {
    fn new(m: &str, f: &str, mp: &str, fp: &str) -> Self {
        Self {
            masculine: m.to_string(),
            feminine: f.to_string(),
            masculine_plural: mp.to_string(),
            feminine_plural: fp.to_string(),
        }
    }

    /// Unknown gender takes the masculine form.
    pub fn pick(&self, gender: Gender, plural: bool) -> &str {
        match (gender == Gender::Feminine, plural) {
            (false, false) => &self.masculine,
            (true, false) => &self.feminine,
            (false, true) => &self.masculine_plural,
            (true, true) => &self.feminine_plural,
        }
    }
}

/// Which pair the agreement pass applies to and which words are articles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgreementRules {
    /// Source language codes (any length) the rules apply to.
    pub source: Vec<String>,
    pub target: Vec<String>,
    /// Lower-cased source indefinite articles.
    pub indefinite: Vec<String>,
    pub definite: Vec<String>,
    pub indefinite_forms: ArticleForms,
    pub definite_forms: ArticleForms,
}

impl Default for AgreementRules {
    /// English to Spanish.
    fn default() -> Self {
        Self {
            source: vec!["en".into(), "eng".into()],
            target: vec!["es".into(), "spa".into()],
            indefinite: vec!["a".into(), "an".into()],
            definite: vec!["the".into()],
            indefinite_forms: ArticleForms::new("un", "una", "unos", "unas"),
            definite_forms: ArticleForms::new("el", "la", "los", "las"),
        }
    }
}

impl AgreementRules {
    pub fn applies_to(&self, src: &str, dst: &str) -> bool {
        self.source.iter().any(|c| lang::same_language(c, src)) && self.target.iter().any(|c| lang::same_language(c, dst))
    }

    fn forms_for(&self, lower: &str) -> Option<&ArticleForms> {
        if self.indefinite.iter().any(|a| a == lower) {
            Some(&self.indefinite_forms)
        } else if self.definite.iter().any(|a| a == lower) {
            Some(&self.definite_forms)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranslateMode {
    /// Word by word with article agreement.
    #[default]
    Rules,
    /// Plain word by word.
    WordByWord,
}

struct GenderPatterns {
    noun_m: Regex,
    loose_m: Regex,
    noun_f: Regex,
    loose_f: Regex,
    nm: Regex,
    nf: Regex,
    plural: Regex,
}

static GENDER_PATTERNS: OnceLock<GenderPatterns> = OnceLock::new();

fn patterns() -> &'static GenderPatterns {
    GENDER_PATTERNS.get_or_init(|| GenderPatterns {
        noun_m: Regex::new(r"\b(noun|sust|sustantivo)\b.*\bm\b").expect("Invalid gender regex pattern"),
        loose_m: Regex::new(r"\bm\W").expect("Invalid gender regex pattern"),
        noun_f: Regex::new(r"\b(noun|sust|sustantivo)\b.*\bf\b").expect("Invalid gender regex pattern"),
        loose_f: Regex::new(r"\bf\W").expect("Invalid gender regex pattern"),
        nm: Regex::new(r"\bnm\b").expect("Invalid gender regex pattern"),
        nf: Regex::new(r"\bnf\b").expect("Invalid gender regex pattern"),
        plural: Regex::new(r"\b(pl|plural)\b").expect("Invalid plural regex pattern"),
    })
}

/// Guesses gender and number from markers in a dictionary gloss.
///
/// `m`/`nm` mark masculine, `f`/`nf` feminine; a later feminine marker
/// overrides a masculine one. `pl`/`plural` marks plural. Without markers the
/// result is `(Unknown, false)`.
pub fn guess_gender_number(gloss: &str) -> (Gender, bool) {
    let p = patterns();
    let s = format!(" {} ", gloss.to_lowercase());

    let mut gender = Gender::Unknown;
    if p.noun_m.is_match(&s) || p.loose_m.is_match(&s) {
        gender = Gender::Masculine;
    }
    if p.noun_f.is_match(&s) || p.loose_f.is_match(&s) {
        gender = Gender::Feminine;
    }
    if p.nm.is_match(&s) {
        gender = Gender::Masculine;
    }
    if p.nf.is_match(&s) {
        gender = Gender::Feminine;
    }
    (gender, p.plural.is_match(&s))
}

/// Sentence translation with article agreement.
pub struct RuleLayer<'a> {
    engine: &'a LookupEngine,
    rules: AgreementRules,
}

impl<'a> RuleLayer<'a> {
    pub fn new(engine: &'a LookupEngine) -> Self {
        Self::with_rules(engine, AgreementRules::default())
    }

    pub fn with_rules(engine: &'a LookupEngine, rules: AgreementRules) -> Self {
        Self { engine, rules }
    }

    pub fn rules(&self) -> &AgreementRules {
        &self.rules
    }

    /// Translates `text` from `src` to `dst`.
    ///
    /// In [`TranslateMode::Rules`] articles agree with the following word
    /// when the pair matches the configured rules; all other words are
    /// translated as in [`LookupEngine::translate_word_by_word`].
    pub fn translate(&self, src: &str, dst: &str, text: &str, mode: TranslateMode) -> Result<String> {
        if mode == TranslateMode::WordByWord || !self.rules.applies_to(src, dst) {
            return self.engine.translate_word_by_word(src, dst, text);
        }

        let resolver = self.engine.resolver(src, dst)?;
        let tokens = tokenize(text);
        let mut out = String::with_capacity(text.len());

        for (i, token) in tokens.iter().enumerate() {
            let word = match token {
                Token::Separator(sep) => {
                    out.push_str(sep);
                    continue;
                }
                Token::Word(word) => *word,
            };

            let next = tokens[i + 1..].iter().find(|t| t.is_word()).map(|t| t.as_str());
            let forms = self.rules.forms_for(&word.to_lowercase());
            match (forms, next) {
                (Some(forms), Some(noun)) => {
                    let (gender, plural) = self.agreement(&resolver, noun)?;
                    trace!("Article '{}' before '{}': {:?}, plural={}", word, noun, gender, plural);
                    out.push_str(forms.pick(gender, plural));
                }
                _ => out.push_str(&resolver.translate_token(word)?),
            }
        }
        Ok(out)
    }

    /// Gender and number of the translation of `noun`. Markers in the gloss
    /// win; a gender stored on the graph lemma fills in when the gloss has
    /// none.
    fn agreement(&self, resolver: &PairResolver<'_>, noun: &str) -> Result<(Gender, bool)> {
        let gloss = resolver.lookup(noun)?.unwrap_or_default();
        let (mut gender, plural) = guess_gender_number(&gloss);
        if gender == Gender::Unknown {
            gender = resolver.target_gender(noun)?;
        }
        Ok((gender, plural))
    }
}
