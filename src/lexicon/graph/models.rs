//! Entities of the bilingual lexical graph.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(LanguageId);
entity_id!(LemmaId);
entity_id!(SenseId);
entity_id!(TranslationId);
entity_id!(DictionaryId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: LanguageId,
    /// ISO-639 code, lower-cased. Identity key.
    pub code: String,
    pub name: String,
}

/// Grammatical gender, normalized to a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "m")]
    Masculine,
    #[serde(rename = "f")]
    Feminine,
    #[serde(rename = "n")]
    Neuter,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl Gender {
    /// Maps a free-form gender tag to the closed set.
    ///
    /// `masculine`/`m`, `feminine`/`f`, `neuter`/`n` (any case, surrounding
    /// whitespace ignored); anything else is `Unknown`.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(|t| t.trim().to_lowercase()).as_deref() {
            Some("masculine") | Some("m") => Gender::Masculine,
            Some("feminine") | Some("f") => Gender::Feminine,
            Some("neuter") | Some("n") => Gender::Neuter,
            _ => Gender::Unknown,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            Gender::Masculine => "m",
            Gender::Feminine => "f",
            Gender::Neuter => "n",
            Gender::Unknown => "unknown",
        }
    }
}

/// A `(language, headword, pos)` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lemma {
    pub id: LemmaId,
    pub language: LanguageId,
    pub headword: String,
    /// Lower-cased, diacritic-folded headword for fuzzy lookups.
    pub norm_headword: String,
    pub pos: Option<String>,
    pub gender: Gender,
    pub features: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sense {
    pub id: SenseId,
    pub lemma: LemmaId,
    /// 1-based position within the lemma's entry.
    pub rank: u32,
    pub gloss: String,
    pub examples: Option<Value>,
}

/// Directed edge `src_lemma → dst_lemma`. Unique per pair of lemmas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub id: TranslationId,
    pub src_lemma: LemmaId,
    pub dst_lemma: LemmaId,
    /// 1 = primary.
    pub rank: u32,
    pub meta: Option<Value>,
}

/// Where an imported dictionary came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub source_url: Option<String>,
    pub edition: Option<String>,
    pub release_version: Option<String>,
}

/// One imported language pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryRecord {
    pub id: DictionaryId,
    /// Pair slug, e.g. `eng-spa`.
    pub name: String,
    pub src: LanguageId,
    pub dst: LanguageId,
    pub provenance: Provenance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_tags_normalize() {
        assert_eq!(Gender::from_tag(Some(" Masculine ")), Gender::Masculine);
        assert_eq!(Gender::from_tag(Some("f")), Gender::Feminine);
        assert_eq!(Gender::from_tag(Some("NEUTER")), Gender::Neuter);
        assert_eq!(Gender::from_tag(Some("common")), Gender::Unknown);
        assert_eq!(Gender::from_tag(None), Gender::Unknown);
    }
}
