//! ISO-639 code handling.
//!
//! Dictionaries name languages with three-letter codes (`eng-spa`) while
//! callers often use two-letter ones (`en`). The table below maps between the
//! two for the languages that commonly appear in bilingual dictionaries.

use crate::lexicon::types::error::{LexiconError, Result};

/// `(alpha-2, alpha-3, English name)`.
const LANGUAGES: &[(&str, &str, &str)] = &[
    ("af", "afr", "Afrikaans"),
    ("ar", "ara", "Arabic"),
    ("bg", "bul", "Bulgarian"),
    ("br", "bre", "Breton"),
    ("ca", "cat", "Catalan"),
    ("cs", "ces", "Czech"),
    ("cy", "cym", "Welsh"),
    ("da", "dan", "Danish"),
    ("de", "deu", "German"),
    ("el", "ell", "Greek"),
    ("en", "eng", "English"),
    ("eo", "epo", "Esperanto"),
    ("es", "spa", "Spanish"),
    ("et", "est", "Estonian"),
    ("eu", "eus", "Basque"),
    ("fa", "fas", "Persian"),
    ("fi", "fin", "Finnish"),
    ("fr", "fra", "French"),
    ("ga", "gle", "Irish"),
    ("gd", "gla", "Scottish Gaelic"),
    ("he", "heb", "Hebrew"),
    ("hi", "hin", "Hindi"),
    ("hr", "hrv", "Croatian"),
    ("hu", "hun", "Hungarian"),
    ("id", "ind", "Indonesian"),
    ("is", "isl", "Icelandic"),
    ("it", "ita", "Italian"),
    ("ja", "jpn", "Japanese"),
    ("ko", "kor", "Korean"),
    ("la", "lat", "Latin"),
    ("lt", "lit", "Lithuanian"),
    ("lv", "lav", "Latvian"),
    ("nl", "nld", "Dutch"),
    ("no", "nor", "Norwegian"),
    ("pl", "pol", "Polish"),
    ("pt", "por", "Portuguese"),
    ("ro", "ron", "Romanian"),
    ("ru", "rus", "Russian"),
    ("sk", "slk", "Slovak"),
    ("sl", "slv", "Slovenian"),
    ("sr", "srp", "Serbian"),
    ("sv", "swe", "Swedish"),
    ("sw", "swa", "Swahili"),
    ("th", "tha", "Thai"),
    ("tr", "tur", "Turkish"),
    ("uk", "ukr", "Ukrainian"),
    ("zh", "zho", "Chinese"),
];

fn normalize(code: &str) -> String {
    code.trim().to_ascii_lowercase()
}

fn entry(code: &str) -> Option<&'static (&'static str, &'static str, &'static str)> {
    let code = normalize(code);
    LANGUAGES.iter().find(|(a2, a3, _)| *a2 == code || *a3 == code)
}

pub fn to_alpha3(code: &str) -> Option<&'static str> {
    entry(code).map(|(_, a3, _)| *a3)
}

pub fn to_alpha2(code: &str) -> Option<&'static str> {
    entry(code).map(|(a2, _, _)| *a2)
}

pub fn display_name(code: &str) -> Option<&'static str> {
    entry(code).map(|(_, _, name)| *name)
}

/// Codes to try, in order, when resolving `code`: the code itself, then its
/// counterpart of the other length.
pub fn candidates(code: &str) -> Vec<String> {
    let code = normalize(code);
    let mut out = vec![code.clone()];
    if let Some((a2, a3, _)) = entry(&code) {
        let other = if code.len() == 2 { a3 } else { a2 };
        if *other != code {
            out.push(other.to_string());
        }
    }
    out
}

/// True if both codes name the same language (`en` and `eng`).
pub fn same_language(a: &str, b: &str) -> bool {
    let (a, b) = (normalize(a), normalize(b));
    a == b || matches!((entry(&a), entry(&b)), (Some(x), Some(y)) if x == y)
}

/// Cache key of a language pair.
pub fn pair_key(src: &str, dst: &str) -> String {
    format!("{}-{}", normalize(src), normalize(dst))
}

/// Splits a `src-dst` slug into its two lower-cased codes.
///
/// # Errors
/// [`LexiconError::InvalidPair`] if there is no `-` or either side is empty.
pub fn split_pair(pair: &str) -> Result<(String, String)> {
    match pair.trim().split_once('-') {
        Some((src, dst)) if !src.trim().is_empty() && !dst.trim().is_empty() => Ok((normalize(src), normalize(dst))),
        _ => Err(LexiconError::InvalidPair(pair.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_between_code_lengths() {
        assert_eq!(to_alpha3("en"), Some("eng"));
        assert_eq!(to_alpha2("SPA"), Some("es"));
        assert_eq!(display_name("deu"), Some("German"));
        assert_eq!(to_alpha3("xx"), None);
    }

    #[test]
    fn candidates_try_both_forms() {
        assert_eq!(candidates("es"), ["es", "spa"]);
        assert_eq!(candidates("Eng"), ["eng", "en"]);
        assert_eq!(candidates("qqq"), ["qqq"]);
    }

    #[test]
    fn same_language_across_forms() {
        assert!(same_language("en", "eng"));
        assert!(same_language("xyz", "XYZ"));
        assert!(!same_language("en", "spa"));
    }

    #[test]
    fn split_pair_validates_shape() {
        assert_eq!(split_pair("eng-spa").unwrap(), ("eng".to_string(), "spa".to_string()));
        assert_eq!(split_pair("pt-br-x").unwrap().1, "br-x");
        assert!(matches!(split_pair("engspa"), Err(LexiconError::InvalidPair(_))));
        assert!(matches!(split_pair("-spa"), Err(LexiconError::InvalidPair(_))));
    }
}
