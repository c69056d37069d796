//! Text recovery for payload bytes and headword normalization.

use std::borrow::Cow;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static TAG_PATTERN: OnceLock<Regex> = OnceLock::new();
static SPACE_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Matches markup tags such as `<b>`, `</k>` or `<img src="x"/>`.
fn tag_regex() -> &'static Regex {
    TAG_PATTERN.get_or_init(|| Regex::new(r"<[^<>]*>").expect("Invalid tag regex pattern"))
}

fn space_regex() -> &'static Regex {
    SPACE_PATTERN.get_or_init(|| Regex::new(r"\s+").expect("Invalid whitespace regex pattern"))
}

/// Decodes payload bytes as UTF-8, reinterpreting them as Latin-1 when they
/// are not valid UTF-8.
///
/// Returns the text and whether the Latin-1 fallback was used.
pub fn decode_lossless(bytes: &[u8]) -> (Cow<'_, str>, bool) {
    match std::str::from_utf8(bytes) {
        Ok(s) => (Cow::Borrowed(s), false),
        Err(_) => (encoding_rs::mem::decode_latin1(bytes), true),
    }
}

/// Removes markup tags.
///
/// Stripping repeats until no tag is left, so nested or split markup such as
/// `<<b>b>` cannot reassemble into a tag.
pub fn strip_tags(text: &str) -> Cow<'_, str> {
    let mut out = tag_regex().replace_all(text, "");
    while tag_regex().is_match(&out) {
        out = Cow::Owned(tag_regex().replace_all(&out, "").into_owned());
    }
    out
}

/// Collapses whitespace runs to a single space and trims both ends.
pub fn collapse_whitespace(text: &str) -> String {
    space_regex().replace_all(text, " ").trim().to_string()
}

/// Turns a raw payload slice into a single line of display text.
///
/// Control characters are dropped, invalid UTF-8 is recovered as Latin-1,
/// markup tags are stripped, whitespace is collapsed and the result is cut
/// to at most `max_chars` characters.
pub fn clean_text(bytes: &[u8], max_chars: usize) -> String {
    let (decoded, fallback) = decode_lossless(bytes);
    if fallback {
        debug!("Payload is not valid UTF-8, recovered as Latin-1 ({} bytes)", bytes.len());
    }

    // Tabs and newlines survive here only to be collapsed into spaces below.
    let sanitized: String = decoded
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect();

    let stripped = strip_tags(&sanitized);
    let collapsed = collapse_whitespace(&stripped);
    truncate_chars(&collapsed, max_chars)
}

/// Like [`clean_text`] but renders empty input as `(empty)`.
pub fn preview_text(bytes: &[u8], max_chars: usize) -> String {
    if bytes.is_empty() {
        return "(empty)".to_string();
    }
    clean_text(bytes, max_chars)
}

/// Cuts `text` to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Case- and diacritic-folded form used as the secondary lemma lookup key.
///
/// `"Árbol"` → `"arbol"`, `"Straße"` → `"straße"`.
pub fn normalize_headword(headword: &str) -> String {
    headword
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .nfc()
        .collect()
}
