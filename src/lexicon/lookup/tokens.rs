//! Letter-run tokenization that keeps everything else verbatim.

use std::sync::OnceLock;

use regex::Regex;

static WORD_PATTERN: OnceLock<Regex> = OnceLock::new();

fn word_regex() -> &'static Regex {
    WORD_PATTERN.get_or_init(|| Regex::new(r"\p{L}+").expect("Invalid word regex pattern"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// A maximal run of letters.
    Word(&'a str),
    /// Anything between two words: spaces, digits, punctuation.
    Separator(&'a str),
}

impl<'a> Token<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Token::Word(s) | Token::Separator(s) => s,
        }
    }

    pub fn is_word(&self) -> bool {
        matches!(self, Token::Word(_))
    }
}

/// Splits `text` into alternating words and separators in a single pass.
///
/// Concatenating the tokens yields `text` again.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for m in word_regex().find_iter(text) {
        if m.start() > last {
            tokens.push(Token::Separator(&text[last..m.start()]));
        }
        tokens.push(Token::Word(m.as_str()));
        last = m.end();
    }
    if last < text.len() {
        tokens.push(Token::Separator(&text[last..]));
    }
    tokens
}
