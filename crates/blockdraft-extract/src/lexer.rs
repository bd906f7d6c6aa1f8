//! Tokenizer for the phrase heuristics.
//!
//! Splits text into words, whitespace runs, quoted phrases and single
//! symbols. Every byte of the input lands in exactly one token, so the
//! tokenizer cannot fail.

use winnow::{
    ModalResult, Parser as _,
    combinator::{alt, delimited, repeat},
    token::{any, take_till, take_while},
};

/// A lexical token borrowing from the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Word(&'a str),
    Space(&'a str),
    /// Content between a pair of double quotes, quotes excluded.
    Quoted(&'a str),
    Symbol(char),
}

fn word<'a>(input: &mut &'a str) -> ModalResult<Token<'a>> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_')
        .map(Token::Word)
        .parse_next(input)
}

fn space<'a>(input: &mut &'a str) -> ModalResult<Token<'a>> {
    take_while(1.., char::is_whitespace)
        .map(Token::Space)
        .parse_next(input)
}

fn quoted<'a>(input: &mut &'a str) -> ModalResult<Token<'a>> {
    delimited('"', take_till(1.., '"'), '"')
        .map(Token::Quoted)
        .parse_next(input)
}

fn symbol<'a>(input: &mut &'a str) -> ModalResult<Token<'a>> {
    any.map(Token::Symbol).parse_next(input)
}

fn token<'a>(input: &mut &'a str) -> ModalResult<Token<'a>> {
    alt((quoted, word, space, symbol)).parse_next(input)
}

/// Tokenizes `text`. An unmatched quote becomes a [`Token::Symbol`].
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut input = text;
    let tokens: ModalResult<Vec<Token<'_>>> = repeat(0.., token).parse_next(&mut input);
    tokens.unwrap_or_default()
}

// Exactly one ASCII capital followed by one or more ASCII lowercase letters.
fn is_title_word(word: &str) -> bool {
    let mut bytes = word.bytes();
    matches!(bytes.next(), Some(b'A'..=b'Z'))
        && word.len() > 1
        && bytes.all(|b| b.is_ascii_lowercase())
}

/// Maximal runs of title-case words separated only by whitespace.
///
/// Quoted content is scanned on its own. A quote ends the surrounding run.
pub fn capitalized_phrases(text: &str) -> Vec<String> {
    let mut phrases = Vec::new();
    collect_capitalized(&tokenize(text), &mut phrases);
    phrases
}

fn collect_capitalized(tokens: &[Token<'_>], phrases: &mut Vec<String>) {
    let mut current = String::new();
    let mut pending_space: Option<&str> = None;

    for token in tokens {
        match token {
            Token::Word(word) if is_title_word(word) => {
                if let Some(space) = pending_space.take() {
                    current.push_str(space);
                }
                current.push_str(word);
            }
            Token::Space(space) if !current.is_empty() => {
                pending_space = Some(space);
            }
            Token::Quoted(inner) => {
                pending_space = None;
                flush_phrase(&mut current, phrases);
                collect_capitalized(&tokenize(inner), phrases);
            }
            _ => {
                pending_space = None;
                flush_phrase(&mut current, phrases);
            }
        }
    }
    flush_phrase(&mut current, phrases);
}

fn flush_phrase(current: &mut String, phrases: &mut Vec<String>) {
    if !current.is_empty() {
        phrases.push(std::mem::take(current));
    }
}

/// Contents of every `"..."` pair, verbatim, in order of appearance.
pub fn quoted_phrases(text: &str) -> Vec<&str> {
    tokenize(text)
        .into_iter()
        .filter_map(|token| match token {
            Token::Quoted(inner) => Some(inner),
            _ => None,
        })
        .collect()
}
