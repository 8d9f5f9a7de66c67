//! Lexer that turns script source into a stream of tokens.

use std::fmt::Display;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

/// The different classes of tokens that compose the language.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum TokenClass {
    Period,
    Lambda,
    Arrow,
    LeftParen,
    RightParen,
    Equals,
    Semicolon,
    Identifier,
    Number,
    Whitespace,
    EndOfInput,
}

/// Structural tokens display as their quoted symbol, everything else as the
/// class name.
impl Display for TokenClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Period => "'.'",
            Self::Lambda => "'λ'",
            Self::Arrow => "'->'",
            Self::LeftParen => "'('",
            Self::RightParen => "')'",
            Self::Equals => "'='",
            Self::Semicolon => "';'",
            Self::Identifier => "ID",
            Self::Number => "NUM",
            Self::Whitespace => "WHITESPACE",
            Self::EndOfInput => "EOF",
        };

        return write!(f, "{}", name);
    }
}

/// Represents a single token of the language. Offsets count code points, not
/// bytes.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Token {
    pub token_class: TokenClass,
    pub token_text: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

/// Raised at the first code point that no token rule accepts.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
#[error("Unexpected character '{character}' @ {offset}")]
pub struct LexError {
    pub character: char,
    pub offset: usize,
}

// Represents how to recognize a token class.
#[derive(Debug)]
struct TokenRule {
    token_class: TokenClass,
    regex: Regex,
}

// Anchored patterns for each token class. Every pattern only ever matches at
// the start of the remaining input.
lazy_static! {
    static ref TOKEN_RULES: Vec<TokenRule> = vec![
        TokenRule {
            token_class: TokenClass::Period,
            regex: Regex::new(r"^\.").expect("Unable to compile Period rule regex."),
        },
        TokenRule {
            token_class: TokenClass::Lambda,
            regex: Regex::new(r"^λ").expect("Unable to compile Lambda rule regex."),
        },
        TokenRule {
            token_class: TokenClass::Arrow,
            regex: Regex::new(r"^->").expect("Unable to compile Arrow rule regex."),
        },
        TokenRule {
            token_class: TokenClass::LeftParen,
            regex: Regex::new(r"^\(").expect("Unable to compile LeftParen rule regex."),
        },
        TokenRule {
            token_class: TokenClass::RightParen,
            regex: Regex::new(r"^\)").expect("Unable to compile RightParen rule regex."),
        },
        TokenRule {
            token_class: TokenClass::Equals,
            regex: Regex::new(r"^=").expect("Unable to compile Equals rule regex."),
        },
        TokenRule {
            token_class: TokenClass::Semicolon,
            regex: Regex::new(r"^;").expect("Unable to compile Semicolon rule regex."),
        },
        TokenRule {
            token_class: TokenClass::Identifier,
            regex: Regex::new(r"^[a-zA-Z]+").expect("Unable to compile Identifier rule regex."),
        },
        TokenRule {
            token_class: TokenClass::Number,
            regex: Regex::new(r"^[0-9]+").expect("Unable to compile Number rule regex."),
        },
        TokenRule {
            token_class: TokenClass::Whitespace,
            regex: Regex::new(r"^[ \t\r\n]+").expect("Unable to compile Whitespace rule regex."),
        },
    ];
}

// Finds the rule that matches the most bytes from the start of the input
// string, if any rule matches at all.
fn get_longest_matching_rule(input_str: &str) -> Option<(&'static TokenRule, usize)> {
    let mut longest: Option<(&'static TokenRule, usize)> = None;

    for token_rule in TOKEN_RULES.iter() {
        if let Some(match_obj) = token_rule.regex.find(input_str) {
            let is_longer = match longest {
                None => true,
                Some((_, longest_len)) => match_obj.len() > longest_len,
            };

            if is_longer && !match_obj.is_empty() {
                longest = Some((token_rule, match_obj.len()));
            }
        }
    }

    return longest;
}

/// Pull-based token stream over a source string.
///
/// Yields every token in order, then exactly one `EndOfInput` token with an
/// empty span at the final offset, then nothing. After a `LexError` is
/// yielded the stream is exhausted.
pub struct Lexer<'src> {
    source: &'src str,
    byte_idx: usize,
    char_idx: usize,
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        return Self {
            source,
            byte_idx: 0,
            char_idx: 0,
            finished: false,
        };
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let remaining = &self.source[self.byte_idx..];

        if remaining.is_empty() {
            self.finished = true;
            return Some(Ok(Token {
                token_class: TokenClass::EndOfInput,
                token_text: String::new(),
                start_offset: self.char_idx,
                end_offset: self.char_idx,
            }));
        }

        match get_longest_matching_rule(remaining) {
            Some((token_rule, match_len)) => {
                let token_text = &remaining[..match_len];
                let start_offset = self.char_idx;

                self.byte_idx += match_len;
                self.char_idx += token_text.chars().count();

                tracing::trace!(
                    token_class = ?token_rule.token_class,
                    start_offset,
                    "lexed token"
                );

                return Some(Ok(Token {
                    token_class: token_rule.token_class,
                    token_text: String::from(token_text),
                    start_offset,
                    end_offset: self.char_idx,
                }));
            }

            None => {
                self.finished = true;
                return Some(Err(LexError {
                    character: remaining.chars().next().unwrap_or_default(),
                    offset: self.char_idx,
                }));
            }
        }
    }
}

impl<'src> std::iter::FusedIterator for Lexer<'src> {}

/// Runs the lexer over the whole program string. Whitespace tokens are
/// dropped when `discard_uninteresting` is set. The end-of-input token is
/// always kept.
pub fn run_lexical_analysis(
    program_str: &str,
    discard_uninteresting: bool,
) -> Result<Vec<Token>, LexError> {
    let mut out = Vec::new();

    for token in Lexer::new(program_str) {
        let token = token?;

        if discard_uninteresting && token.token_class == TokenClass::Whitespace {
            continue;
        }

        out.push(token);
    }

    return Ok(out);
}
