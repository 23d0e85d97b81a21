//! Lexical analysis: splits source text into parenthesis, quote, and
//! literal tokens. Tokenizing never fails; invalid literals are rejected
//! later, during atom construction.

use std::fmt;

const OPEN_CHAR: char = '(';
const CLOSE_CHAR: char = ')';
const COMMENT_CHAR: char = ';';
const STRING_CHAR: char = '"';

/// A single lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Open,
    Close,
    /// A `"` delimiter. The text between a pair of these arrives as a
    /// normal `Atom` token with interior whitespace preserved.
    Quote,
    /// A run of non-delimiter characters, not yet classified.
    Atom(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Open => write!(f, "("),
            Token::Close => write!(f, ")"),
            Token::Quote => write!(f, "\""),
            Token::Atom(text) => write!(f, "{text}"),
        }
    }
}

fn flush_pending(pending: &mut String, tokens: &mut Vec<Token>) {
    if !pending.is_empty() {
        tokens.push(Token::Atom(std::mem::take(pending)));
    }
}

/// Tokenize a complete source string.
///
/// Comments run from `;` to the end of the line and are skipped without
/// terminating a pending literal. Whitespace separates literals except
/// between a pair of quotes, where it is kept verbatim.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pending = String::new();
    let mut in_quote = false;

    let mut chars = input.chars();
    while let Some(c) = chars.next() {
        if c == COMMENT_CHAR {
            for skipped in chars.by_ref() {
                if skipped == '\n' {
                    break;
                }
            }
        } else if c == OPEN_CHAR {
            flush_pending(&mut pending, &mut tokens);
            tokens.push(Token::Open);
        } else if c == CLOSE_CHAR {
            flush_pending(&mut pending, &mut tokens);
            tokens.push(Token::Close);
        } else if c == STRING_CHAR {
            flush_pending(&mut pending, &mut tokens);
            tokens.push(Token::Quote);
            in_quote = !in_quote;
        } else if c.is_whitespace() && !in_quote {
            flush_pending(&mut pending, &mut tokens);
        } else {
            pending.push(c);
        }
    }
    flush_pending(&mut pending, &mut tokens);

    tokens
}
