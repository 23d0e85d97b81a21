//! Stack-based parser. One balanced form per program; the machine keeps
//! an explicit stack of open nodes instead of recursing, so input depth
//! cannot overflow the call stack.

use thiserror::Error;

use crate::atom::Atom;
use crate::expression::Expression;
use crate::token::{tokenize, Token};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty program")]
    Empty,
    #[error("close delimiter with no open expression")]
    UnbalancedClose,
    #[error("expression never closed")]
    Unterminated,
    #[error("invalid literal `{0}`")]
    InvalidLiteral(String),
    #[error("literal `{0}` outside any expression")]
    DanglingLiteral(String),
    #[error("string delimiter outside any expression")]
    DanglingString,
    #[error("trailing input after a complete expression")]
    TrailingTokens,
}

/// Tokenize and parse a complete source string into one expression.
pub fn parse_source(input: &str) -> Result<Expression, ParseError> {
    parse(&tokenize(input))
}

/// Parse a token sequence into one expression. Exactly one balanced form
/// must consume every token.
pub fn parse(tokens: &[Token]) -> Result<Expression, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }

    // The next literal opens a new node as its head.
    let mut at_head = false;
    // The next literal is quoted text; together with at_head it lands in
    // head position.
    let mut at_string_head = false;
    // A quoted string occupies a head slot, so its closing delimiter
    // must not pop the node stack.
    let mut string_head = false;
    let mut in_quote = false;

    // Open nodes, deepest last. Closing attaches the popped node to the
    // node beneath it; closing the last one completes the program.
    let mut stack: Vec<Expression> = Vec::new();
    let mut root: Option<Expression> = None;
    let mut seen = 0usize;

    for (index, token) in tokens.iter().enumerate() {
        match token {
            Token::Open => {
                at_head = true;
            }
            Token::Close => {
                let node = stack.pop().ok_or(ParseError::UnbalancedClose)?;
                match stack.last_mut() {
                    Some(parent) => parent.push(node),
                    None => {
                        root = Some(node);
                        seen = index + 1;
                        break;
                    }
                }
            }
            Token::Quote => {
                if !in_quote {
                    in_quote = true;
                    at_string_head = true;
                } else {
                    if stack.is_empty() {
                        return Err(ParseError::DanglingString);
                    }
                    // a head-position string closes in place and leaves
                    // the flag set, so any later string in the program
                    // keeps its node open and the parse fails
                    if !string_head {
                        let node =
                            stack.pop().ok_or(ParseError::DanglingString)?;
                        match stack.last_mut() {
                            Some(parent) => parent.push(node),
                            None => return Err(ParseError::DanglingString),
                        }
                    }
                    in_quote = false;
                }
            }
            Token::Atom(text) => {
                if at_head && at_string_head {
                    string_head = true;
                    let atom = Atom::from_quoted(text).ok_or_else(|| {
                        ParseError::InvalidLiteral(text.clone())
                    })?;
                    stack.push(Expression::from(atom));
                    at_head = false;
                    at_string_head = false;
                } else if at_head {
                    let atom = Atom::from_token(text).ok_or_else(|| {
                        ParseError::InvalidLiteral(text.clone())
                    })?;
                    stack.push(Expression::from(atom));
                    at_head = false;
                } else if at_string_head {
                    if stack.is_empty() {
                        string_head = true;
                    }
                    let atom = Atom::from_quoted(text).ok_or_else(|| {
                        ParseError::InvalidLiteral(text.clone())
                    })?;
                    stack.push(Expression::from(atom));
                    at_string_head = false;
                } else {
                    let atom = Atom::from_token(text).ok_or_else(|| {
                        ParseError::InvalidLiteral(text.clone())
                    })?;
                    match stack.last_mut() {
                        Some(top) => top.push(Expression::from(atom)),
                        None => {
                            return Err(ParseError::DanglingLiteral(
                                text.clone(),
                            ))
                        }
                    }
                }
            }
        }
        seen = index + 1;
    }

    match root {
        Some(expression) if seen == tokens.len() => Ok(expression),
        Some(_) => Err(ParseError::TrailingTokens),
        None => Err(ParseError::Unterminated),
    }
}
