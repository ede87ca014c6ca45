//! Lexer for the boxes-and-arrows language using logos
//!
//! Newlines and `//` comments are significant: newlines terminate
//! declarations and block fields, and comments are kept so that a parsed
//! file can be printed back.

use logos::Logos;

use crate::error::ParseError;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")]
pub enum Token {
    // Declaration keywords
    #[token("box-style")]
    BoxStyle,
    #[token("box")]
    Box,
    #[token("connect")]
    Connect,
    #[token("constrain")]
    Constrain,

    // Delimiters
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token("\n")]
    Newline,

    // Arithmetic
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    // Relations (longer first)
    #[token("<=")]
    LessOrEqual,
    #[token(">=")]
    GreaterOrEqual,
    #[token("==")]
    EqualEqual,
    #[token("=")]
    Equals,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,

    // Literals - identifiers must come after keywords; an all-digit token
    // is a number, not an identifier
    #[regex(r"[\p{L}\p{N}_][\p{L}\p{N}_\-]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),
    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    String(String),
    #[regex(r"-?[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok(), priority = 3)]
    Number(f64),
    #[regex(r"#[0-9a-zA-Z]+", |lex| lex.slice().to_string())]
    HexColor(String),

    /// Text after the `//`, up to the end of the line
    #[regex(r"//[^\n]*", |lex| lex.slice()[2..].to_string())]
    LineComment(String),
}

/// Strip the quotes of a string literal; a backslash escapes the next character.
fn unescape(literal: &str) -> String {
    let inner = &literal[1..literal.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Lex input string into tokens with spans
///
/// Every unrecognised character is reported; nothing is silently dropped.
pub fn lex(input: &str) -> Result<Vec<(Token, Span)>, Vec<ParseError>> {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    for (tok, span) in Token::lexer(input).spanned() {
        match tok {
            Ok(t) => tokens.push((t, span)),
            Err(()) => errors.push(ParseError::Syntax {
                message: format!("Unrecognized input '{}'", &input[span.clone()]),
                span,
                expected: vec![],
            }),
        }
    }
    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}
