//! Turns source text into a flat list of [`Token`]s.
//!
//! Whitespace (space and tab) is skipped and newlines only advance the line counter. Every other
//! character must start one of the tokens below, otherwise lexing fails.

use std::fmt;

use log::trace;
use logos::Logos;

use crate::lang::error::Error;

#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
#[logos(skip r"[ \t]+")]
pub enum TokenKind {
    /// One or more ASCII letters
    #[regex("[a-zA-Z]+")]
    Identifier,
    /// Non-negative decimal literal
    ///
    /// Matches any run of digits with an optional fraction so that malformed literals such as
    /// `012` or `2.0` are rejected as a whole instead of being split into two valid tokens.
    #[regex(r"[0-9]+(\.[0-9]*)?", well_formed_number)]
    Number,
    /// `print`
    #[token("print")]
    Print,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `=`
    #[token("=")]
    Assign,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `^`
    #[token("^")]
    Caret,
    /// `;`
    #[token(";")]
    Semicolon,
    /// Never emitted; consumed by [`tokenize`] to count lines
    #[token("\n")]
    Newline,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    /// 1-based source line
    pub line: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lexeme)
    }
}

/// Literal must be `0` or start with a non-zero digit, and a fraction (if present) must be
/// non-empty and end in a non-zero digit
fn well_formed_number(lex: &mut logos::Lexer<TokenKind>) -> bool {
    let (whole, fraction) = match lex.slice().split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (lex.slice(), None),
    };

    let whole_ok = whole == "0" || !whole.starts_with('0');
    let fraction_ok = match fraction {
        Some(f) => f.ends_with(|c: char| c != '0' && c.is_ascii_digit()),
        None => true,
    };

    whole_ok && fraction_ok
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, Error> {
    let mut lexer = TokenKind::lexer(source);
    let mut tokens = Vec::new();
    let mut line = 1;

    while let Some(kind) = lexer.next() {
        match kind {
            Ok(TokenKind::Newline) => line += 1,
            Ok(kind) => {
                trace!("token {:?} `{}` on line {}", kind, lexer.slice(), line);
                tokens.push(Token {
                    kind,
                    lexeme: lexer.slice().to_string(),
                    line,
                });
            }
            Err(_) => {
                let slice = lexer.slice();
                // A bad number literal is reported whole, anything else by its first character
                let lexeme = if slice.starts_with(|c: char| c.is_ascii_digit()) {
                    slice.to_string()
                } else {
                    slice.chars().next().map(String::from).unwrap_or_default()
                };

                return Err(Error::IllegalCharacter { lexeme, line });
            }
        }
    }

    Ok(tokens)
}

#[test]
fn test_tokenize() {
    let tokens = tokenize("x = 1.5 ^ y;").expect("failed to lex");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Identifier,
            TokenKind::Assign,
            TokenKind::Number,
            TokenKind::Caret,
            TokenKind::Identifier,
            TokenKind::Semicolon,
        ]
    );
    assert_eq!(tokens[2].lexeme, "1.5");
}

#[test]
fn test_keyword() {
    let tokens = tokenize("print printed prin").expect("failed to lex");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Print,
            TokenKind::Identifier,
            TokenKind::Identifier
        ]
    );
}

#[test]
fn test_numbers() {
    for input in &["0", "1.01", "123", "1012.2", "10", "0.5"] {
        let tokens = tokenize(input).expect("failed to lex");
        assert_eq!(tokens.len(), 1, "{}", input);
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].lexeme, *input);
    }

    for input in &["1.", "2.0", "012", "012.1", "00", "3.10"] {
        match tokenize(input) {
            Err(e) => assert!(e.is_syntax(), "{}", input),
            Ok(_) => panic!("{} should not lex", input),
        }
    }
}

#[test]
fn test_line_numbers() {
    let tokens = tokenize("a\n\tb\n\n  c").expect("failed to lex");
    let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
    assert_eq!(lines, vec![1, 2, 4]);
}

#[test]
fn test_illegal_character() {
    let data = vec![("x = 1 $ 2;", "$", 1), ("x = 1;\ny = 2 % 3;", "%", 2), ("a\r", "\r", 1)];

    for (input, lexeme, line) in data {
        assert_eq!(
            tokenize(input),
            Err(Error::IllegalCharacter {
                lexeme: lexeme.to_string(),
                line
            })
        );
    }
}
