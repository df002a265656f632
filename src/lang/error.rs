use std::fmt;

/// Everything that can abort a run
///
/// The first four variants are syntax errors, see [`Error::is_syntax`].
#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    /// Input contains a character (or malformed number literal) no token starts with
    IllegalCharacter { lexeme: String, line: usize },
    /// Parser stopped on a token that does not fit the grammar
    UnexpectedToken { lexeme: String, line: usize },
    /// Input ended in the middle of a statement
    UnexpectedEnd,
    /// Brackets or `^` chains nest deeper than `limit`
    NestingTooDeep { line: usize, limit: usize },
    /// No active scope binds `name`
    UndefinedName { name: String },
    /// Division by zero, non-real or non-finite result
    Arithmetic { message: String },
}

impl Error {
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            Error::IllegalCharacter { .. }
                | Error::UnexpectedToken { .. }
                | Error::UnexpectedEnd
                | Error::NestingTooDeep { .. }
        )
    }

    pub fn is_undefined_name(&self) -> bool {
        matches!(self, Error::UndefinedName { .. })
    }

    /// Source line of a syntax error, if known
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::IllegalCharacter { line, .. }
            | Error::UnexpectedToken { line, .. }
            | Error::NestingTooDeep { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IllegalCharacter { lexeme, line } => {
                write!(f, "illegal character '{}' on line {}", lexeme.escape_debug(), line)
            }
            Error::UnexpectedToken { lexeme, line } => {
                write!(f, "syntax error on line {}: unexpected '{}'", line, lexeme)
            }
            Error::UnexpectedEnd => write!(f, "syntax error: unexpected end of input"),
            Error::NestingTooDeep { line, limit } => write!(
                f,
                "syntax error on line {}: nesting deeper than {} levels",
                line, limit
            ),
            Error::UndefinedName { name } => write!(f, "undefined name: {}", name),
            Error::Arithmetic { message } => write!(f, "arithmetic error: {}", message),
        }
    }
}

impl std::error::Error for Error {}

#[test]
fn test_display() {
    let data = vec![
        (
            Error::IllegalCharacter {
                lexeme: "$".to_string(),
                line: 1,
            },
            "illegal character '$' on line 1",
        ),
        (
            Error::UnexpectedToken {
                lexeme: "*".to_string(),
                line: 3,
            },
            "syntax error on line 3: unexpected '*'",
        ),
        (Error::UnexpectedEnd, "syntax error: unexpected end of input"),
        (
            Error::NestingTooDeep {
                line: 2,
                limit: 200,
            },
            "syntax error on line 2: nesting deeper than 200 levels",
        ),
        (
            Error::UndefinedName {
                name: "z".to_string(),
            },
            "undefined name: z",
        ),
    ];

    for (err, expected) in data {
        assert_eq!(err.to_string(), expected);
    }
}

#[test]
fn test_kinds() {
    assert!(Error::UnexpectedEnd.is_syntax());
    assert!(!Error::UnexpectedEnd.is_undefined_name());

    let nested = Error::NestingTooDeep {
        line: 4,
        limit: 200,
    };
    assert!(nested.is_syntax());
    assert_eq!(nested.line(), Some(4));

    let undefined = Error::UndefinedName {
        name: "x".to_string(),
    };
    assert!(undefined.is_undefined_name());
    assert!(!undefined.is_syntax());
    assert_eq!(undefined.line(), None);

    let arith = Error::Arithmetic {
        message: "division by zero".to_string(),
    };
    assert!(!arith.is_syntax());
    assert!(!arith.is_undefined_name());
}
