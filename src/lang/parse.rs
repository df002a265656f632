//! Grammar for the language, written as a PEG over the lexer's tokens.
//!
//! Operator precedence uses the same "precedence ladder" as a hand written recursive descent
//! parser: lower precedence operators sit higher up the ladder so operators further down bind to
//! their operands first.
//!
//! ```text
//! expr  <- sum (('+' / '-') sum)*        left-to-right
//! sum   <- pow (('*' / '/') pow)*        left-to-right
//! pow   <- factor ('^' pow)?             right-to-left
//! factor <- '(' expr ')' / NUMBER / IDENTIFIER
//! ```
//!
//! PEGs may not be left recursive, so left associative rules are parsed as repetitions and folded
//! left afterwards. `^` recurses on its right operand which makes it right associative.

use std::collections::VecDeque;
use std::str::FromStr;

use num_bigint::BigInt;
use pom::parser::{call, end, is_a, Parser};

use crate::lang::ast::*;
use crate::lang::error::Error;
use crate::lang::lexer::{Token, TokenKind};
use crate::lang::stack::ensure_sufficient_stack;

type BinopCtor = fn(Box<Expression>, Box<Expression>) -> BinaryExpression;

/// Macro to left fold a series of binary expressions
///
/// Left fold creates left-to-right associativity, ie:
///     1 - 2 - 3 - 4 => ((1 - 2) - 3) - 4
macro_rules! left_fold_binop {
    ($lhs: expr, $rest: expr) => {{
        // Each entry in the deque is a tuple of (constructor, expression)
        let mut deque: VecDeque<(BinopCtor, Expression)> = $rest.into();

        let mut expr = $lhs;
        while let Some((ctor, e)) = deque.pop_front() {
            expr = Expression::BinaryExpression(ctor(Box::new(expr), Box::new(e)));
        }

        expr
    }};
}

fn token<'a>(kind: TokenKind) -> Parser<'a, Token, Token> {
    is_a(move |t: Token| t.kind == kind)
}

fn binop<'a>(kind: TokenKind, ctor: BinopCtor) -> Parser<'a, Token, BinopCtor> {
    token(kind).map(move |_| ctor)
}

/// `call` for the rules that recurse into a nested construct
fn nested<'a, O: 'a>(rule: fn() -> Parser<'a, Token, O>) -> Parser<'a, Token, O> {
    Parser::new(move |input: &'a [Token], start: usize| {
        ensure_sufficient_stack(|| rule().parse_at(input, start))
    })
}

/// Deepest nesting of `(`, `{` and chained `^` accepted
///
/// Every level costs several stack frames in the recursive rules below. Same limit as the
/// parenthesis nesting limit of CPython's tokenizer.
pub const MAX_NESTING: usize = 200;

/// Literals with a `.` are floats, everything else is an exact integer
fn constant(lexeme: &str) -> Result<Constant, String> {
    if lexeme.contains('.') {
        f64::from_str(lexeme)
            .map(Constant::Float)
            .map_err(|e| e.to_string())
    } else {
        BigInt::from_str(lexeme)
            .map(Constant::Integer)
            .map_err(|e| e.to_string())
    }
}

fn ident<'a>() -> Parser<'a, Token, Identifier> {
    token(TokenKind::Identifier).map(|t| Identifier(t.lexeme))
}

fn factor<'a>() -> Parser<'a, Token, Expression> {
    let number = token(TokenKind::Number)
        .convert(|t| constant(&t.lexeme))
        .map(PrimaryExpression::Constant);
    let name = ident().map(PrimaryExpression::Identifier);
    let paren = (token(TokenKind::LParen) * nested(expr) - token(TokenKind::RParen))
        .map(|e| PrimaryExpression::Paren(Box::new(e)));

    (number | name | paren).map(Expression::PrimaryExpression)
}

fn pow_expr<'a>() -> Parser<'a, Token, Expression> {
    let pow = call(factor) + (token(TokenKind::Caret) * nested(pow_expr)).opt();

    // NB: `^` is right-to-left associative, the recursion above already nests to the right
    pow.map(|(base, exp)| match exp {
        Some(exp) => {
            Expression::BinaryExpression(BinaryExpression::Power(Box::new(base), Box::new(exp)))
        }
        None => base,
    })
}

fn mult_expr<'a>() -> Parser<'a, Token, Expression> {
    let ops = binop(TokenKind::Star, BinaryExpression::Multiply)
        | binop(TokenKind::Slash, BinaryExpression::Divide);
    let mult_div = call(pow_expr) + (ops + call(pow_expr)).repeat(0..);

    mult_div.map(|(lhs, rest)| left_fold_binop!(lhs, rest))
}

fn add_expr<'a>() -> Parser<'a, Token, Expression> {
    let ops = binop(TokenKind::Plus, BinaryExpression::Plus)
        | binop(TokenKind::Minus, BinaryExpression::Minus);
    let plus_minus = call(mult_expr) + (ops + call(mult_expr)).repeat(0..);

    plus_minus.map(|(lhs, rest)| left_fold_binop!(lhs, rest))
}

fn expr<'a>() -> Parser<'a, Token, Expression> {
    add_expr()
}

fn assign_stmt<'a>() -> Parser<'a, Token, Statement> {
    let assignment = ident() - token(TokenKind::Assign) + expr() - token(TokenKind::Semicolon);
    assignment.map(|(name, value)| Statement::AssignStatement(name, value))
}

fn print_stmt<'a>() -> Parser<'a, Token, Statement> {
    let print = token(TokenKind::Print) * token(TokenKind::LParen) * ident()
        - token(TokenKind::RParen)
        - token(TokenKind::Semicolon);
    print.map(Statement::PrintStatement)
}

fn block_stmt<'a>() -> Parser<'a, Token, Statement> {
    let block = token(TokenKind::LBrace) * nested(stmts) - token(TokenKind::RBrace);
    block.map(Statement::BlockStatement)
}

/// Parse a statement
///
/// NB: the keyword rule must come before the identifier rule
fn stmt<'a>() -> Parser<'a, Token, Statement> {
    print_stmt() | assign_stmt() | block_stmt()
}

/// Parse a series of statements. No separator is needed between statements
fn stmts<'a>() -> Parser<'a, Token, Vec<Statement>> {
    call(stmt).repeat(0..)
}

/// Turn a pom error from parsing `tokens[offset..]` into an error naming the offending token
fn error_at(tokens: &[Token], offset: usize, err: pom::Error) -> Error {
    let position = match err {
        pom::Error::Incomplete => return Error::UnexpectedEnd,
        pom::Error::Mismatch { position, .. }
        | pom::Error::Conversion { position, .. }
        | pom::Error::Expect { position, .. }
        | pom::Error::Custom { position, .. } => offset + position,
    };

    match tokens.get(position) {
        Some(t) => Error::UnexpectedToken {
            lexeme: t.lexeme.clone(),
            line: t.line,
        },
        None => Error::UnexpectedEnd,
    }
}

/// Find the first token the grammar cannot accept
///
/// The PEG stops at the start of the first statement it cannot parse, which is a poor place to
/// point a user at. Every statement kind is decided by its first token so walk the statements one
/// by one, stepping into blocks, and report where the failing statement goes wrong.
fn locate_error(tokens: &[Token]) -> Error {
    let mut pos = 0;
    let mut depth = 0;

    while let Some(tok) = tokens.get(pos) {
        match tok.kind {
            TokenKind::LBrace => {
                depth += 1;
                pos += 1;
            }
            TokenKind::RBrace if depth > 0 => {
                depth -= 1;
                pos += 1;
            }
            kind => {
                let rest = &tokens[pos..];
                let simple_stmt = if kind == TokenKind::Print {
                    print_stmt()
                } else {
                    assign_stmt()
                };

                match simple_stmt.collect().parse(rest) {
                    Ok(consumed) => pos += consumed.len(),
                    Err(e) => return error_at(tokens, pos, e),
                }
            }
        }
    }

    // Ran out of tokens inside a block
    Error::UnexpectedEnd
}

/// Reject input nested deeper than `MAX_NESTING` before the recursive rules see it
///
/// Depth is the number of open brackets plus the length of every unfinished `^` chain. A chain
/// ends at any lower precedence operator or statement punctuation.
fn check_nesting(tokens: &[Token]) -> Result<(), Error> {
    // One chain length per open bracket, plus the top level
    let mut carets: Vec<usize> = vec![0];
    let mut depth = 0;

    for tok in tokens {
        match tok.kind {
            TokenKind::LParen | TokenKind::LBrace => {
                carets.push(0);
                depth += 1;
            }
            TokenKind::RParen | TokenKind::RBrace => {
                // Unbalanced closers are left for the grammar to report
                if carets.len() > 1 {
                    if let Some(chain) = carets.pop() {
                        depth -= chain + 1;
                    }
                }
            }
            TokenKind::Caret => {
                if let Some(chain) = carets.last_mut() {
                    *chain += 1;
                    depth += 1;
                }
            }
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Assign
            | TokenKind::Semicolon => {
                if let Some(chain) = carets.last_mut() {
                    depth -= *chain;
                    *chain = 0;
                }
            }
            _ => (),
        }

        if depth > MAX_NESTING {
            return Err(Error::NestingTooDeep {
                line: tok.line,
                limit: MAX_NESTING,
            });
        }
    }

    Ok(())
}

pub fn parse(tokens: &[Token]) -> Result<Vec<Statement>, Error> {
    check_nesting(tokens)?;

    let program = stmts() - end();
    program.parse(tokens).map_err(|_| locate_error(tokens))
}

#[cfg(test)]
fn parse_str(input: &str) -> Result<Vec<Statement>, Error> {
    let tokens = crate::lang::lexer::tokenize(input)?;
    parse(&tokens)
}

#[cfg(test)]
fn int(i: i64) -> Box<Expression> {
    Box::new(Expression::PrimaryExpression(PrimaryExpression::Constant(
        Constant::Integer(BigInt::from(i)),
    )))
}

#[cfg(test)]
fn name(n: &str) -> Box<Expression> {
    Box::new(Expression::PrimaryExpression(PrimaryExpression::Identifier(
        Identifier(n.to_string()),
    )))
}

#[cfg(test)]
fn parse_expr(input: &str) -> Expression {
    let mut stmts = parse_str(&format!("x = {};", input)).expect("failed to parse");
    match stmts.pop() {
        Some(Statement::AssignStatement(_, e)) => e,
        _ => panic!("not an assignment"),
    }
}

#[test]
fn test_constant() {
    assert_eq!(constant("0"), Ok(Constant::Integer(BigInt::from(0))));
    assert_eq!(constant("2342"), Ok(Constant::Integer(BigInt::from(2342))));
    assert_eq!(constant("1.01"), Ok(Constant::Float(1.01)));

    let digits = "1000000000000000000000000000000000000000000";
    assert_eq!(
        constant(digits),
        Ok(Constant::Integer(BigInt::from_str(digits).expect("bad test integer")))
    );
}

#[test]
fn test_arith_expr() {
    let data = vec![
        (
            "1 + 2 * 3",
            Expression::BinaryExpression(BinaryExpression::Plus(
                int(1),
                Box::new(Expression::BinaryExpression(BinaryExpression::Multiply(
                    int(2),
                    int(3),
                ))),
            )),
        ),
        (
            "1 - 2 - 3",
            Expression::BinaryExpression(BinaryExpression::Minus(
                Box::new(Expression::BinaryExpression(BinaryExpression::Minus(
                    int(1),
                    int(2),
                ))),
                int(3),
            )),
        ),
        (
            "8 / 4 / 2",
            Expression::BinaryExpression(BinaryExpression::Divide(
                Box::new(Expression::BinaryExpression(BinaryExpression::Divide(
                    int(8),
                    int(4),
                ))),
                int(2),
            )),
        ),
        (
            "2 ^ 3 ^ 2",
            Expression::BinaryExpression(BinaryExpression::Power(
                int(2),
                Box::new(Expression::BinaryExpression(BinaryExpression::Power(
                    int(3),
                    int(2),
                ))),
            )),
        ),
        (
            "a * b ^ 2",
            Expression::BinaryExpression(BinaryExpression::Multiply(
                name("a"),
                Box::new(Expression::BinaryExpression(BinaryExpression::Power(
                    name("b"),
                    int(2),
                ))),
            )),
        ),
        (
            "(1 + 2) * 3",
            Expression::BinaryExpression(BinaryExpression::Multiply(
                Box::new(Expression::PrimaryExpression(PrimaryExpression::Paren(
                    Box::new(Expression::BinaryExpression(BinaryExpression::Plus(
                        int(1),
                        int(2),
                    ))),
                ))),
                int(3),
            )),
        ),
    ];

    for (input, expected) in data {
        assert_eq!(parse_expr(input), expected, "{}", input);
    }
}

#[test]
fn test_stmts() {
    let stmts = parse_str("a = 1; print(a); { b = a; { } } print(a);").expect("failed to parse");
    assert_eq!(
        stmts,
        vec![
            Statement::AssignStatement(Identifier("a".to_string()), *int(1)),
            Statement::PrintStatement(Identifier("a".to_string())),
            Statement::BlockStatement(vec![
                Statement::AssignStatement(Identifier("b".to_string()), *name("a")),
                Statement::BlockStatement(vec![]),
            ]),
            Statement::PrintStatement(Identifier("a".to_string())),
        ]
    );

    assert_eq!(parse_str(""), Ok(vec![]));
    assert_eq!(parse_str("  \n\t "), Ok(vec![]));
}

#[test]
fn test_syntax_errors() {
    let data = vec![
        ("x = 1 ++ 1;", Some(("+", 1))),
        ("5 = 1 + 2 * 10;", Some(("5", 1))),
        ("x = 2 - 3 - 4;\ny = 2 - (3 - 4)", None),
        ("print = 1;", Some(("=", 1))),
        ("a = (1 + 2;", Some((";", 1))),
        ("{\n  { a = 1;\n}", None),
        ("a = 2 ** 2;", Some(("*", 1))),
        ("a += 1;", Some(("+", 1))),
        ("{ x = 1; }\n}", Some(("}", 2))),
        ("{ x = 1;\n  print(x) }", Some(("}", 2))),
        ("print(1);", Some(("1", 1))),
        ("x = ;", Some((";", 1))),
    ];

    for (input, expected) in data {
        let expected = match expected {
            Some((lexeme, line)) => Error::UnexpectedToken {
                lexeme: lexeme.to_string(),
                line,
            },
            None => Error::UnexpectedEnd,
        };
        assert_eq!(parse_str(input), Err(expected), "{}", input);
    }
}

#[test]
fn test_nesting_limit() {
    let parens = |open: &str, close: &str, n: usize| {
        format!("x = {}1{};", open.repeat(n), close.repeat(n))
    };

    assert!(parse_str(&parens("(", ")", MAX_NESTING)).is_ok());
    assert_eq!(
        parse_str(&parens("(", ")", MAX_NESTING + 1)),
        Err(Error::NestingTooDeep {
            line: 1,
            limit: MAX_NESTING
        })
    );
    assert!(parse_str(&parens("(", ")", 1000)).unwrap_err().is_syntax());

    let blocks = |n: usize| format!("{}{}", "{".repeat(n), "}".repeat(n));
    assert!(parse_str(&blocks(MAX_NESTING)).is_ok());
    assert!(parse_str(&blocks(MAX_NESTING + 1)).unwrap_err().is_syntax());

    let chain = |n: usize| format!("x = 1{};", "^1".repeat(n));
    assert!(parse_str(&chain(MAX_NESTING)).is_ok());
    assert!(parse_str(&chain(MAX_NESTING + 1)).unwrap_err().is_syntax());

    // Chains end at lower precedence operators, so these stay shallow
    let sums = format!("x = 1{};", "^1+1".repeat(1000));
    assert!(parse_str(&sums).is_ok());
    let statements = "x = 2^2^2;\n".repeat(1000);
    assert!(parse_str(&statements).is_ok());
}
