use std::fmt;
use std::mem;

use num_bigint::BigInt;

#[derive(Debug, PartialEq)]
pub enum BinaryExpression {
    /// `+`
    Plus(Box<Expression>, Box<Expression>),
    /// `-`
    Minus(Box<Expression>, Box<Expression>),
    /// `*`
    Multiply(Box<Expression>, Box<Expression>),
    /// `/`
    Divide(Box<Expression>, Box<Expression>),
    /// `^`
    Power(Box<Expression>, Box<Expression>),
}

impl BinaryExpression {
    pub fn op_str(&self) -> &str {
        match self {
            BinaryExpression::Plus(_, _) => "+",
            BinaryExpression::Minus(_, _) => "-",
            BinaryExpression::Multiply(_, _) => "*",
            BinaryExpression::Divide(_, _) => "/",
            BinaryExpression::Power(_, _) => "^",
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Constant {
    Integer(BigInt),
    Float(f64),
}

#[derive(Debug, PartialEq, Hash, PartialOrd, Ord, Eq, Clone)]
pub struct Identifier(pub String);

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, PartialEq)]
pub enum PrimaryExpression {
    Identifier(Identifier),
    Constant(Constant),
    Paren(Box<Expression>),
}

#[derive(Debug, PartialEq)]
pub enum Expression {
    PrimaryExpression(PrimaryExpression),
    BinaryExpression(BinaryExpression),
}

impl Expression {
    fn leaf() -> Expression {
        Expression::PrimaryExpression(PrimaryExpression::Constant(Constant::Float(0.0)))
    }

    /// Move subexpressions out into `out`, leaving leaves behind
    fn take_children(&mut self, out: &mut Vec<Expression>) {
        let children: Vec<&mut Box<Expression>> = match self {
            Expression::PrimaryExpression(PrimaryExpression::Paren(e)) => vec![e],
            Expression::PrimaryExpression(_) => vec![],
            Expression::BinaryExpression(b) => match b {
                BinaryExpression::Plus(l, r)
                | BinaryExpression::Minus(l, r)
                | BinaryExpression::Multiply(l, r)
                | BinaryExpression::Divide(l, r)
                | BinaryExpression::Power(l, r) => vec![l, r],
            },
        };

        for child in children {
            out.push(mem::replace(&mut **child, Expression::leaf()));
        }
    }
}

/// Long operator chains fold into trees as deep as the chain is long. Tear them down with an
/// explicit stack so dropping one cannot overflow the call stack
impl Drop for Expression {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut e) = pending.pop() {
            e.take_children(&mut pending);
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum Statement {
    /// (name, value)
    AssignStatement(Identifier, Expression),
    PrintStatement(Identifier),
    /// `{ ... }`, evaluated in a fresh scope
    BlockStatement(Vec<Statement>),
}
