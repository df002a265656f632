use log::debug;

use crate::lang::ast::*;
use crate::lang::error::Error;
use crate::lang::stack::ensure_sufficient_stack;
use crate::lang::value::{Printed, Value};
use crate::lang::variables::Variables;

/// Tree walking evaluator
///
/// Owns the symbol table and the output of `print` statements. Nothing is shared between two
/// `Eval` instances.
#[derive(Default)]
pub struct Eval {
    variables: Variables<Value>,
    output: Vec<Printed>,
}

impl Eval {
    fn eval_primary_expr(&self, expr: &PrimaryExpression) -> Result<Value, Error> {
        let val = match expr {
            PrimaryExpression::Identifier(ident) => self.variables.lookup(ident)?.clone(),
            PrimaryExpression::Constant(c) => Value::from(c),
            PrimaryExpression::Paren(expr) => self.eval_expr(expr)?,
        };

        Ok(val)
    }

    fn eval_binop_expr(&self, binop: &BinaryExpression) -> Result<Value, Error> {
        let res = match binop {
            BinaryExpression::Plus(lhs, rhs) => self.eval_expr(lhs)?.add(&self.eval_expr(rhs)?),
            BinaryExpression::Minus(lhs, rhs) => self.eval_expr(lhs)?.sub(&self.eval_expr(rhs)?),
            BinaryExpression::Multiply(lhs, rhs) => {
                self.eval_expr(lhs)?.mul(&self.eval_expr(rhs)?)
            }
            BinaryExpression::Divide(lhs, rhs) => self.eval_expr(lhs)?.div(&self.eval_expr(rhs)?),
            BinaryExpression::Power(lhs, rhs) => self.eval_expr(lhs)?.pow(&self.eval_expr(rhs)?),
        };

        if let Err(e) = &res {
            debug!("`{}` failed: {}", binop.op_str(), e);
        }

        res
    }

    fn eval_expr(&self, expr: &Expression) -> Result<Value, Error> {
        ensure_sufficient_stack(|| match expr {
            Expression::PrimaryExpression(p) => self.eval_primary_expr(p),
            Expression::BinaryExpression(b) => self.eval_binop_expr(b),
        })
    }

    fn eval_statement(&mut self, stmt: &Statement) -> Result<(), Error> {
        match stmt {
            Statement::AssignStatement(ident, expr) => {
                let val = self.eval_expr(expr)?;
                debug!("assign {} = {:?}", ident, val);
                self.variables.insert(ident.clone(), val);
            }
            Statement::PrintStatement(ident) => {
                let printed = self.variables.lookup(ident)?.to_printed();
                debug!("print {} -> {}", ident, printed);
                self.output.push(printed);
            }
            Statement::BlockStatement(stmts) => {
                self.variables.push_scope();
                ensure_sufficient_stack(|| -> Result<(), Error> {
                    for stmt in stmts {
                        self.eval_statement(stmt)?;
                    }
                    Ok(())
                })?;
                self.variables.pop_scope();
            }
        }

        Ok(())
    }

    pub fn new() -> Self {
        Self::default()
    }

    /// Execute `stmts` in order and return everything they printed
    ///
    /// Execution stops at the first error. Scopes opened by unfinished blocks are dropped so the
    /// next call starts from the global scope again; global bindings made before the error stay.
    pub fn eval(&mut self, stmts: &[Statement]) -> Result<Vec<Printed>, Error> {
        self.output.clear();

        for stmt in stmts {
            if let Err(e) = self.eval_statement(stmt) {
                self.variables.unwind();
                self.output.clear();
                return Err(e);
            }
        }

        Ok(std::mem::take(&mut self.output))
    }
}

#[cfg(test)]
use num_bigint::BigInt;

#[cfg(test)]
fn int(i: i64) -> Printed {
    Printed::Int(BigInt::from(i))
}

#[cfg(test)]
fn eval_str(eval: &mut Eval, input: &str) -> Result<Vec<Printed>, Error> {
    let tokens = crate::lang::lexer::tokenize(input)?;
    let stmts = crate::lang::parse::parse(&tokens)?;
    eval.eval(&stmts)
}

#[test]
fn test_expression() {
    use Printed::Float;

    let tests = vec![
        ("x = 5 + 5; print(x);", int(10)),
        ("x = 100 - 3; print(x);", int(97)),
        ("x = 100 * 3; print(x);", int(300)),
        ("x = 5 / 2; print(x);", Float(2.5)),
        ("x = 4 / 2; print(x);", int(2)),
        ("x = 2 ^ 3 ^ 2; print(x);", int(512)),
        ("x = (2 ^ 3) ^ 2; print(x);", int(64)),
        ("x = 2 - 3 - 4; print(x);", int(-5)),
        ("x = 2 - (3 - 4); print(x);", int(3)),
        ("x = 1.5 + 1.5; print(x);", int(3)),
        ("x = 0.1 * 3; print(x);", Float(0.1 * 3.0)),
        ("x = 2 ^ 0.5 ^ 2; print(x);", Float(2f64.powf(0.25))),
    ];

    for (input, expected) in tests {
        let mut eval = Eval::new();
        assert_eq!(eval_str(&mut eval, input), Ok(vec![expected]), "{}", input);
    }
}

#[test]
fn test_block_scopes() {
    let mut eval = Eval::new();
    let output = eval_str(&mut eval, "x = 1; { x = 2; print(x); { print(x); } } print(x);");
    assert_eq!(output, Ok(vec![int(2), int(2), int(1)]));
}

#[test]
fn test_error_unwinds_scopes() {
    let mut eval = Eval::new();
    let res = eval_str(&mut eval, "g = 1; { { print(g); y = nope; } }");
    assert_eq!(
        res,
        Err(Error::UndefinedName {
            name: "nope".to_string()
        })
    );
    assert_eq!(eval.variables.depth(), 1);

    // Globals bound before the error survive, output from the failed call does not
    assert_eq!(eval_str(&mut eval, "print(g);"), Ok(vec![int(1)]));
}

#[test]
fn test_lookup_at_execution_time() {
    let mut eval = Eval::new();
    let output = eval_str(&mut eval, "{ a = 1; b = a + 1; print(b); a = 10; b = a; print(b); }");
    assert_eq!(output, Ok(vec![int(2), int(10)]));
}

#[test]
fn test_long_operator_chain() {
    // Folds into a tree 20000 levels deep
    let mut eval = Eval::new();
    let src = format!("x = 1{}; print(x);", "+1".repeat(20_000));
    assert_eq!(eval_str(&mut eval, &src), Ok(vec![int(20_001)]));

    let src = format!("x = 2{}; print(x);", "*1".repeat(20_000));
    assert_eq!(eval_str(&mut eval, &src), Ok(vec![int(2)]));
}
