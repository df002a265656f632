use log::info;

use crate::lang::error::Error;
use crate::lang::eval::Eval;
use crate::lang::lexer::tokenize;
use crate::lang::parse::parse;
use crate::lang::value::Printed;

/// An interpreter session
///
/// Global bindings persist across calls to [`Runtime::eval`], which is what the REPL wants. Use
/// [`run`] for a one-off program with fresh state.
#[derive(Default)]
pub struct Runtime {
    eval: Eval,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lex, parse and execute `source`, returning the printed values in program order
    ///
    /// The whole input is parsed before anything executes, so a syntax error anywhere means
    /// nothing runs.
    pub fn eval(&mut self, source: &str) -> Result<Vec<Printed>, Error> {
        let tokens = tokenize(source)?;
        let stmts = parse(&tokens)?;
        info!("parsed {} statements from {} tokens", stmts.len(), tokens.len());

        let output = self.eval.eval(&stmts)?;
        info!("printed {} values", output.len());

        Ok(output)
    }
}

/// Run `source` against a fresh symbol table
pub fn run(source: &str) -> Result<Vec<Printed>, Error> {
    Runtime::new().eval(source)
}

#[test]
fn test_session_keeps_globals() {
    let mut rt = Runtime::new();
    assert_eq!(rt.eval("x = 2;"), Ok(vec![]));
    assert_eq!(rt.eval("y = x * 3; print(y);"), Ok(vec![Printed::Int(6.into())]));
}

#[test]
fn test_run_is_fresh() {
    assert_eq!(run("x = 2; print(x);"), Ok(vec![Printed::Int(2.into())]));
    assert!(run("print(x);").unwrap_err().is_undefined_name());
}

#[test]
fn test_syntax_error_runs_nothing() {
    let mut rt = Runtime::new();
    assert!(rt.eval("a = 1; print(a); b = ;").unwrap_err().is_syntax());
    assert!(rt.eval("print(a);").unwrap_err().is_undefined_name());
}
