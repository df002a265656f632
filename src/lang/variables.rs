use std::collections::BTreeMap;

use log::debug;

use crate::lang::ast::Identifier;
use crate::lang::error::Error;

/// Stack of lexical scopes
///
/// The first scope is the global scope and is never popped. New bindings always go into the
/// innermost scope, so assigning to a name inside a block shadows (never mutates) an outer binding.
pub struct Variables<T> {
    inner: Vec<BTreeMap<Identifier, T>>,
}

impl<T> Default for Variables<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Variables<T> {
    pub fn new() -> Self {
        Variables {
            inner: vec![BTreeMap::default()],
        }
    }

    pub fn push_scope(&mut self) {
        self.inner.push(BTreeMap::default());
        debug!("push scope, depth={}", self.depth());
    }

    pub fn pop_scope(&mut self) {
        assert!(self.inner.len() > 1, "attempted to pop the global scope");
        self.inner.pop();
        debug!("pop scope, depth={}", self.depth());
    }

    /// Drop every scope except the global one
    pub fn unwind(&mut self) {
        self.inner.truncate(1);
    }

    /// Number of active scopes, including the global scope
    pub fn depth(&self) -> usize {
        self.inner.len()
    }

    pub fn get(&self, ident: &Identifier) -> Option<&T> {
        for scope in self.inner.iter().rev() {
            if let Some(val) = scope.get(ident) {
                return Some(val);
            }
        }

        None
    }

    /// Like `get` but a missing binding is an error
    pub fn lookup(&self, ident: &Identifier) -> Result<&T, Error> {
        self.get(ident).ok_or_else(|| Error::UndefinedName {
            name: ident.to_string(),
        })
    }

    pub fn insert(&mut self, ident: Identifier, val: T) {
        // `inner` always holds the global scope
        if let Some(scope) = self.inner.last_mut() {
            scope.insert(ident, val);
        }
    }
}

#[cfg(test)]
fn ident(name: &str) -> Identifier {
    Identifier(name.to_string())
}

#[test]
fn test_shadowing() {
    let mut vars = Variables::new();
    vars.insert(ident("x"), 1);
    vars.push_scope();
    assert_eq!(vars.lookup(&ident("x")), Ok(&1));
    vars.insert(ident("x"), 2);
    assert_eq!(vars.lookup(&ident("x")), Ok(&2));
    vars.pop_scope();
    assert_eq!(vars.lookup(&ident("x")), Ok(&1));
}

#[test]
fn test_overwrite_same_scope() {
    let mut vars = Variables::new();
    vars.insert(ident("x"), 1);
    vars.insert(ident("x"), 5);
    assert_eq!(vars.get(&ident("x")), Some(&5));
}

#[test]
fn test_out_of_scope() {
    let mut vars = Variables::new();
    vars.push_scope();
    vars.insert(ident("y"), 7);
    vars.push_scope();
    assert_eq!(vars.get(&ident("y")), Some(&7));
    vars.pop_scope();
    vars.pop_scope();
    assert_eq!(
        vars.lookup(&ident("y")),
        Err(Error::UndefinedName {
            name: "y".to_string()
        })
    );
}

#[test]
fn test_unwind() {
    let mut vars = Variables::new();
    vars.insert(ident("g"), 0);
    vars.push_scope();
    vars.push_scope();
    vars.insert(ident("l"), 1);
    assert_eq!(vars.depth(), 3);
    vars.unwind();
    assert_eq!(vars.depth(), 1);
    assert_eq!(vars.get(&ident("g")), Some(&0));
    assert_eq!(vars.get(&ident("l")), None);
}
