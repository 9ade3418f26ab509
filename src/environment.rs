//! Module `environment` implements the lexically scoped variable store.
//!
//! Environments form a parent chain: each block, function call, and class body
//! pushes a child environment whose `enclosing` link points at the scope it was
//! created in.  Closures keep their defining environment alive through
//! `Rc<RefCell<…>>`, so scope lifetime is ownership‑driven rather than
//! stack‑driven.
//!
//! The `*_at` accessors walk a *resolver‑computed* number of hops before
//! touching the map.  The resolver guarantees the hop count is valid, which is
//! why `ancestor` may `expect` the enclosing link.

use crate::error::{QuillError, Result};
use crate::value::Value;
use log::debug;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct Environment<'a> {
    values: HashMap<String, Value<'a>>,
    enclosing: Option<Rc<RefCell<Environment<'a>>>>,
}

impl<'a> Environment<'a> {
    /// A root environment with no parent (the global scope).
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    /// A child environment nested inside `enclosing`.
    pub fn with_enclosing(enclosing: Rc<RefCell<Environment<'a>>>) -> Self {
        Self {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Bind `name` in *this* scope, shadowing any outer binding.  Redefinition
    /// in the same scope silently overwrites (the resolver reports duplicate
    /// local declarations before execution starts).
    pub fn define(&mut self, name: &str, value: Value<'a>) {
        debug!("define {} = {}", name, value);

        self.values.insert(name.to_owned(), value);
    }

    /// Look `name` up in this scope, then outward through the chain.
    pub fn get(&self, name: &str, line: usize) -> Result<Value<'a>> {
        if let Some(v) = self.values.get(name) {
            return Ok(v.clone());
        }

        match &self.enclosing {
            Some(parent) => parent.borrow().get(name, line),
            None => Err(QuillError::runtime(
                line,
                format!("Undefined variable '{}'.", name),
            )),
        }
    }

    /// Assign to an *existing* binding, searching outward through the chain.
    pub fn assign(&mut self, name: &str, value: Value<'a>, line: usize) -> Result<()> {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;

            return Ok(());
        }

        match &self.enclosing {
            Some(parent) => parent.borrow_mut().assign(name, value, line),
            None => Err(QuillError::runtime(
                line,
                format!("Undefined variable '{}'.", name),
            )),
        }
    }

    /// Direct lookup in this scope only.  Used by the interpreter to expose
    /// globals to the embedding layer and tests.
    pub fn get_value(&self, name: &str) -> Option<Value<'a>> {
        self.values.get(name).cloned()
    }

    // ─────────────────────── resolver‑guided accessors ──────────────────────

    /// Walk exactly `distance` hops up the chain.  The resolver has proven the
    /// chain is at least that deep, hence the `expect`.
    fn ancestor(
        env: &Rc<RefCell<Environment<'a>>>,
        distance: usize,
    ) -> Rc<RefCell<Environment<'a>>> {
        let mut current = Rc::clone(env);

        for _ in 0..distance {
            let parent = current
                .borrow()
                .enclosing
                .clone()
                .expect("resolver produced a distance deeper than the environment chain");

            current = parent;
        }

        current
    }

    /// Read `name` from the scope exactly `distance` hops up.
    pub fn get_at(
        env: &Rc<RefCell<Environment<'a>>>,
        distance: usize,
        name: &str,
        line: usize,
    ) -> Result<Value<'a>> {
        let target = Self::ancestor(env, distance);
        let found = target.borrow().values.get(name).cloned();

        found.ok_or_else(|| QuillError::runtime(line, format!("Undefined variable '{}'.", name)))
    }

    /// Write `name` in the scope exactly `distance` hops up.
    pub fn assign_at(
        env: &Rc<RefCell<Environment<'a>>>,
        distance: usize,
        name: &str,
        value: Value<'a>,
        line: usize,
    ) -> Result<()> {
        let target = Self::ancestor(env, distance);
        let mut target_ref = target.borrow_mut();

        match target_ref.values.get_mut(name) {
            Some(slot) => {
                *slot = value;

                Ok(())
            }
            None => Err(QuillError::runtime(
                line,
                format!("Undefined variable '{}'.", name),
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_then_get() {
        let env = Environment::new();
        let env = Rc::new(RefCell::new(env));

        env.borrow_mut().define("x", Value::Number(3.0));

        assert_eq!(env.borrow().get("x", 1).unwrap(), Value::Number(3.0));
    }

    #[test]
    fn get_walks_enclosing_chain() {
        let root = Rc::new(RefCell::new(Environment::new()));
        root.borrow_mut().define("x", Value::Number(1.0));

        let child = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(&root))));

        assert_eq!(child.borrow().get("x", 1).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn assign_writes_through_to_defining_scope() {
        let root = Rc::new(RefCell::new(Environment::new()));
        root.borrow_mut().define("x", Value::Number(1.0));

        let child = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(&root))));
        child
            .borrow_mut()
            .assign("x", Value::Number(2.0), 1)
            .unwrap();

        assert_eq!(root.borrow().get_value("x"), Some(Value::Number(2.0)));
    }

    #[test]
    fn get_at_skips_shadowing_scope() {
        let root = Rc::new(RefCell::new(Environment::new()));
        root.borrow_mut().define("x", Value::Number(1.0));

        let child = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(&root))));
        child.borrow_mut().define("x", Value::Number(2.0));

        assert_eq!(
            Environment::get_at(&child, 1, "x", 1).unwrap(),
            Value::Number(1.0)
        );
        assert_eq!(
            Environment::get_at(&child, 0, "x", 1).unwrap(),
            Value::Number(2.0)
        );
    }

    #[test]
    fn undefined_variable_is_a_runtime_error() {
        let env = Rc::new(RefCell::new(Environment::new()));

        let err = env.borrow().get("missing", 7).unwrap_err();

        assert_eq!(
            err.to_string(),
            "[line 7] Runtime error: Undefined variable 'missing'."
        );
    }
}
