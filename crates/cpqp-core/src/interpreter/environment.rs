//! Lexical environments for variable binding

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::bytecode::Value;

/// A scope of variable bindings, chained to the scope that encloses it
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    /// Creates a new global environment
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new environment nested inside `enclosing`
    #[must_use]
    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Self {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Binds `name` in this scope, replacing any previous binding here
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Looks `name` up through the chain of scopes
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.values.get(name) {
            Some(value) => Some(value.clone()),
            None => self
                .enclosing
                .as_ref()
                .and_then(|enclosing| enclosing.borrow().get(name)),
        }
    }

    /// Overwrites the nearest existing binding of `name`
    ///
    /// Returns false if no scope defines it; assignment never declares.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
            true
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_enclosing_scopes() {
        let global = Rc::new(RefCell::new(Environment::new()));
        global.borrow_mut().define("x", Value::Int(1));

        let inner = Environment::with_enclosing(Rc::clone(&global));
        assert_eq!(inner.get("x"), Some(Value::Int(1)));
        assert_eq!(inner.get("y"), None);
    }

    #[test]
    fn shadowing_and_assignment() {
        let global = Rc::new(RefCell::new(Environment::new()));
        global.borrow_mut().define("x", Value::Int(1));

        let mut inner = Environment::with_enclosing(Rc::clone(&global));
        assert!(inner.assign("x", Value::Int(2)));
        assert_eq!(global.borrow().get("x"), Some(Value::Int(2)));

        inner.define("x", Value::string("local"));
        assert!(inner.assign("x", Value::string("changed")));
        assert_eq!(inner.get("x"), Some(Value::string("changed")));
        assert_eq!(global.borrow().get("x"), Some(Value::Int(2)));
    }

    #[test]
    fn assignment_never_declares() {
        let mut env = Environment::new();
        assert!(!env.assign("nope", Value::Nil));
        assert_eq!(env.get("nope"), None);
    }
}
