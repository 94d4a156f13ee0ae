// ABOUTME: Environment module for managing variable bindings and scopes

use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// A frame of named bindings with an optional parent link.
///
/// Frames form a tree rather than a stack: a closure keeps its declaring
/// frame alive for as long as the closure itself lives.
#[derive(Debug)]
pub struct Environment {
    values: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new global environment with no parent
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            values: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment with a parent
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            values: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Defines a binding in THIS scope (doesn't walk parent chain)
    pub fn define(&self, name: String, value: Value) {
        self.values.borrow_mut().insert(name, value);
    }

    /// Looks up a name in this scope and parent scopes recursively
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.values.borrow().get(name) {
            return Some(value.clone());
        }

        if let Some(ref parent) = self.parent {
            return parent.get(name);
        }

        None
    }

    /// Updates an existing binding, walking the parent chain.
    /// Returns false if the name is bound nowhere on the chain.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        if self.values.borrow().contains_key(name) {
            self.values.borrow_mut().insert(name.to_string(), value);
            return true;
        }

        if let Some(ref parent) = self.parent {
            return parent.assign(name, value);
        }

        false
    }

    /// Reads a binding from the frame `depth` parent links up.
    /// The resolver guarantees both the depth and the name.
    pub fn get_at(&self, depth: usize, name: &str) -> Option<Value> {
        if depth == 0 {
            return self.values.borrow().get(name).cloned();
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.get_at(depth - 1, name))
    }

    /// Writes a binding in the frame `depth` parent links up.
    pub fn assign_at(&self, depth: usize, name: &str, value: Value) {
        if depth == 0 {
            self.values.borrow_mut().insert(name.to_string(), value);
        } else if let Some(parent) = &self.parent {
            parent.assign_at(depth - 1, name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_get() {
        let env = Environment::new();
        env.define("x".to_string(), Value::Number(42.0));

        match env.get("x") {
            Some(Value::Number(n)) => assert_eq!(n, 42.0),
            _ => panic!("Expected Number(42.0)"),
        }
    }

    #[test]
    fn test_undefined_name() {
        let env = Environment::new();
        assert!(env.get("undefined").is_none());
    }

    #[test]
    fn test_shadowing() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Number(42.0));

        let child = Environment::with_parent(parent);
        child.define("x".to_string(), Value::Number(100.0));

        // Child should see its own value
        match child.get("x") {
            Some(Value::Number(n)) => assert_eq!(n, 100.0),
            _ => panic!("Expected Number(100.0)"),
        }
    }

    #[test]
    fn test_parent_lookup() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Number(42.0));

        let child = Environment::with_parent(parent);

        match child.get("x") {
            Some(Value::Number(n)) => assert_eq!(n, 42.0),
            _ => panic!("Expected Number(42.0)"),
        }
    }

    #[test]
    fn test_assign_walks_chain() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Number(1.0));

        let child = Environment::with_parent(parent.clone());
        assert!(child.assign("x", Value::Number(2.0)));

        match parent.get("x") {
            Some(Value::Number(n)) => assert_eq!(n, 2.0),
            _ => panic!("Expected Number(2.0)"),
        }

        assert!(!child.assign("missing", Value::Nil));
    }

    #[test]
    fn test_get_at_reads_exact_frame() {
        let grandparent = Environment::new();
        grandparent.define("a".to_string(), Value::Number(1.0));

        let parent = Environment::with_parent(grandparent);
        parent.define("a".to_string(), Value::Number(2.0));

        let child = Environment::with_parent(parent);

        match child.get_at(1, "a") {
            Some(Value::Number(n)) => assert_eq!(n, 2.0),
            _ => panic!("Expected Number(2.0)"),
        }
        match child.get_at(2, "a") {
            Some(Value::Number(n)) => assert_eq!(n, 1.0),
            _ => panic!("Expected Number(1.0)"),
        }
        // Depth 0 is the child itself, which holds nothing
        assert!(child.get_at(0, "a").is_none());
    }

    #[test]
    fn test_assign_at_writes_exact_frame() {
        let parent = Environment::new();
        parent.define("x".to_string(), Value::Number(1.0));

        let child = Environment::with_parent(parent.clone());
        child.assign_at(1, "x", Value::Number(9.0));

        match parent.get("x") {
            Some(Value::Number(n)) => assert_eq!(n, 9.0),
            _ => panic!("Expected Number(9.0)"),
        }
    }
}
