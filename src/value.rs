// ABOUTME: Runtime value domain shared by the evaluator and native functions

use crate::ast::FunctionBody;
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Tagged runtime value.
///
/// Arrays and dictionaries have reference semantics: cloning a `Value`
/// clones the handle, and mutation is observed through every alias.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Rc<RefCell<Vec<Value>>>),
    Dictionary(Rc<RefCell<HashMap<DictKey, Value>>>),
    Function(Rc<UserFunction>),
    Native(Rc<NativeFunction>),
}

/// Hashable key domain for dictionaries.
///
/// Numbers are stored by bit pattern with `-0.0` canonicalized to `0.0`,
/// so keys that compare numerically equal collide. Arrays, dictionaries,
/// and callables are rejected as keys before this type is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DictKey {
    Nil,
    Bool(bool),
    Number(u64),
    String(String),
}

impl DictKey {
    pub fn from_value(value: &Value) -> Option<DictKey> {
        match value {
            Value::Nil => Some(DictKey::Nil),
            Value::Bool(b) => Some(DictKey::Bool(*b)),
            Value::Number(n) => {
                let canonical = if *n == 0.0 { 0.0 } else { *n };
                Some(DictKey::Number(canonical.to_bits()))
            }
            Value::String(s) => Some(DictKey::String(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for DictKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictKey::Nil => write!(f, "nil"),
            DictKey::Bool(b) => write!(f, "{}", b),
            DictKey::Number(bits) => write!(f, "{}", Value::Number(f64::from_bits(*bits))),
            DictKey::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// A user-declared function or lambda plus the environment it closed over.
#[derive(Debug)]
pub struct UserFunction {
    /// `None` for lambdas.
    pub name: Option<String>,
    pub declaration: Rc<FunctionBody>,
    pub closure: Rc<Environment>,
}

pub type NativeFn = fn(&mut Interpreter, &[Value], usize) -> Result<Value, RuntimeError>;

/// A host-provided callable installed in the global environment.
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: NativeFn,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl Value {
    /// Nil and `false` are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Dictionary(_) => "dictionary",
            Value::Function(_) | Value::Native(_) => "function",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => {
                // Whole numbers display without the trailing .0
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Dictionary(map) => {
                write!(f, "{{")?;
                let map = map.borrow();
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by_key(|(k, _)| k.to_string()); // Sort for consistent display
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Function(func) => match &func.name {
                Some(name) => write!(f, "<fn {}>", name),
                None => write!(f, "<lambda>"),
            },
            Value::Native(_) => write!(f, "<native fn>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_display() {
        let whole = Value::Number(42.0);
        assert_eq!(format!("{}", whole), "42");

        let decimal = Value::Number(-2.5);
        assert_eq!(format!("{}", decimal), "-2.5");

        let zero = Value::Number(0.0);
        assert_eq!(format!("{}", zero), "0");

        let three = Value::Number(3.0);
        assert_eq!(format!("{}", three), "3");
    }

    #[test]
    fn test_bool_and_nil_display() {
        assert_eq!(format!("{}", Value::Bool(true)), "true");
        assert_eq!(format!("{}", Value::Bool(false)), "false");
        assert_eq!(format!("{}", Value::Nil), "nil");
    }

    #[test]
    fn test_string_display_is_bare() {
        let s = Value::String("hello".to_string());
        assert_eq!(format!("{}", s), "hello");
    }

    #[test]
    fn test_array_display_with_nested_arrays() {
        let inner = Value::Array(Rc::new(RefCell::new(vec![
            Value::Number(2.0),
            Value::Number(3.0),
        ])));
        let outer = Value::Array(Rc::new(RefCell::new(vec![
            Value::Number(1.0),
            inner,
            Value::Nil,
        ])));
        assert_eq!(format!("{}", outer), "[1, [2, 3], nil]");

        let empty = Value::Array(Rc::new(RefCell::new(vec![])));
        assert_eq!(format!("{}", empty), "[]");
    }

    #[test]
    fn test_dictionary_display_is_sorted() {
        let map = Rc::new(RefCell::new(HashMap::new()));
        map.borrow_mut()
            .insert(DictKey::String("b".into()), Value::Number(2.0));
        map.borrow_mut()
            .insert(DictKey::String("a".into()), Value::Number(1.0));
        let dict = Value::Dictionary(map);
        assert_eq!(format!("{}", dict), "{\"a\": 1, \"b\": 2}");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::String(String::new()).is_truthy());
        assert!(Value::Array(Rc::new(RefCell::new(vec![]))).is_truthy());
    }

    #[test]
    fn test_dict_key_numeric_equality() {
        let a = DictKey::from_value(&Value::Number(2.0)).unwrap();
        let b = DictKey::from_value(&Value::Number(2.0)).unwrap();
        assert_eq!(a, b);

        let zero = DictKey::from_value(&Value::Number(0.0)).unwrap();
        let neg_zero = DictKey::from_value(&Value::Number(-0.0)).unwrap();
        assert_eq!(zero, neg_zero);
    }

    #[test]
    fn test_dict_key_kinds_are_distinct() {
        let number = DictKey::from_value(&Value::Number(2.0)).unwrap();
        let string = DictKey::from_value(&Value::String("2".into())).unwrap();
        assert_ne!(number, string);

        let nil = DictKey::from_value(&Value::Nil).unwrap();
        let fals = DictKey::from_value(&Value::Bool(false)).unwrap();
        assert_ne!(nil, fals);
    }

    #[test]
    fn test_reference_values_are_rejected_as_keys() {
        let array = Value::Array(Rc::new(RefCell::new(vec![])));
        assert!(DictKey::from_value(&array).is_none());

        let dict = Value::Dictionary(Rc::new(RefCell::new(HashMap::new())));
        assert!(DictKey::from_value(&dict).is_none());
    }

    #[test]
    fn test_array_aliasing_shares_storage() {
        let a = Value::Array(Rc::new(RefCell::new(vec![Value::Number(1.0)])));
        let b = a.clone();
        if let Value::Array(items) = &a {
            items.borrow_mut().push(Value::Number(2.0));
        }
        if let Value::Array(items) = &b {
            assert_eq!(items.borrow().len(), 2);
        } else {
            panic!("Expected array");
        }
    }
}
