//! Array natives: len, map, filter, reduce
//!
//! Queries and higher-order helpers over arrays.
//!
//! - `len`: Number of elements in an array
//! - `map`: New array applying a one-argument callable to each element
//! - `filter`: New array of elements the callable finds truthy
//! - `reduce`: Left fold with a two-argument callable, seeded by the
//!   first element

use crate::env::Environment;
use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::value::{NativeFunction, Value};
use std::cell::RefCell;
use std::rc::Rc;

fn expect_array(
    function: &str,
    value: &Value,
    line: usize,
) -> Result<Rc<RefCell<Vec<Value>>>, RuntimeError> {
    match value {
        Value::Array(items) => Ok(Rc::clone(items)),
        other => Err(RuntimeError::native_type_error(
            function, "an array", other, line,
        )),
    }
}

/// Returns the number of elements in an array
pub fn native_len(
    _interpreter: &mut Interpreter,
    args: &[Value],
    line: usize,
) -> Result<Value, RuntimeError> {
    let items = expect_array("len", &args[0], line)?;
    let length = items.borrow().len();
    Ok(Value::Number(length as f64))
}

/// Applies a callable to each element, collecting into a new array
pub fn native_map(
    interpreter: &mut Interpreter,
    args: &[Value],
    line: usize,
) -> Result<Value, RuntimeError> {
    let items = expect_array("map", &args[1], line)?;
    let elements: Vec<Value> = items.borrow().clone();

    let mut result = Vec::with_capacity(elements.len());
    for element in elements {
        result.push(interpreter.call_value(args[0].clone(), vec![element], line)?);
    }
    Ok(Value::Array(Rc::new(RefCell::new(result))))
}

/// Keeps the elements the callable finds truthy
pub fn native_filter(
    interpreter: &mut Interpreter,
    args: &[Value],
    line: usize,
) -> Result<Value, RuntimeError> {
    let items = expect_array("filter", &args[1], line)?;
    let elements: Vec<Value> = items.borrow().clone();

    let mut result = Vec::new();
    for element in elements {
        let keep = interpreter.call_value(args[0].clone(), vec![element.clone()], line)?;
        if keep.is_truthy() {
            result.push(element);
        }
    }
    Ok(Value::Array(Rc::new(RefCell::new(result))))
}

/// Folds left with a two-argument callable.
/// Empty array yields nil; a singleton yields its only element.
pub fn native_reduce(
    interpreter: &mut Interpreter,
    args: &[Value],
    line: usize,
) -> Result<Value, RuntimeError> {
    let items = expect_array("reduce", &args[1], line)?;
    let elements: Vec<Value> = items.borrow().clone();

    let mut iter = elements.into_iter();
    let Some(mut accumulator) = iter.next() else {
        return Ok(Value::Nil);
    };
    for element in iter {
        accumulator = interpreter.call_value(args[0].clone(), vec![accumulator, element], line)?;
    }
    Ok(accumulator)
}

/// Register all array natives in the environment
pub fn register(env: &Rc<Environment>) {
    env.define(
        "len".to_string(),
        Value::Native(Rc::new(NativeFunction {
            name: "len",
            arity: 1,
            func: native_len,
        })),
    );
    env.define(
        "map".to_string(),
        Value::Native(Rc::new(NativeFunction {
            name: "map",
            arity: 2,
            func: native_map,
        })),
    );
    env.define(
        "filter".to_string(),
        Value::Native(Rc::new(NativeFunction {
            name: "filter",
            arity: 2,
            func: native_filter,
        })),
    );
    env.define(
        "reduce".to_string(),
        Value::Native(Rc::new(NativeFunction {
            name: "reduce",
            arity: 2,
            func: native_reduce,
        })),
    );
}
