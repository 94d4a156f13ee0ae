//! Text natives: str
//!
//! - `str`: Stringified form of any value, matching what `print` writes

use crate::env::Environment;
use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::value::{NativeFunction, Value};
use std::rc::Rc;

/// Returns the stringified form of its argument.
pub fn native_str(
    _interpreter: &mut Interpreter,
    args: &[Value],
    _line: usize,
) -> Result<Value, RuntimeError> {
    Ok(Value::String(args[0].to_string()))
}

/// Register all text natives in the environment
pub fn register(env: &Rc<Environment>) {
    env.define(
        "str".to_string(),
        Value::Native(Rc::new(NativeFunction {
            name: "str",
            arity: 1,
            func: native_str,
        })),
    );
}
