//! Time natives: clock
//!
//! - `clock`: Seconds since the Unix epoch as a number

use crate::env::Environment;
use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::value::{NativeFunction, Value};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Returns seconds since the epoch. The only source of nondeterminism in
/// the core.
pub fn native_clock(
    _interpreter: &mut Interpreter,
    _args: &[Value],
    _line: usize,
) -> Result<Value, RuntimeError> {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0);
    Ok(Value::Number(seconds))
}

/// Register all time natives in the environment
pub fn register(env: &Rc<Environment>) {
    env.define(
        "clock".to_string(),
        Value::Native(Rc::new(NativeFunction {
            name: "clock",
            arity: 0,
            func: native_clock,
        })),
    );
}
