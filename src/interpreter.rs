// ABOUTME: Tree-walking evaluator executing statements against the environment chain

use crate::ast::{Expr, Stmt};
use crate::builtins::register_builtins;
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::token::{Literal, Token, TokenKind};
use crate::value::{DictKey, UserFunction, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

/// Signal returned from statement execution.
///
/// Return, Break, and Continue unwind through nested block frames until a
/// call site or loop catches them; every block restores the previous
/// environment on the way out regardless of which signal passes through.
#[derive(Debug)]
pub enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

pub struct Interpreter {
    pub globals: Rc<Environment>,
    environment: Rc<Environment>,
    /// Side-table from identifier-use ids to lexical depth, filled in by
    /// the resolver. Absence means global lookup.
    pub(crate) locals: HashMap<usize, usize>,
    output: Box<dyn Write>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Builds an interpreter writing program output to the given sink.
    pub fn with_output(output: Box<dyn Write>) -> Self {
        let globals = Environment::new();
        register_builtins(&globals);
        let environment = Rc::clone(&globals);
        Interpreter {
            globals,
            environment,
            locals: HashMap::new(),
            output,
        }
    }

    /// Records the lexical depth of one identifier use. Called by the resolver.
    pub fn resolve(&mut self, id: usize, depth: usize) {
        self.locals.insert(id, depth);
    }

    /// Executes a program. The first runtime error unwinds the whole
    /// statement loop and is handed back to the host.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for statement in statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    fn execute(&mut self, statement: &Stmt) -> Result<Flow, RuntimeError> {
        match statement {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                let _ = writeln!(self.output, "{}", value);
                Ok(Flow::Normal)
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(init) => self.evaluate(init)?,
                    None => Value::Nil,
                };
                self.environment.define(name.lexeme.clone(), value);
                Ok(Flow::Normal)
            }
            Stmt::Block(statements) => {
                let environment = Environment::with_parent(Rc::clone(&self.environment));
                self.execute_block(statements, environment)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While {
                condition,
                body,
                increment,
            } => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Flow::Break => return Ok(Flow::Normal),
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        // continue still runs the step clause below
                        Flow::Normal | Flow::Continue => {}
                    }
                    if let Some(increment) = increment {
                        self.evaluate(increment)?;
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Function { name, declaration } => {
                let function = UserFunction {
                    name: Some(name.lexeme.clone()),
                    declaration: Rc::clone(declaration),
                    closure: Rc::clone(&self.environment),
                };
                self.environment
                    .define(name.lexeme.clone(), Value::Function(Rc::new(function)));
                Ok(Flow::Normal)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Break(_) => Ok(Flow::Break),
            Stmt::Continue(_) => Ok(Flow::Continue),
        }
    }

    /// Runs statements inside `environment`, restoring the previous
    /// environment on every exit path, unwinds included.
    fn execute_block(
        &mut self,
        statements: &[Stmt],
        environment: Rc<Environment>,
    ) -> Result<Flow, RuntimeError> {
        let previous = std::mem::replace(&mut self.environment, environment);

        let mut result = Ok(Flow::Normal);
        for statement in statements {
            match self.execute(statement) {
                Ok(Flow::Normal) => continue,
                other => {
                    result = other;
                    break;
                }
            }
        }

        self.environment = previous;
        result
    }

    fn evaluate(&mut self, expression: &Expr) -> Result<Value, RuntimeError> {
        match expression {
            Expr::Literal { value, token } => Ok(literal_value(value, token)),
            Expr::Grouping { expression } => self.evaluate(expression),
            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;
                match operator.kind {
                    TokenKind::Minus => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::type_error(
                            "Operand must be a number.",
                            operator.line,
                        )),
                    },
                    _ => Ok(Value::Bool(!right.is_truthy())),
                }
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                self.binary(left, operator, right)
            }
            Expr::Logic {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;
                if operator.kind == TokenKind::Or {
                    if left.is_truthy() {
                        return Ok(Value::Bool(true));
                    }
                } else if !left.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                let right = self.evaluate(right)?;
                Ok(Value::Bool(right.is_truthy()))
            }
            Expr::Variable { id, name } => self.look_up_variable(*id, name),
            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;
                match self.locals.get(id) {
                    Some(&depth) => {
                        self.environment
                            .assign_at(depth, &name.lexeme, value.clone());
                    }
                    None => {
                        if !self.globals.assign(&name.lexeme, value.clone()) {
                            return Err(RuntimeError::UndefinedVariable {
                                name: name.lexeme.clone(),
                                line: name.line,
                            });
                        }
                    }
                }
                Ok(value)
            }
            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;
                let mut args = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.evaluate(argument)?);
                }
                self.call_value(callee, args, paren.line)
            }
            Expr::Array { elements, .. } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate(element)?);
                }
                Ok(Value::Array(Rc::new(RefCell::new(values))))
            }
            Expr::Dictionary { brace, entries } => {
                let mut map = HashMap::new();
                for pair in entries.chunks(2) {
                    let key = self.evaluate(&pair[0])?;
                    let key = DictKey::from_value(&key)
                        .ok_or(RuntimeError::InvalidKey { line: brace.line })?;
                    let value = self.evaluate(&pair[1])?;
                    // Later duplicates overwrite earlier ones
                    map.insert(key, value);
                }
                Ok(Value::Dictionary(Rc::new(RefCell::new(map))))
            }
            Expr::Subscript {
                target,
                bracket,
                index,
            } => {
                let target = self.evaluate(target)?;
                let index = self.evaluate(index)?;
                match target {
                    Value::Array(items) => {
                        let items = items.borrow();
                        let position = array_index(&index, items.len(), bracket.line)?;
                        Ok(items[position].clone())
                    }
                    Value::Dictionary(map) => {
                        let key = DictKey::from_value(&index)
                            .ok_or(RuntimeError::InvalidKey { line: bracket.line })?;
                        map.borrow()
                            .get(&key)
                            .cloned()
                            .ok_or(RuntimeError::MissingKey { line: bracket.line })
                    }
                    _ => Err(RuntimeError::type_error(
                        "Only arrays and dictionaries can be indexed.",
                        bracket.line,
                    )),
                }
            }
            Expr::SubscriptAssign {
                target,
                bracket,
                index,
                value,
            } => {
                let target = self.evaluate(target)?;
                let index = self.evaluate(index)?;
                let value = self.evaluate(value)?;
                match target {
                    Value::Array(items) => {
                        let mut items = items.borrow_mut();
                        let len = items.len();
                        // No auto-extend: out-of-bounds writes are errors
                        let position = array_index(&index, len, bracket.line)?;
                        items[position] = value.clone();
                        Ok(value)
                    }
                    Value::Dictionary(map) => {
                        let key = DictKey::from_value(&index)
                            .ok_or(RuntimeError::InvalidKey { line: bracket.line })?;
                        map.borrow_mut().insert(key, value.clone());
                        Ok(value)
                    }
                    _ => Err(RuntimeError::type_error(
                        "Only arrays and dictionaries can be indexed.",
                        bracket.line,
                    )),
                }
            }
            Expr::Lambda { declaration, .. } => {
                let function = UserFunction {
                    name: None,
                    declaration: Rc::clone(declaration),
                    closure: Rc::clone(&self.environment),
                };
                Ok(Value::Function(Rc::new(function)))
            }
        }
    }

    fn binary(
        &mut self,
        left: Value,
        operator: &Token,
        right: Value,
    ) -> Result<Value, RuntimeError> {
        match operator.kind {
            TokenKind::Plus => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                (Value::Array(a), Value::Array(b)) => {
                    // Fresh array; element handles are shared
                    let mut items = a.borrow().clone();
                    items.extend(b.borrow().iter().cloned());
                    Ok(Value::Array(Rc::new(RefCell::new(items))))
                }
                _ => Err(RuntimeError::type_error(
                    "Operands must be two numbers, two strings, or two arrays.",
                    operator.line,
                )),
            },
            TokenKind::Minus => numeric(left, operator, right).map(|(a, b)| Value::Number(a - b)),
            TokenKind::Star => numeric(left, operator, right).map(|(a, b)| Value::Number(a * b)),
            TokenKind::Slash => numeric(left, operator, right).map(|(a, b)| Value::Number(a / b)),
            TokenKind::Greater => numeric(left, operator, right).map(|(a, b)| Value::Bool(a > b)),
            TokenKind::GreaterEqual => {
                numeric(left, operator, right).map(|(a, b)| Value::Bool(a >= b))
            }
            TokenKind::Less => numeric(left, operator, right).map(|(a, b)| Value::Bool(a < b)),
            TokenKind::LessEqual => numeric(left, operator, right).map(|(a, b)| Value::Bool(a <= b)),
            TokenKind::EqualEqual => numeric(left, operator, right).map(|(a, b)| Value::Bool(a == b)),
            TokenKind::BangEqual => numeric(left, operator, right).map(|(a, b)| Value::Bool(a != b)),
            _ => Err(RuntimeError::type_error(
                "Unknown binary operator.",
                operator.line,
            )),
        }
    }

    fn look_up_variable(&self, id: usize, name: &Token) -> Result<Value, RuntimeError> {
        let value = match self.locals.get(&id) {
            Some(&depth) => self.environment.get_at(depth, &name.lexeme),
            None => self.globals.get(&name.lexeme),
        };
        value.ok_or_else(|| RuntimeError::UndefinedVariable {
            name: name.lexeme.clone(),
            line: name.line,
        })
    }

    /// Dispatches a call on an already-evaluated callee. Also the entry
    /// point for natives like `map` that invoke user callables.
    pub fn call_value(
        &mut self,
        callee: Value,
        arguments: Vec<Value>,
        line: usize,
    ) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(function) => {
                let expected = function.declaration.params.len();
                if arguments.len() != expected {
                    return Err(RuntimeError::Arity {
                        expected,
                        actual: arguments.len(),
                        line,
                    });
                }
                self.call_user_function(&function, arguments)
            }
            Value::Native(native) => {
                if arguments.len() != native.arity {
                    return Err(RuntimeError::Arity {
                        expected: native.arity,
                        actual: arguments.len(),
                        line,
                    });
                }
                (native.func)(self, &arguments, line)
            }
            _ => Err(RuntimeError::NotCallable { line }),
        }
    }

    fn call_user_function(
        &mut self,
        function: &UserFunction,
        arguments: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        // The call frame is a child of the closure, not of the caller
        let environment = Environment::with_parent(Rc::clone(&function.closure));
        for (param, argument) in function.declaration.params.iter().zip(arguments) {
            environment.define(param.lexeme.clone(), argument);
        }

        let flow = self.execute_block(&function.declaration.body, environment)?;
        Ok(match flow {
            Flow::Return(value) => value,
            // Falling off the end returns nil; break/continue cannot cross
            // a function boundary (resolver-enforced)
            _ => Value::Nil,
        })
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn literal_value(literal: &Option<Literal>, token: &Token) -> Value {
    match token.kind {
        TokenKind::True => Value::Bool(true),
        TokenKind::False => Value::Bool(false),
        TokenKind::Nil => Value::Nil,
        _ => match literal {
            Some(Literal::Number(n)) => Value::Number(*n),
            Some(Literal::Str(s)) => Value::String(s.clone()),
            None => Value::Nil,
        },
    }
}

fn numeric(left: Value, operator: &Token, right: Value) -> Result<(f64, f64), RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((a, b)),
        _ => Err(RuntimeError::type_error(
            "Operands must be numbers.",
            operator.line,
        )),
    }
}

/// Array index rule: a Number whose floor equals itself, within `[0, len)`.
fn array_index(index: &Value, len: usize, line: usize) -> Result<usize, RuntimeError> {
    let n = match index {
        Value::Number(n) => *n,
        _ => return Err(RuntimeError::BadIndex { line }),
    };
    if n.floor() != n || !n.is_finite() {
        return Err(RuntimeError::BadIndex { line });
    }
    if n < 0.0 || n >= len as f64 {
        return Err(RuntimeError::IndexOutOfBounds { line });
    }
    Ok(n as usize)
}
