// ABOUTME: Expression and statement sum types produced by the parser

use crate::token::{Literal, Token};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_NODE_ID: AtomicUsize = AtomicUsize::new(0);

/// Process-unique id for resolvable nodes.
///
/// The interpreter's depth map outlives a single parse (the REPL resolves
/// every line into the same map), so ids from later parses must never
/// collide with entries already recorded.
pub fn next_node_id() -> usize {
    NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Shared parameter list and body of a named function or lambda.
///
/// The declaration is immutable once parsed and is shared (via `Rc`) with
/// every closure constructed from it.
#[derive(Debug)]
pub struct FunctionBody {
    pub params: Vec<Token>,
    pub body: Vec<Stmt>,
}

#[derive(Debug)]
pub enum Expr {
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        paren: Token,
        arguments: Vec<Expr>,
    },
    Grouping {
        expression: Box<Expr>,
    },
    Literal {
        value: Option<Literal>,
        /// Distinguishes `true` / `false` / `nil` / number / string.
        token: Token,
    },
    Unary {
        operator: Token,
        right: Box<Expr>,
    },
    Variable {
        /// Keys this use site into the resolver's depth map.
        id: usize,
        name: Token,
    },
    Assign {
        id: usize,
        name: Token,
        value: Box<Expr>,
    },
    Logic {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Array {
        bracket: Token,
        elements: Vec<Expr>,
    },
    Subscript {
        target: Box<Expr>,
        bracket: Token,
        index: Box<Expr>,
    },
    SubscriptAssign {
        target: Box<Expr>,
        bracket: Token,
        index: Box<Expr>,
        value: Box<Expr>,
    },
    Lambda {
        keyword: Token,
        declaration: Rc<FunctionBody>,
    },
    Dictionary {
        brace: Token,
        /// Alternating key/value expressions; always even length.
        entries: Vec<Expr>,
    },
}

#[derive(Debug)]
pub enum Stmt {
    Expression(Expr),
    Function {
        name: Token,
        declaration: Rc<FunctionBody>,
    },
    Print(Expr),
    Var {
        name: Token,
        initializer: Option<Expr>,
    },
    Block(Vec<Stmt>),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
        /// Step clause of a desugared `for`; evaluated after the body on
        /// both the normal and the `continue` path.
        increment: Option<Expr>,
    },
    Return {
        keyword: Token,
        value: Option<Expr>,
    },
    Break(Token),
    Continue(Token),
}
