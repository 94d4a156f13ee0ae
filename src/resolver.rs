// ABOUTME: Static resolver binding identifier uses to lexical depths

use crate::ast::{Expr, FunctionBody, Stmt};
use crate::interpreter::Interpreter;
use crate::report::Reporter;
use crate::token::Token;
use std::collections::HashMap;

/// Whether we are resolving top-level code or a function body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionType {
    Main,
    Local,
}

/// Walks the AST once between parsing and evaluation.
///
/// Each scope on the stack maps a name to a `defined` flag; the flag stays
/// false between declaration and definition so `var a = a;` in a local
/// scope can be rejected. Globals are not tracked: a name found in no
/// scope is left out of the depth map and resolved dynamically.
pub struct Resolver<'a> {
    interpreter: &'a mut Interpreter,
    reporter: &'a mut Reporter,
    scopes: Vec<HashMap<String, bool>>,
    current_function: FunctionType,
    loop_depth: usize,
}

impl<'a> Resolver<'a> {
    pub fn new(interpreter: &'a mut Interpreter, reporter: &'a mut Reporter) -> Self {
        Resolver {
            interpreter,
            reporter,
            scopes: Vec::new(),
            current_function: FunctionType::Main,
            loop_depth: 0,
        }
    }

    pub fn resolve(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    fn resolve_stmt(&mut self, statement: &Stmt) {
        match statement {
            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve(statements);
                self.end_scope();
            }
            Stmt::Var { name, initializer } => {
                self.declare(name);
                if let Some(init) = initializer {
                    self.resolve_expr(init);
                }
                self.define(name);
            }
            Stmt::Function { name, declaration } => {
                // The name is usable inside the body, enabling recursion
                self.declare(name);
                self.define(name);
                self.resolve_function(declaration);
            }
            Stmt::Expression(expr) | Stmt::Print(expr) => self.resolve_expr(expr),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::While {
                condition,
                body,
                increment,
            } => {
                self.resolve_expr(condition);
                self.loop_depth += 1;
                self.resolve_stmt(body);
                if let Some(increment) = increment {
                    self.resolve_expr(increment);
                }
                self.loop_depth -= 1;
            }
            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::Main {
                    self.reporter
                        .error_at(keyword, "Can't return from top-level code.");
                }
                if let Some(value) = value {
                    self.resolve_expr(value);
                }
            }
            Stmt::Break(keyword) => {
                if self.loop_depth == 0 {
                    self.reporter
                        .error_at(keyword, "Can't use 'break' outside of a loop.");
                }
            }
            Stmt::Continue(keyword) => {
                if self.loop_depth == 0 {
                    self.reporter
                        .error_at(keyword, "Can't use 'continue' outside of a loop.");
                }
            }
        }
    }

    fn resolve_expr(&mut self, expression: &Expr) {
        match expression {
            Expr::Variable { id, name } => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&name.lexeme) == Some(&false) {
                        self.reporter
                            .error_at(name, "Can't read local variable in its own initializer.");
                    }
                }
                self.resolve_local(*id, name);
            }
            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }
            Expr::Binary { left, right, .. } | Expr::Logic { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expr(callee);
                for argument in arguments {
                    self.resolve_expr(argument);
                }
            }
            Expr::Grouping { expression } => self.resolve_expr(expression),
            Expr::Literal { .. } => {}
            Expr::Unary { right, .. } => self.resolve_expr(right),
            Expr::Array { elements, .. } => {
                for element in elements {
                    self.resolve_expr(element);
                }
            }
            Expr::Subscript { target, index, .. } => {
                self.resolve_expr(target);
                self.resolve_expr(index);
            }
            Expr::SubscriptAssign {
                target,
                index,
                value,
                ..
            } => {
                self.resolve_expr(target);
                self.resolve_expr(index);
                self.resolve_expr(value);
            }
            Expr::Lambda { declaration, .. } => self.resolve_function(declaration),
            Expr::Dictionary { entries, .. } => {
                for entry in entries {
                    self.resolve_expr(entry);
                }
            }
        }
    }

    /// Shared by named functions and lambdas; a lambda just has no name
    /// bound in the enclosing scope.
    fn resolve_function(&mut self, declaration: &FunctionBody) {
        let enclosing_function = self.current_function;
        let enclosing_loop_depth = self.loop_depth;
        self.current_function = FunctionType::Local;
        // break/continue cannot cross a function boundary
        self.loop_depth = 0;

        self.begin_scope();
        for param in &declaration.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve(&declaration.body);
        self.end_scope();

        self.current_function = enclosing_function;
        self.loop_depth = enclosing_loop_depth;
    }

    /// Walk scopes innermost outward; the first hit wins and its distance
    /// from the top of the stack is recorded for this use site.
    fn resolve_local(&mut self, id: usize, name: &Token) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                self.interpreter.resolve(id, depth);
                return;
            }
        }
        // Not found locally: assumed global, resolved at runtime
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(&name.lexeme) {
                self.reporter
                    .error_at(name, "Already a variable with this name in this scope.");
            }
            scope.insert(name.lexeme.clone(), false);
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Scanner;
    use crate::parser::Parser;

    fn resolve_source(source: &str) -> (Interpreter, Reporter) {
        let mut reporter = Reporter::new();
        let tokens = Scanner::new(source).scan_tokens(&mut reporter);
        let statements = Parser::new(tokens, &mut reporter).parse();
        assert!(!reporter.had_error, "parse should succeed");
        let mut interpreter = Interpreter::new();
        Resolver::new(&mut interpreter, &mut reporter).resolve(&statements);
        (interpreter, reporter)
    }

    #[test]
    fn test_globals_are_not_recorded() {
        let (interpreter, reporter) = resolve_source("var a = 1; print a;");
        assert!(!reporter.had_error);
        assert!(interpreter.locals.is_empty());
    }

    #[test]
    fn test_local_use_is_recorded_at_depth_zero() {
        let (interpreter, reporter) = resolve_source("{ var a = 1; print a; }");
        assert!(!reporter.had_error);
        assert_eq!(interpreter.locals.len(), 1);
        assert!(interpreter.locals.values().all(|&depth| depth == 0));
    }

    #[test]
    fn test_enclosing_use_is_recorded_at_depth_one() {
        let (interpreter, reporter) = resolve_source("{ var a = 1; { print a; } }");
        assert!(!reporter.had_error);
        assert_eq!(interpreter.locals.len(), 1);
        assert!(interpreter.locals.values().all(|&depth| depth == 1));
    }

    #[test]
    fn test_innermost_declaration_wins() {
        let (interpreter, reporter) = resolve_source("{ var a = 1; { var a = 2; a = 3; } }");
        assert!(!reporter.had_error);
        // The assignment resolves to the inner `a` at depth 0
        assert!(interpreter.locals.values().all(|&depth| depth == 0));
    }

    #[test]
    fn test_self_reference_in_initializer_is_an_error() {
        let (_, reporter) = resolve_source("var a = 1; { var a = a + 1; }");
        assert!(reporter.had_error);
    }

    #[test]
    fn test_duplicate_declaration_in_scope_is_an_error() {
        let (_, reporter) = resolve_source("{ var a = 1; var a = 2; }");
        assert!(reporter.had_error);
    }

    #[test]
    fn test_duplicate_globals_are_allowed() {
        let (_, reporter) = resolve_source("var a = 1; var a = 2;");
        assert!(!reporter.had_error);
    }

    #[test]
    fn test_return_at_top_level_is_an_error() {
        let (_, reporter) = resolve_source("return 1;");
        assert!(reporter.had_error);
    }

    #[test]
    fn test_return_inside_function_is_fine() {
        let (_, reporter) = resolve_source("fun f() { return 1; }");
        assert!(!reporter.had_error);
    }

    #[test]
    fn test_break_outside_loop_is_an_error() {
        let (_, reporter) = resolve_source("break;");
        assert!(reporter.had_error);
    }

    #[test]
    fn test_continue_inside_loop_is_fine() {
        let (_, reporter) = resolve_source("while (true) { continue; }");
        assert!(!reporter.had_error);
    }

    #[test]
    fn test_break_inside_lambda_inside_loop_is_an_error() {
        let (_, reporter) =
            resolve_source("while (true) { var f = lambda() => { break; }; }");
        assert!(reporter.had_error);
    }

    #[test]
    fn test_function_parameters_resolve_in_body() {
        let (interpreter, reporter) = resolve_source("fun f(x) { return x; }");
        assert!(!reporter.had_error);
        assert_eq!(interpreter.locals.len(), 1);
        assert!(interpreter.locals.values().all(|&depth| depth == 0));
    }

    #[test]
    fn test_closure_capture_depth() {
        let (interpreter, reporter) =
            resolve_source("fun make() { var i = 0; fun inc() { i = i + 1; } }");
        assert!(!reporter.had_error);
        // `i = i + 1` contains one read and one write of `i`, both at
        // depth 1 from inside `inc`
        let depths: Vec<_> = interpreter.locals.values().copied().collect();
        assert_eq!(depths.len(), 2);
        assert!(depths.iter().all(|&d| d == 1));
    }
}
