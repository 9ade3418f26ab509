//! Module `resolver` performs the static pass between parsing and evaluation.
//!
//! It walks the tree once, tracking a stack of lexical scopes, and reports the
//! distance of every local variable access back to the interpreter.  Along the
//! way it rejects programs that parse but cannot mean anything sensible:
//! reading a local in its own initializer, duplicate declarations in one scope,
//! `return` outside a function, `this`/`super` misuse, and locals that are
//! never read.
//!
//! All errors are collected rather than short‑circuiting, so one pass reports
//! every resolution problem in the program.

use crate::ast::{Expr, ExprId, FunDecl, Method, Stmt};
use crate::error::QuillError;
use crate::interpreter::Interpreter;
use crate::token::Token;
use log::debug;
use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq)]
enum FunctionType {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(Clone, Copy, PartialEq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

struct VariableInfo<'a> {
    token: &'a Token<'a>,
    defined: bool,
    used: bool,
}

pub struct Resolver<'a, 'i> {
    interpreter: &'i mut Interpreter<'a>,
    scopes: Vec<HashMap<&'a str, VariableInfo<'a>>>,
    current_function: FunctionType,
    current_class: ClassType,
    in_static: bool,
    errors: Vec<QuillError>,
}

impl<'a, 'i> Resolver<'a, 'i> {
    pub fn new(interpreter: &'i mut Interpreter<'a>) -> Self {
        Self {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            in_static: false,
            errors: Vec::new(),
        }
    }

    /// Resolve a whole program, returning every error found.
    pub fn resolve(
        mut self,
        statements: &[Stmt<'a>],
    ) -> std::result::Result<(), Vec<QuillError>> {
        self.resolve_statements(statements);

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    fn error(&mut self, token: &Token<'a>, msg: impl Into<String>) {
        self.errors.push(QuillError::resolve(token.line, msg));
    }

    // ───────────────────────────── scope stack ──────────────────────────────

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pop a scope, flagging every binding that was never read.
    fn end_scope(&mut self) {
        if let Some(scope) = self.scopes.pop() {
            let unused: Vec<&'a Token<'a>> = scope
                .values()
                .filter(|info| !info.used)
                .map(|info| info.token)
                .collect();

            for token in unused {
                self.error(
                    token,
                    format!("Local variable '{}' is unused.", token.lexeme),
                );
            }
        }
    }

    /// Reserve `name` in the innermost scope, not yet readable.
    fn declare(&mut self, name: &'a Token<'a>) {
        let already = match self.scopes.last() {
            Some(scope) => scope.contains_key(name.lexeme),
            None => return, // globals are not tracked
        };

        if already {
            self.error(
                name,
                format!("Already a variable with name '{}' in this scope.", name.lexeme),
            );
        }

        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(
                name.lexeme,
                VariableInfo {
                    token: name,
                    defined: false,
                    used: false,
                },
            );
        }
    }

    /// Mark `name` initialized and readable.
    fn define(&mut self, name: &'a Token<'a>) {
        if let Some(scope) = self.scopes.last_mut() {
            if let Some(info) = scope.get_mut(name.lexeme) {
                info.defined = true;
            }
        }
    }

    /// Insert an implicit binding (`this`, `super`) that is exempt from the
    /// unused check.
    fn define_implicit(&mut self, name: &'static str, token: &'a Token<'a>) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(
                name,
                VariableInfo {
                    token,
                    defined: true,
                    used: true,
                },
            );
        }
    }

    /// Walk scopes innermost‑out; on a hit, record the distance with the
    /// interpreter.  Only reads mark a binding used.
    fn resolve_local(&mut self, id: ExprId, name: &'a Token<'a>, is_read: bool) {
        for (hops, scope) in self.scopes.iter_mut().rev().enumerate() {
            if let Some(info) = scope.get_mut(name.lexeme) {
                if is_read {
                    info.used = true;
                }

                debug!("resolved '{}' at distance {}", name.lexeme, hops);
                self.interpreter.resolve(id, hops);

                return;
            }
        }
        // Not found in any scope: assumed global, looked up at runtime.
    }

    // ───────────────────────────── statements ───────────────────────────────

    fn resolve_statements(&mut self, statements: &[Stmt<'a>]) {
        for stmt in statements {
            self.resolve_statement(stmt);
        }
    }

    fn resolve_statement(&mut self, stmt: &Stmt<'a>) {
        match stmt {
            Stmt::Expression(expr) | Stmt::Print(expr) => self.resolve_expression(expr),

            Stmt::Var { name, initializer } => {
                self.declare(name);

                if let Some(init) = initializer {
                    self.resolve_expression(init);
                }

                self.define(name);
            }

            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve_statements(statements);
                self.end_scope();
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expression(condition);
                self.resolve_statement(then_branch);

                if let Some(else_branch) = else_branch {
                    self.resolve_statement(else_branch);
                }
            }

            Stmt::While {
                condition,
                body,
                aftereach,
            } => {
                self.resolve_expression(condition);
                self.resolve_statement(body);

                if let Some(after) = aftereach {
                    self.resolve_statement(after);
                }
            }

            // The loop variable is declared in the enclosing scope, so reads
            // inside the body resolve through it like any other local.
            Stmt::Forall {
                name,
                sequence,
                body,
                aftereach,
            } => {
                self.resolve_expression(sequence);
                self.declare(name);
                self.define(name);
                self.resolve_statement(body);

                if let Some(after) = aftereach {
                    self.resolve_statement(after);
                }
            }

            Stmt::Break(_) | Stmt::Continue(_) => {}

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.error(keyword, "Can't return outside of a function.");
                }

                if let Some(value) = value {
                    if self.current_function == FunctionType::Initializer {
                        self.error(keyword, "Can't return a value in 'init' constructor.");
                    }

                    self.resolve_expression(value);
                }
            }

            Stmt::Function { name, declaration } => {
                self.declare(name);
                self.define(name);
                self.resolve_function(declaration, FunctionType::Function);
            }

            Stmt::Class {
                name,
                superclass,
                methods,
                statics,
            } => self.resolve_class(name, superclass.as_ref(), methods, statics),
        }
    }

    fn resolve_class(
        &mut self,
        name: &'a Token<'a>,
        superclass: Option<&Expr<'a>>,
        methods: &[Method<'a>],
        statics: &[Method<'a>],
    ) {
        let enclosing_class = self.current_class;
        let enclosing_static = self.in_static;
        self.current_class = ClassType::Class;
        self.in_static = false;

        self.declare(name);
        self.define(name);

        if let Some(expr) = superclass {
            if let Expr::Variable {
                name: super_name, ..
            } = expr
            {
                if super_name.lexeme == name.lexeme {
                    self.error(super_name, "A class cannot inherit from itself.");
                }
            }

            self.current_class = ClassType::Subclass;
            self.resolve_expression(expr);

            self.begin_scope();
            self.define_implicit("super", name);
        }

        self.begin_scope();
        self.define_implicit("this", name);

        for method in methods {
            let function_type = if method.name.lexeme == "init" {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };

            self.resolve_function(&method.declaration, function_type);
        }

        self.end_scope();

        if superclass.is_some() {
            self.end_scope();
        }

        // Statics resolve outside the `super` frame, with a `this` of their
        // own bound to the class object at runtime.
        self.begin_scope();
        self.in_static = true;
        self.define_implicit("this", name);

        for method in statics {
            if method.name.lexeme == "init" {
                self.error(
                    method.name,
                    format!(
                        "Can't declare 'init' in static context in class '{}'.",
                        name.lexeme
                    ),
                );
            }

            self.resolve_function(&method.declaration, FunctionType::Method);
        }

        self.end_scope();

        self.current_class = enclosing_class;
        self.in_static = enclosing_static;
    }

    fn resolve_function(&mut self, declaration: &FunDecl<'a>, function_type: FunctionType) {
        let enclosing_function = self.current_function;
        self.current_function = function_type;

        self.begin_scope();

        for &param in &declaration.params {
            self.declare(param);
            self.define(param);
        }

        self.resolve_statements(&declaration.body);
        self.end_scope();

        self.current_function = enclosing_function;
    }

    // ───────────────────────────── expressions ──────────────────────────────

    fn resolve_expression(&mut self, expr: &Expr<'a>) {
        match expr {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => self.resolve_expression(inner),

            Expr::Unary { right, .. } => self.resolve_expression(right),

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expression(left);
                self.resolve_expression(right);
            }

            Expr::Conditional {
                condition,
                if_true,
                if_false,
            } => {
                self.resolve_expression(condition);
                self.resolve_expression(if_true);
                self.resolve_expression(if_false);
            }

            Expr::Variable { id, name } => {
                let in_own_initializer = self
                    .scopes
                    .last()
                    .and_then(|scope| scope.get(name.lexeme))
                    .is_some_and(|info| !info.defined);

                if in_own_initializer {
                    self.error(name, "Can't read local variable in its own initializer");
                }

                self.resolve_local(*id, name, true);
            }

            Expr::Assign { id, name, value } => {
                self.resolve_expression(value);
                self.resolve_local(*id, name, false);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expression(callee);

                for argument in arguments {
                    self.resolve_expression(argument);
                }
            }

            // Properties are looked up dynamically, only the object resolves.
            Expr::Get { object, .. } => self.resolve_expression(object),

            Expr::Set { object, value, .. } => {
                self.resolve_expression(value);
                self.resolve_expression(object);
            }

            Expr::Index { object, index, .. } => {
                self.resolve_expression(object);
                self.resolve_expression(index);
            }

            Expr::SetIndex {
                object,
                index,
                value,
                ..
            } => {
                self.resolve_expression(object);
                self.resolve_expression(index);
                self.resolve_expression(value);
            }

            Expr::List { items, .. } => {
                for item in items {
                    self.resolve_expression(item);
                }
            }

            Expr::Fun(declaration) => {
                self.resolve_function(declaration, FunctionType::Function);
            }

            Expr::This { id, keyword } => {
                if self.current_class == ClassType::None {
                    self.error(keyword, "Cannot use 'this' outside of a class.");
                }

                self.resolve_local(*id, keyword, false);
            }

            Expr::Super { id, keyword, .. } => {
                if self.in_static {
                    self.error(keyword, "Cannot use 'super' inside a static method.");
                }

                if self.current_class == ClassType::None {
                    self.error(keyword, "Cannot use 'super' outside of a class.");
                } else if self.current_class != ClassType::Subclass {
                    self.error(keyword, "Cannot use 'super' in a class with no superclass.");
                }

                self.resolve_local(*id, keyword, false);
            }

            Expr::Post { value, effect } => {
                self.resolve_expression(value);
                self.resolve_expression(effect);
            }
        }
    }
}
