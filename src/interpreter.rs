//! Module `interpreter` implements the tree‑walking evaluator.
//!
//! Control flow is modelled in the return type instead of with exceptions:
//! every statement evaluates to a [`Signal`] saying how execution should
//! proceed (`Normal`, `Break`, `Continue`, or `Return`), and hard stops travel
//! as [`Unwind`] in the error position.  `break`/`continue` are consumed by the
//! innermost loop, `return` by the innermost function call, and a runtime error
//! or `exit()` unwinds all the way out of [`Interpreter::interpret`].
//!
//! Variable accesses annotated by the resolver are looked up via
//! `Environment::get_at`/`assign_at` at their recorded distance; everything
//! else goes straight to the globals.

use crate::ast::{Expr, ExprId, LiteralValue, Method, Stmt};
use crate::environment::Environment;
use crate::error::QuillError;
use crate::native::{self, NativeError};
use crate::token::{Token, TokenType};
use crate::value::{Class, Function, Instance, Value};
use log::{debug, info};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// How execution should continue after a statement.
#[derive(Debug)]
pub enum Signal<'a> {
    Normal,
    Break,
    Continue,
    Return(Value<'a>),
}

/// A hard stop travelling up through evaluation.
#[derive(Debug)]
pub enum Unwind {
    Error(QuillError),
    /// Clean shutdown requested by the `exit` native.
    Exit,
}

impl From<QuillError> for Unwind {
    fn from(err: QuillError) -> Self {
        Unwind::Error(err)
    }
}

type Eval<T> = std::result::Result<T, Unwind>;

fn runtime_err(line: usize, msg: impl Into<String>) -> Unwind {
    Unwind::Error(QuillError::runtime(line, msg))
}

pub struct Interpreter<'a> {
    globals: Rc<RefCell<Environment<'a>>>,
    environment: Rc<RefCell<Environment<'a>>>,
    /// Resolver output: lexical distance per annotated expression node.
    locals: HashMap<ExprId, usize>,
}

impl<'a> Default for Interpreter<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Interpreter<'a> {
    pub fn new() -> Self {
        let mut globals = Environment::new();
        native::install(&mut globals);

        let globals = Rc::new(RefCell::new(globals));

        info!("Interpreter created");

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
        }
    }

    /// Record a resolved lexical distance.  Called by the resolver.
    pub fn resolve(&mut self, id: ExprId, depth: usize) {
        debug!("resolve expr {} at depth {}", id, depth);

        self.locals.insert(id, depth);
    }

    /// Read a global binding.  Used by the embedding layer and tests.
    pub fn global(&self, name: &str) -> Option<Value<'a>> {
        self.globals.borrow().get_value(name)
    }

    /// Run a program.  `Ok(true)` means it ran to completion, `Ok(false)`
    /// means `exit()` was called, `Err` is a runtime error.
    pub fn interpret(&mut self, statements: &[Stmt<'a>]) -> crate::error::Result<bool> {
        for stmt in statements {
            match self.execute(stmt) {
                Ok(_) => {}
                Err(Unwind::Exit) => return Ok(false),
                Err(Unwind::Error(err)) => return Err(err),
            }
        }

        Ok(true)
    }

    // ───────────────────────────── statements ───────────────────────────────

    fn execute(&mut self, stmt: &Stmt<'a>) -> Eval<Signal<'a>> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;

                Ok(Signal::Normal)
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                println!("{}", value);

                Ok(Signal::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                self.environment.borrow_mut().define(name.lexeme, value);

                Ok(Signal::Normal)
            }

            Stmt::Block(statements) => {
                let previous = Rc::clone(&self.environment);
                self.environment = Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(
                    &previous,
                ))));

                // Restore on every exit path, error included.
                let result = self.execute_all(statements);
                self.environment = previous;

                result
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
                    Ok(Signal::Normal)
                }
            }

            Stmt::While {
                condition,
                body,
                aftereach,
            } => self.execute_while(condition, body, aftereach.as_deref()),

            Stmt::Forall {
                name,
                sequence,
                body,
                aftereach,
            } => self.execute_forall(name, sequence, body, aftereach.as_deref()),

            Stmt::Break(_) => Ok(Signal::Break),

            Stmt::Continue(_) => Ok(Signal::Continue),

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                Ok(Signal::Return(value))
            }

            Stmt::Function { name, declaration } => {
                let function = Function {
                    name: Some(name.lexeme.to_owned()),
                    declaration: Rc::clone(declaration),
                    closure: Rc::clone(&self.environment),
                    is_initializer: false,
                };

                self.environment
                    .borrow_mut()
                    .define(name.lexeme, Value::Function(Rc::new(function)));

                Ok(Signal::Normal)
            }

            Stmt::Class {
                name,
                superclass,
                methods,
                statics,
            } => self.execute_class(name, superclass.as_ref(), methods, statics),
        }
    }

    /// Run statements in the current environment, stopping at the first
    /// non‑`Normal` signal.
    fn execute_all(&mut self, statements: &[Stmt<'a>]) -> Eval<Signal<'a>> {
        for stmt in statements {
            match self.execute(stmt)? {
                Signal::Normal => {}
                other => return Ok(other),
            }
        }

        Ok(Signal::Normal)
    }

    fn execute_while(
        &mut self,
        condition: &Expr<'a>,
        body: &Stmt<'a>,
        aftereach: Option<&Stmt<'a>>,
    ) -> Eval<Signal<'a>> {
        while self.evaluate(condition)?.is_truthy() {
            match self.execute(body)? {
                // `break` skips the aftereach clause.
                Signal::Break => return Ok(Signal::Normal),
                Signal::Return(value) => return Ok(Signal::Return(value)),
                Signal::Normal | Signal::Continue => {}
            }

            if let Some(after) = aftereach {
                match self.execute(after)? {
                    Signal::Break => return Ok(Signal::Normal),
                    Signal::Return(value) => return Ok(Signal::Return(value)),
                    Signal::Normal | Signal::Continue => {}
                }
            }
        }

        Ok(Signal::Normal)
    }

    /// Rebinds the loop variable in the current environment before each pass,
    /// so the body sees it like any other local of the enclosing scope.
    fn execute_forall(
        &mut self,
        name: &'a Token<'a>,
        sequence: &Expr<'a>,
        body: &Stmt<'a>,
        aftereach: Option<&Stmt<'a>>,
    ) -> Eval<Signal<'a>> {
        let sequence = self.evaluate(sequence)?;

        let length = match sequence.sequence_length() {
            Some(length) => length,
            None => {
                return Err(runtime_err(name.line, "Can't iterate over a non-sequence."));
            }
        };

        for index in 0..length {
            let element = match sequence.sequence_get(index) {
                Some(element) => element,
                None => break,
            };

            self.environment.borrow_mut().define(name.lexeme, element);

            match self.execute(body)? {
                // `break` skips the aftereach clause.
                Signal::Break => return Ok(Signal::Normal),
                Signal::Return(value) => return Ok(Signal::Return(value)),
                Signal::Normal | Signal::Continue => {}
            }

            if let Some(after) = aftereach {
                match self.execute(after)? {
                    Signal::Break => return Ok(Signal::Normal),
                    Signal::Return(value) => return Ok(Signal::Return(value)),
                    Signal::Normal | Signal::Continue => {}
                }
            }
        }

        Ok(Signal::Normal)
    }

    fn execute_class(
        &mut self,
        name: &'a Token<'a>,
        superclass: Option<&Expr<'a>>,
        methods: &[Method<'a>],
        statics: &[Method<'a>],
    ) -> Eval<Signal<'a>> {
        let superclass_value: Option<Rc<Class<'a>>> = match superclass {
            Some(expr) => {
                let line = match expr {
                    Expr::Variable { name, .. } => name.line,
                    _ => name.line,
                };

                match self.evaluate(expr)? {
                    Value::Class(class) => Some(class),
                    _ => return Err(runtime_err(line, "Superclass must be a class.")),
                }
            }
            None => None,
        };

        self.environment.borrow_mut().define(name.lexeme, Value::Nil);

        // Static methods close over the scope the class is declared in, so
        // `super` (pushed below) is only visible to instance methods.
        let statics_closure = Rc::clone(&self.environment);

        let mut static_methods: HashMap<String, Rc<Function<'a>>> = HashMap::new();

        for method in statics {
            let function = Function {
                name: Some(method.name.lexeme.to_owned()),
                declaration: Rc::clone(&method.declaration),
                closure: Rc::clone(&statics_closure),
                is_initializer: false,
            };

            static_methods.insert(method.name.lexeme.to_owned(), Rc::new(function));
        }

        // The metaclass shares the class's superclass, so an unmatched static
        // call falls back through the superclass's method table.
        let metaclass = Rc::new(Class {
            name: format!("{} metaclass", name.lexeme),
            superclass: superclass_value.as_ref().map(Rc::clone),
            methods: static_methods,
            metaclass: None,
            fields: RefCell::new(HashMap::new()),
        });

        let previous = if superclass_value.is_some() {
            let previous = Rc::clone(&self.environment);
            let mut env = Environment::with_enclosing(Rc::clone(&previous));

            if let Some(sc) = &superclass_value {
                env.define("super", Value::Class(Rc::clone(sc)));
            }

            self.environment = Rc::new(RefCell::new(env));

            Some(previous)
        } else {
            None
        };

        let mut instance_methods: HashMap<String, Rc<Function<'a>>> = HashMap::new();

        for method in methods {
            let function = Function {
                name: Some(method.name.lexeme.to_owned()),
                declaration: Rc::clone(&method.declaration),
                closure: Rc::clone(&self.environment),
                is_initializer: method.name.lexeme == "init",
            };

            instance_methods.insert(method.name.lexeme.to_owned(), Rc::new(function));
        }

        let class = Rc::new(Class {
            name: name.lexeme.to_owned(),
            superclass: superclass_value,
            methods: instance_methods,
            metaclass: Some(metaclass),
            fields: RefCell::new(HashMap::new()),
        });

        if let Some(previous) = previous {
            self.environment = previous;
        }

        self.environment
            .borrow_mut()
            .assign(name.lexeme, Value::Class(class), name.line)?;

        debug!("class {} defined", name.lexeme);

        Ok(Signal::Normal)
    }

    // ───────────────────────────── expressions ──────────────────────────────

    fn evaluate(&mut self, expr: &Expr<'a>) -> Eval<Value<'a>> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => {
                let right = self.evaluate(right)?;

                match operator.token_type {
                    TokenType::MINUS => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(runtime_err(operator.line, "Operand must be a number.")),
                    },
                    _ => Ok(Value::Bool(!right.is_truthy())),
                }
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;

                // `and`/`or` yield an operand value, not a boolean.
                let short_circuits = match operator.token_type {
                    TokenType::OR => left.is_truthy(),
                    _ => !left.is_truthy(),
                };

                if short_circuits {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Conditional {
                condition,
                if_true,
                if_false,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(if_true)
                } else {
                    self.evaluate(if_false)
                }
            }

            Expr::Variable { id, name } => self.lookup_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(id) {
                    Some(&distance) => Environment::assign_at(
                        &self.environment,
                        distance,
                        name.lexeme,
                        value.clone(),
                        name.line,
                    )?,
                    None => self.globals.borrow_mut().assign(
                        name.lexeme,
                        value.clone(),
                        name.line,
                    )?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut args: Vec<Value<'a>> = Vec::with_capacity(arguments.len());

                for argument in arguments {
                    args.push(self.evaluate(argument)?);
                }

                self.call_value(callee, args, paren)
            }

            Expr::Get { object, name } => {
                let object = self.evaluate(object)?;

                self.get_property(object, name)
            }

            Expr::Set {
                object,
                name,
                value,
            } => {
                let object = self.evaluate(object)?;
                let value = self.evaluate(value)?;

                match object {
                    Value::Instance(instance) => {
                        instance
                            .borrow_mut()
                            .fields
                            .insert(name.lexeme.to_owned(), value.clone());

                        Ok(value)
                    }
                    Value::Class(class) => {
                        class
                            .fields
                            .borrow_mut()
                            .insert(name.lexeme.to_owned(), value.clone());

                        Ok(value)
                    }
                    _ => Err(runtime_err(
                        name.line,
                        "Tried to access property from something not an instance of a class.",
                    )),
                }
            }

            Expr::Index {
                object,
                bracket,
                index,
            } => {
                let object = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                let i = check_index(&object, &index, bracket)?;

                Ok(object.sequence_get(i).unwrap_or(Value::Nil))
            }

            Expr::SetIndex {
                object,
                bracket,
                index,
                value,
            } => {
                let object = self.evaluate(object)?;
                let index = self.evaluate(index)?;
                let value = self.evaluate(value)?;

                if matches!(object, Value::String(_)) {
                    return Err(runtime_err(
                        bracket.line,
                        "Cannot set index of a string, strings are immutable.",
                    ));
                }

                let i = check_index(&object, &index, bracket)?;
                object.sequence_set(i, value.clone());

                Ok(value)
            }

            Expr::List { items, .. } => {
                let mut values: Vec<Value<'a>> = Vec::with_capacity(items.len());

                for item in items {
                    values.push(self.evaluate(item)?);
                }

                Ok(Value::List(Rc::new(RefCell::new(values))))
            }

            Expr::Fun(declaration) => {
                let function = Function {
                    name: None,
                    declaration: Rc::clone(declaration),
                    closure: Rc::clone(&self.environment),
                    is_initializer: false,
                };

                Ok(Value::Function(Rc::new(function)))
            }

            Expr::This { id, keyword } => self.lookup_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),

            Expr::Post { value, effect } => {
                let value = self.evaluate(value)?;
                self.evaluate(effect)?;

                Ok(value)
            }
        }
    }

    fn evaluate_binary(
        &mut self,
        left: &Expr<'a>,
        operator: &'a Token<'a>,
        right: &Expr<'a>,
    ) -> Eval<Value<'a>> {
        if matches!(operator.token_type, TokenType::COMMA) {
            self.evaluate(left)?;

            return self.evaluate(right);
        }

        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;
        let line = operator.line;

        match operator.token_type {
            // Compound assignment and ++/-- reuse their operator token here.
            TokenType::PLUS | TokenType::PLUS_EQUAL | TokenType::PLUS_PLUS => {
                add_values(left, right, line)
            }

            TokenType::MINUS | TokenType::MINUS_EQUAL | TokenType::MINUS_MINUS => {
                let (l, r) = number_operands(&left, &right, line)?;

                Ok(Value::Number(l - r))
            }

            TokenType::STAR | TokenType::STAR_EQUAL => {
                let (l, r) = number_operands(&left, &right, line)?;

                Ok(Value::Number(l * r))
            }

            TokenType::SLASH | TokenType::SLASH_EQUAL => {
                let (l, r) = number_operands(&left, &right, line)?;

                if r == 0.0 {
                    return Err(runtime_err(line, "Right operand cannot be 0."));
                }

                Ok(Value::Number(l / r))
            }

            TokenType::GREATER => {
                let (l, r) = number_operands(&left, &right, line)?;

                Ok(Value::Bool(l > r))
            }

            TokenType::GREATER_EQUAL => {
                let (l, r) = number_operands(&left, &right, line)?;

                Ok(Value::Bool(l >= r))
            }

            TokenType::LESS => {
                let (l, r) = number_operands(&left, &right, line)?;

                Ok(Value::Bool(l < r))
            }

            TokenType::LESS_EQUAL => {
                let (l, r) = number_operands(&left, &right, line)?;

                Ok(Value::Bool(l <= r))
            }

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left == right)),

            TokenType::BANG_EQUAL => Ok(Value::Bool(left != right)),

            TokenType::XOR => Ok(Value::Bool(left.is_truthy() ^ right.is_truthy())),

            _ => Err(runtime_err(line, "Invalid operands.")),
        }
    }

    fn evaluate_super(
        &mut self,
        id: ExprId,
        keyword: &'a Token<'a>,
        method: &'a Token<'a>,
    ) -> Eval<Value<'a>> {
        let distance = match self.locals.get(&id) {
            Some(&distance) => distance,
            None => {
                return Err(runtime_err(keyword.line, "Undefined variable 'super'."));
            }
        };

        let superclass = match Environment::get_at(
            &self.environment,
            distance,
            "super",
            keyword.line,
        )? {
            Value::Class(class) => class,
            _ => return Err(runtime_err(keyword.line, "Undefined variable 'super'.")),
        };

        // `this` lives one scope inside the one holding `super`.
        let object = Environment::get_at(&self.environment, distance - 1, "this", keyword.line)?;

        match superclass.find_method(method.lexeme) {
            Some(function) => Ok(Value::Function(Rc::new(function.bind(object)))),
            None => Err(runtime_err(
                method.line,
                format!(
                    "Undefined property '{}' on superclass '{}'.",
                    method.lexeme, superclass.name
                ),
            )),
        }
    }

    fn lookup_variable(&self, id: ExprId, name: &'a Token<'a>) -> Eval<Value<'a>> {
        let value = match self.locals.get(&id) {
            Some(&distance) => {
                Environment::get_at(&self.environment, distance, name.lexeme, name.line)?
            }
            None => self.globals.borrow().get(name.lexeme, name.line)?,
        };

        Ok(value)
    }

    fn get_property(&mut self, object: Value<'a>, name: &'a Token<'a>) -> Eval<Value<'a>> {
        match object {
            Value::Instance(ref instance) => {
                if let Some(field) = instance.borrow().fields.get(name.lexeme) {
                    return Ok(field.clone());
                }

                let class = Rc::clone(&instance.borrow().class);

                match class.find_method(name.lexeme) {
                    Some(method) => Ok(Value::Function(Rc::new(method.bind(object.clone())))),
                    None => Err(runtime_err(
                        name.line,
                        format!(
                            "Undefined property '{}' on instance of class '{}'.",
                            name.lexeme, class.name
                        ),
                    )),
                }
            }
            Value::Class(ref class) => {
                if let Some(field) = class.fields.borrow().get(name.lexeme) {
                    return Ok(field.clone());
                }

                let static_method = class
                    .metaclass
                    .as_ref()
                    .and_then(|metaclass| metaclass.find_method(name.lexeme));

                match static_method {
                    Some(method) => Ok(Value::Function(Rc::new(method.bind(object.clone())))),
                    None => Err(runtime_err(
                        name.line,
                        format!(
                            "Undefined property '{}' on instance of class '{} metaclass'.",
                            name.lexeme, class.name
                        ),
                    )),
                }
            }
            _ => Err(runtime_err(
                name.line,
                "Tried to access property from something not an instance of a class.",
            )),
        }
    }

    // ───────────────────────────── calls ────────────────────────────────────

    fn call_value(
        &mut self,
        callee: Value<'a>,
        arguments: Vec<Value<'a>>,
        paren: &'a Token<'a>,
    ) -> Eval<Value<'a>> {
        let arity = match &callee {
            Value::NativeFunction { arity, .. } => *arity,
            Value::Function(function) => function.arity(),
            Value::Class(class) => class.arity(),
            _ => {
                return Err(runtime_err(paren.line, "Calling an uncallable thing."));
            }
        };

        if arguments.len() != arity {
            return Err(runtime_err(
                paren.line,
                format!(
                    "Expected {} arguments but got {} instead.",
                    arity,
                    arguments.len()
                ),
            ));
        }

        match callee {
            Value::NativeFunction { func, .. } => match func(&arguments) {
                Ok(value) => Ok(value),
                Err(NativeError::Exit) => Err(Unwind::Exit),
                Err(NativeError::Msg(msg)) => Err(runtime_err(paren.line, msg)),
            },

            Value::Function(function) => self.call_function(&function, arguments),

            Value::Class(class) => {
                let instance = Rc::new(RefCell::new(Instance::new(Rc::clone(&class))));

                if let Some(init) = class.find_method("init") {
                    let bound = init.bind(Value::Instance(Rc::clone(&instance)));
                    self.call_function(&bound, arguments)?;
                }

                Ok(Value::Instance(instance))
            }

            // Arity dispatch above already rejected everything else.
            _ => Err(runtime_err(paren.line, "Calling an uncallable thing.")),
        }
    }

    fn call_function(
        &mut self,
        function: &Function<'a>,
        arguments: Vec<Value<'a>>,
    ) -> Eval<Value<'a>> {
        let mut env = Environment::with_enclosing(Rc::clone(&function.closure));

        for (param, argument) in function.declaration.params.iter().zip(arguments) {
            env.define(param.lexeme, argument);
        }

        let previous = Rc::clone(&self.environment);
        self.environment = Rc::new(RefCell::new(env));

        let result = self.execute_all(&function.declaration.body);
        self.environment = previous;

        let signal = result?;

        if function.is_initializer {
            // `init` always yields the receiver, even on early return.
            let this = Environment::get_at(&function.closure, 0, "this", 0)?;

            return Ok(this);
        }

        match signal {
            Signal::Return(value) => Ok(value),
            _ => Ok(Value::Nil),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Free helpers
// ─────────────────────────────────────────────────────────────────────────────

/// `+` over numbers, strings, and lists.  A string on either side stringifies
/// the other operand; two lists concatenate into a fresh list.
fn add_values<'a>(left: Value<'a>, right: Value<'a>, line: usize) -> Eval<Value<'a>> {
    match (&left, &right) {
        (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),

        (Value::String(_), _) | (_, Value::String(_)) => {
            Ok(Value::String(format!("{}{}", left, right)))
        }

        (Value::List(l), Value::List(r)) => {
            let mut items: Vec<Value<'a>> = l.borrow().clone();
            items.extend(r.borrow().iter().cloned());

            Ok(Value::List(Rc::new(RefCell::new(items))))
        }

        _ => Err(runtime_err(line, "Invalid operands.")),
    }
}

fn number_operands(left: &Value<'_>, right: &Value<'_>, line: usize) -> Eval<(f64, f64)> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => Ok((*l, *r)),
        _ => Err(runtime_err(line, "Operands must be numbers.")),
    }
}

/// Validate an index against a sequence value and return it as `usize`.
fn check_index(object: &Value<'_>, index: &Value<'_>, bracket: &Token<'_>) -> Eval<usize> {
    let length = match object.sequence_length() {
        Some(length) => length,
        None => {
            return Err(runtime_err(
                bracket.line,
                "Indexing something that is not a sequence.",
            ));
        }
    };

    let n = match index {
        Value::Number(n) => n.trunc(),
        _ => {
            return Err(runtime_err(
                bracket.line,
                "Index to sequence is not a number.",
            ));
        }
    };

    if n < 0.0 || n as usize >= length {
        return Err(runtime_err(
            bracket.line,
            "Indexing out of range of sequence.",
        ));
    }

    Ok(n as usize)
}
