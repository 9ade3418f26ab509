//! Module `ast` defines the expression and statement trees produced by the
//! parser.
//!
//! Every node that the resolver needs to annotate with a lexical distance
//! (`Variable`, `Assign`, `This`, `Super`) carries a parser‑assigned [`ExprId`]
//! so that resolution data can live in a side table on the interpreter instead
//! of inside the tree itself.
//!
//! Function declarations are shared through `Rc<FunDecl>` because a single
//! declaration can be evaluated many times (methods, closures created in a
//! loop) and each evaluation only needs a cheap handle.

use crate::token::Token;
use std::rc::Rc;

/// Unique identifier for a resolvable expression node.  Assigned by the parser
/// as a simple counter, consumed by the resolver and interpreter.
pub type ExprId = usize;

/// A literal value embedded directly in the source text.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    Str(String),
    True,
    False,
    Nil,
}

/// The parameter list and body shared by named functions, methods, and
/// anonymous `fun` expressions.
#[derive(Debug, Clone)]
pub struct FunDecl<'a> {
    pub params: Vec<&'a Token<'a>>,
    pub body: Vec<Stmt<'a>>,
}

/// A method inside a class declaration, either an instance method or a member
/// of a `static { … }` block.
#[derive(Debug, Clone)]
pub struct Method<'a> {
    pub name: &'a Token<'a>,
    pub declaration: Rc<FunDecl<'a>>,
}

#[derive(Debug, Clone)]
pub enum Expr<'a> {
    Literal(LiteralValue),

    Grouping(Box<Expr<'a>>),

    Unary {
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    Binary {
        left: Box<Expr<'a>>,
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// `and` / `or`: short‑circuiting, yields one of the operand values.
    Logical {
        left: Box<Expr<'a>>,
        operator: &'a Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Ternary `condition ? if_true : if_false`.
    Conditional {
        condition: Box<Expr<'a>>,
        if_true: Box<Expr<'a>>,
        if_false: Box<Expr<'a>>,
    },

    Variable {
        id: ExprId,
        name: &'a Token<'a>,
    },

    Assign {
        id: ExprId,
        name: &'a Token<'a>,
        value: Box<Expr<'a>>,
    },

    Call {
        callee: Box<Expr<'a>>,
        /// Closing parenthesis, kept for error line numbers.
        paren: &'a Token<'a>,
        arguments: Vec<Expr<'a>>,
    },

    /// Property read `object.name`.
    Get {
        object: Box<Expr<'a>>,
        name: &'a Token<'a>,
    },

    /// Property write `object.name = value`.
    Set {
        object: Box<Expr<'a>>,
        name: &'a Token<'a>,
        value: Box<Expr<'a>>,
    },

    /// Sequence read `object[index]`.
    Index {
        object: Box<Expr<'a>>,
        /// Opening bracket, kept for error line numbers.
        bracket: &'a Token<'a>,
        index: Box<Expr<'a>>,
    },

    /// Sequence write `object[index] = value`.
    SetIndex {
        object: Box<Expr<'a>>,
        bracket: &'a Token<'a>,
        index: Box<Expr<'a>>,
        value: Box<Expr<'a>>,
    },

    /// List literal `[a, b, c]`.
    List {
        bracket: &'a Token<'a>,
        items: Vec<Expr<'a>>,
    },

    /// Anonymous function expression.
    Fun(Rc<FunDecl<'a>>),

    This {
        id: ExprId,
        keyword: &'a Token<'a>,
    },

    Super {
        id: ExprId,
        keyword: &'a Token<'a>,
        method: &'a Token<'a>,
    },

    /// Postfix `++` / `--`: evaluate `value` first, then run `effect` for its
    /// side effect, and yield the pre‑increment value.
    Post {
        value: Box<Expr<'a>>,
        effect: Box<Expr<'a>>,
    },
}

#[derive(Debug, Clone)]
pub enum Stmt<'a> {
    Expression(Expr<'a>),

    Print(Expr<'a>),

    Var {
        name: &'a Token<'a>,
        initializer: Option<Expr<'a>>,
    },

    Block(Vec<Stmt<'a>>),

    If {
        condition: Expr<'a>,
        then_branch: Box<Stmt<'a>>,
        else_branch: Option<Box<Stmt<'a>>>,
    },

    While {
        condition: Expr<'a>,
        body: Box<Stmt<'a>>,
        /// Runs after each completed or `continue`d iteration, but not after
        /// `break`.  `for` loops desugar their increment clause into this slot.
        aftereach: Option<Box<Stmt<'a>>>,
    },

    /// Sequence iteration.  The loop variable lives in the enclosing scope
    /// and is rebound to each element in turn.
    Forall {
        name: &'a Token<'a>,
        sequence: Expr<'a>,
        body: Box<Stmt<'a>>,
        aftereach: Option<Box<Stmt<'a>>>,
    },

    Break(&'a Token<'a>),

    Continue(&'a Token<'a>),

    Return {
        keyword: &'a Token<'a>,
        value: Option<Expr<'a>>,
    },

    Function {
        name: &'a Token<'a>,
        declaration: Rc<FunDecl<'a>>,
    },

    Class {
        name: &'a Token<'a>,
        /// Always an `Expr::Variable` when present.
        superclass: Option<Expr<'a>>,
        methods: Vec<Method<'a>>,
        statics: Vec<Method<'a>>,
    },
}
