//! Module `value` defines the runtime value model.
//!
//! Scalars (`Number`, `Bool`, `Nil`) and strings are owned and copied freely.
//! Lists, functions, classes, instances, and file handles are shared through
//! `Rc`, with `RefCell` wherever the language allows mutation through an
//! alias.  Equality is structural for scalars, strings, and lists, and
//! identity (`Rc::ptr_eq`) for everything with object identity.
//!
//! Strings and lists both expose the *sequence* capability used by indexing
//! and the `length` native: strings are indexable but immutable, lists are
//! both indexable and mutable.

use crate::ast::FunDecl;
use crate::environment::Environment;
use crate::native::{NativeError, ReadHandle, WriteHandle};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Signature shared by every native function.
pub type NativeFn<'a> = fn(&[Value<'a>]) -> std::result::Result<Value<'a>, NativeError>;

#[derive(Debug, Clone)]
pub enum Value<'a> {
    Number(f64),
    Bool(bool),
    Nil,
    String(String),
    List(Rc<RefCell<Vec<Value<'a>>>>),
    Function(Rc<Function<'a>>),
    Class(Rc<Class<'a>>),
    Instance(Rc<RefCell<Instance<'a>>>),
    NativeFunction {
        name: &'static str,
        arity: usize,
        func: NativeFn<'a>,
    },
    ReadHandle(Rc<RefCell<ReadHandle>>),
    WriteHandle(Rc<RefCell<WriteHandle>>),
}

impl<'a> Value<'a> {
    /// `nil` and `false` are falsey, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Bool(b) => *b,
            _ => true,
        }
    }

    /// Number of elements for sequence values, `None` otherwise.  Strings are
    /// measured in characters, not bytes.
    pub fn sequence_length(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.chars().count()),
            Value::List(items) => Some(items.borrow().len()),
            _ => None,
        }
    }

    /// Read element `index`.  The caller has already range‑checked against
    /// [`sequence_length`], so out‑of‑range here means a non‑sequence.
    pub fn sequence_get(&self, index: usize) -> Option<Value<'a>> {
        match self {
            Value::String(s) => s.chars().nth(index).map(|c| Value::String(c.to_string())),
            Value::List(items) => items.borrow().get(index).cloned(),
            _ => None,
        }
    }

    /// Write element `index`.  Only lists are mutable; the interpreter rejects
    /// string element assignment before calling this.
    pub fn sequence_set(&self, index: usize, value: Value<'a>) {
        if let Value::List(items) = self {
            items.borrow_mut()[index] = value;
        }
    }
}

impl<'a> PartialEq for Value<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow()
            }
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            (
                Value::NativeFunction { name: a, .. },
                Value::NativeFunction { name: b, .. },
            ) => a == b,
            (Value::ReadHandle(a), Value::ReadHandle(b)) => Rc::ptr_eq(a, b),
            (Value::WriteHandle(a), Value::WriteHandle(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<'a> fmt::Display for Value<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                // Whole numbers print without a trailing ".0".
                if n.fract() == 0.0 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Bool(b) => write!(f, "{}", b),
            Value::Nil => write!(f, "nil"),
            Value::String(s) => write!(f, "{}", s),
            Value::List(items) => {
                write!(f, "[")?;

                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }

                    write!(f, "{}", item)?;
                }

                write!(f, "]")
            }
            Value::Function(fun) => match &fun.name {
                Some(name) => write!(f, "<fn {}>", name),
                None => write!(f, "<fn>"),
            },
            Value::Class(class) => write!(f, "{}", class.name),
            Value::Instance(instance) => {
                write!(f, "{} instance", instance.borrow().class.name)
            }
            Value::NativeFunction { .. } => write!(f, "<native fn>"),
            Value::ReadHandle(handle) => write!(f, "<file {} read>", handle.borrow().name()),
            Value::WriteHandle(handle) => write!(f, "<file {} write>", handle.borrow().name()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Functions
// ─────────────────────────────────────────────────────────────────────────────

/// A user‑defined function or method: a shared declaration plus the
/// environment it closed over.
pub struct Function<'a> {
    pub name: Option<String>,
    pub declaration: Rc<FunDecl<'a>>,
    pub closure: Rc<RefCell<Environment<'a>>>,
    pub is_initializer: bool,
}

impl<'a> Function<'a> {
    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Produce a bound method: same declaration, but closing over a fresh
    /// environment in which `this` is the receiver.
    pub fn bind(&self, this: Value<'a>) -> Function<'a> {
        let mut env = Environment::with_enclosing(Rc::clone(&self.closure));
        env.define("this", this);

        Function {
            name: self.name.clone(),
            declaration: Rc::clone(&self.declaration),
            closure: Rc::new(RefCell::new(env)),
            is_initializer: self.is_initializer,
        }
    }
}

impl<'a> fmt::Debug for Function<'a> {
    // Closures can form reference cycles through their environment, so keep
    // the debug representation shallow.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("is_initializer", &self.is_initializer)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Classes and instances
// ─────────────────────────────────────────────────────────────────────────────

/// A class object.  Classes are first class: they carry their own field table
/// (static fields) and an optional metaclass whose instance methods act as
/// this class's static methods.
pub struct Class<'a> {
    pub name: String,
    pub superclass: Option<Rc<Class<'a>>>,
    pub methods: HashMap<String, Rc<Function<'a>>>,
    pub metaclass: Option<Rc<Class<'a>>>,
    pub fields: RefCell<HashMap<String, Value<'a>>>,
}

impl<'a> Class<'a> {
    /// Look `name` up on this class, then up the inheritance chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<Function<'a>>> {
        if let Some(method) = self.methods.get(name) {
            return Some(Rc::clone(method));
        }

        self.superclass
            .as_ref()
            .and_then(|superclass| superclass.find_method(name))
    }

    /// Constructor arity: `init`'s if declared, otherwise zero.
    pub fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |init| init.arity())
    }
}

impl<'a> fmt::Debug for Class<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// An instance: a reference to its class plus its own field table.
pub struct Instance<'a> {
    pub class: Rc<Class<'a>>,
    pub fields: HashMap<String, Value<'a>>,
}

impl<'a> Instance<'a> {
    pub fn new(class: Rc<Class<'a>>) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }
}

impl<'a> fmt::Debug for Instance<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_numbers_print_without_decimal() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(3.5).to_string(), "3.5");
        assert_eq!(Value::Number(-0.25).to_string(), "-0.25");
    }

    #[test]
    fn lists_print_bracketed() {
        let list: Value = Value::List(Rc::new(RefCell::new(vec![
            Value::Number(1.0),
            Value::String("two".to_owned()),
            Value::Nil,
        ])));

        assert_eq!(list.to_string(), "[1, two, nil]");

        let empty: Value = Value::List(Rc::new(RefCell::new(Vec::new())));

        assert_eq!(empty.to_string(), "[]");
    }

    #[test]
    fn list_equality_is_elementwise() {
        let a: Value = Value::List(Rc::new(RefCell::new(vec![Value::Number(1.0)])));
        let b: Value = Value::List(Rc::new(RefCell::new(vec![Value::Number(1.0)])));
        let c: Value = Value::List(Rc::new(RefCell::new(vec![Value::Number(2.0)])));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::String(String::new()).is_truthy());
    }

    #[test]
    fn string_indexing_is_character_based() {
        let s: Value = Value::String("héllo".to_owned());

        assert_eq!(s.sequence_length(), Some(5));
        assert_eq!(s.sequence_get(1), Some(Value::String("é".to_owned())));
    }
}
