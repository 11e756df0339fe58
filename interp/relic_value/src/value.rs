//! The runtime value domain.
//!
//! Values are immutable; composite payloads live behind `Heap` so cloning a
//! value never copies its contents. Construction goes through the factory
//! methods, which keep allocation decisions in one place.

use std::fmt;
use std::hash::{Hash, Hasher};

use relic_ir::{Integer, Name, NumKind};

use crate::compare::rank;
use crate::{CaseValue, Heap, StructLayout, StructValue};

/// A number: an arbitrary-precision integer plus its declared kind.
///
/// The kind is carried for display and cast semantics. The Nat invariant
/// (non-negative) is produced by correct operations, never enforced here,
/// and equality and ordering ignore the kind entirely.
#[derive(Clone, Debug)]
pub struct Num {
    pub int: Integer,
    pub kind: NumKind,
}

impl Num {
    pub fn new(int: Integer, kind: NumKind) -> Self {
        Num { int, kind }
    }
}

/// A runtime value.
#[derive(Clone)]
pub enum Value {
    Bool(bool),
    Num(Num),
    Text(Heap<String>),
    Struct(StructValue),
    Case(CaseValue),
    Tuple(Heap<Vec<Value>>),
    Opt(Option<Heap<Value>>),
    List(Heap<Vec<Value>>),
    /// A first-class reference to a named function definition.
    Func(Name),
}

impl Value {
    pub fn bool(b: bool) -> Self {
        Value::Bool(b)
    }

    pub fn nat(int: impl Into<Integer>) -> Self {
        Value::Num(Num::new(int.into(), NumKind::Nat))
    }

    pub fn int(int: impl Into<Integer>) -> Self {
        Value::Num(Num::new(int.into(), NumKind::Int))
    }

    pub fn num(int: Integer, kind: NumKind) -> Self {
        Value::Num(Num::new(int, kind))
    }

    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(Heap::new(s.into()))
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(Heap::new(items))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Heap::new(items))
    }

    pub fn some(value: Value) -> Self {
        Value::Opt(Some(Heap::new(value)))
    }

    pub fn none() -> Self {
        Value::Opt(None)
    }

    pub fn case(mixop: relic_ir::MixopId, args: Vec<Value>) -> Self {
        Value::Case(CaseValue::new(mixop, args))
    }

    pub fn struct_(layout: StructLayout, fields: Vec<Value>) -> Self {
        Value::Struct(StructValue::new(layout, fields))
    }

    pub fn func(name: Name) -> Self {
        Value::Func(name)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<&Num> {
        match self {
            Value::Num(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_case(&self) -> Option<&CaseValue> {
        match self {
            Value::Case(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// `Some(Some(v))` for a present option, `Some(None)` for an absent one,
    /// `None` for any other variant.
    pub fn as_opt(&self) -> Option<Option<&Value>> {
        match self {
            Value::Opt(inner) => Some(inner.as_deref()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_func(&self) -> Option<Name> {
        match self {
            Value::Func(name) => Some(*name),
            _ => None,
        }
    }

    /// Variant name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Num(n) => match n.kind {
                NumKind::Nat => "nat",
                NumKind::Int => "int",
            },
            Value::Text(_) => "text",
            Value::Struct(_) => "struct",
            Value::Case(_) => "case",
            Value::Tuple(_) => "tuple",
            Value::Opt(_) => "opt",
            Value::List(_) => "list",
            Value::Func(_) => "func",
        }
    }
}

/// Hashing mirrors equality: numeric kind and struct layout names never
/// participate, only the mathematical/structural content does.
impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        rank(self).hash(state);
        match self {
            Value::Bool(b) => b.hash(state),
            Value::Num(n) => n.int.hash(state),
            Value::Text(s) => s.hash(state),
            Value::Struct(s) => s.fields.hash(state),
            Value::Case(c) => {
                c.mixop.hash(state);
                c.args.hash(state);
            }
            Value::Tuple(items) => items.hash(state),
            Value::Opt(inner) => inner.hash(state),
            Value::List(items) => items.hash(state),
            Value::Func(name) => name.hash(state),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Num(n) => write!(f, "{}", n.int),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Struct(s) => {
                write!(f, "{{")?;
                write_joined(f, &s.fields)?;
                write!(f, "}}")
            }
            Value::Case(c) => {
                write!(f, "#{}(", c.mixop.raw())?;
                write_joined(f, &c.args)?;
                write!(f, ")")
            }
            Value::Tuple(items) => {
                write!(f, "(")?;
                write_joined(f, items)?;
                write!(f, ")")
            }
            Value::Opt(None) => write!(f, "?()"),
            Value::Opt(Some(inner)) => write!(f, "?({})", **inner),
            Value::List(items) => {
                write!(f, "[")?;
                write_joined(f, items)?;
                write!(f, "]")
            }
            Value::Func(name) => write!(f, "func {name:?}"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Num(n) => write!(f, "Num({:?}, {:?})", n.int, n.kind),
            Value::Text(s) => write!(f, "Text({s:?})"),
            Value::Struct(s) => write!(f, "Struct({:?}, {:?})", s.layout, s.fields),
            Value::Case(c) => write!(f, "Case({:?}, {:?})", c.mixop, c.args),
            Value::Tuple(items) => write!(f, "Tuple({items:?})"),
            Value::Opt(inner) => write!(f, "Opt({inner:?})"),
            Value::List(items) => write!(f, "List({items:?})"),
            Value::Func(name) => write!(f, "Func({name:?})"),
        }
    }
}
