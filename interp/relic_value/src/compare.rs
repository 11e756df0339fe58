//! Total structural ordering over values.
//!
//! Every pair of values compares: unlike variants order by a fixed variant
//! rank, like variants compare structurally. Pattern matching, guard
//! evaluation, and the sorted map builtins all sit on this one ordering, so
//! equality is exactly `compare == Equal` and never pointer identity.

use std::cmp::Ordering;

use crate::Value;

/// Fixed variant rank ordering unlike variants.
pub(crate) fn rank(v: &Value) -> u8 {
    match v {
        Value::Bool(_) => 0,
        Value::Num(_) => 1,
        Value::Text(_) => 2,
        Value::Struct(_) => 3,
        Value::Case(_) => 4,
        Value::Tuple(_) => 5,
        Value::Opt(_) => 6,
        Value::List(_) => 7,
        Value::Func(_) => 8,
    }
}

fn compare_slices(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        let ord = compare(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

/// Three-way structural comparison, total over all value pairs.
///
/// Numbers compare by mathematical value, ignoring kind and representation.
/// Structs compare by field slots in their own layout order; layouts are
/// never re-sorted. Case values compare by interned mixop id first (a stable
/// order within one table), then elementwise. Absent options order before
/// present ones.
pub fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Num(x), Value::Num(y)) => x.int.cmp(&y.int),
        (Value::Text(x), Value::Text(y)) => x.as_str().cmp(y.as_str()),
        (Value::Struct(x), Value::Struct(y)) => compare_slices(&x.fields, &y.fields),
        (Value::Case(x), Value::Case(y)) => x
            .mixop
            .cmp(&y.mixop)
            .then_with(|| compare_slices(&x.args, &y.args)),
        (Value::Tuple(x), Value::Tuple(y)) => compare_slices(x, y),
        (Value::Opt(x), Value::Opt(y)) => match (x, y) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => compare(x, y),
        },
        (Value::List(x), Value::List(y)) => compare_slices(x, y),
        (Value::Func(x), Value::Func(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Structural equality: `compare == Equal`.
pub fn eq(a: &Value, b: &Value) -> bool {
    compare(a, b) == Ordering::Equal
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        eq(self, other)
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(compare(self, other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}
