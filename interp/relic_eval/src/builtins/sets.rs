//! Set builtins.
//!
//! A set is the case value `{}(elements)`: the brace constructor applied to
//! one list. No deduplication invariant is assumed on inputs; each operation
//! establishes only what it needs through structural `eq`.

use relic_ir::Span;
use relic_value::{eq, Value};

use crate::context::Ctx;
use crate::errors::{invalid_operation, EvalResult};

use super::expect_list;

/// Decode the element list of a set value.
pub(super) fn elements<'a>(
    ctx: &Ctx,
    what: &str,
    value: &'a Value,
    span: Span,
) -> EvalResult<&'a [Value]> {
    let case = value.as_case().filter(|c| {
        c.mixop == ctx.globals.builtin_mixops.braces && c.args.len() == 1
    });
    match case {
        Some(c) => expect_list(what, &c.args[0], span),
        None => Err(invalid_operation(
            format!("{what} expects a set, got {}", value.type_name()),
            span,
        )),
    }
}

fn make_set(ctx: &Ctx, elems: Vec<Value>) -> Value {
    Value::case(ctx.globals.builtin_mixops.braces, vec![Value::list(elems)])
}

fn contains(haystack: &[Value], needle: &Value) -> bool {
    haystack.iter().any(|v| eq(v, needle))
}

pub(super) fn union(ctx: &Ctx, a: &Value, b: &Value, span: Span) -> EvalResult<Value> {
    let a = elements(ctx, "union_set", a, span)?;
    let b = elements(ctx, "union_set", b, span)?;
    let mut out = a.to_vec();
    for item in b {
        if !contains(a, item) {
            out.push(item.clone());
        }
    }
    Ok(make_set(ctx, out))
}

pub(super) fn intersect(ctx: &Ctx, a: &Value, b: &Value, span: Span) -> EvalResult<Value> {
    let a = elements(ctx, "intersect_set", a, span)?;
    let b = elements(ctx, "intersect_set", b, span)?;
    let out = a.iter().filter(|v| contains(b, v)).cloned().collect();
    Ok(make_set(ctx, out))
}

pub(super) fn diff(ctx: &Ctx, a: &Value, b: &Value, span: Span) -> EvalResult<Value> {
    let a = elements(ctx, "diff_set", a, span)?;
    let b = elements(ctx, "diff_set", b, span)?;
    let out = a.iter().filter(|v| !contains(b, v)).cloned().collect();
    Ok(make_set(ctx, out))
}

/// Subset test.
pub(super) fn sub(ctx: &Ctx, a: &Value, b: &Value, span: Span) -> EvalResult<Value> {
    let a = elements(ctx, "sub_set", a, span)?;
    let b = elements(ctx, "sub_set", b, span)?;
    Ok(Value::bool(a.iter().all(|v| contains(b, v))))
}

/// Extensional set equality: mutual inclusion, element order irrelevant.
pub(super) fn set_eq(ctx: &Ctx, a: &Value, b: &Value, span: Span) -> EvalResult<Value> {
    let xs = elements(ctx, "eq_set", a, span)?;
    let ys = elements(ctx, "eq_set", b, span)?;
    let both = xs.iter().all(|v| contains(ys, v)) && ys.iter().all(|v| contains(xs, v));
    Ok(Value::bool(both))
}

/// `unions_set(list of sets)`: left fold of `union_set` over the empty set.
pub(super) fn unions(ctx: &Ctx, list: &Value, span: Span) -> EvalResult<Value> {
    let sets = expect_list("unions_set", list, span)?;
    let mut acc = make_set(ctx, Vec::new());
    for set in sets {
        acc = union(ctx, &acc, set, span)?;
    }
    Ok(acc)
}
