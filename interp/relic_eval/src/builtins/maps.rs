//! Map builtins.
//!
//! A map is the case value `{}(entries)` where each entry is `->(key, value)`
//! and entries are kept sorted by key under the total value ordering. The
//! sorted invariant is established by `add_map`/`update_map`; lookups still
//! scan the whole list so unsorted input degrades to a slower answer, never
//! a wrong one.

use std::cmp::Ordering;

use relic_ir::Span;
use relic_value::{compare, eq, Value};

use crate::context::Ctx;
use crate::errors::{invalid_operation, EvalResult};

use super::sets::elements;

/// Decode one `->(key, value)` entry.
fn entry<'a>(ctx: &Ctx, what: &str, value: &'a Value, span: Span) -> EvalResult<(&'a Value, &'a Value)> {
    let case = value
        .as_case()
        .filter(|c| c.mixop == ctx.globals.builtin_mixops.arrow && c.args.len() == 2);
    match case {
        Some(c) => Ok((&c.args[0], &c.args[1])),
        None => Err(invalid_operation(
            format!("{what} expects map entries, got {}", value.type_name()),
            span,
        )),
    }
}

fn make_entry(ctx: &Ctx, key: Value, value: Value) -> Value {
    Value::case(ctx.globals.builtin_mixops.arrow, vec![key, value])
}

fn make_map(ctx: &Ctx, entries: Vec<Value>) -> Value {
    Value::case(ctx.globals.builtin_mixops.braces, vec![Value::list(entries)])
}

/// `add_map(m, k, v)`: ordered insert, replacing on an equal key.
pub(super) fn add(ctx: &Ctx, m: &Value, k: &Value, v: &Value, span: Span) -> EvalResult<Value> {
    let entries = elements(ctx, "add_map", m, span)?;
    let mut out = Vec::with_capacity(entries.len() + 1);
    let mut placed = false;
    for e in entries {
        let (ek, _) = entry(ctx, "add_map", e, span)?;
        if placed {
            out.push(e.clone());
            continue;
        }
        match compare(k, ek) {
            Ordering::Less => {
                out.push(make_entry(ctx, k.clone(), v.clone()));
                out.push(e.clone());
                placed = true;
            }
            Ordering::Equal => {
                out.push(make_entry(ctx, k.clone(), v.clone()));
                placed = true;
            }
            Ordering::Greater => out.push(e.clone()),
        }
    }
    if !placed {
        out.push(make_entry(ctx, k.clone(), v.clone()));
    }
    Ok(make_map(ctx, out))
}

/// `update_map(m, k, v)`: replace the entry for `k`, which must exist.
pub(super) fn update(ctx: &Ctx, m: &Value, k: &Value, v: &Value, span: Span) -> EvalResult<Value> {
    let entries = elements(ctx, "update_map", m, span)?;
    let mut out = Vec::with_capacity(entries.len());
    let mut found = false;
    for e in entries {
        let (ek, _) = entry(ctx, "update_map", e, span)?;
        if !found && eq(ek, k) {
            out.push(make_entry(ctx, k.clone(), v.clone()));
            found = true;
        } else {
            out.push(e.clone());
        }
    }
    if !found {
        return Err(invalid_operation(
            format!("update_map: key {k} not present"),
            span,
        ));
    }
    Ok(make_map(ctx, out))
}

/// `find_map(m, k)`: the value bound to `k`, as an optional.
pub(super) fn find(ctx: &Ctx, m: &Value, k: &Value, span: Span) -> EvalResult<Value> {
    let entries = elements(ctx, "find_map", m, span)?;
    for e in entries {
        let (ek, ev) = entry(ctx, "find_map", e, span)?;
        if eq(ek, k) {
            return Ok(Value::some(ev.clone()));
        }
    }
    Ok(Value::none())
}

/// `mem_map(m, k)`: key membership.
pub(super) fn mem(ctx: &Ctx, m: &Value, k: &Value, span: Span) -> EvalResult<Value> {
    let entries = elements(ctx, "mem_map", m, span)?;
    for e in entries {
        let (ek, _) = entry(ctx, "mem_map", e, span)?;
        if eq(ek, k) {
            return Ok(Value::bool(true));
        }
    }
    Ok(Value::bool(false))
}
