//! Runtime type operations: alias resolution, subtype tests, casts.
//!
//! Types at runtime are checked against the value's actual shape; the kind
//! and layout annotations carried by values are informative, never
//! authoritative. Name resolution consults the local type environment first
//! (bound type parameters), then the global type definitions, following
//! transparent aliases; named struct and variant definitions stay nominal.

use relic_ir::{DefTyp, Iter, NumKind, Span, Typ, VarId};
use relic_value::Value;

use crate::context::Ctx;
use crate::errors::{
    invalid_operation, type_substitution_error, unbound_name, EvalResult, NameKind,
};

/// Alias chains longer than this are cyclic.
const MAX_ALIAS_DEPTH: usize = 64;

/// Follow type-parameter bindings and transparent aliases to a head type.
/// A name bound to a struct or variant definition resolves to itself.
pub(crate) fn resolve(ctx: &Ctx, typ: &Typ, span: Span) -> EvalResult<Typ> {
    let mut current = typ.clone();
    for _ in 0..MAX_ALIAS_DEPTH {
        let name = match current {
            Typ::Var(name) => name,
            other => return Ok(other),
        };
        if let Some(bound) = ctx.tenv.lookup(&VarId::plain(name)) {
            current = bound.clone();
            continue;
        }
        match ctx.globals.typdef(name) {
            Some(def) => match &def.body {
                DefTyp::Plain(aliased) => current = aliased.clone(),
                DefTyp::Struct(_) | DefTyp::Variant(_) => return Ok(Typ::Var(name)),
            },
            None => {
                return Err(unbound_name(NameKind::Type, &ctx.name_str(name), span));
            }
        }
    }
    Err(invalid_operation("type alias cycle", span))
}

/// Validate a type argument before substitution. Function types are not
/// substitutable: the language is first-order.
pub(crate) fn check_targ(ctx: &Ctx, typ: &Typ, span: Span) -> EvalResult<()> {
    if resolve(ctx, typ, span)? == Typ::Func {
        return Err(type_substitution_error(
            "cannot substitute a function type for a type parameter",
            span,
        ));
    }
    Ok(())
}

/// Shape-based subtype test of a value against a type.
pub(crate) fn is_subtype(ctx: &Ctx, value: &Value, typ: &Typ, span: Span) -> EvalResult<bool> {
    let resolved = resolve(ctx, typ, span)?;
    let holds = match &resolved {
        Typ::Bool => value.as_bool().is_some(),
        // Nat is the non-negative integers, a subtype of Int.
        Typ::Num(NumKind::Int) => value.as_num().is_some(),
        Typ::Num(NumKind::Nat) => value.as_num().is_some_and(|n| !n.int.is_negative()),
        Typ::Text => value.as_text().is_some(),
        Typ::Tuple(typs) => match value.as_tuple() {
            Some(items) if items.len() == typs.len() => {
                for (item, t) in items.iter().zip(typs) {
                    if !is_subtype(ctx, item, t, span)? {
                        return Ok(false);
                    }
                }
                true
            }
            _ => false,
        },
        Typ::Iter(inner, Iter::Opt) => match value.as_opt() {
            Some(None) => true,
            Some(Some(item)) => is_subtype(ctx, item, inner, span)?,
            None => false,
        },
        Typ::Iter(inner, Iter::List) => match value.as_list() {
            Some(items) => {
                for item in items {
                    if !is_subtype(ctx, item, inner, span)? {
                        return Ok(false);
                    }
                }
                true
            }
            None => false,
        },
        Typ::Func => value.as_func().is_some(),
        Typ::Var(name) => {
            // resolve() only leaves nominal definitions behind.
            let def = ctx
                .globals
                .typdef(*name)
                .ok_or_else(|| unbound_name(NameKind::Type, &ctx.name_str(*name), span))?;
            match &def.body {
                DefTyp::Struct(fields) => value
                    .as_struct()
                    .is_some_and(|s| {
                        s.layout.fields().len() == fields.len()
                            && s.layout
                                .fields()
                                .iter()
                                .zip(fields)
                                .all(|(have, (want, _))| have == want)
                    }),
                DefTyp::Variant(cases) => value
                    .as_case()
                    .is_some_and(|c| cases.iter().any(|case| case.mixop == c.mixop)),
                DefTyp::Plain(_) => false,
            }
        }
    };
    Ok(holds)
}

/// Widening cast. Re-kinds Nat numbers to Int; otherwise the value passes
/// through unchanged once the subtype check holds.
pub(crate) fn upcast(ctx: &Ctx, value: Value, typ: &Typ, span: Span) -> EvalResult<Value> {
    let resolved = resolve(ctx, typ, span)?;
    if let (Typ::Num(NumKind::Int), Some(n)) = (&resolved, value.as_num()) {
        return Ok(Value::num(n.int.clone(), NumKind::Int));
    }
    if is_subtype(ctx, &value, &resolved, span)? {
        Ok(value)
    } else {
        Err(invalid_operation(
            format!("cannot upcast {} to {resolved:?}", value.type_name()),
            span,
        ))
    }
}

/// Narrowing cast. Fails when the value lies outside the target type.
pub(crate) fn downcast(ctx: &Ctx, value: Value, typ: &Typ, span: Span) -> EvalResult<Value> {
    let resolved = resolve(ctx, typ, span)?;
    if let (Typ::Num(kind), Some(n)) = (&resolved, value.as_num()) {
        if *kind == NumKind::Nat && n.int.is_negative() {
            return Err(invalid_operation(
                format!("cannot downcast negative {} to nat", n.int),
                span,
            ));
        }
        return Ok(Value::num(n.int.clone(), *kind));
    }
    if is_subtype(ctx, &value, &resolved, span)? {
        Ok(value)
    } else {
        Err(invalid_operation(
            format!("cannot downcast {} to {resolved:?}", value.type_name()),
            span,
        ))
    }
}
